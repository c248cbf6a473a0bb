//! Records produced and consumed by one resolution pass.

use crate::constants::{DEFAULT_CONTAINER_NAME, RESOLVED_PATH_PROPERTY, SOURCE_REFERENCE_PROPERTY};
use crate::core::{ResolverError, Result};
use crate::model::{ModelStore, NodeId, NodeKind, join_model_path};

/// A dependency record as stored under an artifact's container node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    /// The record node
    pub node: NodeId,
    /// Model path of the record node
    pub path: String,
    /// Raw reference strings that asserted this dependency
    pub source_references: Vec<String>,
    /// Canonical target path, absent when resolution failed
    pub resolved_path: Option<String>,
}

impl DependencyRecord {
    /// Reads the record stored at `node`.
    ///
    /// # Errors
    ///
    /// Fails with [`ResolverError::NodeNotFound`] if `node` does not exist and
    /// [`ResolverError::Other`] if it is not a dependency record.
    pub fn read<S: ModelStore + ?Sized>(store: &S, node: NodeId) -> Result<Self> {
        let record = store.get_node(node)?;
        if record.kind != NodeKind::Dependency {
            return Err(ResolverError::Other {
                message: format!("{} is not a dependency record", record.path),
            });
        }

        Ok(Self {
            node,
            path: record.path.clone(),
            source_references: record
                .property(SOURCE_REFERENCE_PROPERTY)
                .map(|value| value.to_list())
                .unwrap_or_default(),
            resolved_path: record.text_property(RESOLVED_PATH_PROPERTY).map(str::to_string),
        })
    }

    /// The first recorded reference string.
    #[must_use]
    pub fn source_reference(&self) -> Option<&str> {
        self.source_references.first().map(String::as_str)
    }

    /// Whether the resolved target currently exists in the tree.
    ///
    /// Always `false` for records without a resolved path.
    pub fn exists<S: ModelStore + ?Sized>(&self, store: &S) -> bool {
        self.resolved_path.as_deref().is_some_and(|path| store.node_exists(path))
    }
}

/// Reads every record under `artifact`'s default `dependencies` container.
///
/// Returns an empty list when the artifact has no container.
pub fn dependency_records<S: ModelStore + ?Sized>(
    store: &S,
    artifact: NodeId,
) -> Result<Vec<DependencyRecord>> {
    dependency_records_in(store, artifact, DEFAULT_CONTAINER_NAME)
}

/// Reads every record under the container named `container_name`.
pub fn dependency_records_in<S: ModelStore + ?Sized>(
    store: &S,
    artifact: NodeId,
    container_name: &str,
) -> Result<Vec<DependencyRecord>> {
    let Some(container) = store.child_named(artifact, container_name) else {
        return Ok(Vec::new());
    };

    store
        .get_node(container)?
        .children
        .iter()
        .filter(|child| store.node(**child).is_some_and(|n| n.kind == NodeKind::Dependency))
        .map(|child| DependencyRecord::read(store, *child))
        .collect()
}

/// A reference whose target does not exist yet.
///
/// Lives only for one pass: the recorder produces it and the uploader consumes
/// it to fetch and generate the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingDependency {
    /// A miss found by the relative resolver
    Relative {
        /// Reference with leading `./` and `../` segments stripped
        relative_path: String,
        /// Number of `../` segments consumed
        parent_hop_count: usize,
        /// Model path of the ancestor the path is relative to
        ancestor_path: String,
    },
    /// A miss found by the absolute resolver
    Absolute {
        /// Fetchable form of the reference
        external_path: String,
        /// Workspace location to import into, computed by the uploader when `None`
        fetch_workspace_path: Option<String>,
        /// Model path the target will be generated at
        resolved_model_path: String,
        /// Directory levels the model cursor ascended from the artifact's parent
        parent_hop_count: usize,
        /// Reference segments beyond the common prefix
        relative_path: String,
    },
}

impl MissingDependency {
    /// The model path the missing target should be generated at.
    #[must_use]
    pub fn resolved_model_path(&self) -> String {
        match self {
            Self::Relative {
                relative_path,
                ancestor_path,
                ..
            } => join_model_path(ancestor_path, relative_path),
            Self::Absolute {
                resolved_model_path,
                ..
            } => resolved_model_path.clone(),
        }
    }
}

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical model path of the target
    pub resolved_path: String,
    /// Whether a node exists at `resolved_path`
    pub exists: bool,
    /// Set exactly when `exists` is false
    pub missing: Option<MissingDependency>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemoryModelStore, PropertyValue};

    #[test]
    fn test_missing_dependency_model_path() {
        let relative = MissingDependency::Relative {
            relative_path: "data/types/BookDatatypes.xsd".to_string(),
            parent_hop_count: 1,
            ancestor_path: "/Model/Books".to_string(),
        };
        assert_eq!(relative.resolved_model_path(), "/Model/Books/data/types/BookDatatypes.xsd");

        let top_level = MissingDependency::Relative {
            relative_path: "MovieDatatypes.xsd".to_string(),
            parent_hop_count: 0,
            ancestor_path: "/".to_string(),
        };
        assert_eq!(top_level.resolved_model_path(), "/MovieDatatypes.xsd");
    }

    #[test]
    fn test_dependency_records_reads_container() {
        let mut store = MemoryModelStore::new();
        let artifact = store.ensure_path("/Books.xsd", NodeKind::Model).unwrap();
        assert!(dependency_records(&store, artifact).unwrap().is_empty());

        let container =
            store.add_child(artifact, NodeKind::DependencyContainer, "dependencies").unwrap();
        let record = store.add_child(container, NodeKind::Dependency, "dependency1").unwrap();
        store
            .set_property(
                record,
                SOURCE_REFERENCE_PROPERTY,
                PropertyValue::List(vec!["Types.xsd".to_string()]),
            )
            .unwrap();
        store.set_property(record, RESOLVED_PATH_PROPERTY, PropertyValue::from("/Types.xsd")).unwrap();

        let records = dependency_records(&store, artifact).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_reference(), Some("Types.xsd"));
        assert_eq!(records[0].resolved_path.as_deref(), Some("/Types.xsd"));
        assert!(!records[0].exists(&store));

        store.ensure_path("/Types.xsd", NodeKind::Model).unwrap();
        assert!(records[0].exists(&store));
    }

    #[test]
    fn test_read_rejects_non_records() {
        let mut store = MemoryModelStore::new();
        let artifact = store.ensure_path("/Books.xsd", NodeKind::Model).unwrap();
        assert!(DependencyRecord::read(&store, artifact).is_err());
    }
}
