//! Fluent construction of model trees for tests.

use anyhow::Result;

use crate::constants::{EXTERNAL_ORIGIN_PROPERTY, METAMODEL_ID_PROPERTY, REFERENCE_LOCATION_PROPERTY};
use crate::model::{MemoryModelStore, ModelStore, NodeId, NodeKind, PropertyValue, ReferenceKind};

/// Description of one artifact tree.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSpec {
    path: String,
    origin: Option<String>,
    metamodel: Option<String>,
    wrapped: bool,
    children: Vec<ChildSpec>,
}

#[derive(Debug, Clone)]
enum ChildSpec {
    Reference(ReferenceKind, Option<String>),
    Element(String),
}

impl ArtifactSpec {
    /// An artifact rooted at `path` with no references.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Records `externalOrigin` on the root.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Records `metamodelId` on the root.
    pub fn metamodel(mut self, id: impl Into<String>) -> Self {
        self.metamodel = Some(id.into());
        self
    }

    /// Places the content below a `document` wrapper node.
    pub fn wrapped(mut self) -> Self {
        self.wrapped = true;
        self
    }

    /// Adds an import of `location`.
    pub fn import(self, location: impl Into<String>) -> Self {
        self.reference(ReferenceKind::Import, location)
    }

    /// Adds an include of `location`.
    pub fn include(self, location: impl Into<String>) -> Self {
        self.reference(ReferenceKind::Include, location)
    }

    /// Adds a redefine of `location`.
    pub fn redefine(self, location: impl Into<String>) -> Self {
        self.reference(ReferenceKind::Redefine, location)
    }

    /// Adds a reference of any kind.
    pub fn reference(mut self, kind: ReferenceKind, location: impl Into<String>) -> Self {
        self.children.push(ChildSpec::Reference(kind, Some(location.into())));
        self
    }

    /// Adds a reference node without a location.
    pub fn reference_without_location(mut self, kind: ReferenceKind) -> Self {
        self.children.push(ChildSpec::Reference(kind, None));
        self
    }

    /// Adds a non-reference element.
    pub fn element(mut self, name: impl Into<String>) -> Self {
        self.children.push(ChildSpec::Element(name.into()));
        self
    }

    /// Builds the artifact in `store` and returns its root.
    pub fn build_in(&self, store: &mut dyn ModelStore) -> Result<NodeId> {
        let root = store.ensure_path(&self.path, NodeKind::Model)?;
        if let Some(origin) = &self.origin {
            store.set_property(root, EXTERNAL_ORIGIN_PROPERTY, PropertyValue::from(origin.as_str()))?;
        }
        if let Some(metamodel) = &self.metamodel {
            store.set_property(root, METAMODEL_ID_PROPERTY, PropertyValue::from(metamodel.as_str()))?;
        }

        let content = if self.wrapped {
            store.add_child(root, NodeKind::Document, "document")?
        } else {
            root
        };
        for child in &self.children {
            match child {
                ChildSpec::Reference(kind, location) => {
                    let node = store.add_child(content, NodeKind::Reference(*kind), kind.as_str())?;
                    if let Some(location) = location {
                        store.set_property(
                            node,
                            REFERENCE_LOCATION_PROPERTY,
                            PropertyValue::from(location.as_str()),
                        )?;
                    }
                }
                ChildSpec::Element(name) => {
                    store.add_child(content, NodeKind::Element("element".to_string()), name)?;
                }
            }
        }
        Ok(root)
    }
}

/// A [`MemoryModelStore`] populated artifact by artifact.
///
/// # Examples
///
/// ```rust
/// use artifact_deps::model::ModelStore;
/// use artifact_deps::test_utils::{ArtifactSpec, TreeBuilder};
///
/// let mut tree = TreeBuilder::new();
/// let books = tree
///     .artifact(ArtifactSpec::new("/Model/Books/Books.xsd").wrapped().import("Types.xsd"))
///     .unwrap();
/// assert!(tree.store().node_exists("/Model/Books/Books.xsd/document/import"));
/// # let _ = books;
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    store: MemoryModelStore,
}

impl TreeBuilder {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artifact and returns its root.
    pub fn artifact(&mut self, spec: ArtifactSpec) -> Result<NodeId> {
        spec.build_in(&mut self.store)
    }

    /// Adds a bare model node at `path`, standing for an artifact that already
    /// exists in the workspace.
    pub fn existing(&mut self, path: &str) -> Result<NodeId> {
        Ok(self.store.ensure_path(path, NodeKind::Model)?)
    }

    /// The tree built so far.
    pub const fn store(&self) -> &MemoryModelStore {
        &self.store
    }

    /// Finishes building.
    pub fn into_store(self) -> MemoryModelStore {
        self.store
    }
}
