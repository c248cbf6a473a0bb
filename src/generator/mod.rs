//! Model generation and metamodel lookup.
//!
//! Parsing artifact syntax is not this crate's job. A [`ModelGenerator`] turns
//! an imported workspace file into a model tree, tagging every import, include
//! and redefine directive as a [`NodeKind::Reference`](crate::model::NodeKind::Reference)
//! node carrying a `schemaLocation` property. The resolver then records and
//! materializes the references of each generated tree.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{ModelStore, NodeId};

/// A metamodel an artifact can be generated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metamodel {
    /// Identifier recorded as `metamodelId` on generated roots
    pub id: String,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    /// File extensions this metamodel handles, without the dot
    #[serde(default)]
    pub file_extensions: Vec<String>,
}

impl Metamodel {
    /// A metamodel with no name or extensions.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            file_extensions: Vec::new(),
        }
    }

    /// Sets the human-readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a handled file extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extensions.push(extension.into());
        self
    }

    /// Whether `workspace_path` ends in one of this metamodel's extensions.
    #[must_use]
    pub fn handles(&self, workspace_path: &str) -> bool {
        workspace_path.rsplit_once('.').is_some_and(|(_, ext)| {
            self.file_extensions.iter().any(|known| known.eq_ignore_ascii_case(ext))
        })
    }
}

/// Lookup of metamodels by id.
pub trait MetamodelRegistry {
    /// The metamodel registered under `id`.
    fn lookup(&self, id: &str) -> Option<Metamodel>;
}

/// A [`MetamodelRegistry`] over a fixed set of metamodels.
///
/// # Examples
///
/// ```rust
/// use artifact_deps::generator::{Metamodel, MetamodelRegistry, StaticMetamodelRegistry};
///
/// let registry = StaticMetamodelRegistry::new()
///     .with(Metamodel::new("xsd").with_name("XML Schema").with_extension("xsd"));
/// assert!(registry.lookup("xsd").is_some());
/// assert!(registry.lookup("wsdl").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticMetamodelRegistry {
    metamodels: BTreeMap<String, Metamodel>,
}

impl StaticMetamodelRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a metamodel, replacing any with the same id.
    #[must_use]
    pub fn with(mut self, metamodel: Metamodel) -> Self {
        self.register(metamodel);
        self
    }

    /// Adds a metamodel, returning the one it replaced.
    pub fn register(&mut self, metamodel: Metamodel) -> Option<Metamodel> {
        self.metamodels.insert(metamodel.id.clone(), metamodel)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.metamodels.keys().map(String::as_str)
    }

    /// The metamodel handling `workspace_path`'s extension, if any.
    #[must_use]
    pub fn for_path(&self, workspace_path: &str) -> Option<&Metamodel> {
        self.metamodels.values().find(|m| m.handles(workspace_path))
    }
}

impl MetamodelRegistry for StaticMetamodelRegistry {
    fn lookup(&self, id: &str) -> Option<Metamodel> {
        self.metamodels.get(id).cloned()
    }
}

/// Builds model trees from imported workspace files.
pub trait ModelGenerator {
    /// Generates the tree for the artifact at `workspace_path` so that its
    /// root lives at `model_path`, and returns that root.
    ///
    /// Generators only build the tree. Recording the root's origin and
    /// resolving its references is left to the resolver that asked for it.
    fn generate_model(
        &mut self,
        store: &mut dyn ModelStore,
        workspace_path: &str,
        model_path: &str,
        metamodel: &Metamodel,
    ) -> Result<NodeId>;
}
