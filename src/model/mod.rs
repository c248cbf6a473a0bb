//! Model tree types shared by the resolver and its collaborators.
//!
//! A model tree is the hierarchical parse result of imported artifacts. Every
//! node has a canonical, slash-delimited path rooted at `/`:
//!
//! ```text
//! /                               Root
//! └── Model                       Folder
//!     └── Books                   Folder
//!         └── Books.xsd           Model      (externalOrigin, metamodelId)
//!             ├── document        Document
//!             │   ├── import      Reference(Import)   (schemaLocation)
//!             │   └── include     Reference(Include)  (schemaLocation)
//!             └── dependencies    DependencyContainer
//!                 └── dependency1 Dependency (sourceReference, resolvedPath)
//! ```
//!
//! Nodes live in an arena owned by a [`ModelStore`]; parents are referenced by
//! [`NodeId`] so a child never owns its parent.
//!
//! # Modules
//!
//! - [`store`] - the [`ModelStore`] trait the resolver mutates trees through
//! - [`memory`] - [`MemoryModelStore`], an arena store with JSON snapshots

pub mod memory;
pub mod store;

pub use memory::MemoryModelStore;
pub use store::ModelStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Index of a node inside a store's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three directive kinds that make a node a reference to another artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// Imports components from another namespace
    Import,
    /// Includes components of the same namespace
    Include,
    /// Includes and redefines components of the same namespace
    Redefine,
}

impl ReferenceKind {
    /// Maps a directive keyword (`import`, `include`, `redefine`) to its kind.
    ///
    /// Generators call this once while building a tree, so resolution never
    /// compares kind strings.
    #[must_use]
    pub fn from_directive(directive: &str) -> Option<Self> {
        match directive.to_ascii_lowercase().as_str() {
            "import" => Some(Self::Import),
            "include" => Some(Self::Include),
            "redefine" => Some(Self::Redefine),
            _ => None,
        }
    }

    /// The directive keyword for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Include => "include",
            Self::Redefine => "redefine",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary type tag of a model node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NodeKind {
    /// The single tree root at `/`
    Root,
    /// A workspace folder
    Folder,
    /// The root node of one parsed artifact
    Model,
    /// Optional wrapper between an artifact root and its content
    Document,
    /// An import/include/redefine directive
    Reference(ReferenceKind),
    /// Container holding the dependency records of one artifact
    DependencyContainer,
    /// One dependency record
    Dependency,
    /// Any other parsed element, tagged by the generator
    Element(String),
}

impl NodeKind {
    /// The reference kind, if this node is a reference.
    #[must_use]
    pub const fn reference_kind(&self) -> Option<ReferenceKind> {
        match self {
            Self::Reference(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Value of a node property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A single string
    Text(String),
    /// An ordered sequence of strings
    List(Vec<String>),
}

impl PropertyValue {
    /// The string value, or the first element of a list.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::List(values) => values.first().map(String::as_str),
        }
    }

    /// All values as a slice-like vector.
    #[must_use]
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Text(value) => vec![value.clone()],
            Self::List(values) => values.clone(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

/// A node in the model tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelNode {
    /// Arena index of this node
    pub id: NodeId,
    /// Last path segment (empty for the tree root)
    pub name: String,
    /// Canonical path, rooted at `/`
    pub path: String,
    /// Primary type tag
    pub kind: NodeKind,
    /// Parent node; `None` only for the tree root
    pub parent: Option<NodeId>,
    /// Ordered children
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Named properties
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl ModelNode {
    /// A property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// A property by name as text, ignoring empty values.
    #[must_use]
    pub fn text_property(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_text).filter(|value| !value.is_empty())
    }

    /// Whether this node is the tree root.
    #[must_use]
    pub const fn is_tree_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Joins a model path and a child name without doubling the root slash.
#[must_use]
pub fn join_model_path(parent: &str, child: &str) -> String {
    let child = child.trim_start_matches('/');
    if parent.ends_with('/') {
        format!("{parent}{child}")
    } else {
        format!("{parent}/{child}")
    }
}

/// Whether `name` may be used as a node name.
#[must_use]
pub fn is_valid_node_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_model_path() {
        assert_eq!(join_model_path("/", "Books.xsd"), "/Books.xsd");
        assert_eq!(join_model_path("/Model/Books", "data/x.xsd"), "/Model/Books/data/x.xsd");
        assert_eq!(join_model_path("/Model/", "/x.xsd"), "/Model/x.xsd");
    }

    #[test]
    fn test_reference_kind_from_directive() {
        assert_eq!(ReferenceKind::from_directive("import"), Some(ReferenceKind::Import));
        assert_eq!(ReferenceKind::from_directive("INCLUDE"), Some(ReferenceKind::Include));
        assert_eq!(ReferenceKind::from_directive("redefine"), Some(ReferenceKind::Redefine));
        assert_eq!(ReferenceKind::from_directive("element"), None);
    }

    #[test]
    fn test_node_name_validation() {
        assert!(is_valid_node_name("Books.xsd"));
        assert!(!is_valid_node_name(""));
        assert!(!is_valid_node_name("a/b"));
        assert!(!is_valid_node_name(".."));
    }

    #[test]
    fn test_property_value_serialization_is_untagged() {
        let text = serde_json::to_string(&PropertyValue::from("x.xsd")).unwrap();
        assert_eq!(text, "\"x.xsd\"");

        let list: PropertyValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(list.as_text(), Some("a"));
        assert_eq!(list.to_list(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_text_property_ignores_empty() {
        let mut node = ModelNode {
            id: NodeId(1),
            name: "import".to_string(),
            path: "/A.xsd/import".to_string(),
            kind: NodeKind::Reference(ReferenceKind::Import),
            parent: Some(NodeId(0)),
            children: Vec::new(),
            properties: BTreeMap::new(),
        };
        node.properties.insert("schemaLocation".to_string(), PropertyValue::from(""));
        assert_eq!(node.text_property("schemaLocation"), None);
        assert_eq!(node.kind.reference_kind(), Some(ReferenceKind::Import));
    }
}
