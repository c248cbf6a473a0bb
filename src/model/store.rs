//! The model store contract.
//!
//! The resolver never owns persistence or transactions; it reads and mutates
//! trees exclusively through [`ModelStore`]. Implementations decide how nodes
//! are stored and what `save` persists.

use super::{ModelNode, NodeId, NodeKind, PropertyValue, join_model_path};
use crate::core::{ResolverError, Result};

/// Storage behind a model tree.
///
/// Paths are canonical model paths (`/Model/Books/Books.xsd`). When several
/// siblings share a name, path lookups return the first one added.
pub trait ModelStore {
    /// The tree root (`/`).
    fn root(&self) -> NodeId;

    /// A node by id, or `None` if it does not exist (or was removed).
    fn node(&self, id: NodeId) -> Option<&ModelNode>;

    /// The node at a canonical path.
    fn find(&self, path: &str) -> Option<NodeId>;

    /// Adds a new last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails with [`ResolverError::NodeNotFound`] for an unknown parent and
    /// [`ResolverError::InvalidNodeName`] for empty or slashed names.
    fn add_child(&mut self, parent: NodeId, kind: NodeKind, name: &str) -> Result<NodeId>;

    /// Sets (or replaces) a property on a node.
    fn set_property(&mut self, node: NodeId, name: &str, value: PropertyValue) -> Result<()>;

    /// Removes a property; removing an absent property is not an error.
    fn remove_property(&mut self, node: NodeId, name: &str) -> Result<()>;

    /// Removes a node and its whole subtree.
    fn remove_node(&mut self, node: NodeId) -> Result<()>;

    /// Persists all mutations made so far.
    ///
    /// # Errors
    ///
    /// Fails with [`ResolverError::PersistFailed`] when persistence fails; this
    /// is the only error [`DependencyResolver::process`](crate::resolver::DependencyResolver::process)
    /// propagates.
    fn save(&mut self) -> Result<()>;

    /// Whether a node exists at `path`.
    fn node_exists(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// A node by id, failing with [`ResolverError::NodeNotFound`].
    fn get_node(&self, id: NodeId) -> Result<&ModelNode> {
        self.node(id).ok_or_else(|| ResolverError::NodeNotFound {
            path: id.to_string(),
        })
    }

    /// The child of `parent` named `name`, if any.
    fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let parent = self.node(parent)?;
        parent
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).is_some_and(|node| node.name == name))
    }

    /// Returns the node at `path`, creating missing ancestors as folders and
    /// the final node with `leaf_kind`.
    fn ensure_path(&mut self, path: &str, leaf_kind: NodeKind) -> Result<NodeId> {
        if let Some(existing) = self.find(path) {
            return Ok(existing);
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut cursor = self.root();
        let mut current = String::from("/");
        for (index, segment) in segments.iter().enumerate() {
            current = join_model_path(&current, segment);
            cursor = match self.find(&current) {
                Some(id) => id,
                None => {
                    let kind = if index + 1 == segments.len() {
                        leaf_kind.clone()
                    } else {
                        NodeKind::Folder
                    };
                    self.add_child(cursor, kind, segment)?
                }
            };
        }
        Ok(cursor)
    }
}
