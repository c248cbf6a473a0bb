//! Arena-backed in-memory model store with optional JSON snapshots.
//!
//! [`MemoryModelStore`] keeps every node in a `Vec` indexed by [`NodeId`] and a
//! path index for `find`. Removed nodes leave a tombstone so ids stay stable.
//! When a snapshot path is configured, [`ModelStore::save`] writes the whole
//! arena atomically as JSON; [`MemoryModelStore::load_snapshot`] restores it.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ModelNode, ModelStore, NodeId, NodeKind, PropertyValue, is_valid_node_name};
use crate::core::{ResolverError, Result};
use crate::utils::fs::{read_json_file, write_json_file};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    nodes: Vec<Option<ModelNode>>,
}

/// An in-memory [`ModelStore`].
#[derive(Debug, Clone)]
pub struct MemoryModelStore {
    nodes: Vec<Option<ModelNode>>,
    index: HashMap<String, NodeId>,
    snapshot_path: Option<PathBuf>,
    save_count: usize,
}

impl Default for MemoryModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryModelStore {
    /// Creates a store containing only the tree root.
    #[must_use]
    pub fn new() -> Self {
        let root = ModelNode {
            id: NodeId(0),
            name: String::new(),
            path: "/".to_string(),
            kind: NodeKind::Root,
            parent: None,
            children: Vec::new(),
            properties: BTreeMap::new(),
        };
        let mut index = HashMap::new();
        index.insert(root.path.clone(), root.id);
        Self {
            nodes: vec![Some(root)],
            index,
            snapshot_path: None,
            save_count: 0,
        }
    }

    /// Persists to `path` on every [`ModelStore::save`].
    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Restores a store from a snapshot written by `save`, keeping `path` as
    /// the snapshot target.
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let snapshot: Snapshot =
            read_json_file(path).map_err(|e| ResolverError::PersistFailed {
                reason: format!("{e:#}"),
            })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ResolverError::PersistFailed {
                reason: format!(
                    "unsupported snapshot version {} in {}",
                    snapshot.version,
                    path.display()
                ),
            });
        }
        if !matches!(snapshot.nodes.first(), Some(Some(root)) if root.kind == NodeKind::Root) {
            return Err(ResolverError::PersistFailed {
                reason: format!("snapshot {} has no tree root", path.display()),
            });
        }

        let mut store = Self {
            nodes: snapshot.nodes,
            index: HashMap::new(),
            snapshot_path: Some(path.to_path_buf()),
            save_count: 0,
        };
        store.rebuild_index();
        Ok(store)
    }

    /// Number of successful `save` calls.
    #[must_use]
    pub const fn save_count(&self) -> usize {
        self.save_count
    }

    /// Number of live nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Whether the store holds only the tree root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Iterates live nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelNode> {
        self.nodes.iter().flatten()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ModelNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut).ok_or_else(|| {
            ResolverError::NodeNotFound {
                path: id.to_string(),
            }
        })
    }

    // Walks in id order so that the first node added for a path wins.
    fn rebuild_index(&mut self) {
        self.index.clear();
        for node in self.nodes.iter().flatten() {
            self.index.entry(node.path.clone()).or_insert(node.id);
        }
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        if let Some(node) = self.node(id) {
            for child in &node.children {
                self.collect_subtree(*child, out);
            }
        }
    }
}

impl ModelStore for MemoryModelStore {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> Option<&ModelNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn find(&self, path: &str) -> Option<NodeId> {
        let trimmed = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        self.index.get(trimmed).copied()
    }

    fn add_child(&mut self, parent: NodeId, kind: NodeKind, name: &str) -> Result<NodeId> {
        if !is_valid_node_name(name) {
            return Err(ResolverError::InvalidNodeName {
                name: name.to_string(),
            });
        }

        let parent_path = self.get_node(parent)?.path.clone();
        let id = NodeId(self.nodes.len());
        let path = super::join_model_path(&parent_path, name);

        self.node_mut(parent)?.children.push(id);
        self.index.entry(path.clone()).or_insert(id);
        self.nodes.push(Some(ModelNode {
            id,
            name: name.to_string(),
            path,
            kind,
            parent: Some(parent),
            children: Vec::new(),
            properties: BTreeMap::new(),
        }));
        Ok(id)
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: PropertyValue) -> Result<()> {
        self.node_mut(node)?.properties.insert(name.to_string(), value);
        Ok(())
    }

    fn remove_property(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.node_mut(node)?.properties.remove(name);
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<()> {
        let parent = self.get_node(node)?.parent.ok_or_else(|| ResolverError::Other {
            message: "the tree root cannot be removed".to_string(),
        })?;

        let mut doomed = Vec::new();
        self.collect_subtree(node, &mut doomed);

        self.node_mut(parent)?.children.retain(|child| *child != node);
        for id in doomed {
            if let Some(slot) = self.nodes.get_mut(id.0) {
                *slot = None;
            }
        }
        self.rebuild_index();
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if let Some(path) = &self.snapshot_path {
            let snapshot = Snapshot {
                version: SNAPSHOT_VERSION,
                nodes: self.nodes.clone(),
            };
            write_json_file(path, &snapshot, true).map_err(|e| ResolverError::PersistFailed {
                reason: format!("{e:#}"),
            })?;
            tracing::debug!("Saved model snapshot to {}", path.display());
        }
        self.save_count += 1;
        Ok(())
    }
}
