//! Resolution of relative references against the referring artifact's ancestry.

use super::types::{MissingDependency, Resolution};
use crate::core::{ResolverError, Result};
use crate::model::{ModelStore, NodeId, join_model_path};

/// Resolves a normalized relative `reference` made by the artifact rooted at
/// `artifact`.
///
/// The artifact's parent node stands for the directory the artifact was
/// imported from. Every leading `../` moves one node up; a reference that
/// climbs above the tree root cannot be resolved.
///
/// # Errors
///
/// Fails with [`ResolverError::UnresolvableReference`] when the ascent passes
/// the tree root or nothing remains after the dot segments, and with
/// [`ResolverError::NodeNotFound`] when the artifact is not in the store.
pub fn resolve_relative<S: ModelStore + ?Sized>(
    store: &S,
    artifact: NodeId,
    reference: &str,
) -> Result<Resolution> {
    let unresolvable = |reason: &str| ResolverError::UnresolvableReference {
        reference: reference.to_string(),
        reason: reason.to_string(),
    };

    let root = store.get_node(artifact)?;
    let mut cursor = store.get_node(root.parent.ok_or_else(|| unresolvable("artifact is the tree root"))?)?;

    // Query and fragment never name a node.
    let mut remaining = reference.split(['?', '#']).next().unwrap_or_default();
    let mut hops = 0usize;

    while let Some(rest) = remaining.strip_prefix("../") {
        let Some(parent) = cursor.parent else {
            return Err(unresolvable("ascends above the tree root"));
        };
        cursor = store.get_node(parent)?;
        remaining = rest;
        hops += 1;
    }
    while let Some(rest) = remaining.strip_prefix("./") {
        remaining = rest;
    }

    if remaining.is_empty() || remaining == "." || remaining == ".." || remaining.ends_with('/') {
        return Err(unresolvable("does not name an artifact"));
    }

    let resolved_path = join_model_path(&cursor.path, remaining);
    let exists = store.node_exists(&resolved_path);
    tracing::debug!(
        "Relative reference '{}' resolved to {} ({} hop(s), exists: {})",
        reference,
        resolved_path,
        hops,
        exists
    );

    let missing = (!exists).then(|| MissingDependency::Relative {
        relative_path: remaining.to_string(),
        parent_hop_count: hops,
        ancestor_path: cursor.path.clone(),
    });

    Ok(Resolution {
        resolved_path,
        exists,
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemoryModelStore, NodeKind};

    fn store_with(paths: &[&str]) -> MemoryModelStore {
        let mut store = MemoryModelStore::new();
        for path in paths {
            store.ensure_path(path, NodeKind::Model).unwrap();
        }
        store
    }

    #[test]
    fn test_sibling_directory_reference() {
        let store = store_with(&["/Model/Books/Books.xsd"]);
        let artifact = store.find("/Model/Books/Books.xsd").unwrap();

        let resolution = resolve_relative(&store, artifact, "data/types/BookDatatypes.xsd").unwrap();
        assert_eq!(resolution.resolved_path, "/Model/Books/data/types/BookDatatypes.xsd");
        assert!(!resolution.exists);
        assert_eq!(
            resolution.missing,
            Some(MissingDependency::Relative {
                relative_path: "data/types/BookDatatypes.xsd".to_string(),
                parent_hop_count: 0,
                ancestor_path: "/Model/Books".to_string(),
            })
        );
    }

    #[test]
    fn test_parent_hops() {
        let store = store_with(&[
            "/Model/Books/SOAP/BooksWithSOAPEncoding.xsd",
            "/Model/Books/data/types/BookDatatypes.xsd",
        ]);
        let artifact = store.find("/Model/Books/SOAP/BooksWithSOAPEncoding.xsd").unwrap();

        let resolution =
            resolve_relative(&store, artifact, "../data/types/BookDatatypes.xsd").unwrap();
        assert_eq!(resolution.resolved_path, "/Model/Books/data/types/BookDatatypes.xsd");
        assert!(resolution.exists);
        assert!(resolution.missing.is_none());
    }

    #[test]
    fn test_top_level_artifact() {
        let store = store_with(&["/Movies.xsd"]);
        let artifact = store.find("/Movies.xsd").unwrap();

        let resolution = resolve_relative(&store, artifact, "MovieDatatypes.xsd").unwrap();
        assert_eq!(resolution.resolved_path, "/MovieDatatypes.xsd");
        assert!(matches!(
            resolution.missing,
            Some(MissingDependency::Relative { parent_hop_count: 0, .. })
        ));
    }

    #[test]
    fn test_ascent_past_root_fails() {
        let store = store_with(&["/Books.xsd"]);
        let artifact = store.find("/Books.xsd").unwrap();

        assert!(matches!(
            resolve_relative(&store, artifact, "../data/types/BookDatatypes.xsd"),
            Err(ResolverError::UnresolvableReference { .. })
        ));
    }

    #[test]
    fn test_query_and_fragment_are_ignored() {
        let store = store_with(&["/Movies.xsd", "/Types.xsd"]);
        let artifact = store.find("/Movies.xsd").unwrap();

        let resolution = resolve_relative(&store, artifact, "Types.xsd#Title").unwrap();
        assert_eq!(resolution.resolved_path, "/Types.xsd");
        assert!(resolution.exists);
    }

    #[test]
    fn test_directory_reference_is_unresolvable() {
        let store = store_with(&["/Model/Books.xsd"]);
        let artifact = store.find("/Model/Books.xsd").unwrap();
        assert!(resolve_relative(&store, artifact, "../").is_err());
        assert!(resolve_relative(&store, artifact, "types/").is_err());
    }
}
