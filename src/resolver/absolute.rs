//! Resolution of absolute references by common-prefix matching.
//!
//! An absolute reference (`http://host/schemas/types/T.xsd`, `/schemas/T.xsd`)
//! carries no information about where its target lives in the model tree. The
//! only anchor is the referring artifact's external origin: the artifact's
//! parent node stands for the origin's directory. Matching the reference
//! against that directory segment by segment tells how far to climb from the
//! parent node and which segments to append below it.
//!
//! ```text
//! origin     http://h/schemas/books/Books.xsd   model /Model/books/Books.xsd
//! reference  http://h/schemas/common/C.xsd
//! common     http: "" h schemas                 climb 1 (books)
//! resolved   /Model/common/C.xsd
//! ```
//!
//! This is a heuristic over strings, not a filesystem walk.

use super::path_helpers::{location_segments, normalize, parent_location, parse_reference};
use super::types::{MissingDependency, Resolution};
use crate::core::{ResolverError, Result};
use crate::model::{ModelStore, NodeId, join_model_path};

/// Resolves a normalized absolute `reference` made by the artifact rooted at
/// `artifact`, whose bytes came from `origin`.
///
/// # Errors
///
/// Fails with [`ResolverError::UnresolvableReference`] when there is no origin,
/// when the reference does not share the origin's root (scheme, authority and
/// leading `/`), or when nothing remains beyond the common prefix. Malformed
/// origins fail with [`ResolverError::MalformedReference`].
pub fn resolve_absolute<S: ModelStore + ?Sized>(
    store: &S,
    artifact: NodeId,
    reference: &str,
    origin: Option<&str>,
) -> Result<Resolution> {
    let unresolvable = |reason: String| ResolverError::UnresolvableReference {
        reference: reference.to_string(),
        reason,
    };

    let origin = origin.ok_or_else(|| unresolvable("artifact has no external origin".to_string()))?;
    let normalized_origin = normalize(origin)?;
    let origin_parts = parse_reference(&normalized_origin)?;
    let origin_dir = parent_location(&origin_parts.location());

    let external_path = inherit_root(reference, origin_parts.scheme, origin_parts.authority)?;
    let (reference_segments, reference_root) =
        location_segments(&external_path).map_err(|e| unresolvable(e.to_string()))?;
    let (mut origin_segments, origin_root) = location_segments(&origin_dir)
        .map_err(|_| unresolvable(format!("origin '{origin}' has no directory")))?;
    if origin_segments.len() > origin_root && origin_segments.last().is_some_and(String::is_empty) {
        origin_segments.pop();
    }

    let common = reference_segments
        .iter()
        .zip(&origin_segments)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 || common < reference_root.max(origin_root) {
        return Err(unresolvable(format!("shares no root with origin '{origin}'")));
    }

    let suffix = &reference_segments[common..];
    if suffix.is_empty() || suffix.iter().any(String::is_empty) {
        return Err(unresolvable("does not name an artifact".to_string()));
    }

    let root = store.get_node(artifact)?;
    let parent = root
        .parent
        .ok_or_else(|| unresolvable("artifact is the tree root".to_string()))?;
    let mut cursor = store.get_node(parent)?;
    let last_common = &reference_segments[common - 1];
    let mut hops = 0usize;
    for _ in common..origin_segments.len() {
        if cursor.name == *last_common {
            break;
        }
        let Some(up) = cursor.parent else {
            break;
        };
        cursor = store.get_node(up)?;
        hops += 1;
    }

    let relative_path = suffix.join("/");
    let resolved_path = join_model_path(&cursor.path, &relative_path);
    let exists = store.node_exists(&resolved_path);
    tracing::debug!(
        "Absolute reference '{}' resolved to {} ({} common segment(s), {} hop(s), exists: {})",
        reference,
        resolved_path,
        common,
        hops,
        exists
    );

    let missing = (!exists).then(|| MissingDependency::Absolute {
        external_path,
        fetch_workspace_path: None,
        resolved_model_path: resolved_path.clone(),
        parent_hop_count: hops,
        relative_path,
    });

    Ok(Resolution {
        resolved_path,
        exists,
        missing,
    })
}

/// Gives a scheme-less reference the origin's scheme, and its authority when
/// the reference names none, the way an absolute-path reference resolves
/// against a base URI.
fn inherit_root(reference: &str, scheme: Option<&str>, authority: Option<&str>) -> Result<String> {
    let parts = parse_reference(reference)?;
    match scheme {
        Some(scheme) if parts.scheme.is_none() => match authority {
            Some(authority) if parts.authority.is_none() => {
                Ok(format!("{scheme}://{authority}{reference}"))
            }
            _ => Ok(format!("{scheme}:{reference}")),
        },
        _ => Ok(reference.to_string()),
    }
}
