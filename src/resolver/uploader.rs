//! Materialization of missing dependencies.
//!
//! For each [`MissingDependency`] found while recording an artifact, the
//! uploader works out where the target's bytes live and where they belong in
//! the workspace, fetches and imports them, generates the target's model at
//! the path the reference resolved to, and records the new artifact's own
//! dependencies one level deeper.
//!
//! A target is materialized at most once. Two references in one artifact can
//! name the same target, and a nested pass can create a target that is still
//! queued here, so each one is checked against the store right before fetching.
//!
//! Nothing here aborts the pass. A failure for one dependency is logged and
//! the next one is tried; the dependency record simply keeps pointing at a
//! path that does not exist.

use super::DependencyResolver;
use super::path_helpers::{ascend_location, join_location, normalize, parent_location};
use super::types::MissingDependency;
use crate::constants::{CHECKSUM_PROPERTY, EXTERNAL_ORIGIN_PROPERTY, METAMODEL_ID_PROPERTY};
use crate::core::ResolverError;
use crate::generator::{Metamodel, MetamodelRegistry, ModelGenerator};
use crate::importer::Importer;
use crate::model::{ModelStore, NodeId, PropertyValue};
use crate::utils::fs::checksum_bytes;

/// Where a missing dependency is fetched from and materialized to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchPlan {
    pub external_url: String,
    pub workspace_path: String,
    pub model_path: String,
}

/// Computes the fetch plan for `dependency`, found in the artifact imported
/// to `artifact_workspace_path` from `origin`.
///
/// Relative misses climb the origin's directory and the artifact's workspace
/// directory by the same number of levels the model cursor climbed, so the
/// fetched file lands next to where the reference expects it.
pub(crate) fn plan_fetch(
    artifact_workspace_path: &str,
    origin: &str,
    dependency: &MissingDependency,
) -> Result<FetchPlan, ResolverError> {
    let workspace_dir = parent_location(artifact_workspace_path);
    let ascend = |directory: &str, hops: usize, relative_path: &str, what: &str| {
        ascend_location(directory, hops)
            .map(|ancestor| join_location(&ancestor, relative_path))
            .ok_or_else(|| ResolverError::UnresolvableReference {
                reference: relative_path.to_string(),
                reason: format!("{what} '{directory}' has fewer than {hops} parent directories"),
            })
    };

    match dependency {
        MissingDependency::Relative {
            relative_path,
            parent_hop_count,
            ..
        } => {
            let origin_dir = parent_location(&normalize(origin)?);
            Ok(FetchPlan {
                external_url: ascend(&origin_dir, *parent_hop_count, relative_path, "origin")?,
                workspace_path: ascend(
                    &workspace_dir,
                    *parent_hop_count,
                    relative_path,
                    "workspace directory",
                )?,
                model_path: dependency.resolved_model_path(),
            })
        }
        MissingDependency::Absolute {
            external_path,
            fetch_workspace_path,
            resolved_model_path,
            parent_hop_count,
            relative_path,
        } => {
            let workspace_path = match fetch_workspace_path {
                Some(path) => path.clone(),
                None => ascend(&workspace_dir, *parent_hop_count, relative_path, "workspace directory")?,
            };
            Ok(FetchPlan {
                external_url: external_path.clone(),
                workspace_path,
                model_path: resolved_model_path.clone(),
            })
        }
    }
}

/// Keeps a [`ResolverError`] raised by a collaborator, or wraps any other
/// error with `fallback`.
fn fold_error(error: anyhow::Error, fallback: impl FnOnce(String) -> ResolverError) -> ResolverError {
    match error.downcast::<ResolverError>() {
        Ok(error) => error,
        Err(error) => fallback(format!("{error:#}")),
    }
}

impl<S, I, G, R> DependencyResolver<S, I, G, R>
where
    S: ModelStore,
    I: Importer,
    G: ModelGenerator,
    R: MetamodelRegistry,
{
    /// Fetches, imports and generates every missing dependency of `root`,
    /// returning how many were materialized.
    pub(crate) fn upload(
        &mut self,
        workspace_path: &str,
        root: NodeId,
        missing: &[MissingDependency],
        depth: usize,
    ) -> usize {
        if depth >= self.config.max_depth {
            let artifact = self.store.node(root).map(|n| n.path.clone()).unwrap_or_default();
            let error = ResolverError::DepthLimitExceeded {
                max_depth: self.config.max_depth,
                artifact,
            };
            tracing::warn!("{}; leaving {} dependencies unresolved", error, missing.len());
            return 0;
        }

        let Some((origin, metamodel)) = self.upload_context(root) else {
            return 0;
        };

        let mut materialized = 0;
        for dependency in missing {
            match self.materialize(workspace_path, &origin, &metamodel, dependency, depth) {
                Ok(Some(model_path)) => {
                    tracing::info!("Materialized missing dependency {}", model_path);
                    materialized += 1;
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        "Failed to materialize {}: {}",
                        dependency.resolved_model_path(),
                        error
                    );
                }
            }
        }
        materialized
    }

    /// The origin and metamodel every missing dependency of `root` is fetched
    /// and generated with, or `None` when either is unknown.
    fn upload_context(&self, root: NodeId) -> Option<(String, Metamodel)> {
        let node = self.store.node(root)?;
        let Some(origin) = node.text_property(EXTERNAL_ORIGIN_PROPERTY) else {
            tracing::debug!("{} has no {}; missing dependencies stay unresolved", node.path, EXTERNAL_ORIGIN_PROPERTY);
            return None;
        };
        let Some(metamodel_id) = node.text_property(METAMODEL_ID_PROPERTY) else {
            tracing::debug!("{} has no {}; missing dependencies stay unresolved", node.path, METAMODEL_ID_PROPERTY);
            return None;
        };
        let Some(metamodel) = self.registry.lookup(metamodel_id) else {
            let error = ResolverError::MetamodelNotFound {
                id: metamodel_id.to_string(),
            };
            tracing::warn!("{}; missing dependencies of {} stay unresolved", error, node.path);
            return None;
        };
        Some((origin.to_string(), metamodel))
    }

    /// Materializes one dependency, returning the generated path, or `None`
    /// when its model path exists by now.
    fn materialize(
        &mut self,
        workspace_path: &str,
        origin: &str,
        metamodel: &Metamodel,
        dependency: &MissingDependency,
        depth: usize,
    ) -> Result<Option<String>, ResolverError> {
        let plan = plan_fetch(workspace_path, origin, dependency)?;
        if self.store.node_exists(&plan.model_path) {
            tracing::debug!("{} already materialized, skipping", plan.model_path);
            return Ok(None);
        }
        tracing::debug!(
            "Fetching {} into {} for {}",
            plan.external_url,
            plan.workspace_path,
            plan.model_path
        );

        let bytes = self.importer.fetch(&plan.external_url).map_err(|e| {
            fold_error(e, |reason| ResolverError::FetchFailed {
                url: plan.external_url.clone(),
                reason,
            })
        })?;
        let imported = self
            .importer
            .import_into_workspace(&bytes, &plan.workspace_path)
            .map_err(|e| {
                fold_error(e, |reason| ResolverError::FetchFailed {
                    url: plan.external_url.clone(),
                    reason,
                })
            })?;

        let generated = self
            .generator
            .generate_model(&mut self.store, &imported, &plan.model_path, metamodel)
            .map_err(|e| {
                fold_error(e, |reason| ResolverError::GenerationFailed {
                    model_path: plan.model_path.clone(),
                    reason,
                })
            })?;

        self.store.set_property(
            generated,
            EXTERNAL_ORIGIN_PROPERTY,
            PropertyValue::from(plan.external_url.as_str()),
        )?;
        self.store.set_property(
            generated,
            METAMODEL_ID_PROPERTY,
            PropertyValue::from(metamodel.id.as_str()),
        )?;
        self.store.set_property(generated, CHECKSUM_PROPERTY, PropertyValue::from(checksum_bytes(&bytes)))?;

        let generated_path = self.store.get_node(generated)?.path.clone();
        if generated_path != plan.model_path {
            tracing::warn!(
                "Generator placed {} at {} instead of {}",
                imported,
                generated_path,
                plan.model_path
            );
        }

        self.process_at_depth(&imported, generated, depth + 1)?;
        Ok(Some(generated_path))
    }
}
