//! Dependency discovery and resolution for imported artifacts.
//!
//! Given the model tree of one imported artifact, the resolver finds every
//! import, include and redefine reference it makes, resolves each to a
//! canonical model path, records the outcome under a `dependencies` container
//! node, and fetches and generates any target that does not exist yet. The
//! newly generated artifacts are processed the same way, so a whole graph of
//! related artifacts is materialized from a single `process` call.
//!
//! # Architecture Overview
//!
//! ```text
//! process(workspace_path, root)
//!   │
//!   ├─ reference nodes under root (or its Document wrapper)
//!   │
//!   ├─ per reference:  normalize ─► is_relative ─┬─► relative::resolve_relative
//!   │                                            └─► absolute::resolve_absolute
//!   │                  └─► dependency record (sourceReference, resolvedPath)
//!   │
//!   ├─ uploader: fetch ─► import ─► generate ─► process(depth + 1)
//!   │
//!   └─ store.save()
//! ```
//!
//! # Modules
//!
//! - [`path_helpers`] - reference parsing, normalization and classification
//! - [`relative`] - ascent through the referring artifact's ancestors
//! - [`absolute`] - common-prefix matching against the artifact's origin
//! - [`types`] - dependency records and missing-dependency bookkeeping
//! - `uploader` - fetching and generating missing targets
//!
//! # Failure Handling
//!
//! Resolution is best effort. A malformed or unresolvable reference leaves
//! its record without `resolvedPath`; a failed fetch or generation leaves the
//! target missing. Both are logged and the pass continues. Only store failures
//! (including the final `save`) are returned to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use artifact_deps::config::ResolverConfig;
//! use artifact_deps::generator::{Metamodel, StaticMetamodelRegistry};
//! use artifact_deps::importer::WorkspaceImporter;
//! use artifact_deps::model::MemoryModelStore;
//! use artifact_deps::resolver::DependencyResolver;
//! # use artifact_deps::generator::ModelGenerator;
//! # fn example(generator: impl ModelGenerator, root: artifact_deps::model::NodeId) -> anyhow::Result<()> {
//! let config = ResolverConfig::discover()?;
//! let importer = WorkspaceImporter::new("/srv/workspace", &config.fetch)?;
//! let registry = StaticMetamodelRegistry::new().with(Metamodel::new("xsd"));
//!
//! let mut resolver = DependencyResolver::new(MemoryModelStore::new(), importer, generator, registry)
//!     .with_config(config);
//! if let Some(container) = resolver.process("/Model/Books/Books.xsd", root)? {
//!     println!("Dependencies recorded under {container}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod absolute;
pub mod path_helpers;
pub mod relative;
pub mod types;
mod uploader;


pub use types::{
    DependencyRecord, MissingDependency, Resolution, dependency_records, dependency_records_in,
};

use tracing::Span;

use crate::config::{ContainerPolicy, ResolverConfig};
use crate::constants::{
    DEPENDENCY_RECORD_PREFIX, EXTERNAL_ORIGIN_PROPERTY, REFERENCE_LOCATION_PROPERTY,
    RESOLVED_PATH_PROPERTY, SOURCE_REFERENCE_PROPERTY,
};
use crate::core::Result;
use crate::generator::{MetamodelRegistry, ModelGenerator};
use crate::importer::Importer;
use crate::model::{ModelStore, NodeId, NodeKind, PropertyValue};

use self::path_helpers::{is_relative, normalize};

/// Records and materializes the dependencies of imported artifacts.
///
/// The resolver owns its collaborators for the duration of its use; the
/// store can be borrowed back with [`store`](Self::store) or reclaimed with
/// [`into_store`](Self::into_store). Owning the store means every `process`
/// call has exclusive access to the tree.
///
/// # Logging
///
/// Every event is emitted inside the span given to [`with_span`](Self::with_span)
/// (a `dependency_resolver` span by default), with one child span per
/// processed artifact carrying its path and recursion depth.
pub struct DependencyResolver<S, I, G, R> {
    store: S,
    importer: I,
    generator: G,
    registry: R,
    config: ResolverConfig,
    span: Span,
}

impl<S, I, G, R> DependencyResolver<S, I, G, R> {
    /// Creates a resolver with the default configuration.
    pub fn new(store: S, importer: I, generator: G, registry: R) -> Self {
        Self {
            store,
            importer,
            generator,
            registry,
            config: ResolverConfig::default(),
            span: tracing::debug_span!("dependency_resolver"),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the span all events are logged in.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The active configuration.
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The model store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The model store, mutably.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The importer.
    pub const fn importer(&self) -> &I {
        &self.importer
    }

    /// The model generator.
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// Consumes the resolver and returns its store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S, I, G, R> DependencyResolver<S, I, G, R>
where
    S: ModelStore,
    I: Importer,
    G: ModelGenerator,
    R: MetamodelRegistry,
{
    /// Records the dependencies of the artifact rooted at `root`, imported to
    /// `workspace_path`, and materializes the missing ones.
    ///
    /// Returns the path of the dependencies container, or `None` when the
    /// artifact makes no references.
    ///
    /// # Errors
    ///
    /// Only store failures are returned: [`ResolverError::NodeNotFound`] when
    /// `root` does not exist, [`ResolverError::InvalidNodeName`] for a
    /// configured container name the store rejects, and
    /// [`ResolverError::PersistFailed`] when the final save fails.
    ///
    /// [`ResolverError::NodeNotFound`]: crate::core::ResolverError::NodeNotFound
    /// [`ResolverError::InvalidNodeName`]: crate::core::ResolverError::InvalidNodeName
    /// [`ResolverError::PersistFailed`]: crate::core::ResolverError::PersistFailed
    pub fn process(&mut self, workspace_path: &str, root: NodeId) -> Result<Option<String>> {
        self.process_at_depth(workspace_path, root, 0)
    }

    /// Resolves one raw reference made by the artifact rooted at `artifact`
    /// without touching the tree.
    ///
    /// # Errors
    ///
    /// Fails with [`MalformedReference`](crate::core::ResolverError::MalformedReference)
    /// or [`UnresolvableReference`](crate::core::ResolverError::UnresolvableReference).
    pub fn resolve_reference(&self, artifact: NodeId, reference: &str) -> Result<Resolution> {
        let normalized = normalize(reference)?;
        if is_relative(&normalized)? {
            relative::resolve_relative(&self.store, artifact, &normalized)
        } else {
            let origin = self.store.get_node(artifact)?.text_property(EXTERNAL_ORIGIN_PROPERTY);
            absolute::resolve_absolute(&self.store, artifact, &normalized, origin)
        }
    }

    /// The records under `artifact`'s container.
    pub fn records(&self, artifact: NodeId) -> Result<Vec<DependencyRecord>> {
        dependency_records_in(&self.store, artifact, &self.config.container_name)
    }

    fn process_at_depth(
        &mut self,
        workspace_path: &str,
        root: NodeId,
        depth: usize,
    ) -> Result<Option<String>> {
        let span = self.span.clone();
        let _entered = span.enter();
        let artifact_path = self.store.get_node(root)?.path.clone();
        let artifact_span = tracing::debug_span!("artifact", artifact = %artifact_path, depth);
        let _artifact = artifact_span.enter();

        let stale = match self.config.container_policy {
            ContainerPolicy::Rebuild => self.store.child_named(root, &self.config.container_name),
            ContainerPolicy::Reuse => None,
        };
        if let Some(existing) = stale {
            tracing::debug!("Removing existing {} container", self.config.container_name);
            self.store.remove_node(existing)?;
        }
        let mut dirty = stale.is_some();

        let references = self.reference_nodes(root)?;
        let mut container = None;
        let mut records = Vec::new();
        let mut missing = Vec::new();
        let mut resolved = 0usize;

        for reference in references {
            let reference_node = self.store.get_node(reference)?;
            let Some(raw) = reference_node.text_property(REFERENCE_LOCATION_PROPERTY) else {
                tracing::warn!(
                    "Reference {} has no {}, skipping",
                    reference_node.path,
                    REFERENCE_LOCATION_PROPERTY
                );
                continue;
            };
            let raw = raw.to_string();

            let container_id = match container {
                Some(id) => id,
                None => {
                    let id = self.open_container(root)?;
                    container = Some(id);
                    id
                }
            };
            let record = self.record_node(container_id, &raw)?;
            records.push(record);
            self.store.set_property(
                record,
                SOURCE_REFERENCE_PROPERTY,
                PropertyValue::List(vec![raw.clone()]),
            )?;

            match self.resolve_reference(root, &raw) {
                Ok(resolution) => {
                    self.store.set_property(
                        record,
                        RESOLVED_PATH_PROPERTY,
                        PropertyValue::from(resolution.resolved_path.as_str()),
                    )?;
                    resolved += 1;
                    if let Some(dependency) = resolution.missing {
                        missing.push(dependency);
                    }
                }
                Err(error) if !error.is_recoverable() => return Err(error),
                Err(error) => {
                    self.store.remove_property(record, RESOLVED_PATH_PROPERTY)?;
                    tracing::warn!("Leaving '{}' unresolved: {}", raw, error);
                }
            }
        }

        if self.config.container_policy == ContainerPolicy::Reuse {
            dirty |= self.prune_records(root, container, &records)?;
        }

        let Some(container) = container else {
            tracing::debug!("No references found in {}", artifact_path);
            if dirty {
                self.store.save()?;
            }
            return Ok(None);
        };

        let materialized = if missing.is_empty() {
            0
        } else {
            self.upload(workspace_path, root, &missing, depth)
        };

        self.store.save()?;
        let container_path = self.store.get_node(container)?.path.clone();
        tracing::info!(
            "Recorded dependencies of {} ({} resolved, {} missing, {} materialized)",
            artifact_path,
            resolved,
            missing.len(),
            materialized
        );
        Ok(Some(container_path))
    }

    /// Reference nodes of the artifact, in encounter order.
    fn reference_nodes(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let root_node = self.store.get_node(root)?;
        let scope = if self.config.probe_document_wrapper {
            root_node
                .children
                .iter()
                .copied()
                .find(|child| self.store.node(*child).is_some_and(|n| n.kind == NodeKind::Document))
                .unwrap_or(root)
        } else {
            root
        };

        Ok(self
            .store
            .get_node(scope)?
            .children
            .iter()
            .copied()
            .filter(|child| {
                self.store.node(*child).is_some_and(|n| n.kind.reference_kind().is_some())
            })
            .collect())
    }

    fn open_container(&mut self, root: NodeId) -> Result<NodeId> {
        if let Some(existing) = self.store.child_named(root, &self.config.container_name) {
            return Ok(existing);
        }
        let container_name = self.config.container_name.clone();
        self.store.add_child(root, NodeKind::DependencyContainer, &container_name)
    }

    /// Drops records left by an earlier run whose reference is gone, and the
    /// whole container when the artifact no longer makes any references.
    /// Returns whether anything was removed.
    fn prune_records(
        &mut self,
        root: NodeId,
        container: Option<NodeId>,
        kept: &[NodeId],
    ) -> Result<bool> {
        let Some(container) = container else {
            return match self.store.child_named(root, &self.config.container_name) {
                Some(leftover) => {
                    tracing::debug!("Removing {} container with no references left", self.config.container_name);
                    self.store.remove_node(leftover)?;
                    Ok(true)
                }
                None => Ok(false),
            };
        };

        let stale: Vec<NodeId> = self
            .store
            .get_node(container)?
            .children
            .iter()
            .copied()
            .filter(|child| {
                !kept.contains(child)
                    && self.store.node(*child).is_some_and(|n| n.kind == NodeKind::Dependency)
            })
            .collect();
        for record in &stale {
            tracing::debug!("Pruning stale dependency record {}", self.store.get_node(*record)?.path);
            self.store.remove_node(*record)?;
        }
        Ok(!stale.is_empty())
    }

    /// The record for `raw`: reused from an earlier run under
    /// [`ContainerPolicy::Reuse`], otherwise a new `dependency{n}` child.
    fn record_node(&mut self, container: NodeId, raw: &str) -> Result<NodeId> {
        let children = self.store.get_node(container)?.children.clone();

        if self.config.container_policy == ContainerPolicy::Reuse {
            let existing = children.iter().copied().find(|child| {
                self.store.node(*child).is_some_and(|n| {
                    n.kind == NodeKind::Dependency
                        && n.property(SOURCE_REFERENCE_PROPERTY)
                            .is_some_and(|value| value.to_list().iter().any(|r| r == raw))
                })
            });
            if let Some(existing) = existing {
                return Ok(existing);
            }
        }

        let mut index = children.len() + 1;
        while self
            .store
            .child_named(container, &format!("{DEPENDENCY_RECORD_PREFIX}{index}"))
            .is_some()
        {
            index += 1;
        }
        self.store.add_child(
            container,
            NodeKind::Dependency,
            &format!("{DEPENDENCY_RECORD_PREFIX}{index}"),
        )
    }
}
