//! Common test utilities for artifact-deps integration tests
//!
//! A [`TestWorkspace`] is a temporary workspace directory with helpers to lay
//! out upstream artifacts and to import a first artifact the way an embedding
//! application would before handing it to the resolver.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use artifact_deps::config::ResolverConfig;
use artifact_deps::constants::{EXTERNAL_ORIGIN_PROPERTY, METAMODEL_ID_PROPERTY};
use artifact_deps::generator::{Metamodel, ModelGenerator, StaticMetamodelRegistry};
use artifact_deps::importer::WorkspaceImporter;
use artifact_deps::model::{MemoryModelStore, ModelStore, NodeId, PropertyValue};
use artifact_deps::resolver::DependencyResolver;
use artifact_deps::test_utils::ScriptedGenerator;

/// Resolver wired with the bundled store and importer.
pub type WorkspaceResolver =
    DependencyResolver<MemoryModelStore, WorkspaceImporter, ScriptedGenerator, StaticMetamodelRegistry>;

/// The metamodel every test artifact is generated with.
pub fn xsd() -> Metamodel {
    Metamodel::new("xsd").with_name("XML Schema").with_extension("xsd")
}

/// A temporary workspace directory.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("Failed to create workspace directory")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `content` to `relative` below the workspace, creating parents.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// A `file://` URL for `relative` below the workspace.
    pub fn file_url(&self, relative: &str) -> String {
        let path = self.dir.path().join(relative).display().to_string().replace('\\', "/");
        format!("file://{path}")
    }

    /// A resolver over an empty store importing into this workspace.
    pub fn resolver(&self, store: MemoryModelStore, config: ResolverConfig) -> Result<WorkspaceResolver> {
        let importer = WorkspaceImporter::new(self.path(), &config.fetch)?;
        Ok(DependencyResolver::new(
            store,
            importer,
            ScriptedGenerator::new(self.path()),
            StaticMetamodelRegistry::new().with(xsd()),
        )
        .with_config(config))
    }

    /// Copies `content` to `workspace_path`, generates its tree at the same
    /// model path and records `origin` and the metamodel on the root.
    pub fn import_root(
        &self,
        store: &mut MemoryModelStore,
        workspace_path: &str,
        origin: &str,
        content: &str,
    ) -> Result<NodeId> {
        self.write(workspace_path.trim_start_matches('/'), content)?;
        let root = ScriptedGenerator::new(self.path()).generate_model(
            store,
            workspace_path,
            workspace_path,
            &xsd(),
        )?;
        store.set_property(root, EXTERNAL_ORIGIN_PROPERTY, PropertyValue::from(origin))?;
        store.set_property(root, METAMODEL_ID_PROPERTY, PropertyValue::from("xsd"))?;
        Ok(root)
    }
}
