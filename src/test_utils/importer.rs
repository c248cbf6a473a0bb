//! An in-memory importer for tests.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::ResolverError;
use crate::importer::Importer;
use crate::utils::fs::{atomic_write, workspace_file_path};

/// Serves fetches from a fixed map of locations and imports into a real
/// workspace directory, remembering every location fetched.
#[derive(Debug, Default)]
pub struct MapImporter {
    root: PathBuf,
    sources: HashMap<String, Vec<u8>>,
    fetched: RefCell<Vec<String>>,
}

impl MapImporter {
    /// An importer writing below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Serves `content` for `location`.
    pub fn with(mut self, location: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.sources.insert(location.into(), content.into());
        self
    }

    /// Every location fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl Importer for MapImporter {
    fn fetch(&self, external_url: &str) -> Result<Vec<u8>> {
        self.fetched.borrow_mut().push(external_url.to_string());
        self.sources.get(external_url).cloned().ok_or_else(|| {
            ResolverError::FetchFailed {
                url: external_url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            }
            .into()
        })
    }

    fn import_into_workspace(&self, bytes: &[u8], workspace_path: &str) -> Result<String> {
        let target = workspace_file_path(&self.root, workspace_path).ok_or_else(|| {
            ResolverError::UnsafeWorkspacePath {
                path: workspace_path.to_string(),
            }
        })?;
        atomic_write(&target, bytes)?;
        Ok(workspace_path.to_string())
    }
}
