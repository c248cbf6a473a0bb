//! Fetching artifact bytes and importing them into the workspace.
//!
//! The resolver never performs I/O itself. When a dependency is missing it
//! asks an [`Importer`] for the bytes at the dependency's external location
//! and to store them at a workspace path, then hands that path to the model
//! generator.
//!
//! [`WorkspaceImporter`] is the bundled implementation. It maps workspace
//! paths onto a directory on disk and understands three kinds of location:
//!
//! | Location                    | Source                                     |
//! |-----------------------------|--------------------------------------------|
//! | `http://…`, `https://…`     | HTTP GET with timeout and retries          |
//! | `file:///abs/path.xsd`      | the local filesystem                       |
//! | `imports/Books.xsd` (no scheme) | a file below the workspace root        |

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::FetchConfig;
use crate::core::ResolverError;
use crate::core::file_error::FileOps;
use crate::resolver::path_helpers::{parse_reference, percent_decode};
use crate::utils::backoff::exponential_backoff_with_delay;
use crate::utils::fs::{atomic_write, workspace_file_path};

/// Source of artifact bytes and sink for imported artifacts.
///
/// Errors are `anyhow` so implementations can attach their own context; a
/// [`ResolverError`] inside the chain is preserved by the resolver.
pub trait Importer {
    /// Reads the bytes at an external location.
    fn fetch(&self, external_url: &str) -> Result<Vec<u8>>;

    /// Stores `bytes` at `workspace_path` and returns the path the artifact
    /// can be generated from.
    fn import_into_workspace(&self, bytes: &[u8], workspace_path: &str) -> Result<String>;
}

/// Why a single HTTP attempt failed, and whether trying again may help.
struct AttemptFailure {
    reason: String,
    transient: bool,
}

/// An [`Importer`] backed by a workspace directory and a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct WorkspaceImporter {
    root: PathBuf,
    client: Client,
    max_retries: u32,
}

impl WorkspaceImporter {
    /// Creates an importer rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (for example when
    /// the TLS backend fails to initialize).
    pub fn new(root: impl Into<PathBuf>, fetch: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            root: root.into(),
            client,
            max_retries: fetch.max_retries,
        })
    }

    /// The workspace directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn workspace_file(&self, workspace_path: &str) -> Result<PathBuf, ResolverError> {
        workspace_file_path(&self.root, workspace_path).ok_or_else(|| {
            ResolverError::UnsafeWorkspacePath {
                path: workspace_path.to_string(),
            }
        })
    }

    fn read_file(path: &Path) -> Result<Vec<u8>, ResolverError> {
        Ok(FileOps::read_bytes_with_context(
            path,
            "fetching artifact",
            "importer::WorkspaceImporter::fetch",
        )?)
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, ResolverError> {
        let mut attempt = 0;
        loop {
            match self.try_fetch_http(url) {
                Ok(bytes) => {
                    tracing::debug!("Fetched {} ({} bytes)", url, bytes.len());
                    return Ok(bytes);
                }
                Err(failure) if failure.transient && attempt < self.max_retries => {
                    tracing::debug!(
                        "Fetch of {} failed ({}), retrying ({}/{})",
                        url,
                        failure.reason,
                        attempt + 1,
                        self.max_retries
                    );
                    attempt = exponential_backoff_with_delay(attempt);
                }
                Err(failure) => {
                    return Err(ResolverError::FetchFailed {
                        url: url.to_string(),
                        reason: failure.reason,
                    });
                }
            }
        }
    }

    fn try_fetch_http(&self, url: &str) -> Result<Vec<u8>, AttemptFailure> {
        let response = self.client.get(url).send().map_err(|e| AttemptFailure {
            transient: e.is_timeout() || e.is_connect(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure {
                reason: format!("HTTP {status}"),
                transient: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            });
        }

        response.bytes().map(|bytes| bytes.to_vec()).map_err(|e| AttemptFailure {
            reason: format!("failed to read response body: {e}"),
            transient: true,
        })
    }
}

impl Importer for WorkspaceImporter {
    fn fetch(&self, external_url: &str) -> Result<Vec<u8>> {
        let parts = parse_reference(external_url)?;
        let scheme = parts.scheme.map(str::to_ascii_lowercase);

        let bytes = match scheme.as_deref() {
            Some("http" | "https") => self.fetch_http(external_url)?,
            Some("file") => Self::read_file(Path::new(&percent_decode(parts.path)?))?,
            None => Self::read_file(&self.workspace_file(parts.path)?)?,
            Some(other) => {
                return Err(ResolverError::UnsupportedScheme {
                    url: external_url.to_string(),
                    scheme: other.to_string(),
                }
                .into());
            }
        };
        Ok(bytes)
    }

    fn import_into_workspace(&self, bytes: &[u8], workspace_path: &str) -> Result<String> {
        let target = self.workspace_file(workspace_path)?;
        atomic_write(&target, bytes)
            .with_context(|| format!("Failed to import {workspace_path} into the workspace"))?;
        tracing::debug!("Imported {} bytes to {}", bytes.len(), target.display());
        Ok(workspace_path.to_string())
    }
}
