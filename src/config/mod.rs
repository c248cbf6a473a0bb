//! Configuration management for artifact-deps
//!
//! The resolver reads a single optional TOML file. Embedders usually call
//! [`ResolverConfig::discover`] once at startup and hand the result to
//! [`DependencyResolver::with_config`](crate::resolver::DependencyResolver::with_config).
//!
//! # Modules
//!
//! - `resolver` - [`ResolverConfig`], [`FetchConfig`] and [`ContainerPolicy`]
//! - `parser` - Generic TOML parsing utilities with error context
//!
//! # Configuration File (`~/.artifact-deps/config.toml`)
//!
//! **Location:**
//! - Unix/macOS: `~/.artifact-deps/config.toml`
//! - Windows: `%LOCALAPPDATA%\artifact-deps\config.toml`
//! - Anywhere, when `ARTIFACT_DEPS_CONFIG` names a file
//!
//! ```toml
//! max_depth = 8
//! container_policy = "reuse"
//!
//! [fetch]
//! timeout_secs = 10
//! ```
//!
//! # Environment Variables
//!
//! - `ARTIFACT_DEPS_CONFIG` - explicit configuration file
//! - `ARTIFACT_DEPS_MAX_DEPTH` - overrides `max_depth`

mod parser;
mod resolver;

pub use parser::parse_config;
pub use resolver::{ContainerPolicy, FetchConfig, ResolverConfig};

use anyhow::Result;
use std::path::PathBuf;

/// Default location of the configuration file.
///
/// # Errors
///
/// Returns an error if the home directory (or, on Windows, the local data
/// directory) cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
            .join("artifact-deps")
    } else {
        dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
            .join(".artifact-deps")
    };

    Ok(config_dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("config.toml"));
            assert!(path.to_string_lossy().contains("artifact-deps"));
        }
    }
}
