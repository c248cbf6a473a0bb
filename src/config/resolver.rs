//! Resolver configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```toml
//! max_depth = 16
//! container_name = "dependencies"
//! container_policy = "rebuild"   # or "reuse"
//! probe_document_wrapper = true
//!
//! [fetch]
//! timeout_secs = 30
//! max_retries = 3
//! user_agent = "artifact-deps/0.3.2"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{default_config_path, parse_config};
use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_CONTAINER_NAME, DEFAULT_FETCH_RETRIES, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_MAX_DEPTH, MAX_DEPTH_ENV,
};
use crate::core::ResolverError;
use crate::model::is_valid_node_name;

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_container_name() -> String {
    DEFAULT_CONTAINER_NAME.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

const fn default_max_retries() -> u32 {
    DEFAULT_FETCH_RETRIES
}

fn default_user_agent() -> String {
    concat!("artifact-deps/", env!("CARGO_PKG_VERSION")).to_string()
}

/// What `process` does with a dependencies container left by an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerPolicy {
    /// Remove the container and record everything again
    #[default]
    Rebuild,
    /// Keep the container; a record whose source reference matches is updated
    /// in place instead of duplicated
    Reuse,
}

/// Settings for fetching remote artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt; only transient failures retry
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// `User-Agent` header sent with HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

/// Configuration for [`DependencyResolver`](crate::resolver::DependencyResolver).
///
/// # Examples
///
/// ```rust
/// use artifact_deps::config::{ContainerPolicy, ResolverConfig};
///
/// let config: ResolverConfig = toml::from_str("container_policy = \"reuse\"").unwrap();
/// assert_eq!(config.container_policy, ContainerPolicy::Reuse);
/// assert_eq!(config.max_depth, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// How many levels of missing dependencies are materialized recursively.
    ///
    /// The artifact passed to `process` is level 0; its missing dependencies
    /// are fetched and processed at level 1, and so on. Dependencies found at
    /// `max_depth` are recorded but not fetched.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Name of the container node created under each artifact root
    #[serde(default = "default_container_name")]
    pub container_name: String,

    /// Handling of a container left by an earlier `process` call
    #[serde(default)]
    pub container_policy: ContainerPolicy,

    /// Look for references below a `Document` wrapper node before falling
    /// back to the artifact root's direct children
    #[serde(default = "default_true")]
    pub probe_document_wrapper: bool,

    /// Remote fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            container_name: default_container_name(),
            container_policy: ContainerPolicy::default(),
            probe_document_wrapper: default_true(),
            fetch: FetchConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it fails
    /// [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Finds the configuration for this process.
    ///
    /// # Location Priority
    ///
    /// 1. The file named by `ARTIFACT_DEPS_CONFIG` (must exist)
    /// 2. `~/.artifact-deps/config.toml`, if present
    /// 3. Defaults
    ///
    /// `ARTIFACT_DEPS_MAX_DEPTH` then overrides `max_depth`.
    pub fn discover() -> Result<Self> {
        Self::discover_with(|name| std::env::var(name).ok(), default_config_path().ok())
    }

    /// [`discover`](Self::discover) with an explicit environment lookup and
    /// default location.
    pub fn discover_with<F>(env: F, default_path: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if let Some(path) = env(CONFIG_PATH_ENV) {
            tracing::debug!("Loading resolver config from {} ({})", path, CONFIG_PATH_ENV);
            Self::load(Path::new(&path))?
        } else if let Some(path) = default_path.filter(|p| p.exists()) {
            tracing::debug!("Loading resolver config from {}", path.display());
            Self::load(&path)?
        } else {
            Self::default()
        };

        if let Some(value) = env(MAX_DEPTH_ENV) {
            config.max_depth = value.trim().parse().map_err(|_| ResolverError::ConfigError {
                message: format!("{MAX_DEPTH_ENV} must be a positive integer, got '{value}'"),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Fails with [`ResolverError::ConfigError`] when `max_depth` is zero or
    /// `container_name` is not a usable node name.
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.max_depth == 0 {
            return Err(ResolverError::ConfigError {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        if !is_valid_node_name(&self.container_name) {
            return Err(ResolverError::ConfigError {
                message: format!("invalid container_name '{}'", self.container_name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.container_name, "dependencies");
        assert_eq!(config.container_policy, ContainerPolicy::Rebuild);
        assert!(config.probe_document_wrapper);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.max_retries, 3);
        assert!(config.fetch.user_agent.starts_with("artifact-deps/"));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: ResolverConfig = toml::from_str("").unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "max_depth = 4\n\n[fetch]\nmax_retries = 0\n").unwrap();

        let config = ResolverConfig::load(&path).unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.fetch.max_retries, 0);
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_validation() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");

        std::fs::write(&path, "max_depth = 0\n").unwrap();
        assert!(ResolverConfig::load(&path).is_err());

        std::fs::write(&path, "container_name = \"deps/all\"\n").unwrap();
        let error = ResolverConfig::load(&path).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ResolverError>(),
            Some(ResolverError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_discover_priority() {
        let temp = tempdir().unwrap();
        let explicit = temp.path().join("explicit.toml");
        let fallback = temp.path().join("fallback.toml");
        std::fs::write(&explicit, "max_depth = 2\n").unwrap();
        std::fs::write(&fallback, "max_depth = 3\n").unwrap();
        let explicit_str = explicit.to_string_lossy().to_string();

        let config = ResolverConfig::discover_with(
            env_of(&[(CONFIG_PATH_ENV, explicit_str.as_str())]),
            Some(fallback.clone()),
        )
        .unwrap();
        assert_eq!(config.max_depth, 2);

        let config = ResolverConfig::discover_with(env_of(&[]), Some(fallback)).unwrap();
        assert_eq!(config.max_depth, 3);

        let config =
            ResolverConfig::discover_with(env_of(&[]), Some(temp.path().join("absent.toml")))
                .unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_discover_missing_explicit_file_fails() {
        let result = ResolverConfig::discover_with(
            env_of(&[(CONFIG_PATH_ENV, "/nonexistent/artifact-deps.toml")]),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_max_depth_override() {
        let config = ResolverConfig::discover_with(env_of(&[(MAX_DEPTH_ENV, "5")]), None).unwrap();
        assert_eq!(config.max_depth, 5);

        assert!(ResolverConfig::discover_with(env_of(&[(MAX_DEPTH_ENV, "deep")]), None).is_err());
        assert!(ResolverConfig::discover_with(env_of(&[(MAX_DEPTH_ENV, "0")]), None).is_err());
    }

    #[test]
    #[serial]
    fn test_discover_reads_process_environment() {
        let original = std::env::var(MAX_DEPTH_ENV).ok();
        let original_config = std::env::var(CONFIG_PATH_ENV).ok();
        unsafe {
            std::env::set_var(MAX_DEPTH_ENV, "7");
            std::env::remove_var(CONFIG_PATH_ENV);
        }

        let result = ResolverConfig::discover();

        unsafe {
            match original {
                Some(val) => std::env::set_var(MAX_DEPTH_ENV, val),
                None => std::env::remove_var(MAX_DEPTH_ENV),
            }
            if let Some(val) = original_config {
                std::env::set_var(CONFIG_PATH_ENV, val);
            }
        }

        // A user config in the home directory may set other fields, but the
        // environment override always wins.
        if let Ok(config) = result {
            assert_eq!(config.max_depth, 7);
        }
    }
}
