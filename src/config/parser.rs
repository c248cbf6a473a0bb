//! Generic configuration parsing utilities.
//!
//! TOML parsing for any `DeserializeOwned` configuration type, with the file
//! path attached to every read or parse failure:
//!
//! ```text
//! Failed to parse config file: /path/to/config.toml
//! Caused by:
//!     invalid type: string "deep", expected u32
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Examples
///
/// ```rust,no_run
/// use artifact_deps::config::{ResolverConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: ResolverConfig = parse_config(Path::new("artifact-deps.toml"))?;
/// println!("max depth: {}", config.max_depth);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read, contains invalid TOML, or does
/// not match the structure of `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
