//! Error handling for artifact-deps
//!
//! This module provides the error types used across dependency discovery and
//! resolution, plus user-friendly error reporting for embedders that surface
//! resolver failures to people. The error system follows two principles:
//! 1. **Strongly-typed errors** so the resolver can decide per failure whether
//!    to degrade (skip one reference, skip one missing dependency) or abort
//! 2. **User-friendly messages** with actionable suggestions
//!
//! # Architecture
//!
//! - [`ResolverError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds suggestions and details
//!
//! # Error Categories
//!
//! - **Reference**: [`ResolverError::MalformedReference`], [`ResolverError::UnresolvableReference`]
//! - **Materialization**: [`ResolverError::FetchFailed`], [`ResolverError::GenerationFailed`],
//!   [`ResolverError::MetamodelNotFound`], [`ResolverError::DepthLimitExceeded`]
//! - **Store**: [`ResolverError::NodeNotFound`], [`ResolverError::InvalidNodeName`],
//!   [`ResolverError::PersistFailed`]
//! - **Configuration**: [`ResolverError::ConfigError`], [`ResolverError::TomlError`]
//!
//! Only store errors escape [`DependencyResolver::process`](crate::resolver::DependencyResolver::process);
//! reference and materialization errors are logged and degrade to unresolved
//! dependency records.
//!
//! # Examples
//!
//! ```rust,no_run
//! use artifact_deps::core::{ResolverError, user_friendly_error};
//!
//! let error = ResolverError::MalformedReference {
//!     reference: "bad ref.xsd".to_string(),
//!     reason: "contains whitespace".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::core::file_error::FileOperationError;

/// The main error type for dependency resolution.
///
/// Each variant carries the reference, URL or path it concerns so that log
/// lines and user-facing messages can point at the offending input.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// A reference string could not be parsed as a URI
    ///
    /// The reference is skipped; its dependency record keeps the raw string
    /// but no resolved path.
    #[error("Malformed reference '{reference}': {reason}")]
    MalformedReference {
        /// The raw reference string
        reference: String,
        /// Why parsing failed
        reason: String,
    },

    /// A reference was classified but no canonical path could be computed
    ///
    /// Typical causes are a relative reference ascending past the tree root or
    /// an absolute reference on an artifact with no recorded external origin.
    #[error("Unresolvable reference '{reference}': {reason}")]
    UnresolvableReference {
        /// The normalized reference string
        reference: String,
        /// Why resolution failed
        reason: String,
    },

    /// Fetching the bytes of a missing dependency failed
    #[error("Failed to fetch '{url}': {reason}")]
    FetchFailed {
        /// The external location that was fetched
        url: String,
        /// The underlying failure
        reason: String,
    },

    /// The importer does not know how to fetch this kind of location
    #[error("Unsupported URL scheme '{scheme}' in '{url}'")]
    UnsupportedScheme {
        /// The external location
        url: String,
        /// The scheme that is not supported
        scheme: String,
    },

    /// A workspace path would escape the workspace root
    #[error("Workspace path escapes the workspace root: {path}")]
    UnsafeWorkspacePath {
        /// The offending workspace path
        path: String,
    },

    /// The model generator failed for a newly imported artifact
    #[error("Failed to generate model at '{model_path}': {reason}")]
    GenerationFailed {
        /// The model path the generator was asked to populate
        model_path: String,
        /// The underlying failure
        reason: String,
    },

    /// The metamodel recorded on an artifact is not registered
    #[error("Metamodel not found: {id}")]
    MetamodelNotFound {
        /// The unknown metamodel identifier
        id: String,
    },

    /// Recursive materialization reached the configured depth bound
    #[error("Dependency depth limit of {max_depth} reached while processing '{artifact}'")]
    DepthLimitExceeded {
        /// The configured bound
        max_depth: usize,
        /// The artifact whose dependencies were left unmaterialized
        artifact: String,
    },

    /// A model node could not be found in the store
    #[error("Model node not found: {path}")]
    NodeNotFound {
        /// Path or id of the missing node
        path: String,
    },

    /// A node name is empty or contains a path separator
    #[error("Invalid model node name: '{name}'")]
    InvalidNodeName {
        /// The rejected name
        name: String,
    },

    /// The model store failed to persist the tree mutation
    #[error("Failed to persist model tree: {reason}")]
    PersistFailed {
        /// The underlying failure
        reason: String,
    },

    /// Configuration is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// Workspace file operation failed
    #[error(transparent)]
    FileOperation(#[from] FileOperationError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl ResolverError {
    /// Returns `true` for errors that only affect a single reference or
    /// missing dependency and must not abort a scan.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::NodeNotFound { .. } | Self::InvalidNodeName { .. } | Self::PersistFailed { .. }
        )
    }
}

impl Clone for ResolverError {
    fn clone(&self) -> Self {
        match self {
            Self::MalformedReference {
                reference,
                reason,
            } => Self::MalformedReference {
                reference: reference.clone(),
                reason: reason.clone(),
            },
            Self::UnresolvableReference {
                reference,
                reason,
            } => Self::UnresolvableReference {
                reference: reference.clone(),
                reason: reason.clone(),
            },
            Self::FetchFailed {
                url,
                reason,
            } => Self::FetchFailed {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::UnsupportedScheme {
                url,
                scheme,
            } => Self::UnsupportedScheme {
                url: url.clone(),
                scheme: scheme.clone(),
            },
            Self::UnsafeWorkspacePath {
                path,
            } => Self::UnsafeWorkspacePath {
                path: path.clone(),
            },
            Self::GenerationFailed {
                model_path,
                reason,
            } => Self::GenerationFailed {
                model_path: model_path.clone(),
                reason: reason.clone(),
            },
            Self::MetamodelNotFound {
                id,
            } => Self::MetamodelNotFound {
                id: id.clone(),
            },
            Self::DepthLimitExceeded {
                max_depth,
                artifact,
            } => Self::DepthLimitExceeded {
                max_depth: *max_depth,
                artifact: artifact.clone(),
            },
            Self::NodeNotFound {
                path,
            } => Self::NodeNotFound {
                path: path.clone(),
            },
            Self::InvalidNodeName {
                name,
            } => Self::InvalidNodeName {
                name: name.clone(),
            },
            Self::PersistFailed {
                reason,
            } => Self::PersistFailed {
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::FileOperation(e) => Self::Other {
                message: e.user_message(),
            },
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`ResolverError`] and adds an optional suggestion
/// for resolution and additional details.
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ResolverError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: ResolverError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// [`ResolverError`]s get variant-specific suggestions; `std::io::Error` and
/// `toml::de::Error` are mapped onto the closest variant. Anything else is
/// wrapped as [`ResolverError::Other`] with the full error chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(resolver_error) = error.downcast_ref::<ResolverError>() {
        return create_error_context(resolver_error.clone());
    }

    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ResolverError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check ownership and permissions of the workspace directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ResolverError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(ResolverError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of the resolver configuration file")
        .with_details("TOML parsing errors are usually caused by missing quotes or mismatched brackets");
    }

    ErrorContext::new(ResolverError::Other {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: ResolverError) -> ErrorContext {
    match &error {
        ResolverError::MalformedReference { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the reference in the source artifact; it must be a valid URI or relative path")
            .with_details("The reference was recorded without a resolved path and the scan continued"),

        ResolverError::UnresolvableReference { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the artifact sits deep enough in the workspace for '../' references and that absolute references share a prefix with the artifact's origin")
            .with_details("Artifacts resolving absolute references need a recorded external origin"),

        ResolverError::FetchFailed { url, .. } => {
            let suggestion = if url.starts_with("http://") || url.starts_with("https://") {
                "Check your network connection and that the URL is reachable"
            } else {
                "Check that the referenced file exists next to the original artifact"
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        ResolverError::UnsupportedScheme { .. } => ErrorContext::new(error)
            .with_suggestion("Only http, https, file and workspace-relative locations can be fetched"),

        ResolverError::UnsafeWorkspacePath { .. } => ErrorContext::new(error)
            .with_suggestion("Move the importing artifact deeper into the workspace or fix the '../' references")
            .with_details("Imported files must stay inside the workspace root"),

        ResolverError::GenerationFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the fetched artifact is valid for its metamodel"),

        ResolverError::MetamodelNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Register the metamodel before importing artifacts that use it"),

        ResolverError::DepthLimitExceeded { .. } => ErrorContext::new(error)
            .with_suggestion("Increase max_depth in the resolver configuration or break the reference chain")
            .with_details("Deep chains usually indicate a reference cycle between artifacts at different paths"),

        ResolverError::PersistFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the model store location is writable"),

        ResolverError::ConfigError { .. } | ResolverError::TomlError(_) => ErrorContext::new(error)
            .with_suggestion("Check the resolver configuration file"),

        _ => ErrorContext::new(error),
    }
}
