//! Core types for artifact-deps
//!
//! This module holds the error types shared by every other module:
//!
//! - [`error`] - [`ResolverError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`file_error`] - structured context for workspace file operations

pub mod error;
pub mod file_error;

pub use error::{ErrorContext, ResolverError, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};

/// Result alias used by the model store and the resolver.
pub type Result<T, E = ResolverError> = std::result::Result<T, E>;
