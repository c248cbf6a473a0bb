//! Utilities shared by the importer and the model store.
//!
//! # Modules
//!
//! - [`fs`] - File system operations with atomic writes and path safety checks
//! - [`backoff`] - Exponential backoff for retried fetches

pub mod backoff;
pub mod fs;

pub use fs::{atomic_write, ensure_dir, normalize_path, safe_write};
