//! File system utilities for the workspace.
//!
//! - [`atomic`] - temp-and-rename writes
//! - [`dirs`] - directory creation
//! - [`formats`] - text and JSON helpers
//! - [`metadata`] - SHA-256 checksums
//! - [`paths`] - normalization and traversal checks

pub mod atomic;
pub mod dirs;
pub mod formats;
pub mod metadata;
pub mod paths;

pub use atomic::{atomic_write, safe_write};
pub use dirs::ensure_dir;
pub use formats::{read_json_file, read_text_file, write_json_file, write_text_file};
pub use metadata::checksum_bytes;
pub use paths::{is_safe_path, normalize_path, workspace_file_path};
