//! Path utilities for normalization and workspace containment checks.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components.
///
/// This function performs logical path resolution without accessing the filesystem.
/// It does not resolve symbolic links or verify that the path exists.
///
/// # Examples
///
/// ```rust
/// use artifact_deps::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// let path = Path::new("/foo/./bar/../baz");
/// assert_eq!(normalize_path(path), PathBuf::from("/foo/baz"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Checks if a path is safe and doesn't escape the base directory.
///
/// Both paths are normalized before comparison, so traversal attempts using
/// `../` are detected.
///
/// # Examples
///
/// ```rust
/// use artifact_deps::utils::fs::is_safe_path;
/// use std::path::Path;
///
/// let base = Path::new("/srv/workspace");
/// assert!(is_safe_path(base, Path::new("Model/Books.xsd")));
/// assert!(!is_safe_path(base, Path::new("../../../etc/passwd")));
/// ```
#[must_use]
pub fn is_safe_path(base: &Path, path: &Path) -> bool {
    let normalized_base = normalize_path(base);
    let normalized_path = if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    };

    normalized_path.starts_with(normalized_base)
}

/// Maps a slash-delimited workspace path (`/Model/Books.xsd`) onto a file
/// below `root`, or `None` when the path would escape `root`.
#[must_use]
pub fn workspace_file_path(root: &Path, workspace_path: &str) -> Option<PathBuf> {
    let relative = workspace_path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    let candidate = root.join(relative);
    is_safe_path(root, &candidate).then(|| normalize_path(&candidate))
}
