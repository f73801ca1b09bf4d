//! Cross-platform path utilities
//!
//! Windows paths use backslashes (`\`) while everything written into
//! generated build files must use forward slashes. These helpers keep the
//! emitted text identical regardless of the host platform.

use std::path::Path;

/// Normalize a path string to forward slashes
#[inline]
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Convert a Path to a normalized POSIX string
#[inline]
pub fn path_to_posix(path: &Path) -> String {
    to_posix(&path.to_string_lossy())
}
