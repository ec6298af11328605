//! Path normalization and logical name resolution

use crate::error::BuildError;
use std::path::{Path, PathBuf};

/// Canonicalize a tree root before walking
///
/// Resolves symlinks, `.` and `..`, and drops any trailing separator so the
/// same tree always relativizes the same way regardless of how the root was
/// spelled by the caller.
pub fn normalize_root(root: &Path) -> Result<PathBuf, BuildError> {
    dunce::canonicalize(root)
        .map_err(|e| BuildError::InvalidPath(format!("Failed to canonicalize {:?}: {}", root, e)))
}

/// Compute the logical manifest name for `file` under `root`.
///
/// The logical name is the file's root-relative path with the final extension
/// stripped, joined with the platform separator. Root-level files carry no
/// leading separator. Deterministic for a given (root, file) pair.
pub fn logical_name(root: &Path, file: &Path) -> Result<String, BuildError> {
    let relative = file.strip_prefix(root).map_err(|_| {
        BuildError::InvalidPath(format!("{:?} is not under tree root {:?}", file, root))
    })?;

    let stem = relative
        .file_stem()
        .ok_or_else(|| BuildError::InvalidPath(format!("{:?} has no file name", file)))?;

    let logical = match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(stem),
        _ => PathBuf::from(stem),
    };

    Ok(logical.to_string_lossy().into_owned())
}
