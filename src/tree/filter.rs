//! Extension-based file selection

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;

/// Selects files by their final extension.
///
/// Extensions are matched exactly and case-sensitively, without the leading
/// dot. A file with no extension only matches when the empty string is
/// configured. Dotfiles such as `.gitignore` count as having no extension.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    /// Create a filter from a list of extensions (no dots).
    ///
    /// An empty list matches nothing.
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions.iter().cloned().collect(),
        }
    }

    /// Whether the file at `path` should be digested.
    pub fn is_eligible(&self, path: &Path) -> bool {
        let extension = path.extension().and_then(OsStr::to_str).unwrap_or("");
        self.extensions.contains(extension)
    }
}
