//! Filesystem walker for digesting directory trees

use crate::error::BuildError;
use crate::events::{BuildEvent, EventSink};
use crate::tree::filter::ExtensionFilter;
use crate::tree::hasher;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

/// Filesystem entry types
#[derive(Debug, Clone)]
pub enum Entry {
    /// A file entry with its path and size
    File { path: PathBuf, size: u64 },
    /// A directory entry with its path
    Directory { path: PathBuf },
}

/// A file that finished hashing.
#[derive(Debug, Clone)]
pub struct HashedFile {
    pub path: PathBuf,
    pub digest: String,
}

/// Walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: true)
    pub follow_symlinks: bool,
    /// Salt appended to every file digest
    pub permutation: String,
    /// Upper bound on files hashed concurrently
    pub max_in_flight: usize,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            permutation: String::new(),
            max_in_flight: 64,
        }
    }
}

/// Walks a source tree and hashes every eligible file.
pub struct Walker {
    root: PathBuf,
    filter: ExtensionFilter,
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker with default configuration
    pub fn new(root: PathBuf, filter: ExtensionFilter) -> Self {
        Self {
            root,
            filter,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, filter: ExtensionFilter, config: WalkerConfig) -> Self {
        Self {
            root,
            filter,
            config,
        }
    }

    /// Discover every entry under the root.
    ///
    /// Returns entries sorted by path for determinism. Any walk or metadata
    /// failure anywhere in the tree is fatal.
    fn discover(root: PathBuf, follow_symlinks: bool) -> Result<Vec<Entry>, BuildError> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(&root).follow_links(follow_symlinks) {
            let entry = entry.map_err(BuildError::from_walkdir)?;
            let path = entry.path().to_path_buf();

            // The root itself never becomes an entry
            if path == root {
                continue;
            }

            let metadata = entry.metadata().map_err(BuildError::from_walkdir)?;

            if metadata.is_file() {
                entries.push(Entry::File {
                    path,
                    size: metadata.len(),
                });
            } else if metadata.is_dir() {
                entries.push(Entry::Directory { path });
            }
        }

        entries.sort_by(|a, b| {
            let path_a = match a {
                Entry::File { path, .. } | Entry::Directory { path } => path,
            };
            let path_b = match b {
                Entry::File { path, .. } | Entry::Directory { path } => path,
            };
            path_a.cmp(path_b)
        });

        Ok(entries)
    }

    /// Walk the tree and hash every file the filter accepts.
    ///
    /// Discovery runs on a blocking thread; hashing fans out across the
    /// returned files with at most `max_in_flight` files open at once.
    /// Results carry no ordering guarantee. The first fatal error aborts the
    /// walk and outstanding hash tasks are dropped.
    pub async fn walk(&self, events: &dyn EventSink) -> Result<Vec<HashedFile>, BuildError> {
        let root = self.root.clone();
        let follow_symlinks = self.config.follow_symlinks;
        let entries = tokio::task::spawn_blocking(move || Self::discover(root, follow_symlinks))
            .await
            .map_err(|e| BuildError::Worker(e.to_string()))??;

        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut tasks: JoinSet<Result<HashedFile, BuildError>> = JoinSet::new();
        let mut eligible = 0usize;
        let mut eligible_bytes = 0u64;

        for entry in entries {
            let (path, size) = match entry {
                Entry::File { path, size } => (path, size),
                Entry::Directory { .. } => continue,
            };

            if !self.filter.is_eligible(&path) {
                events.emit(BuildEvent::FileSkipped { path });
                continue;
            }

            eligible += 1;
            eligible_bytes += size;

            let semaphore = Arc::clone(&semaphore);
            let permutation = self.config.permutation.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| BuildError::Worker(e.to_string()))?;
                let digest = hasher::hash_file(&path, &permutation).await?;
                Ok(HashedFile { path, digest })
            });
        }

        tracing::debug!(
            files = eligible,
            bytes = eligible_bytes,
            "Dispatching hash tasks"
        );

        let mut hashed = Vec::with_capacity(eligible);
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(|e| BuildError::Worker(e.to_string()))?;
            hashed.push(result?);
        }

        Ok(hashed)
    }
}
