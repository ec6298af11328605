//! Error types for the digest build pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Build-related errors.
///
/// Every filesystem failure is fatal by policy: the build aborts on the first
/// error anywhere in the tree and no manifest is produced for that run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to walk tree at {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write manifest to {path:?}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logical name collision: {logical_name:?} is produced by more than one source file")]
    Collision { logical_name: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Hash worker failed: {0}")]
    Worker(String),

    #[error("Manifest serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<config::ConfigError> for BuildError {
    fn from(err: config::ConfigError) -> Self {
        BuildError::Config(err.to_string())
    }
}

impl BuildError {
    /// Map a walkdir failure to a fatal walk error, keeping the offending path
    /// when walkdir knows it.
    pub fn from_walkdir(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let message = err.to_string();
        let source = err
            .into_io_error()
            // Loop detection has no underlying I/O error
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message));
        BuildError::Walk { path, source }
    }
}
