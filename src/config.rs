//! Configuration System
//!
//! Declarative configuration for the digest build. Values come from an
//! optional `imprint.toml` in the working directory, with CLI flags merged on
//! top by the caller. Every field has a default so a bare checkout digests
//! `.js` files with no configuration at all.

use crate::error::BuildError;
use crate::logging::LoggingConfig;
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when two source files resolve to the same logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep the later entry and emit a warning.
    #[default]
    Warn,
    /// Abort the build.
    Error,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Manifest file name, written into the destination directory
    #[serde(default = "default_outputname")]
    pub outputname: String,

    /// Extra bytes mixed into every digest after the file contents.
    /// Changing this value changes every fingerprint in the tree.
    #[serde(default)]
    pub permutation: String,

    /// File extensions to digest (matched exactly, without the dot).
    /// An empty list matches nothing.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Collision handling policy
    #[serde(default)]
    pub collisions: CollisionPolicy,

    /// Follow symlinks during the walk
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,

    /// Upper bound on files hashed concurrently
    #[serde(default = "default_max_concurrent_reads")]
    pub max_concurrent_reads: usize,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_outputname() -> String {
    "digest.json".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["js".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_reads() -> usize {
    64
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            outputname: default_outputname(),
            permutation: String::new(),
            extensions: default_extensions(),
            collisions: CollisionPolicy::default(),
            follow_symlinks: default_true(),
            max_concurrent_reads: default_max_concurrent_reads(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DigestConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.outputname.is_empty() {
            return Err(BuildError::Config(
                "outputname cannot be empty".to_string(),
            ));
        }
        if self.outputname.contains('/') || self.outputname.contains('\\') {
            return Err(BuildError::Config(format!(
                "outputname must be a bare file name, got {:?}",
                self.outputname
            )));
        }
        if self.max_concurrent_reads == 0 {
            return Err(BuildError::Config(
                "max_concurrent_reads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads configuration from the filesystem.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `imprint.toml` under the given directory.
    /// A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<DigestConfig, BuildError> {
        let config_path = dir.join("imprint.toml");
        if !config_path.exists() {
            return Ok(DigestConfig::default());
        }
        Self::load_from_file(&config_path)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<DigestConfig, BuildError> {
        let settings = Config::builder()
            .add_source(File::from(path).required(true))
            .build()?;
        let config: DigestConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
