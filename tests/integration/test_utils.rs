//! Shared test utilities for integration tests
//!
//! Builds throwaway source trees and runs digest builds against them so the
//! test modules stay focused on the behavior under test.

use imprint::build::DigestBuilder;
use imprint::config::DigestConfig;
use imprint::error::BuildError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temp directory populated with the given (relative path, content)
/// pairs, creating intermediate directories as needed.
pub fn build_tree(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (relative, content) in files {
        let path = temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    temp_dir
}

/// Run one digest build with the given config.
pub async fn digest(
    source: &Path,
    dest: &Path,
    config: DigestConfig,
) -> Result<PathBuf, BuildError> {
    DigestBuilder::new(config).run(source, dest).await
}

/// Run one digest build with default config (extensions = ["js"]).
pub async fn digest_defaults(source: &Path, dest: &Path) -> Result<PathBuf, BuildError> {
    digest(source, dest, DigestConfig::default()).await
}

/// Read the manifest JSON back as a map.
pub fn read_manifest(path: &Path) -> BTreeMap<String, String> {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

/// Raw manifest bytes, for byte-identity assertions.
pub fn read_manifest_bytes(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}
