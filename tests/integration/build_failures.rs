//! Integration tests for fatal error behavior
//!
//! Every filesystem failure aborts the build: no manifest for the failed run
//! may appear at the destination, though a manifest from an earlier run may
//! remain and must not be mistaken for fresh output.

use super::test_utils::{build_tree, digest, digest_defaults, read_manifest_bytes};
use imprint::config::{CollisionPolicy, DigestConfig};
use imprint::error::BuildError;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_source_fails_without_manifest() {
    let parent = TempDir::new().unwrap();
    let source = parent.path().join("never-created");
    let dest = parent.path().join("out");

    let result = digest_defaults(&source, &dest).await;

    assert!(result.is_err());
    assert!(!dest.join("digest.json").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_entry_fails_the_whole_build() {
    let source = build_tree(&[("good.js", "fine")]);
    // A dangling symlink makes the metadata query fail while following links
    std::os::unix::fs::symlink(
        source.path().join("missing.js"),
        source.path().join("broken.js"),
    )
    .unwrap();
    let dest = TempDir::new().unwrap();

    let result = digest_defaults(source.path(), dest.path()).await;

    assert!(result.is_err());
    assert!(!dest.path().join("digest.json").exists());
}

/// Discovery can stat a mode-000 file, so the failure surfaces later, inside
/// the concurrent hash tasks, and must still abort the build.
#[cfg(unix)]
#[tokio::test]
async fn test_read_denied_during_hashing_fails_the_build() {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    let source = build_tree(&[("app.js", "fine"), ("locked.js", "unreadable")]);
    let locked = source.path().join("locked.js");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Mode bits never stop root from opening the file
    if std::fs::metadata(&locked).unwrap().uid() == 0 {
        return;
    }

    let dest = TempDir::new().unwrap();
    let result = digest_defaults(source.path(), dest.path()).await;

    assert!(matches!(result, Err(BuildError::FileRead { .. })));
    assert!(!dest.path().join("digest.json").exists());
}

/// A failed run leaves a previous run's manifest untouched.
#[tokio::test]
async fn test_failure_preserves_previous_manifest() {
    let source = build_tree(&[("app.js", "v1")]);
    let dest = TempDir::new().unwrap();

    digest_defaults(source.path(), dest.path()).await.unwrap();
    let first_bytes = read_manifest_bytes(&dest.path().join("digest.json"));

    // Second run against a vanished source fails outright
    let gone = source.path().join("subtree-that-never-existed");
    let result = digest_defaults(&gone, dest.path()).await;
    assert!(result.is_err());

    assert_eq!(
        read_manifest_bytes(&dest.path().join("digest.json")),
        first_bytes
    );
}

#[tokio::test]
async fn test_strict_collisions_fail_and_write_nothing() {
    let source = build_tree(&[("app.js", "js body"), ("app.css", "css body")]);
    let dest = TempDir::new().unwrap();

    let config = DigestConfig {
        extensions: vec!["js".to_string(), "css".to_string()],
        collisions: CollisionPolicy::Error,
        ..DigestConfig::default()
    };
    let result = digest(source.path(), dest.path(), config).await;

    assert!(matches!(result, Err(BuildError::Collision { .. })));
    assert!(!dest.path().join("digest.json").exists());
}

#[tokio::test]
async fn test_unwritable_destination_fails() {
    let source = build_tree(&[("app.js", "body")]);
    let parent = TempDir::new().unwrap();
    // A file where the destination directory should be
    let dest = parent.path().join("occupied");
    std::fs::write(&dest, "not a directory").unwrap();

    let result = digest_defaults(source.path(), &dest).await;
    assert!(result.is_err());
}
