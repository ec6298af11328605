//! Integration tests for the persisted manifest format

use super::test_utils::{build_tree, digest, digest_defaults, read_manifest, read_manifest_bytes};
use imprint::config::DigestConfig;
use imprint::tree::hasher::DIGEST_LEN;
use serde_json::Value;
use tempfile::TempDir;

/// The manifest is one JSON object of string-to-string pairs.
#[tokio::test]
async fn test_manifest_is_flat_json_object() {
    let source = build_tree(&[("app.js", "body"), ("lib/util.js", "body")]);
    let dest = TempDir::new().unwrap();

    digest_defaults(source.path(), dest.path()).await.unwrap();

    let value: Value =
        serde_json::from_slice(&read_manifest_bytes(&dest.path().join("digest.json"))).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    for entry in object.values() {
        assert!(entry.is_string());
    }
}

/// Logical names are root-relative, extension-stripped, and carry no leading
/// separator; fingerprinted names append a hyphen and the hex digest.
#[tokio::test]
async fn test_entry_shape() {
    let source = build_tree(&[("scripts/app.js", "var app;")]);
    let dest = TempDir::new().unwrap();

    digest_defaults(source.path(), dest.path()).await.unwrap();

    let manifest = read_manifest(&dest.path().join("digest.json"));
    let fingerprinted = manifest.get("scripts/app").unwrap();

    let suffix = fingerprinted
        .strip_prefix("scripts/app-")
        .expect("fingerprinted name keeps the logical name as prefix");
    assert_eq!(suffix.len(), DIGEST_LEN * 2);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

/// Root-level files map to bare stems.
#[tokio::test]
async fn test_root_level_names_have_no_separator() {
    let source = build_tree(&[("app.js", "var app;")]);
    let dest = TempDir::new().unwrap();

    digest_defaults(source.path(), dest.path()).await.unwrap();

    let manifest = read_manifest(&dest.path().join("digest.json"));
    assert!(manifest.contains_key("app"));
    assert!(!manifest.keys().any(|k| k.starts_with('/')));
}

/// Only the final extension is stripped from multi-dot names.
#[tokio::test]
async fn test_multi_dot_names_keep_inner_dots() {
    let source = build_tree(&[("bundle.min.js", "minified")]);
    let dest = TempDir::new().unwrap();

    digest_defaults(source.path(), dest.path()).await.unwrap();

    let manifest = read_manifest(&dest.path().join("digest.json"));
    assert!(manifest.contains_key("bundle.min"));
}

/// A custom outputname lands the manifest under that file name.
#[tokio::test]
async fn test_custom_outputname() {
    let source = build_tree(&[("app.js", "body")]);
    let dest = TempDir::new().unwrap();

    let config = DigestConfig {
        outputname: "assets-manifest.json".to_string(),
        ..DigestConfig::default()
    };
    digest(source.path(), dest.path(), config).await.unwrap();

    assert!(dest.path().join("assets-manifest.json").exists());
    assert!(!dest.path().join("digest.json").exists());
}

/// An empty eligible set still writes a well-formed empty object.
#[tokio::test]
async fn test_empty_manifest_is_empty_object() {
    let source = build_tree(&[("readme.txt", "no scripts here")]);
    let dest = TempDir::new().unwrap();

    digest_defaults(source.path(), dest.path()).await.unwrap();

    assert_eq!(
        read_manifest_bytes(&dest.path().join("digest.json")),
        b"{}"
    );
}
