//! Integration tests for the tree transform contract
//!
//! Hosts drive the digest engine through the `TreeTransform` trait: supply a
//! materialized source directory and a destination, get the destination back
//! on success so steps can chain.

use super::test_utils::{build_tree, read_manifest};
use imprint::build::{DigestBuilder, TreeTransform};
use imprint::config::DigestConfig;
use imprint::events::{BuildEvent, CaptureSink};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_transform_resolves_with_destination() {
    let source = build_tree(&[("app.js", "body")]);
    let dest = TempDir::new().unwrap();

    let builder = DigestBuilder::new(DigestConfig::default());
    let transform: &dyn TreeTransform = &builder;

    let reported = transform
        .transform(source.path(), dest.path())
        .await
        .unwrap();

    assert_eq!(reported, dunce::canonicalize(dest.path()).unwrap());
    assert!(reported.join("digest.json").exists());
}

/// The returned destination can feed the next step directly.
#[tokio::test]
async fn test_transform_output_chains_into_next_step() {
    let source = build_tree(&[("app.js", "body")]);
    let dest_a = TempDir::new().unwrap();
    let dest_b = TempDir::new().unwrap();

    let first = DigestBuilder::new(DigestConfig::default());
    let stage_output = first.transform(source.path(), dest_a.path()).await.unwrap();

    // Downstream step treats the previous output directory as its source;
    // digesting the manifest itself requires opting into the json extension.
    let second = DigestBuilder::new(DigestConfig {
        extensions: vec!["json".to_string()],
        outputname: "digest2.json".to_string(),
        ..DigestConfig::default()
    });
    second.transform(&stage_output, dest_b.path()).await.unwrap();

    let manifest = read_manifest(&dest_b.path().join("digest2.json"));
    assert!(manifest.contains_key("digest"));
}

#[tokio::test]
async fn test_transform_rejects_instead_of_resolving_on_failure() {
    let parent = TempDir::new().unwrap();
    let source = parent.path().join("absent");
    let dest = parent.path().join("out");

    let builder = DigestBuilder::new(DigestConfig::default());
    let result = builder.transform(&source, &dest).await;

    assert!(result.is_err());
}

/// Hosts can observe the run through an injected event sink with no global
/// logging setup.
#[tokio::test]
async fn test_transform_reports_through_injected_sink() {
    let source = build_tree(&[("app.js", "body"), ("notes.txt", "skip me")]);
    let dest = TempDir::new().unwrap();

    let sink = Arc::new(CaptureSink::new());
    let builder = DigestBuilder::with_events(DigestConfig::default(), sink.clone());
    builder.transform(source.path(), dest.path()).await.unwrap();

    let events = sink.snapshot();
    assert!(events
        .iter()
        .any(|e| matches!(e, BuildEvent::FileHashed { logical_name, .. } if logical_name == "app")));
    assert!(events
        .iter()
        .any(|e| matches!(e, BuildEvent::FileSkipped { path } if path.ends_with("notes.txt"))));
    assert!(events
        .iter()
        .any(|e| matches!(e, BuildEvent::ManifestWritten { entries: 1, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, BuildEvent::BuildCompleted { .. })));
}
