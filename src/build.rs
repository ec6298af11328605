//! Build orchestration
//!
//! Drives one digest run end to end: resolve the source and destination
//! directories, walk and hash the tree, accumulate the manifest, and persist
//! it into the destination. The orchestrator is the single writer of the
//! manifest; hash tasks hand it completed digests and never share state.

use crate::config::DigestConfig;
use crate::error::BuildError;
use crate::events::{BuildEvent, EventSink, TracingSink};
use crate::manifest::{Manifest, ManifestEntry, RecordOutcome};
use crate::tree::filter::ExtensionFilter;
use crate::tree::path;
use crate::tree::walker::{Walker, WalkerConfig};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Phases of one digest run.
///
/// A run moves forward through the first four phases and lands on `Done`;
/// any fatal error from any phase lands on `Failed` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    Idle,
    ResolvingPaths,
    Walking,
    WritingManifest,
    Done,
    Failed,
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BuildPhase::Idle => "idle",
            BuildPhase::ResolvingPaths => "resolving_paths",
            BuildPhase::Walking => "walking",
            BuildPhase::WritingManifest => "writing_manifest",
            BuildPhase::Done => "done",
            BuildPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Contract between the digest engine and a host build tool.
///
/// The host supplies an already-materialized source directory and a
/// destination directory; the transform writes its outputs into the
/// destination and returns that directory so steps can chain. Any error
/// fails the whole build step and the destination must not be trusted.
#[async_trait]
pub trait TreeTransform: Send + Sync {
    async fn transform(&self, source_dir: &Path, dest_dir: &Path) -> Result<PathBuf, BuildError>;
}

/// Orchestrates one digest build.
pub struct DigestBuilder {
    config: DigestConfig,
    events: Arc<dyn EventSink>,
    phase: Mutex<BuildPhase>,
}

impl DigestBuilder {
    /// Create a builder that reports progress through the tracing pipeline.
    pub fn new(config: DigestConfig) -> Self {
        Self::with_events(config, Arc::new(TracingSink))
    }

    /// Create a builder with an injected event sink.
    pub fn with_events(config: DigestConfig, events: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            events,
            phase: Mutex::new(BuildPhase::Idle),
        }
    }

    /// Current phase of the run.
    pub fn phase(&self) -> BuildPhase {
        *self.phase.lock()
    }

    fn set_phase(&self, phase: BuildPhase) {
        *self.phase.lock() = phase;
        debug!(phase = %phase, "Build phase changed");
        self.events.emit(BuildEvent::PhaseChanged { phase });
    }

    /// Run one digest build from `source_dir` into `dest_dir`.
    ///
    /// On success the manifest sits at `dest_dir/<outputname>` and the
    /// resolved destination directory is returned. On failure no success is
    /// reported and any manifest at the destination is from a previous run.
    #[instrument(skip(self), fields(source = %source_dir.display(), dest = %dest_dir.display()))]
    pub async fn run(&self, source_dir: &Path, dest_dir: &Path) -> Result<PathBuf, BuildError> {
        let start = Instant::now();
        info!("Starting digest build");

        match self.execute(source_dir, dest_dir, start).await {
            Ok(dest) => Ok(dest),
            Err(e) => {
                self.set_phase(BuildPhase::Failed);
                self.events.emit(BuildEvent::BuildFailed {
                    error: e.to_string(),
                });
                error!("Digest build failed: {}", e);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        start: Instant,
    ) -> Result<PathBuf, BuildError> {
        self.set_phase(BuildPhase::ResolvingPaths);

        let source_root = path::normalize_root(source_dir)?;
        let metadata = std::fs::metadata(&source_root).map_err(|source| BuildError::Walk {
            path: source_root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(BuildError::InvalidPath(format!(
                "{:?} is not a directory",
                source_root
            )));
        }

        std::fs::create_dir_all(dest_dir).map_err(|source| BuildError::ManifestWrite {
            path: dest_dir.to_path_buf(),
            source,
        })?;
        let dest_root = path::normalize_root(dest_dir)?;

        self.set_phase(BuildPhase::Walking);

        let filter = ExtensionFilter::new(&self.config.extensions);
        let walker_config = WalkerConfig {
            follow_symlinks: self.config.follow_symlinks,
            permutation: self.config.permutation.clone(),
            max_in_flight: self.config.max_concurrent_reads,
        };
        let walker = Walker::with_config(source_root.clone(), filter, walker_config);
        let hashed = walker.walk(self.events.as_ref()).await?;
        debug!(hashed = hashed.len(), "Tree walk completed");

        let mut manifest = Manifest::new(self.config.collisions);
        for file in hashed {
            let entry = ManifestEntry::resolve(&source_root, &file.path, &file.digest)?;
            let logical_name = entry.logical_name.clone();
            let fingerprinted_name = entry.fingerprinted_name.clone();

            match manifest.record(entry)? {
                RecordOutcome::Inserted => {
                    self.events.emit(BuildEvent::FileHashed {
                        logical_name,
                        fingerprinted_name,
                    });
                }
                RecordOutcome::ReplacedLastWrite { previous } => {
                    warn!(
                        logical_name = %logical_name,
                        "Logical name collision, last write wins"
                    );
                    self.events.emit(BuildEvent::CollisionDetected {
                        logical_name,
                        previous,
                        replacement: fingerprinted_name,
                    });
                }
            }
        }

        self.set_phase(BuildPhase::WritingManifest);

        let manifest_path = dest_root.join(&self.config.outputname);
        manifest.write(&manifest_path)?;
        self.events.emit(BuildEvent::ManifestWritten {
            path: manifest_path,
            entries: manifest.len(),
        });

        self.set_phase(BuildPhase::Done);

        let duration = start.elapsed();
        info!(
            entries = manifest.len(),
            duration_ms = duration.as_millis(),
            "Digest build completed"
        );
        self.events.emit(BuildEvent::BuildCompleted {
            entries: manifest.len(),
            duration_ms: duration.as_millis(),
        });

        Ok(dest_root)
    }
}

#[async_trait]
impl TreeTransform for DigestBuilder {
    async fn transform(&self, source_dir: &Path, dest_dir: &Path) -> Result<PathBuf, BuildError> {
        self.run(source_dir, dest_dir).await
    }
}
