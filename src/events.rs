//! Build event stream.
//!
//! The orchestrator reports progress through an injected [`EventSink`] rather
//! than a global console, so hosts can route events into their own reporting
//! and tests can capture or discard them without initializing logging.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::build::BuildPhase;

/// Event severity, mapped onto the tracing levels by [`TracingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Info,
    Warn,
    Error,
}

/// A single build event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildEvent {
    /// The orchestrator moved to a new phase.
    PhaseChanged { phase: BuildPhase },
    /// A file was visited but did not match the extension allow-list.
    FileSkipped { path: PathBuf },
    /// A file finished hashing and resolved to a manifest entry.
    FileHashed {
        logical_name: String,
        fingerprinted_name: String,
    },
    /// Two source files resolved to the same logical name; the replacement won.
    CollisionDetected {
        logical_name: String,
        previous: String,
        replacement: String,
    },
    /// The manifest was persisted.
    ManifestWritten { path: PathBuf, entries: usize },
    /// The build finished successfully.
    BuildCompleted { entries: usize, duration_ms: u128 },
    /// The build aborted on its first fatal error.
    BuildFailed { error: String },
}

impl BuildEvent {
    pub fn severity(&self) -> Severity {
        match self {
            BuildEvent::PhaseChanged { .. } | BuildEvent::FileSkipped { .. } => Severity::Trace,
            BuildEvent::FileHashed { .. }
            | BuildEvent::ManifestWritten { .. }
            | BuildEvent::BuildCompleted { .. } => Severity::Info,
            BuildEvent::CollisionDetected { .. } => Severity::Warn,
            BuildEvent::BuildFailed { .. } => Severity::Error,
        }
    }
}

/// Receiver for build events.
///
/// Emission is single-task: the walker's dispatch loop and the orchestrator
/// call sinks inline, never from hash workers. A slow sink stalls the build.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: BuildEvent);
}

/// Forwards events to the `tracing` pipeline at their severity.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: BuildEvent) {
        match event.severity() {
            Severity::Trace => tracing::trace!(event = ?event, "build event"),
            Severity::Info => tracing::info!(event = ?event, "build event"),
            Severity::Warn => tracing::warn!(event = ?event, "build event"),
            Severity::Error => tracing::error!(event = ?event, "build event"),
        }
    }
}

/// Buffers events for later inspection; used by tests.
#[derive(Debug, Default)]
pub struct CaptureSink {
    events: Mutex<Vec<BuildEvent>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn snapshot(&self) -> Vec<BuildEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for CaptureSink {
    fn emit(&self, event: BuildEvent) {
        self.events.lock().push(event);
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: BuildEvent) {}
}
