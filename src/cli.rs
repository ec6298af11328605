//! CLI surface: clap definitions, flag merging, command execution, and error
//! mapping. No domain logic; the digest run itself lives in [`crate::build`].

use crate::build::DigestBuilder;
use crate::config::{CollisionPolicy, ConfigLoader, DigestConfig};
use crate::error::BuildError;
use crate::events::{BuildEvent, EventSink, TracingSink};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Imprint CLI - content fingerprints for asset trees
#[derive(Parser)]
#[command(name = "imprint")]
#[command(about = "Content-addressed fingerprints and cache-busting manifests for asset trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides imprint.toml discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Suppress all logging
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Digest a source tree and write the manifest
    Digest {
        /// Source directory to walk
        source: PathBuf,

        /// Destination directory for the manifest (created if absent)
        dest: PathBuf,

        /// Manifest file name
        #[arg(long)]
        output: Option<String>,

        /// Salt mixed into every fingerprint
        #[arg(long)]
        permutation: Option<String>,

        /// Comma-separated extensions to digest
        #[arg(long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        /// Fail on logical name collisions instead of keeping the last write
        #[arg(long)]
        strict_collisions: bool,

        /// Upper bound on files hashed concurrently
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Do not follow symlinks during the walk
        #[arg(long)]
        no_follow_symlinks: bool,
    },
}

impl Cli {
    /// Effective config for this invocation: file values with CLI flags
    /// merged on top.
    pub fn effective_config(&self) -> Result<DigestConfig, BuildError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(Path::new("."))?,
        };

        match &self.command {
            Commands::Digest {
                output,
                permutation,
                extensions,
                strict_collisions,
                max_concurrent,
                no_follow_symlinks,
                ..
            } => {
                if let Some(output) = output {
                    config.outputname = output.clone();
                }
                if let Some(permutation) = permutation {
                    config.permutation = permutation.clone();
                }
                if let Some(extensions) = extensions {
                    config.extensions = extensions.clone();
                }
                if *strict_collisions {
                    config.collisions = CollisionPolicy::Error;
                }
                if let Some(max_concurrent) = max_concurrent {
                    config.max_concurrent_reads = *max_concurrent;
                }
                if *no_follow_symlinks {
                    config.follow_symlinks = false;
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Forwards events to tracing while keeping the completion count for the
/// stdout summary.
struct SummarySink {
    inner: TracingSink,
    completed: Mutex<Option<usize>>,
}

impl SummarySink {
    fn new() -> Self {
        Self {
            inner: TracingSink,
            completed: Mutex::new(None),
        }
    }

    fn completed_entries(&self) -> Option<usize> {
        *self.completed.lock()
    }
}

impl EventSink for SummarySink {
    fn emit(&self, event: BuildEvent) {
        if let BuildEvent::BuildCompleted { entries, .. } = &event {
            *self.completed.lock() = Some(*entries);
        }
        self.inner.emit(event);
    }
}

/// Execute the parsed command, returning the summary line for stdout.
pub fn execute(cli: &Cli) -> Result<String, BuildError> {
    let config = cli.effective_config()?;

    match &cli.command {
        Commands::Digest { source, dest, .. } => {
            let outputname = config.outputname.clone();
            let sink = Arc::new(SummarySink::new());
            let builder = DigestBuilder::with_events(config, sink.clone());

            let runtime =
                tokio::runtime::Runtime::new().map_err(|e| BuildError::Worker(e.to_string()))?;
            let dest_root = runtime.block_on(builder.run(source, dest))?;

            let entries = sink.completed_entries().unwrap_or(0);
            Ok(format!(
                "Digested {} files. Saved manifest to {}",
                entries,
                dest_root.join(outputname).display()
            ))
        }
    }
}

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &BuildError) -> String {
    e.to_string()
}
