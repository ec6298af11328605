//! Manifest accumulation and serialization
//!
//! The manifest is the single shared output of a build: a JSON object mapping
//! each logical name to its fingerprinted name. Entries arrive from hash
//! tasks in completion order; a sorted map keeps the serialized form
//! byte-identical across runs regardless of that order.

use crate::config::CollisionPolicy;
use crate::error::BuildError;
use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single manifest pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub logical_name: String,
    pub fingerprinted_name: String,
}

impl ManifestEntry {
    /// Resolve a hashed file into its manifest entry.
    ///
    /// Pure: the same (root, file, digest) triple always yields the same
    /// entry, independent of traversal order.
    pub fn resolve(root: &Path, file: &Path, digest_hex: &str) -> Result<Self, BuildError> {
        let logical_name = path::logical_name(root, file)?;
        let fingerprinted_name = format!("{}-{}", logical_name, digest_hex);
        Ok(Self {
            logical_name,
            fingerprinted_name,
        })
    }
}

/// Outcome of recording an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    /// The logical name was already mapped; the new entry replaced it.
    ReplacedLastWrite { previous: String },
}

/// Accumulates (logical name, fingerprinted name) pairs for one build.
///
/// Owned by the orchestrator as the single writer; hash tasks never touch it
/// directly.
#[derive(Debug)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
    policy: CollisionPolicy,
}

impl Manifest {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            entries: BTreeMap::new(),
            policy,
        }
    }

    /// Record one entry under its logical name.
    ///
    /// A repeated logical name either replaces the existing mapping
    /// (last write wins) or aborts the build, per the collision policy.
    pub fn record(&mut self, entry: ManifestEntry) -> Result<RecordOutcome, BuildError> {
        match self
            .entries
            .insert(entry.logical_name.clone(), entry.fingerprinted_name)
        {
            None => Ok(RecordOutcome::Inserted),
            Some(previous) => match self.policy {
                CollisionPolicy::Warn => Ok(RecordOutcome::ReplacedLastWrite { previous }),
                CollisionPolicy::Error => Err(BuildError::Collision {
                    logical_name: entry.logical_name,
                }),
            },
        }
    }

    pub fn get(&self, logical_name: &str) -> Option<&str> {
        self.entries.get(logical_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a single JSON object.
    ///
    /// Keys come out sorted, so equal manifests serialize to equal bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, BuildError> {
        Ok(serde_json::to_vec(&self.entries)?)
    }

    /// Persist the manifest at `path` via a sibling temp file and rename,
    /// so a crash mid-write never leaves a truncated manifest behind.
    pub fn write(&self, path: &Path) -> Result<(), BuildError> {
        let bytes = self.to_json()?;

        let file_name = path
            .file_name()
            .ok_or_else(|| BuildError::InvalidPath(format!("{:?} has no file name", path)))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, &bytes).map_err(|source| BuildError::ManifestWrite {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, path).map_err(|source| BuildError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}
