//! Streaming content hashing using BLAKE3
//!
//! Fingerprints are the first 16 bytes of a BLAKE3 digest over the file's
//! bytes followed by the configured permutation string, rendered as 32
//! lowercase hex characters. The 128-bit truncation keeps fingerprinted
//! names the same width clients already consume while the full-width state
//! preserves BLAKE3's distribution. This encoding is part of the output
//! contract: the hex string is embedded in filenames served to clients.

use crate::error::BuildError;
use blake3::Hasher;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Bytes of BLAKE3 output kept in a fingerprint.
pub const DIGEST_LEN: usize = 16;

/// Read granularity for streaming file contents.
const READ_CHUNK: usize = 64 * 1024;

/// Incremental hash state for a single file.
///
/// Created when the file is opened, fed each chunk in read order, and
/// finalized exactly once. Finalization consumes the accumulator so a digest
/// can never be extracted twice or mixed across files.
pub struct FileHasher {
    inner: Hasher,
}

impl FileHasher {
    pub fn new() -> Self {
        Self {
            inner: Hasher::new(),
        }
    }

    /// Feed one chunk of file content.
    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
    }

    /// Append the permutation after the last content byte and produce the
    /// lowercase hex fingerprint.
    pub fn finalize(mut self, permutation: &str) -> String {
        self.inner.update(permutation.as_bytes());
        let hash = self.inner.finalize();
        hex::encode(&hash.as_bytes()[..DIGEST_LEN])
    }
}

impl Default for FileHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a file's contents in sequential chunks.
///
/// Reads never seek and never revisit bytes, so the digest depends only on
/// the byte sequence and the permutation. Any read failure is fatal.
pub async fn hash_file(path: &Path, permutation: &str) -> Result<String, BuildError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|source| BuildError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    let mut hasher = FileHasher::new();
    let mut buffer = vec![0u8; READ_CHUNK];

    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|source| BuildError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize(permutation))
}
