//! Deterministic change-detection digest.
//!
//! Combines each included file's raw bytes and its resolved variable export
//! into one SHA-256 value. Per-entry digests are sorted lexicographically
//! before the final pass, so the result is independent of input iteration
//! order. An external caching layer compares digests to decide whether
//! regeneration is needed.

use std::collections::BTreeMap;

use sha2::{Digest as _, Sha256};
use thiserror::Error;

/// Failures while computing the combined digest.
#[derive(Error, Debug)]
pub enum HashError {
    /// The input mapping was empty.
    #[error("no input provided")]
    NoInput,

    /// An included file could not be read.
    #[error("reading {path}: {source}")]
    Io {
        /// Path of the unreadable file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Digest a set of (file identity → resolved variable export) pairs.
///
/// Bit-for-bit reproducible across runs given identical file contents and
/// variable exports.
///
/// # Errors
///
/// Fails when the mapping is empty or any file cannot be read.
pub fn digest(included: &BTreeMap<String, String>) -> Result<String, HashError> {
    if included.is_empty() {
        return Err(HashError::NoInput);
    }

    let mut digests = Vec::with_capacity(included.len());

    for (name, export) in included {
        let data = std::fs::read(name).map_err(|source| HashError::Io {
            path: name.clone(),
            source,
        })?;

        let entry = format!(
            "{name}\n{}\n{}\n",
            sha256_hex(&data),
            sha256_hex(export.as_bytes())
        );

        digests.push(sha256_hex(entry.as_bytes()));
    }

    digests.sort_unstable();

    let payload = digests.join("\n") + "\n";
    Ok(sha256_hex(payload.as_bytes()))
}
