//! Content digests for store objects and asset indexes.
//!
//! Files are hashed in fixed-size chunks so memory use stays bounded for
//! large objects. The algorithm is a run-wide setting shared by the index
//! and every object it names.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Digest used to address and verify objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 160-bit SHA-1; what the public asset repository uses.
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Length of a digest in lowercase hex characters.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// True if `s` is a lowercase hex digest of the right length for this algorithm.
    pub fn is_digest(self, s: &str) -> bool {
        s.len() == self.hex_len() && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(format!("unsupported hash algorithm: {other}")),
        }
    }
}

/// Compute the digest of the file at `path` and return it as lowercase hex.
pub fn hash_path(path: &Path, algorithm: HashAlgorithm) -> Result<String, SyncError> {
    match algorithm {
        HashAlgorithm::Sha1 => digest_path::<Sha1>(path),
        HashAlgorithm::Sha256 => digest_path::<Sha256>(path),
    }
}

/// Hash `path` and compare against `expected`. Returns `Ok(None)` on a match
/// and `Ok(Some(actual))` on a mismatch so the caller decides what to do
/// with the file.
pub fn verify_path(
    path: &Path,
    expected: &str,
    algorithm: HashAlgorithm,
) -> Result<Option<String>, SyncError> {
    let actual = hash_path(path, algorithm)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(None)
    } else {
        Ok(Some(actual))
    }
}

fn digest_path<D: Digest>(path: &Path) -> Result<String, SyncError> {
    let mut f = File::open(path).map_err(|e| SyncError::io("open", path, e))?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf).map_err(|e| SyncError::io("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
