//! Store root layout and object addressing.
//!
//! ```text
//! <root>/objects/<hash[0:2]>/<hash>
//! <root>/indexes/<manifest id>.json
//! ```
//!
//! Remote objects use the same sharded suffix under the repository base URL.

use crate::error::SyncError;
use std::path::{Path, PathBuf};

pub const OBJECTS_DIR: &str = "objects";
pub const INDEXES_DIR: &str = "indexes";

/// Sharded suffix for a digest: `"ab/abcd1234…"`.
///
/// Callers pass validated digests (at least two ASCII hex chars); anything
/// shorter is used whole as its own shard.
pub fn object_suffix(hash: &str) -> String {
    let shard = hash.get(..2).unwrap_or(hash);
    format!("{}/{}", shard, hash)
}

/// Remote URL of an object: `base + hash[0:2] + "/" + hash`.
///
/// `base` is expected to end with `/` (see [`normalize_base_url`]).
pub fn object_url(base: &str, hash: &str) -> String {
    format!("{}{}", base, object_suffix(hash))
}

/// Validate a repository base URL and make sure it ends with `/` so object
/// suffixes append cleanly.
pub fn normalize_base_url(base: &str) -> Result<String, url::ParseError> {
    let parsed = url::Url::parse(base)?;
    let mut s = parsed.to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Ok(s)
}

fn is_plain_index_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}

/// On-disk layout of a store root.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.root.join(OBJECTS_DIR)
    }

    pub fn indexes_dir(&self) -> PathBuf {
        self.root.join(INDEXES_DIR)
    }

    /// Local path of the object with digest `hash`.
    pub fn object_path(&self, hash: &str) -> PathBuf {
        let shard = hash.get(..2).unwrap_or(hash);
        self.objects_dir().join(shard).join(hash)
    }

    /// Cached copy of the manifest named `id`.
    ///
    /// The id must be a single plain file name component; anything that could
    /// resolve outside `indexes/` is a `Format` error.
    pub fn index_path(&self, id: &str) -> Result<PathBuf, SyncError> {
        let dir = self.indexes_dir();
        if !is_plain_index_id(id) {
            return Err(SyncError::Format {
                path: dir,
                reason: format!("invalid asset index id {:?}", id),
            });
        }
        Ok(dir.join(format!("{}.json", id)))
    }
}
