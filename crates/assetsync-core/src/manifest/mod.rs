//! Asset index (manifest) model and parsing.
//!
//! An index is a JSON document of the form
//!
//! ```json
//! { "objects": { "<logical name>": { "hash": "<hex digest>", "size": 1024 } } }
//! ```
//!
//! Fields other than `hash` and `size` are carried through untouched.

mod version;

pub use version::{AssetIndexRef, VersionDescriptor};

use crate::checksum::HashAlgorithm;
use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Where to find a manifest and what it must look like: the caller-supplied
/// half of the loader contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    /// Manifest id; also names the cached copy (`indexes/<id>.json`).
    pub id: String,
    pub url: String,
    pub size: u64,
    pub hash: String,
}

/// One required object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Content digest; the object's address in the store.
    pub hash: String,
    pub size: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawIndex {
    objects: BTreeMap<String, AssetRecord>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Parsed, validated asset index. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Manifest {
    id: String,
    size: u64,
    hash: String,
    objects: BTreeMap<String, AssetRecord>,
    extra: Map<String, Value>,
}

impl Manifest {
    /// Parse index bytes that were read from `path` (used for error context only).
    ///
    /// Every record's hash must be a lowercase hex digest of `algorithm`'s length.
    pub fn parse(
        descriptor: &IndexDescriptor,
        bytes: &[u8],
        path: &Path,
        algorithm: HashAlgorithm,
    ) -> Result<Self, SyncError> {
        let raw: RawIndex = serde_json::from_slice(bytes).map_err(|e| SyncError::Format {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        for (name, record) in &raw.objects {
            if !algorithm.is_digest(&record.hash) {
                return Err(SyncError::Format {
                    path: path.to_path_buf(),
                    reason: format!(
                        "asset {} has malformed {} hash {:?}",
                        name, algorithm, record.hash
                    ),
                });
            }
        }

        Ok(Manifest {
            id: descriptor.id.clone(),
            size: descriptor.size,
            hash: descriptor.hash.clone(),
            objects: raw.objects,
            extra: raw.extra,
        })
    }

    /// Read and parse the index file at `path`.
    pub fn read(
        descriptor: &IndexDescriptor,
        path: &Path,
        algorithm: HashAlgorithm,
    ) -> Result<Self, SyncError> {
        let bytes = std::fs::read(path).map_err(|e| SyncError::io("read", path, e))?;
        Self::parse(descriptor, &bytes, path, algorithm)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Expected byte size of the index document itself.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Expected digest of the index document itself.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AssetRecord> {
        self.objects.get(name)
    }

    /// Records in logical-name order.
    pub fn assets(&self) -> impl Iterator<Item = (&str, &AssetRecord)> {
        self.objects.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Sum of all record sizes (objects shared by several names count once per name).
    pub fn total_size(&self) -> u64 {
        self.objects.values().map(|r| r.size).sum()
    }

    /// Top-level index fields other than `objects` (e.g. `virtual`, `map_to_resources`).
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
