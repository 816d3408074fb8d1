//! Version descriptor: the `assetIndex` reference inside a version JSON.

use super::IndexDescriptor;
use crate::error::SyncError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,
    pub sha1: String,
    pub size: u64,
    pub url: String,
    #[serde(default)]
    pub total_size: Option<u64>,
}

impl AssetIndexRef {
    pub fn descriptor(&self) -> IndexDescriptor {
        IndexDescriptor {
            id: self.id.clone(),
            url: self.url.clone(),
            size: self.size,
            hash: self.sha1.to_ascii_lowercase(),
        }
    }
}

/// The parts of a version JSON this crate cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    pub asset_index: AssetIndexRef,
}

impl VersionDescriptor {
    pub fn read(path: &Path) -> Result<Self, SyncError> {
        let bytes = std::fs::read(path).map_err(|e| SyncError::io("read", path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| SyncError::Format {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
