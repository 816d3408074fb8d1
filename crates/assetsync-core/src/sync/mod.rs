//! Asset synchronizer: reconcile a manifest against the local object store.
//!
//! For each record the store path is derived from the digest. A present
//! file of the expected size is trusted (under [`TrustPolicy::SizeOnly`]);
//! anything else is fetched from the repository and always hash-verified.
//! A fetched object that fails verification is deleted and aborts the run,
//! so no unverified bytes are left under a canonical object path.

mod observer;
#[cfg(test)]
pub(crate) mod test_support;

pub use observer::{NoopObserver, SyncObserver};

use crate::checksum::{self, HashAlgorithm};
use crate::error::SyncError;
use crate::fetch::Fetcher;
use crate::layout::{self, StoreLayout};
use crate::manifest::{AssetRecord, Manifest};
use crate::storage;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Rule for accepting an object that is already in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrustPolicy {
    /// Accept an existing object whose size matches, without hashing it.
    /// A same-size object with different bytes is trusted; this is the
    /// compatible default.
    #[default]
    SizeOnly,
    /// Re-hash existing same-size objects and re-fetch any that do not match.
    FullHash,
}

impl fmt::Display for TrustPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrustPolicy::SizeOnly => "size-only",
            TrustPolicy::FullHash => "full-hash",
        })
    }
}

impl FromStr for TrustPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "size-only" => Ok(TrustPolicy::SizeOnly),
            "full-hash" => Ok(TrustPolicy::FullHash),
            other => Err(format!("unknown trust policy: {other}")),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records in the manifest.
    pub total: usize,
    /// Records satisfied by an object already in the store.
    pub cached: usize,
    /// Records downloaded and verified this run.
    pub fetched: usize,
    pub bytes_fetched: u64,
}

impl SyncReport {
    /// True if the run did not touch the network.
    pub fn is_noop(&self) -> bool {
        self.fetched == 0
    }
}

pub struct AssetSynchronizer<'a> {
    fetcher: &'a dyn Fetcher,
    algorithm: HashAlgorithm,
    trust: TrustPolicy,
}

impl<'a> AssetSynchronizer<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self {
            fetcher,
            algorithm: HashAlgorithm::default(),
            trust: TrustPolicy::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_trust_policy(mut self, trust: TrustPolicy) -> Self {
        self.trust = trust;
        self
    }

    /// Make every record in `manifest` present and valid under `layout`,
    /// fetching missing or wrong-size objects from `base_url`.
    ///
    /// The first failure aborts the whole run; nothing is retried.
    pub fn synchronize(
        &self,
        base_url: &str,
        layout: &StoreLayout,
        manifest: &Manifest,
        observer: &mut dyn SyncObserver,
    ) -> Result<SyncReport, SyncError> {
        let base: Cow<'_, str> = if base_url.ends_with('/') {
            Cow::Borrowed(base_url)
        } else {
            Cow::Owned(format!("{}/", base_url))
        };

        let objects_dir = layout.objects_dir();
        storage::ensure_dir(&objects_dir)
            .map_err(|e| SyncError::io("create directory", &objects_dir, e))?;

        let mut report = SyncReport {
            total: manifest.len(),
            ..SyncReport::default()
        };

        for (name, record) in manifest.assets() {
            let path = layout.object_path(&record.hash);
            if self.is_current(name, record, &path)? {
                report.cached += 1;
                continue;
            }

            if report.fetched == 0 {
                observer.first_fetch();
            }
            observer.asset_started(name, record);

            let url = layout::object_url(&base, &record.hash);
            self.fetch_verified(name, record, &url, &path)?;

            report.fetched += 1;
            report.bytes_fetched += record.size;
            observer.asset_verified(name, record);
        }

        tracing::debug!(
            index = manifest.id(),
            total = report.total,
            cached = report.cached,
            fetched = report.fetched,
            "asset sync complete"
        );
        Ok(report)
    }

    /// Decide whether the object at `path` can be accepted without a download.
    fn is_current(&self, name: &str, record: &AssetRecord, path: &Path) -> Result<bool, SyncError> {
        let Some(len) = storage::file_len(path) else {
            return Ok(false);
        };
        tracing::debug!(asset = name, "considering existing file with size {}", len);
        if len != record.size {
            tracing::debug!(asset = name, "size mismatch, expected {}", record.size);
            return Ok(false);
        }
        match self.trust {
            TrustPolicy::SizeOnly => Ok(true),
            TrustPolicy::FullHash => {
                match checksum::verify_path(path, &record.hash, self.algorithm)? {
                    None => Ok(true),
                    Some(actual) => {
                        tracing::warn!(
                            asset = name,
                            expected = %record.hash,
                            actual = %actual,
                            "existing object is corrupt, fetching again"
                        );
                        Ok(false)
                    }
                }
            }
        }
    }

    fn fetch_verified(
        &self,
        name: &str,
        record: &AssetRecord,
        url: &str,
        path: &Path,
    ) -> Result<(), SyncError> {
        if let Some(shard) = path.parent() {
            storage::ensure_dir(shard).map_err(|e| SyncError::io("create directory", shard, e))?;
        }

        let subject = format!("asset {}", name);
        tracing::info!(asset = name, url, "downloading missing asset");
        self.fetcher
            .fetch(url, path)
            .map_err(|e| SyncError::from_fetch(&subject, url, path, &record.hash, e))?;

        let mismatch = match checksum::verify_path(path, &record.hash, self.algorithm) {
            Ok(None) => return Ok(()),
            Ok(Some(actual)) => SyncError::Integrity {
                subject,
                expected: record.hash.clone(),
                actual,
            },
            Err(e) => e,
        };

        // Never leave an unverified object under its canonical name.
        if let Err(e) = storage::remove_if_exists(path) {
            tracing::warn!(path = %path.display(), "could not remove unverified object: {}", e);
        }
        Err(mismatch)
    }
}
