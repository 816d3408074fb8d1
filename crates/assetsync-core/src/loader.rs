//! Asset index loader.
//!
//! A cached index whose size matches the descriptor is parsed as-is.
//! Otherwise the index is downloaded into the cache and its digest checked
//! against the descriptor before it is parsed.

use crate::checksum::{self, HashAlgorithm};
use crate::error::SyncError;
use crate::fetch::Fetcher;
use crate::layout::StoreLayout;
use crate::manifest::{IndexDescriptor, Manifest};
use crate::storage;
use crate::sync::SyncObserver;
use std::path::Path;

/// How the loader obtained the index document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// Cached copy with the expected size; not re-hashed.
    Cached,
    /// Downloaded and verified this run.
    Fetched,
}

pub struct ManifestLoader<'a> {
    layout: &'a StoreLayout,
    fetcher: &'a dyn Fetcher,
    algorithm: HashAlgorithm,
}

impl<'a> ManifestLoader<'a> {
    pub fn new(layout: &'a StoreLayout, fetcher: &'a dyn Fetcher, algorithm: HashAlgorithm) -> Self {
        Self {
            layout,
            fetcher,
            algorithm,
        }
    }

    /// Load the index named by `descriptor`, downloading it if the cached
    /// copy is missing or has the wrong size.
    pub fn load(
        &self,
        descriptor: &IndexDescriptor,
        observer: &mut dyn SyncObserver,
    ) -> Result<(Manifest, IndexSource), SyncError> {
        let path = self.layout.index_path(&descriptor.id)?;

        let source = match storage::file_len(&path) {
            Some(len) if len == descriptor.size => {
                tracing::debug!(id = %descriptor.id, "cached asset index has expected size, skipping download");
                IndexSource::Cached
            }
            existing => {
                if let Some(len) = existing {
                    tracing::debug!(
                        id = %descriptor.id,
                        "cached asset index has size {}, expected {}",
                        len,
                        descriptor.size
                    );
                }
                observer.index_fetch_started(&descriptor.id);
                self.fetch_verified(descriptor, &path)?;
                IndexSource::Fetched
            }
        };

        let manifest = Manifest::read(descriptor, &path, self.algorithm)?;
        tracing::debug!(id = %descriptor.id, assets = manifest.len(), ?source, "asset index loaded");
        Ok((manifest, source))
    }

    fn fetch_verified(&self, descriptor: &IndexDescriptor, path: &Path) -> Result<(), SyncError> {
        let dir = self.layout.indexes_dir();
        storage::ensure_dir(&dir).map_err(|e| SyncError::io("create directory", &dir, e))?;

        let subject = format!("asset index {}", descriptor.id);
        tracing::info!(id = %descriptor.id, url = %descriptor.url, "downloading asset index");
        self.fetcher
            .fetch(&descriptor.url, path)
            .map_err(|e| {
                SyncError::from_fetch(&subject, &descriptor.url, path, &descriptor.hash, e)
            })?;

        let failure = match checksum::verify_path(path, &descriptor.hash, self.algorithm) {
            Ok(None) => return Ok(()),
            Ok(Some(actual)) => SyncError::Integrity {
                subject,
                expected: descriptor.hash.clone(),
                actual,
            },
            Err(e) => e,
        };

        // An unverified index left in the cache would pass the next size check.
        if let Err(e) = storage::remove_if_exists(path) {
            tracing::warn!(path = %path.display(), "could not remove unverified index: {}", e);
        }
        Err(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sync::test_support::{sha1_hex, MockFetcher, RecordingObserver};

    const INDEX: &[u8] =
        br#"{"objects": {"a.txt": {"hash": "f572d396fae9206628714fb2ce00f72e94f2258f", "size": 6}}}"#;
    const URL: &str = "http://meta.test/indexes/7.json";

    fn descriptor() -> IndexDescriptor {
        IndexDescriptor {
            id: "7".to_string(),
            url: URL.to_string(),
            size: INDEX.len() as u64,
            hash: sha1_hex(INDEX),
        }
    }

    #[test]
    fn fetches_verifies_and_caches_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        let fetcher = MockFetcher::new().serve(URL, INDEX);
        let mut observer = RecordingObserver::default();

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let (manifest, source) = loader.load(&descriptor(), &mut observer).unwrap();

        assert_eq!(source, IndexSource::Fetched);
        assert_eq!(manifest.id(), "7");
        assert_eq!(manifest.len(), 1);
        assert_eq!(fetcher.calls(), vec![URL.to_string()]);
        assert_eq!(observer.index_fetches, vec!["7".to_string()]);
        assert_eq!(std::fs::read(layout.index_path("7").unwrap()).unwrap(), INDEX);
    }

    #[test]
    fn cached_index_with_matching_size_is_not_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        std::fs::create_dir_all(layout.indexes_dir()).unwrap();
        std::fs::write(layout.index_path("7").unwrap(), INDEX).unwrap();
        let fetcher = MockFetcher::new();
        let mut observer = RecordingObserver::default();

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let (manifest, source) = loader.load(&descriptor(), &mut observer).unwrap();

        assert_eq!(source, IndexSource::Cached);
        assert_eq!(manifest.len(), 1);
        assert!(fetcher.calls().is_empty());
        assert!(observer.index_fetches.is_empty());
    }

    #[test]
    fn cached_index_with_wrong_size_is_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        std::fs::create_dir_all(layout.indexes_dir()).unwrap();
        std::fs::write(layout.index_path("7").unwrap(), b"{}").unwrap();
        let fetcher = MockFetcher::new().serve(URL, INDEX);

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let (_, source) = loader
            .load(&descriptor(), &mut RecordingObserver::default())
            .unwrap();

        assert_eq!(source, IndexSource::Fetched);
        assert_eq!(std::fs::read(layout.index_path("7").unwrap()).unwrap(), INDEX);
    }

    #[test]
    fn tampered_index_is_integrity_error_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        let tampered: &[u8] = br#"{"objects": {}}"#;
        let fetcher = MockFetcher::new().serve(URL, tampered);

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let err = loader
            .load(&descriptor(), &mut RecordingObserver::default())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Integrity);
        match err {
            SyncError::Integrity { expected, actual, .. } => {
                assert_eq!(expected, sha1_hex(INDEX));
                assert_eq!(actual, sha1_hex(tampered));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!layout.index_path("7").unwrap().exists());
    }

    #[test]
    fn transport_failure_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        let fetcher = MockFetcher::new();

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let err = loader
            .load(&descriptor(), &mut RecordingObserver::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("asset index 7"));
    }

    #[test]
    fn unusable_index_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        std::fs::write(layout.indexes_dir(), b"file in the way").unwrap();
        let fetcher = MockFetcher::new().serve(URL, INDEX);

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let err = loader
            .load(&descriptor(), &mut RecordingObserver::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn verified_but_malformed_index_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        let body: &[u8] = b"not json";
        let fetcher = MockFetcher::new().serve(URL, body);
        let descriptor = IndexDescriptor {
            size: body.len() as u64,
            hash: sha1_hex(body),
            ..descriptor()
        };

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let err = loader
            .load(&descriptor, &mut RecordingObserver::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    /// Leaves a dangling symlink where the index should be, so the
    /// fetch succeeds but hashing the result fails.
    #[cfg(unix)]
    struct DanglingLinkFetcher;

    #[cfg(unix)]
    impl Fetcher for DanglingLinkFetcher {
        fn fetch(&self, _url: &str, dest: &Path) -> Result<(), crate::fetch::FetchError> {
            std::os::unix::fs::symlink(dest.with_extension("missing"), dest)
                .map_err(crate::fetch::FetchError::Storage)
        }
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_fetched_index_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        let fetcher = DanglingLinkFetcher;

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let err = loader
            .load(&descriptor(), &mut RecordingObserver::default())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        let path = layout.index_path("7").unwrap();
        assert!(std::fs::symlink_metadata(&path).is_err());
    }

    #[test]
    fn index_id_with_path_components_is_rejected_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path().join("store"));
        let fetcher = MockFetcher::new().serve(URL, INDEX);
        let descriptor = IndexDescriptor {
            id: "../../escape".to_string(),
            ..descriptor()
        };

        let loader = ManifestLoader::new(&layout, &fetcher, HashAlgorithm::Sha1);
        let err = loader
            .load(&descriptor, &mut RecordingObserver::default())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(fetcher.calls().is_empty());
        assert!(!dir.path().join("escape.json").exists());
    }
}
