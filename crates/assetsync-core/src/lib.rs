pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod fetch;
pub mod launch;
pub mod layout;
pub mod loader;
pub mod manifest;
pub mod storage;
pub mod sync;
pub mod verify;

pub use checksum::HashAlgorithm;
pub use error::{ErrorKind, SyncError};
pub use fetch::{CurlFetcher, CurlOptions, FetchError, Fetcher};
pub use layout::StoreLayout;
pub use loader::{IndexSource, ManifestLoader};
pub use manifest::{AssetRecord, IndexDescriptor, Manifest};
pub use sync::{AssetSynchronizer, NoopObserver, SyncObserver, SyncReport, TrustPolicy};
