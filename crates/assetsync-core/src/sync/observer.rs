//! Notification hooks for a sync run.

use crate::manifest::AssetRecord;

/// Receives progress notifications from the loader and synchronizer.
///
/// Hooks never influence control flow. All methods default to no-ops.
pub trait SyncObserver {
    /// Called at most once per run, immediately before the first network
    /// fetch. A run that never calls this was served entirely from the store.
    fn first_fetch(&mut self) {}

    /// The cached index for `id` is missing or stale and is about to be downloaded.
    fn index_fetch_started(&mut self, _id: &str) {}

    /// `name` is missing or invalid locally and is about to be downloaded.
    fn asset_started(&mut self, _name: &str, _record: &AssetRecord) {}

    /// `name` was downloaded and its digest verified.
    fn asset_verified(&mut self, _name: &str, _record: &AssetRecord) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
