//! Console observer for sync runs.

use assetsync_core::manifest::AssetRecord;
use assetsync_core::sync::SyncObserver;

/// Prints one line per download and remembers whether anything was fetched.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    fetched_any: bool,
    downloads: usize,
}

impl ConsoleObserver {
    /// True once the index or any object had to be downloaded.
    pub fn fetched_any(&self) -> bool {
        self.fetched_any
    }

    pub fn downloads(&self) -> usize {
        self.downloads
    }
}

impl SyncObserver for ConsoleObserver {
    fn first_fetch(&mut self) {
        self.fetched_any = true;
        println!("setting up assets, this may take a while");
    }

    fn index_fetch_started(&mut self, id: &str) {
        self.fetched_any = true;
        println!("downloading asset index {}", id);
    }

    fn asset_started(&mut self, name: &str, record: &AssetRecord) {
        println!("  {} ({} bytes)", name, record.size);
    }

    fn asset_verified(&mut self, _name: &str, _record: &AssetRecord) {
        self.downloads += 1;
    }
}
