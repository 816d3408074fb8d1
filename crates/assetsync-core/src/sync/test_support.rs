//! In-memory fetcher and recording observer for unit tests.

use crate::fetch::{FetchError, Fetcher};
use crate::manifest::AssetRecord;
use crate::sync::SyncObserver;
use sha2::Digest;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

pub(crate) fn sha1_hex(data: &[u8]) -> String {
    hex::encode(sha1::Sha1::digest(data))
}

/// Serves fixed bodies by URL; unknown URLs answer HTTP 404.
#[derive(Default)]
pub(crate) struct MockFetcher {
    bodies: HashMap<String, Vec<u8>>,
    calls: RefCell<Vec<String>>,
}

impl MockFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serve(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        match self.bodies.get(url) {
            Some(body) => std::fs::write(dest, body).map_err(FetchError::Storage),
            None => Err(FetchError::Http(404)),
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub(crate) first_fetches: usize,
    pub(crate) index_fetches: Vec<String>,
    pub(crate) started: Vec<String>,
    pub(crate) verified: Vec<String>,
}

impl SyncObserver for RecordingObserver {
    fn first_fetch(&mut self) {
        self.first_fetches += 1;
    }

    fn index_fetch_started(&mut self, id: &str) {
        self.index_fetches.push(id.to_string());
    }

    fn asset_started(&mut self, name: &str, _record: &AssetRecord) {
        self.started.push(name.to_string());
    }

    fn asset_verified(&mut self, name: &str, _record: &AssetRecord) {
        self.verified.push(name.to_string());
    }
}
