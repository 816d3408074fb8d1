//! Object fetcher: single-stream GET of a remote resource into a local path.
//!
//! The body is streamed into `<dest>.part` and renamed over `dest` when the
//! transfer completes. On failure the temp file is removed and `dest` is left
//! as it was. A body cut short of its announced length is reported as
//! [`FetchError::PartialTransfer`].

mod error;

pub use error::FetchError;

use crate::storage::{self, StorageWriter};
use std::io;
use std::path::Path;
use std::time::Duration;

/// Retrieves `url` into `dest`, fully replacing prior content.
///
/// Blocking; runs on the caller's thread.
pub trait Fetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Transfer tuning. Every field defaults to the libcurl default.
#[derive(Debug, Clone, Default)]
pub struct CurlOptions {
    pub connect_timeout: Option<Duration>,
    /// Abort when throughput stays below `limit` bytes/s for the given duration.
    pub low_speed: Option<(u32, Duration)>,
    pub user_agent: Option<String>,
}

/// [`Fetcher`] backed by the libcurl easy interface.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    options: CurlOptions,
}

impl CurlFetcher {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }

    fn transfer(&self, url: &str, writer: &mut StorageWriter) -> Result<(), FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        if let Some(timeout) = self.options.connect_timeout {
            easy.connect_timeout(timeout)?;
        }
        if let Some((limit, time)) = self.options.low_speed {
            easy.low_speed_limit(limit)?;
            easy.low_speed_time(time)?;
        }
        let agent = self
            .options
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent);
        easy.useragent(&agent)?;

        let mut storage_error: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match writer.append(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    storage_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = storage_error {
            return Err(FetchError::Storage(e));
        }
        if let Err(e) = performed {
            if e.is_partial_file() {
                let announced = easy.content_length_download().unwrap_or(-1.0);
                return Err(FetchError::PartialTransfer {
                    expected: (announced >= 0.0).then_some(announced as u64),
                    received: writer.written(),
                });
            }
            return Err(e.into());
        }

        // file:// and other non-HTTP schemes report 0.
        let code = easy.response_code()?;
        if code != 0 && !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(())
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let tp = storage::temp_path(dest);
        let mut writer = StorageWriter::create(&tp).map_err(FetchError::Storage)?;

        if let Err(e) = self.transfer(url, &mut writer) {
            tracing::debug!(url, "fetch failed: {}", e);
            writer.discard();
            return Err(e);
        }
        if let Err(e) = writer.sync() {
            writer.discard();
            return Err(FetchError::Storage(e));
        }
        let received = writer.written();
        if let Err(e) = writer.finalize(dest) {
            let _ = storage::remove_if_exists(&tp);
            return Err(FetchError::Storage(e));
        }
        tracing::debug!(url, dest = %dest.display(), bytes = received, "fetched");
        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("assetsync/{}", env!("CARGO_PKG_VERSION"))
}
