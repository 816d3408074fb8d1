//! Error type shared by the loader, the synchronizer and the store audit.
//!
//! Every failure aborts the current pass; nothing here is retried. Variants
//! carry enough context (asset or manifest name, URL, digests, underlying
//! cause) to diagnose a failed run from the message alone.

use crate::fetch::FetchError;
use std::io;
use std::path::{Path, PathBuf};

/// Coarse classification of a [`SyncError`], used by callers that react to
/// the category rather than the details (exit codes, tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Transport,
    Integrity,
    Format,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Filesystem create/read/write/delete failure.
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Network fetch failure, including non-success responses.
    #[error("failed to download {subject} from {url}")]
    Transport {
        subject: String,
        url: String,
        #[source]
        source: FetchError,
    },

    /// Hash mismatch after a fresh fetch.
    #[error("failed to verify {subject}: expected {expected}, got {actual}")]
    Integrity {
        subject: String,
        expected: String,
        actual: String,
    },

    /// Manifest content does not have the expected shape.
    #[error("malformed asset index {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Io { .. } => ErrorKind::Io,
            SyncError::Transport { .. } => ErrorKind::Transport,
            SyncError::Integrity { .. } => ErrorKind::Integrity,
            SyncError::Format { .. } => ErrorKind::Format,
        }
    }

    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        SyncError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Maps a fetch failure: local write problems stay `Io`, a truncated body
    /// fails verification against `expected`, everything else is a transport
    /// failure for `subject`.
    pub(crate) fn from_fetch(
        subject: &str,
        url: &str,
        dest: &Path,
        expected: &str,
        err: FetchError,
    ) -> Self {
        match err {
            FetchError::Storage(source) => SyncError::io("write", dest, source),
            truncated @ FetchError::PartialTransfer { .. } => SyncError::Integrity {
                subject: subject.to_string(),
                expected: expected.to_string(),
                actual: truncated.to_string(),
            },
            other => SyncError::Transport {
                subject: subject.to_string(),
                url: url.to_string(),
                source: other,
            },
        }
    }
}
