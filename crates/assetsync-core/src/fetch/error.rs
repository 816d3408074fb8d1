//! Fetch error type.

use std::fmt;

/// Error returned by a single fetch (curl failure, HTTP error, short body or local write failure).
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (DNS, connection, TLS, timeout, bad URL, ...).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Body ended before the announced `Content-Length` (curl error 18).
    /// `expected` is `None` when no length was announced.
    PartialTransfer {
        expected: Option<u64>,
        received: u64,
    },
    /// Disk write of the downloaded body failed (disk full, permission denied).
    Storage(std::io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(_) => f.write_str("curl transfer failed"),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::PartialTransfer {
                expected: Some(expected),
                received,
            } => write!(f, "truncated: got {} of {} bytes", received, expected),
            FetchError::PartialTransfer {
                expected: None,
                received,
            } => write!(f, "truncated after {} bytes", received),
            FetchError::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Storage(e) => Some(e),
            FetchError::Http(_) | FetchError::PartialTransfer { .. } => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}
