//! Tile download primitive.
//!
//! [`TileFetcher`] is the boundary the download worker drives: fetch one
//! URL synchronously into a destination file, or fail leaving no partial
//! file behind. The trait exists for dependency injection; tests substitute
//! scripted fetchers for the real HTTP client.

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Errors that can occur while fetching a tile.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// Request failed in transport (DNS, connect, timeout, body read)
    #[error("request failed: {0}")]
    Request(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Writing the body to the destination file failed
    #[error("fetch I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for the synchronous tile download primitive.
///
/// On success the full response body has been written to `dest`. On failure
/// any partial file at `dest` has been deleted. Implementations must be
/// thread-safe (`Send + Sync`); the download worker calls them from a
/// background thread.
pub trait TileFetcher: Send + Sync {
    /// Fetch `url` and write the complete body to `dest`.
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Default User-Agent string for tile requests.
/// Some tile servers reject requests without a browser-like User-Agent.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Real fetcher over a blocking reqwest client.
///
/// Follows redirects and transparently decompresses gzip bodies, matching
/// what tile servers commonly negotiate.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default 30 second timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(30)
    }

    /// Creates a fetcher with a custom request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    fn fetch_inner(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        trace!(url = url, "tile download starting");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        fs::write(dest, &body)?;

        debug!(url = url, bytes = body.len(), "tile downloaded");
        Ok(())
    }
}

impl TileFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        match self.fetch_inner(url, dest) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(url = url, error = %e, "tile download failed");
                // Never leave a partial body behind
                if dest.exists() {
                    let _ = fs::remove_file(dest);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fetcher_construction() {
        assert!(HttpFetcher::new().is_ok());
        assert!(HttpFetcher::with_timeout(5).is_ok());
    }

    #[test]
    fn test_invalid_url_fails_without_leaving_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("tile.png");

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("not-a-url", &dest);

        assert!(result.is_err());
        assert!(!dest.exists(), "No partial file may survive a failure");
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::Status {
            status: 404,
            url: "http://example.com/t.png".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://example.com/t.png");
    }
}
