//! Bounded HTTP GET used by the polling watchers.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{FetchError, WatchError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    /// Connect (TCP + TLS) timeout, and separately the wait for response
    /// headers.
    pub timeout: Duration,
    /// Body bytes kept; the rest is dropped without error.
    pub max_body_bytes: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
    limits: FetchLimits,
}

impl HttpFetcher {
    pub fn new(limits: FetchLimits) -> Result<Self, FetchError> {
        Self::build(limits, false)
    }

    /// Like [`HttpFetcher::new`], but ignores proxy environment variables.
    pub fn without_proxy(limits: FetchLimits) -> Result<Self, FetchError> {
        Self::build(limits, true)
    }

    fn build(limits: FetchLimits, direct: bool) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(limits.timeout)
            .user_agent(concat!("notbot/", env!("CARGO_PKG_VERSION")));
        if direct {
            builder = builder.no_proxy();
        }
        Ok(Self {
            http: builder.build()?,
            limits,
        })
    }

    pub fn limits(&self) -> FetchLimits {
        self.limits
    }

    /// GET `url` and return at most `max_body_bytes` of the body.
    ///
    /// The status code is not checked; decoding is the caller's job.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let timeout = self.limits.timeout;
        let mut response = tokio::time::timeout(timeout, self.http.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;

        debug!(url = %url, status = %response.status(), "fetched");

        let cap = self.limits.max_body_bytes;
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = cap - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                if chunk.len() > room {
                    debug!(url = %url, cap, "response body truncated");
                }
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    /// Fetch and deserialize a JSON document.
    pub async fn fetch_json<D: DeserializeOwned>(&self, url: &str) -> Result<D, WatchError> {
        let body = self.fetch(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
