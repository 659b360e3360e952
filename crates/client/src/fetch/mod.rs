//! HTTP fetch pipeline.
//!
//! Everything the worker pulls over the network goes through [`Network`],
//! a narrow seam over the HTTP client:
//!
//! - install fetches every manifest asset through it, and
//! - the interceptor forwards cache misses through it.
//!
//! [`Network::send`] fails only on transport problems (refused connection,
//! timeout, DNS, oversized body). HTTP statuses are returned verbatim so the
//! interceptor can hand a 404 back to the caller unmodified, while the
//! installer applies its own success check.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, StatusCode, header};
use std::time::{Duration, Instant};

use strata_core::{Error, Request};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "strata/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "strata/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Response headers as name/value string pairs, in wire order.
    ///
    /// Values that are not valid UTF-8 are skipped; the stored snapshot is
    /// for replay to the hosting environment, which speaks strings.
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect()
    }
}

/// The network seam the worker fetches through.
///
/// Implemented by [`FetchClient`] for real traffic and by stub
/// implementations in tests, which is how offline scenarios are exercised
/// without a network.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request, returning the response whatever its status.
    ///
    /// # Errors
    ///
    /// Fails only on transport-level problems; an HTTP error status is a
    /// successful send.
    async fn send(&self, request: &Request) -> Result<FetchResponse, Error>;
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn send(&self, request: &Request) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::Network(format!("invalid method: {}", request.method)))?;

        let response = self
            .http
            .request(method, request.url.as_str())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(url = %request.url, %status, fetch_ms, bytes = bytes.len(), "fetched");

        Ok(FetchResponse { status, content_type, bytes, headers, fetch_ms })
    }
}
