//! The interception request model.
//!
//! A request is identified by method + URL; the navigation mode only
//! influences fallback policy, never identity.

use url::Url;

/// Whether a request loads a new top-level document or a subresource.
///
/// Only navigations are eligible for the cached-root offline fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Subresource,
}

impl RequestMode {
    /// Map the hosting environment's mode string. Anything that is not a
    /// navigation ("navigate") counts as a subresource fetch.
    pub fn from_host(mode: Option<&str>) -> Self {
        match mode {
            Some("navigate") => RequestMode::Navigate,
            _ => RequestMode::Subresource,
        }
    }
}

/// An outbound request the worker has been asked to fulfill.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    pub fn new(method: &str, url: Url, mode: RequestMode) -> Self {
        Self { method: method.to_ascii_uppercase(), url, mode }
    }

    /// A plain GET subresource request, as issued during install.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url, RequestMode::Subresource)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}
