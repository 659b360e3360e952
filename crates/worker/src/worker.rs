//! The offline worker: shared state and event entry points.
//!
//! One `OfflineWorker` is built per process. The hosting runtime drives it
//! through three events, in order: install (populate the current cache
//! generation), activate (sweep stale generations), then any number of
//! concurrent fetch events for the rest of the process lifetime.

use std::sync::Arc;

use strata_client::{FetchResponse, Network};
use strata_core::{AssetManifest, CacheDb, CacheEntry, Request, generation_name};
use url::Url;

use crate::fetch;
use crate::lifecycle::{self, ActivateReport, InstallReport};

/// Worker state shared by the lifecycle handlers and the interceptor.
pub struct OfflineWorker {
    pub(crate) cache: CacheDb,
    pub(crate) network: Arc<dyn Network>,
    pub(crate) manifest: AssetManifest,
    /// Name of the current cache generation, derived from the deployment
    /// version. Never mutated; a new deployment is a new process.
    pub(crate) generation: String,
    pub(crate) origin: Url,
}

impl OfflineWorker {
    pub fn new(cache: CacheDb, network: Arc<dyn Network>, manifest: AssetManifest, version: &str, origin: Url) -> Self {
        Self { cache, network, manifest, generation: generation_name(version), origin }
    }

    /// The current generation name.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Install: open the current generation and precache every manifest
    /// asset into it. Fails as a whole if any asset fails.
    pub async fn on_install(&self) -> Result<InstallReport, strata_core::Error> {
        lifecycle::install(self).await
    }

    /// Activate: delete every generation other than the current one.
    pub async fn on_activate(&self) -> Result<ActivateReport, strata_core::Error> {
        lifecycle::activate(self).await
    }

    /// Fetch: decide a response for one intercepted request.
    pub async fn on_fetch(&self, request: &Request) -> Result<FetchDecision, strata_core::Error> {
        fetch::intercept(self, request).await
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
    /// Precached manifest asset.
    Cache,
    /// Forwarded network response.
    Network,
    /// Cached root document served for an offline navigation.
    Fallback,
}

impl ServeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ServeSource::Cache => "cache",
            ServeSource::Network => "network",
            ServeSource::Fallback => "fallback",
        }
    }
}

/// A response the worker decided on, ready to hand to the host.
#[derive(Debug, Clone)]
pub struct ServedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub source: ServeSource,
}

impl ServedResponse {
    pub(crate) fn from_entry(entry: CacheEntry, source: ServeSource) -> Self {
        let headers = entry
            .headers_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default();
        Self { status: entry.status, content_type: entry.content_type, headers, body: entry.body, source }
    }

    pub(crate) fn from_network(response: &FetchResponse) -> Self {
        Self {
            status: response.status.as_u16(),
            content_type: response.content_type.clone(),
            headers: response.header_pairs(),
            body: response.bytes.to_vec(),
            source: ServeSource::Network,
        }
    }
}

/// Outcome of one fetch event.
#[derive(Debug, Clone)]
pub enum FetchDecision {
    /// The worker decided the response.
    Respond(ServedResponse),
    /// Not intercepted; the host performs its own direct network call.
    PassThrough,
}
