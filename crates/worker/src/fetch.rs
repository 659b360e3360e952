//! Fetch interception policy.
//!
//! Ordered decision for every request the host asks the worker to fulfill:
//!
//! 1. non-GET → pass through untouched
//! 2. manifest path → serve the precached entry
//! 3. anything else (or a defensive miss) → forward to the network
//! 4. network failure on a navigation → serve the cached root document
//!
//! Interception never writes to the cache; dynamic responses are not
//! captured, so the cache cannot grow or go stale outside install.

use strata_client::resolve_asset;
use strata_core::{Error, Request};

use crate::worker::{FetchDecision, OfflineWorker, ServeSource, ServedResponse};

/// The path served as an offline substitute for failed navigations. The
/// application routes client-side from its root document.
const ROOT_PATH: &str = "/";

pub(crate) async fn intercept(worker: &OfflineWorker, request: &Request) -> Result<FetchDecision, Error> {
    if !request.is_get() {
        tracing::trace!(method = %request.method, url = %request.url, "non-GET pass-through");
        return Ok(FetchDecision::PassThrough);
    }

    // Precached, versioned asset: serve from the current generation.
    if worker.manifest.contains(request.url.path()) {
        if let Some(entry) = worker
            .cache
            .match_entry(&worker.generation, &request.method, request.url.as_str())
            .await?
        {
            tracing::trace!(path = request.url.path(), "serving precached asset");
            return Ok(FetchDecision::Respond(ServedResponse::from_entry(entry, ServeSource::Cache)));
        }

        // Install stores every manifest path, so this indicates a degraded
        // generation. Recover via the network rather than failing the
        // request.
        tracing::warn!(
            path = request.url.path(),
            generation = %worker.generation,
            "manifest asset missing from cache, falling back to network"
        );
    }

    match worker.network.send(request).await {
        Ok(response) => Ok(FetchDecision::Respond(ServedResponse::from_network(&response))),
        Err(network_err) => {
            if request.is_navigation()
                && let Some(entry) = match_root(worker).await
            {
                tracing::debug!(url = %request.url, "offline navigation, serving cached root");
                return Ok(FetchDecision::Respond(ServedResponse::from_entry(entry, ServeSource::Fallback)));
            }
            // Subresource, or the root was never cached: the caller
            // observes the original network failure.
            Err(network_err)
        }
    }
}

/// Look up the cached root document. Lookup failures are logged and count
/// as a miss; the network error stays the terminal error for the caller.
async fn match_root(worker: &OfflineWorker) -> Option<strata_core::CacheEntry> {
    let root = resolve_asset(&worker.origin, ROOT_PATH).ok()?;
    match worker.cache.match_entry(&worker.generation, "GET", root.as_str()).await {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(error = %e, "root fallback lookup failed");
            None
        }
    }
}
