//! strata worker entry point.
//!
//! Boots the offline worker: install populates the current cache
//! generation, activate sweeps stale ones, then fetch events are served
//! over the stdio bridge for the rest of the process lifetime. Logging
//! goes to stderr to keep stdout a clean protocol channel.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use strata_client::{FetchClient, FetchConfig, parse_origin};
use strata_core::{AppConfig, AssetManifest, CacheDb};

mod fetch;
mod lifecycle;
mod protocol;
mod runtime;
mod worker;

use worker::OfflineWorker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let version = config.require_version()?.to_string();
    let origin = parse_origin(config.require_origin()?)?;
    let manifest = AssetManifest::load(&config.manifest_path)?;

    tracing::info!(version, origin = %origin, assets = manifest.len(), "starting strata worker");

    let cache = CacheDb::open(&config.db_path).await?;
    let network = FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..FetchConfig::default()
    })?;

    let worker = OfflineWorker::new(cache, Arc::new(network), manifest, &version, origin);

    // Install failure is fatal for this deployment attempt: exit non-zero
    // so the deployment system observes it and can retry.
    let installed = worker.on_install().await?;
    tracing::info!(generation = %installed.generation, entries = installed.entries, "install complete");

    let cleanup = worker.on_activate().await?;
    tracing::info!(deleted = cleanup.deleted, failed = cleanup.failed, "activated");

    runtime::serve(Arc::new(worker), tokio::io::stdin(), tokio::io::stdout()).await?;

    Ok(())
}
