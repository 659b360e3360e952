//! Install and activate: the cache generation lifecycle.
//!
//! Install populates the current generation from the asset manifest;
//! activate garbage-collects every other generation. The runtime awaits
//! both to completion before any fetch event is handled, so serving code
//! only ever observes a fully built generation.

use strata_client::resolve_asset;
use strata_core::{CacheEntry, Error, Request};

use crate::worker::OfflineWorker;

/// Outcome of a completed install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub generation: String,
    pub entries: usize,
}

/// Outcome of a completed activation.
#[derive(Debug, Clone)]
pub struct ActivateReport {
    pub deleted: usize,
    pub failed: usize,
}

/// Open the current generation and fetch every manifest path into it.
///
/// Each asset is fetched fresh from the network and upserted under its
/// request identity, so re-running install for the same version simply
/// overwrites the entries. Any fetch failure or non-2xx status fails the
/// install as a whole: a generation missing even one asset is never
/// considered valid.
pub(crate) async fn install(worker: &OfflineWorker) -> Result<InstallReport, Error> {
    worker.cache.open_generation(&worker.generation).await?;

    for path in worker.manifest.paths() {
        let url = resolve_asset(&worker.origin, path).map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;
        let request = Request::get(url.clone());

        let response = worker
            .network
            .send(&request)
            .await
            .map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;

        if !response.status.is_success() {
            return Err(Error::InstallFailed(format!("{path}: status {}", response.status)));
        }

        let headers_json = serde_json::to_string(&response.header_pairs()).ok();
        let entry = CacheEntry::new(
            "GET",
            url.as_str(),
            path,
            response.status.as_u16(),
            response.content_type.clone(),
            headers_json,
            response.bytes.to_vec(),
        );
        worker.cache.put_entry(&worker.generation, &entry).await?;

        tracing::debug!(path, bytes = entry.body.len(), "precached asset");
    }

    Ok(InstallReport { generation: worker.generation.clone(), entries: worker.manifest.len() })
}

/// Delete every cache generation whose name is not the current one.
///
/// Cleanup is best-effort per generation: a failed deletion is logged and
/// counted but never aborts deletion of the others, and never fails the
/// activation. A surviving stale generation is only ever dead weight; no
/// reads are directed at it.
pub(crate) async fn activate(worker: &OfflineWorker) -> Result<ActivateReport, Error> {
    let mut report = ActivateReport { deleted: 0, failed: 0 };

    for name in worker.cache.list_generations().await? {
        if name == worker.generation {
            continue;
        }
        match worker.cache.delete_generation(&name).await {
            Ok(true) => {
                report.deleted += 1;
                tracing::debug!(generation = %name, "deleted stale generation");
            }
            Ok(false) => {}
            Err(e) => {
                report.failed += 1;
                tracing::warn!(generation = %name, error = %e, "failed to delete stale generation");
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::stub_worker;

    #[tokio::test]
    async fn test_install_populates_generation() {
        let (worker, network) = stub_worker(
            &["/", "/app.js"],
            "v1",
            &[
                ("https://app.test/", 200, b"<html>home</html>"),
                ("https://app.test/app.js", 200, b"console.log(1)"),
            ],
        )
        .await;

        let report = worker.on_install().await.unwrap();
        assert_eq!(report.generation, "cache-v1");
        assert_eq!(report.entries, 2);
        assert_eq!(network.calls(), 2);

        let hit = worker
            .cache
            .match_entry("cache-v1", "GET", "https://app.test/app.js")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.body, b"console.log(1)");
        assert_eq!(hit.path, "/app.js");
    }

    #[tokio::test]
    async fn test_install_fails_whole_on_fetch_error() {
        let (worker, network) = stub_worker(&["/app.js"], "v1", &[]).await;
        network.set_offline(true);

        let result = worker.on_install().await;
        assert!(matches!(result, Err(Error::InstallFailed(_))));
    }

    #[tokio::test]
    async fn test_install_fails_whole_on_http_error() {
        // Second asset 404s: the whole install fails even though the first
        // asset stored fine.
        let (worker, _network) = stub_worker(
            &["/app.js", "/missing.css"],
            "v1",
            &[("https://app.test/app.js", 200, b"ok")],
        )
        .await;

        let result = worker.on_install().await;
        assert!(matches!(result, Err(Error::InstallFailed(msg)) if msg.contains("/missing.css")));
    }

    #[tokio::test]
    async fn test_install_idempotent() {
        let (worker, _network) =
            stub_worker(&["/app.js"], "v1", &[("https://app.test/app.js", 200, b"fresh")]).await;

        worker.on_install().await.unwrap();
        worker.on_install().await.unwrap();

        assert_eq!(worker.cache.entry_count("cache-v1").await.unwrap(), 1);
        let hit = worker
            .cache
            .match_entry("cache-v1", "GET", "https://app.test/app.js")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.body, b"fresh");
    }

    #[tokio::test]
    async fn test_activate_with_no_stale_generations() {
        let (worker, _network) =
            stub_worker(&["/app.js"], "v1", &[("https://app.test/app.js", 200, b"a")]).await;

        worker.on_install().await.unwrap();
        let report = worker.on_activate().await.unwrap();

        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(worker.cache.list_generations().await.unwrap(), vec!["cache-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_sweeps_stale_generations() {
        let (worker, _network) =
            stub_worker(&["/app.js"], "v2", &[("https://app.test/app.js", 200, b"b")]).await;

        // A previous deployment left its generation behind.
        worker.cache.open_generation("cache-v1").await.unwrap();

        worker.on_install().await.unwrap();
        let report = worker.on_activate().await.unwrap();

        assert_eq!(report.deleted, 1);
        assert_eq!(worker.cache.list_generations().await.unwrap(), vec!["cache-v2".to_string()]);
    }
}
