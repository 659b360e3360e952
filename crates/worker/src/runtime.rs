//! The serve loop: host events in, reply frames out.
//!
//! Reads line-delimited events from the host, spawns one task per fetch
//! event, and funnels replies through a single writer task so concurrent
//! completions never interleave on the output stream. Runs until the host
//! closes the input.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use strata_client::parse_request_url;
use strata_core::{Request, RequestMode};

use crate::protocol::{self, HostEvent, WorkerReply};
use crate::worker::OfflineWorker;

/// Serve fetch events until the input stream closes.
///
/// Install and activate must have completed before this is called; the
/// `ready` frame tells the host the worker is serving.
pub async fn serve<R, W>(worker: Arc<OfflineWorker>, input: R, output: W) -> Result<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<WorkerReply>(64);

    let writer = tokio::spawn(async move {
        let mut output = output;
        while let Some(reply) = rx.recv().await {
            let line = match serde_json::to_string(&reply) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize reply frame");
                    continue;
                }
            };
            if output.write_all(line.as_bytes()).await.is_err() || output.write_all(b"\n").await.is_err() {
                break;
            }
            let _ = output.flush().await;
        }
    });

    tx.send(WorkerReply::Ready { generation: worker.generation().to_string() })
        .await?;

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match protocol::parse_event(line) {
            Ok(HostEvent::Fetch { id, method, url, mode }) => {
                let worker = Arc::clone(&worker);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reply = handle_fetch_event(&worker, id, &method, &url, mode.as_deref()).await;
                    let _ = tx.send(reply).await;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed host frame");
            }
        }
    }

    // Input closed: let in-flight replies drain, then stop the writer.
    drop(tx);
    let _ = writer.await;

    tracing::info!("host closed input, worker shutting down");
    Ok(())
}

async fn handle_fetch_event(worker: &OfflineWorker, id: u64, method: &str, url: &str, mode: Option<&str>) -> WorkerReply {
    let url = match parse_request_url(url) {
        Ok(url) => url,
        Err(e) => return WorkerReply::Error { id, message: strata_core::Error::from(e).to_string() },
    };

    let request = Request::new(method, url, RequestMode::from_host(mode));

    match worker.on_fetch(&request).await {
        Ok(decision) => WorkerReply::from_decision(id, decision),
        Err(e) => WorkerReply::Error { id, message: e.to_string() },
    }
}
