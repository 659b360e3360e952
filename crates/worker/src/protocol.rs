//! Line-delimited JSON frames between the hosting runtime and the worker.
//!
//! The host writes one event per line on the worker's stdin and reads one
//! reply per event on stdout, correlated by `id`. Replies may arrive out of
//! order; each fetch event is handled concurrently. Logging goes to stderr
//! so stdout stays a clean protocol channel.

use serde::{Deserialize, Serialize};

use crate::worker::{FetchDecision, ServedResponse};

/// An event dispatched by the hosting runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// An outbound request the host asks the worker to fulfill.
    Fetch {
        id: u64,
        method: String,
        url: String,
        /// The host's navigation mode string; "navigate" marks a top-level
        /// document load, anything else is a subresource fetch.
        #[serde(default)]
        mode: Option<String>,
    },
}

/// A reply frame written to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerReply {
    /// Emitted once, after activation completes and before any fetch reply.
    Ready { generation: String },
    /// The worker decided the response.
    Response {
        id: u64,
        status: u16,
        content_type: Option<String>,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        source: String,
    },
    /// Not intercepted; the host performs its own direct network call.
    PassThrough { id: u64 },
    /// The request failed; the original failure propagates to the caller.
    Error { id: u64, message: String },
}

impl WorkerReply {
    pub fn from_decision(id: u64, decision: FetchDecision) -> Self {
        match decision {
            FetchDecision::Respond(response) => Self::from_response(id, response),
            FetchDecision::PassThrough => WorkerReply::PassThrough { id },
        }
    }

    fn from_response(id: u64, response: ServedResponse) -> Self {
        WorkerReply::Response {
            id,
            status: response.status,
            content_type: response.content_type,
            headers: response.headers,
            body: response.body,
            source: response.source.as_str().to_string(),
        }
    }
}

/// Parse one host frame from a line of input.
pub fn parse_event(line: &str) -> Result<HostEvent, serde_json::Error> {
    serde_json::from_str(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::ServeSource;

    #[test]
    fn test_parse_fetch_event() {
        let event = parse_event(r#"{"type":"fetch","id":7,"method":"GET","url":"https://app.test/","mode":"navigate"}"#)
            .unwrap();
        let HostEvent::Fetch { id, method, url, mode } = event;
        assert_eq!(id, 7);
        assert_eq!(method, "GET");
        assert_eq!(url, "https://app.test/");
        assert_eq!(mode.as_deref(), Some("navigate"));
    }

    #[test]
    fn test_parse_fetch_event_mode_optional() {
        let event = parse_event(r#"{"type":"fetch","id":1,"method":"POST","url":"https://app.test/api"}"#).unwrap();
        let HostEvent::Fetch { mode, .. } = event;
        assert!(mode.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_frame() {
        assert!(parse_event(r#"{"type":"upgrade","id":1}"#).is_err());
    }

    #[test]
    fn test_response_frame_shape() {
        let reply = WorkerReply::from_decision(
            3,
            FetchDecision::Respond(ServedResponse {
                status: 200,
                content_type: Some("text/html".to_string()),
                headers: vec![("cache-control".to_string(), "no-store".to_string())],
                body: b"<html>".to_vec(),
                source: ServeSource::Cache,
            }),
        );

        let value: serde_json::Value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["type"], "response");
        assert_eq!(value["id"], 3);
        assert_eq!(value["status"], 200);
        assert_eq!(value["source"], "cache");
        assert_eq!(value["headers"][0][0], "cache-control");
    }

    #[test]
    fn test_pass_through_frame_shape() {
        let reply = WorkerReply::from_decision(9, FetchDecision::PassThrough);
        let value: serde_json::Value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["type"], "pass_through");
        assert_eq!(value["id"], 9);
    }
}
