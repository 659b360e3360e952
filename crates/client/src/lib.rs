//! Client code for strata.
//!
//! This crate provides the HTTP fetch pipeline and URL handling the worker
//! uses for install-time precaching and fetch-event forwarding.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Network};
pub use fetch::url::{UrlError, parse_origin, parse_request_url, resolve_asset};
