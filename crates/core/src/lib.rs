//! Core types and shared functionality for strata.
//!
//! This crate provides:
//! - Versioned cache generation store with SQLite backend
//! - Asset manifest and request models
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod manifest;
pub mod request;

pub use cache::{CacheDb, CacheEntry, generation_name};
pub use config::AppConfig;
pub use error::Error;
pub use manifest::AssetManifest;
pub use request::{Request, RequestMode};
