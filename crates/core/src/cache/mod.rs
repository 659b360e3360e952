//! SQLite-backed store for versioned cache generations.
//!
//! This module provides the persistent key→response store behind the
//! offline cache, with async access via tokio-rusqlite. It supports:
//!
//! - Named cache generations, one per deployment version
//! - Entries addressed by request identity (method + URL, SHA-256 keyed)
//! - Whole-generation deletion for activation-time cleanup
//! - Automatic schema migrations and WAL mode for concurrent readers

pub mod connection;
pub mod generations;
pub mod identity;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use generations::{CacheEntry, generation_name};
