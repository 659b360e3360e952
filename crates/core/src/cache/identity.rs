//! Request identity keys.
//!
//! A cache entry is addressed by its request identity: method + URL. The
//! identity is hashed so the storage key is fixed-width and opaque.

use sha2::{Digest, Sha256};

/// Compute the storage key for a request identity.
///
/// The method is uppercased before hashing so `get` and `GET` address the
/// same entry.
pub fn entry_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
