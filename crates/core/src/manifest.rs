//! The precache asset manifest.
//!
//! An ordered set of unique absolute paths, supplied by the build system and
//! immutable for the process lifetime. Install fetches and stores every
//! listed path; the interceptor serves cache-first exactly for paths that
//! are members of this set.

use crate::Error;
use std::collections::HashSet;
use std::path::Path;

/// Ordered, de-duplicated list of asset paths designated for precaching.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    paths: Vec<String>,
    index: HashSet<String>,
}

impl AssetManifest {
    /// Build a manifest from path strings.
    ///
    /// Duplicates are dropped, keeping the first occurrence. Every path must
    /// be absolute (start with `/`).
    pub fn from_paths<I, S>(paths: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut manifest = Self::default();
        for path in paths {
            let path = path.into();
            if !path.starts_with('/') {
                return Err(Error::Manifest(format!("path {path:?} is not absolute")));
            }
            if manifest.index.insert(path.clone()) {
                manifest.paths.push(path);
            }
        }
        Ok(manifest)
    }

    /// Parse a manifest from its JSON form: an array of path strings.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let paths: Vec<String> = serde_json::from_str(json).map_err(|e| Error::Manifest(e.to_string()))?;
        Self::from_paths(paths)
    }

    /// Load a manifest file written by the build system.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Manifest(format!("failed to read {}: {e}", path.display())))?;
        let manifest = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), assets = manifest.len(), "loaded asset manifest");
        Ok(manifest)
    }

    /// Exact membership test on a request pathname.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    /// Paths in manifest order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
