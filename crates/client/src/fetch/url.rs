//! URL handling: origin parsing, asset resolution, request canonicalization.
//!
//! Cache entries are addressed by full URL, so every URL that participates
//! in matching is normalized the same way: http/https only, fragment
//! dropped, host lowercased (the url crate does this on parse).

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("asset path must be absolute: {0}")]
    RelativePath(String),
}

impl From<UrlError> for strata_core::Error {
    fn from(err: UrlError) -> Self {
        strata_core::Error::InvalidUrl(err.to_string())
    }
}

/// Parse the configured origin the precached assets are served from.
///
/// The origin is reduced to scheme + host + port; any path, query, or
/// fragment is discarded so asset resolution always starts from the root.
pub fn parse_origin(input: &str) -> Result<url::Url, UrlError> {
    let mut origin = parse_request_url(input)?;
    origin.set_path("/");
    origin.set_query(None);
    Ok(origin)
}

/// Resolve a manifest path against the origin.
pub fn resolve_asset(origin: &url::Url, path: &str) -> Result<url::Url, UrlError> {
    if !path.starts_with('/') {
        return Err(UrlError::RelativePath(path.to_string()));
    }
    origin.join(path).map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

/// Canonicalize a request URL arriving from the hosting environment.
///
/// Trims whitespace, requires an absolute http/https URL, and drops the
/// fragment (it never reaches the server, so it must not affect identity).
/// Query strings are kept verbatim.
pub fn parse_request_url(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
