//! Unified error types for strata.

use tokio_rusqlite::rusqlite;

/// Unified error type shared across the strata crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Install could not populate the new cache generation.
    ///
    /// Fatal for the deployment attempt: no partial generation is ever
    /// considered valid.
    #[error("install failed: {0}")]
    InstallFailed(String),

    /// Asset manifest could not be read or is malformed.
    #[error("invalid asset manifest: {0}")]
    Manifest(String),

    /// Database operation failed.
    #[error("cache storage error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("cache storage error: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid or unresolvable URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Network transport failure (connection refused, timeout, DNS, ...).
    ///
    /// This is the error the interceptor recovers from via the root-page
    /// fallback; when no fallback applies it propagates to the caller.
    #[error("network error: {0}")]
    Network(String),

    /// Response body exceeded the configured size cap.
    #[error("response too large: {0}")]
    FetchTooLarge(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
