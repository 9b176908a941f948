//! Error types for the vocabulary cache.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by a backend implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The query was rejected or failed remotely.
    #[error("query failed: {0}")]
    Query(String),

    /// The connection dropped mid-call.
    #[error("connection lost: {0}")]
    Connection(String),

    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors surfaced by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backend handle never appeared within the attempt budget.
    #[error("backend unavailable after {attempts} attempts")]
    BackendUnavailable { attempts: u32 },

    /// A query returned an error or no usable rows.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// No entries could be obtained at all.
    #[error("vocabulary cache unavailable: {0}")]
    CacheUnavailable(String),
}

impl From<BackendError> for CacheError {
    fn from(err: BackendError) -> Self {
        Self::FetchFailed(err.to_string())
    }
}
