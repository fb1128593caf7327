use std::{error::Error as StdError, fmt, time::Duration};

use thiserror::Error;

/// Failure from an embedding provider.
#[derive(Debug)]
pub enum EmbeddingError {
    InvalidResponse(String),
    RateLimited { retry_after: Option<Duration> },
    Timeout(Duration),
    Provider(String),
    Other(Box<dyn StdError + Send + Sync>),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingError::InvalidResponse(message) => {
                write!(f, "embedding invalid response: {message}")
            }
            EmbeddingError::RateLimited { retry_after } => match retry_after {
                Some(duration) => write!(f, "embedding rate limited (retry_after={duration:?})"),
                None => write!(f, "embedding rate limited (retry_after=unknown)"),
            },
            EmbeddingError::Timeout(duration) => write!(f, "embedding timeout after {duration:?}"),
            EmbeddingError::Provider(message) => write!(f, "embedding provider error: {message}"),
            EmbeddingError::Other(error) => write!(f, "embedding error: {error}"),
        }
    }
}

impl StdError for EmbeddingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EmbeddingError::Other(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

/// Failure from the vector-store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or auth rejected. Never retried here; callers
    /// own the resilience policy.
    #[error("cannot reach vector store: {0}")]
    Connection(String),
    /// Stored vector size disagrees with the embedder binding. The usual
    /// cause is a collection written with a different provider.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("invalid document id: {0}")]
    InvalidId(String),
    /// Backend rejected the operation; the backend's message is kept
    /// intact for diagnosability.
    #[error("store error: {0}")]
    Backend(String),
    #[error("invalid store response: {0}")]
    InvalidResponse(String),
}
