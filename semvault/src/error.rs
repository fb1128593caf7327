use semvault_core::{EmbeddingError, StoreError};
use thiserror::Error;

/// Error taxonomy of the access layer.
///
/// Backend- and provider-specific failures are normalized into these kinds;
/// nothing is retried or swallowed here. Callers own the resilience policy.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Backend or embedding provider unreachable, or auth rejected.
    #[error("connection error: {0}")]
    Connection(String),
    /// Caller error: empty query text, empty batch, missing confirm flag.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The collection was embedded with a different provider or dimension
    /// than the current binding. Detected by backend rejection, not
    /// pre-validated client-side.
    #[error("embedding provider mismatch: {0}")]
    ProviderMismatch(String),
    /// A restore aborts on the first malformed line; partial restores
    /// would silently produce a plausible but wrong collection.
    #[error("malformed backup record at line {line}: {reason}")]
    MalformedBackupRecord { line: usize, reason: String },
    /// Generic backend failure, message kept intact for diagnosability.
    #[error("backend failure: {0}")]
    Backend(String),
    #[error("backup file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectionError {
    /// Stable kind label, used for structured error payloads and CLI exit
    /// messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionError::Connection(_) => "connection",
            CollectionError::InvalidArgument(_) => "invalid_argument",
            CollectionError::ProviderMismatch(_) => "provider_mismatch",
            CollectionError::MalformedBackupRecord { .. } => "malformed_backup_record",
            CollectionError::Backend(_) => "backend",
            CollectionError::Io(_) => "io",
        }
    }
}

impl From<StoreError> for CollectionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection(message) => CollectionError::Connection(message),
            StoreError::DimensionMismatch { expected, got } => CollectionError::ProviderMismatch(
                format!("collection stores {got}-dimension vectors, provider produces {expected}"),
            ),
            StoreError::InvalidId(id) => {
                CollectionError::InvalidArgument(format!("invalid document id: '{id}'"))
            }
            StoreError::Backend(message) => CollectionError::Backend(message),
            StoreError::InvalidResponse(message) => CollectionError::Backend(message),
        }
    }
}

impl From<EmbeddingError> for CollectionError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Provider(_)
            | EmbeddingError::RateLimited { .. }
            | EmbeddingError::Timeout(_) => CollectionError::Connection(err.to_string()),
            EmbeddingError::InvalidResponse(_) | EmbeddingError::Other(_) => {
                CollectionError::Backend(err.to_string())
            }
        }
    }
}
