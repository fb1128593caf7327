use semvault_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QdrantStoreError {
    #[error("invalid configuration: base_url cannot be empty")]
    EmptyBaseUrl,
    #[error("invalid configuration: collection cannot be empty")]
    EmptyCollection,
    #[error("invalid collection name: '{0}'")]
    InvalidCollectionName(String),
    #[error("invalid document id: {0}")]
    InvalidDocumentId(String),
    #[error("document '{id}' is missing embedding")]
    MissingEmbedding { id: String },
    #[error("qdrant point '{point_id}' is missing content payload '__semvault_content'")]
    MissingContentPayload { point_id: String },
    #[error("qdrant point '{point_id}' has invalid payload: {reason}")]
    InvalidPayload { point_id: String, reason: String },
    #[error("unsupported metadata filter: {0}")]
    UnsupportedFilter(String),
    #[error("cannot reach qdrant: {0}")]
    Connection(String),
    #[error("qdrant request failed: {0}")]
    Request(String),
    #[error("collection '{collection}' not found: {message}")]
    CollectionNotFound { collection: String, message: String },
    #[error("collection dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("qdrant returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("invalid qdrant response: {message}")]
    InvalidResponse { message: String },
}

impl From<reqwest::Error> for QdrantStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            QdrantStoreError::Connection(err.to_string())
        } else {
            QdrantStoreError::Request(err.to_string())
        }
    }
}

impl From<QdrantStoreError> for StoreError {
    fn from(value: QdrantStoreError) -> Self {
        match value {
            QdrantStoreError::InvalidDocumentId(id) => StoreError::InvalidId(id),
            QdrantStoreError::Connection(message) => StoreError::Connection(message),
            QdrantStoreError::DimensionMismatch { expected, got } => {
                StoreError::DimensionMismatch { expected, got }
            }
            QdrantStoreError::InvalidResponse { message } => StoreError::InvalidResponse(message),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
