use async_trait::async_trait;

use crate::{Document, MetadataFilter, StoreError};

/// One nearest-neighbor hit as reported by the backend.
///
/// `distance` is the backend's raw distance metric, lower is closer. Score
/// normalization into `[0,1]` is the access layer's job, not the store's.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub document: Document,
    pub distance: f32,
}

/// One page of a full scan. `next_offset` is an opaque backend cursor;
/// `None` means the scan is exhausted.
#[derive(Clone, Debug, Default)]
pub struct ScanPage {
    pub documents: Vec<Document>,
    pub next_offset: Option<String>,
}

/// Contract for a remote vector-store backend holding one named collection
/// of (id, vector, content, metadata) entries.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the collection if absent; when it already exists, verifies
    /// the stored vector size against `dimension` and fails with
    /// [`StoreError::DimensionMismatch`] on conflict.
    async fn ensure_collection(&self, dimension: usize) -> Result<(), StoreError>;

    /// Upserts documents. Every document must carry an embedding.
    async fn upsert(&self, docs: Vec<Document>) -> Result<(), StoreError>;

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>, StoreError>;

    /// Paginated full scan of ids, content and metadata. Pass `None` to
    /// start, then feed back `next_offset` until it comes back `None`.
    /// Scan order is backend-defined, not insertion order.
    async fn scan(
        &self,
        offset: Option<String>,
        page_size: usize,
    ) -> Result<ScanPage, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn delete(&self, ids: &[String]) -> Result<(), StoreError>;

    /// Deletes every document in the collection.
    async fn clear(&self) -> Result<(), StoreError>;
}
