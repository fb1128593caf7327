//! Document-oriented access layer over a vector store backend.
//!
//! [`VectorCollection`] turns an embedding-backed similarity index into a
//! small document store: filtered semantic queries, aggregate statistics,
//! recency scans, and durable line-delimited JSON backups. One embedding
//! provider is bound per collection; the write and read paths must agree on
//! the vector space, so the binding is immutable for the collection's
//! lifetime.

mod backup;
mod collection;
mod error;
mod hash_embedder;
mod memory;

pub use backup::BackupRecord;
pub use collection::{
    CollectionStats, QueryMatch, QueryOptions, VectorCollection, DEFAULT_LIMIT, DEFAULT_THRESHOLD,
    MAX_BATCH_SIZE,
};
pub use error::CollectionError;
pub use hash_embedder::HashEmbedder;
pub use memory::InMemoryVectorStore;
