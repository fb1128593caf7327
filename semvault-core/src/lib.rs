//! Shared vocabulary for the semvault workspace: documents, the embedding
//! and vector-store contracts, metadata filters, and the error taxonomy.

mod document;
mod embedding;
mod error;
mod metadata_filter;
mod value;
mod vector_store;

pub use document::{Document, Metadata};
pub use embedding::Embedding;
pub use error::{EmbeddingError, StoreError};
pub use metadata_filter::MetadataFilter;
pub use value::Value;
pub use vector_store::{ScanPage, SearchResult, VectorStore};
