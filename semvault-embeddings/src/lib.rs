//! Embedding providers, each behind its own feature flag.

mod error;

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "ollama")]
mod ollama;

pub use error::EmbeddingProviderError;

#[cfg(feature = "openai")]
pub use openai::OpenAiEmbedding;

#[cfg(feature = "ollama")]
pub use ollama::OllamaEmbedding;
