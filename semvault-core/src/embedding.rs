use async_trait::async_trait;

use crate::EmbeddingError;

/// Converts text into fixed-dimension vectors.
///
/// A collection is bound to exactly one provider; the write and read paths
/// must agree on the vector space, so the same instance serves both.
#[async_trait]
pub trait Embedding: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds a batch of texts. Providers that support batched requests
    /// should issue a single call; the batch-add path relies on this to
    /// keep round trips and rate-limit pressure down.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn dimension(&self) -> usize;
}
