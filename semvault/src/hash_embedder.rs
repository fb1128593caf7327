use async_trait::async_trait;

use semvault_core::{Embedding, EmbeddingError};

/// Deterministic, network-free [`Embedding`] provider for tests and
/// offline plumbing.
///
/// Each lowercased whitespace token is hashed into one of `dimension`
/// buckets and the bucket counts are L2-normalized, so identical text
/// lands on the identical unit vector and exact self-matches score 1.0
/// under the cosine contract. Texts sharing tokens land closer than texts
/// sharing none; there are no real semantics beyond that.
#[derive(Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn bucket(&self, token: &str) -> usize {
        // splitmix64-style mixer over the token bytes
        let mut hash: u64 = 0x9e37_79b9_7f4a_7c15;
        for byte in token.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0xbf58_476d_1ce4_e5b9);
            hash ^= hash >> 27;
        }
        (hash % self.dimension as u64) as usize
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        if self.dimension == 0 {
            return Vec::new();
        }

        let mut buckets = vec![0.0_f32; self.dimension];
        for token in text.split_whitespace() {
            buckets[self.bucket(&token.to_lowercase())] += 1.0;
        }

        let norm = buckets.iter().map(|value| value * value).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut buckets {
                *value /= norm;
            }
        }
        buckets
    }
}

#[async_trait]
impl Embedding for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.vectorize(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
