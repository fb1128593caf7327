use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use semvault_core::{Embedding, EmbeddingError};
use serde::{Deserialize, Serialize};

use crate::EmbeddingProviderError;

/// Local models can be slow to load on first use, but an embed call that
/// takes longer than this is stuck, not warming up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Local embedding provider backed by an Ollama server.
///
/// Uses the `/api/embed` endpoint, which accepts a batch of inputs in one
/// request, so `embed_batch` costs a single round trip.
#[derive(Clone)]
pub struct OllamaEmbedding {
    base_url: String,
    model: String,
    dimension: usize,
    http: Client,
}

impl OllamaEmbedding {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into(),
            model: model.into(),
            dimension,
            http,
        }
    }

    fn embed_url(&self) -> String {
        format!("{}/api/embed", self.base_url.trim_end_matches('/'))
    }

    async fn request(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let expected = input.len();
        let req = OllamaEmbedRequest {
            model: self.model.clone(),
            input,
        };

        let response = self
            .http
            .post(self.embed_url())
            .json(&req)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    EmbeddingError::Timeout(REQUEST_TIMEOUT)
                } else {
                    EmbeddingProviderError::Request(err.to_string()).into()
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(EmbeddingError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(
                EmbeddingProviderError::Request(format!("ollama returned HTTP {status}")).into(),
            );
        }

        let response: OllamaEmbedResponse = response
            .json()
            .await
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?;

        if response.embeddings.len() != expected {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected {expected} embeddings, got {}",
                response.embeddings.len()
            ))
            .into());
        }

        for embedding in &response.embeddings {
            if embedding.len() != self.dimension {
                return Err(EmbeddingProviderError::InvalidResponse(format!(
                    "expected embedding dimension {}, got {}",
                    self.dimension,
                    embedding.len()
                ))
                .into());
            }
        }

        Ok(response.embeddings)
    }
}

#[derive(Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedding for OllamaEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut out = self.request(vec![text.to_string()]).await?;
        out.pop()
            .ok_or_else(|| EmbeddingProviderError::InvalidResponse("missing embedding".to_string()).into())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts.to_vec()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
