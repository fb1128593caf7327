use async_openai::config::OpenAIConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_openai::Client;
use async_trait::async_trait;
use semvault_core::{Embedding, EmbeddingError};

use crate::EmbeddingProviderError;

/// Hosted embedding provider backed by the OpenAI embeddings API.
///
/// `embed_batch` sends the whole batch in one request; the provider bills
/// per token, so batching also keeps rate-limit pressure down.
#[derive(Clone)]
pub struct OpenAiEmbedding {
    client: Client<OpenAIConfig>,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedding {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        let config = OpenAIConfig::default().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: model.into(),
            dimension,
        }
    }

    pub fn with_client(
        client: Client<OpenAIConfig>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            dimension,
        }
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), EmbeddingError> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected embedding dimension {}, got {}",
                self.dimension,
                embedding.len()
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl Embedding for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(text)
            .build()
            .map_err(|err| EmbeddingError::Other(Box::new(err)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| {
                EmbeddingError::from(EmbeddingProviderError::InvalidResponse(
                    "missing embedding".to_string(),
                ))
            })?;

        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let inputs_len = texts.len();
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(texts.to_vec())
            .build()
            .map_err(|err| EmbeddingError::Other(Box::new(err)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?;

        if response.data.len() != inputs_len {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected {inputs_len} embeddings, got {}",
                response.data.len()
            ))
            .into());
        }

        let mut out = Vec::with_capacity(response.data.len());
        for item in response.data {
            self.check_dimension(&item.embedding)?;
            out.push(item.embedding);
        }

        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
