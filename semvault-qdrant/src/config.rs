use std::fmt;
use std::time::Duration;

use crate::{QdrantStoreError, QdrantVectorStore};

/// Characters Qdrant rejects in collection names; they would also corrupt
/// the request paths this client builds by string formatting.
const FORBIDDEN_NAME_CHARS: &[char] = &['/', '\\', '?', '#', '%'];

/// Builder for [`QdrantVectorStore`]. `build` normalizes what it is given:
/// the base URL loses its trailing slash, the collection name is trimmed
/// and validated, and a blank API key counts as no key at all.
#[derive(Default, Clone)]
pub struct QdrantStoreBuilder {
    base_url: String,
    collection: String,
    api_key: Option<String>,
    request_timeout: Option<Duration>,
}

impl fmt::Debug for QdrantStoreBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QdrantStoreBuilder")
            .field("base_url", &self.base_url)
            .field("collection", &self.collection)
            .field(
                "api_key",
                if self.api_key.is_some() {
                    &"<redacted>"
                } else {
                    &"<none>"
                },
            )
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl QdrantStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = value.into();
        self
    }

    pub fn collection(mut self, value: impl Into<String>) -> Self {
        self.collection = value.into();
        self
    }

    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.api_key = if value.trim().is_empty() {
            None
        } else {
            Some(value)
        };
        self
    }

    /// Per-request timeout for every call the store makes. Without it the
    /// store waits as long as the operating system lets the socket live.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<QdrantVectorStore, QdrantStoreError> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(QdrantStoreError::EmptyBaseUrl);
        }

        let collection = validated_collection_name(&self.collection)?;

        if base_url.to_ascii_lowercase().contains("cloud.qdrant.io") && self.api_key.is_none() {
            tracing::warn!(
                base_url = %base_url,
                "qdrant cloud URL detected without an API key; requests may fail"
            );
        }

        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            client = client.timeout(timeout);
        }
        let client = client.build().map_err(QdrantStoreError::from)?;

        Ok(QdrantVectorStore::from_parts(
            client,
            base_url,
            collection,
            self.api_key,
        ))
    }
}

fn validated_collection_name(raw: &str) -> Result<String, QdrantStoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(QdrantStoreError::EmptyCollection);
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || FORBIDDEN_NAME_CHARS.contains(&c))
    {
        return Err(QdrantStoreError::InvalidCollectionName(name.to_string()));
    }
    Ok(name.to_string())
}
