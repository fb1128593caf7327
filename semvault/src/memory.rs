use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use semvault_core::{
    Document, Metadata, MetadataFilter, ScanPage, SearchResult, StoreError, Value, VectorStore,
};

#[derive(Default)]
struct StoreInner {
    docs: Vec<Option<Document>>,
    embeddings: Vec<Option<Vec<f32>>>,
    id_map: HashMap<String, usize>,
    dimension: Option<usize>,
}

/// In-memory [`VectorStore`] with cosine distance. Backs tests, examples
/// and offline runs; same contract as the remote backends, including
/// paginated scans.
#[derive(Clone, Default)]
pub struct InMemoryVectorStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, dimension: usize) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.dimension {
            Some(expected) if expected != dimension => Err(StoreError::DimensionMismatch {
                expected: dimension,
                got: expected,
            }),
            _ => {
                inner.dimension = Some(dimension);
                Ok(())
            }
        }
    }

    async fn upsert(&self, docs: Vec<Document>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for mut doc in docs {
            if doc.id.trim().is_empty() {
                return Err(StoreError::InvalidId(doc.id));
            }

            let embedding = doc
                .embedding
                .take()
                .ok_or_else(|| StoreError::Backend(format!("document '{}' is missing embedding", doc.id)))?;
            let dimension = embedding.len();
            match inner.dimension {
                Some(expected) if expected != dimension => {
                    return Err(StoreError::DimensionMismatch {
                        expected,
                        got: dimension,
                    });
                }
                None => inner.dimension = Some(dimension),
                _ => {}
            }

            if let Some(&index) = inner.id_map.get(&doc.id) {
                inner.docs[index] = Some(doc);
                inner.embeddings[index] = Some(embedding);
            } else {
                let index = inner.docs.len();
                inner.id_map.insert(doc.id.clone(), index);
                inner.docs.push(Some(doc));
                inner.embeddings.push(Some(embedding));
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let inner = self.inner.read().await;
        let expected = inner.dimension.unwrap_or(query_embedding.len());
        if expected != query_embedding.len() {
            return Err(StoreError::DimensionMismatch {
                expected,
                got: query_embedding.len(),
            });
        }

        let mut scored = Vec::new();
        for (idx, embedding) in inner.embeddings.iter().enumerate() {
            let Some(embedding) = embedding else { continue };
            let Some(doc) = inner.docs[idx].as_ref() else {
                continue;
            };
            if let Some(filter) = filter {
                if !metadata_matches(filter, &doc.metadata) {
                    continue;
                }
            }

            let similarity = cosine_similarity(query_embedding, embedding);
            let mut result_doc = doc.clone();
            result_doc.embedding = None;
            scored.push(SearchResult {
                document: result_doc,
                distance: 1.0 - similarity,
            });
        }

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn scan(
        &self,
        offset: Option<String>,
        page_size: usize,
    ) -> Result<ScanPage, StoreError> {
        let inner = self.inner.read().await;
        let start: usize = match offset {
            Some(raw) => raw
                .parse()
                .map_err(|_| StoreError::InvalidResponse(format!("invalid scan cursor: '{raw}'")))?,
            None => 0,
        };

        let mut documents = Vec::new();
        let mut idx = start;
        while idx < inner.docs.len() && documents.len() < page_size {
            if let Some(doc) = inner.docs[idx].as_ref() {
                let mut doc = doc.clone();
                doc.embedding = None;
                documents.push(doc);
            }
            idx += 1;
        }

        let more_remaining = inner.docs[idx..].iter().any(Option::is_some);
        Ok(ScanPage {
            documents,
            next_offset: more_remaining.then(|| idx.to_string()),
        })
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.id_map.len())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for id in ids {
            if let Some(idx) = inner.id_map.remove(id) {
                inner.docs[idx] = None;
                inner.embeddings[idx] = None;
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.docs.clear();
        inner.embeddings.clear();
        inner.id_map.clear();
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn metadata_value(metadata: &Metadata, key: &str) -> Option<Value> {
    match key {
        "source" => metadata.source.clone().map(Value::String),
        "category" => metadata.category.clone().map(Value::String),
        "filePath" => metadata.file_path.clone().map(Value::String),
        "title" => metadata.title.clone().map(Value::String),
        "lastModified" => metadata.last_modified.clone().map(Value::String),
        other => metadata.extra.get(other).cloned(),
    }
}

fn metadata_matches(filter: &MetadataFilter, metadata: &Metadata) -> bool {
    match filter {
        MetadataFilter::Eq(key, value) => {
            metadata_value(metadata, key).is_some_and(|entry| entry == *value)
        }
        MetadataFilter::All(filters) => filters
            .iter()
            .all(|filter| metadata_matches(filter, metadata)),
    }
}
