use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use semvault_core::{Document, Embedding, Metadata, MetadataFilter, VectorStore};

use crate::CollectionError;

/// Default number of results returned by a query.
pub const DEFAULT_LIMIT: usize = 5;
/// Default minimum similarity score a result must reach.
pub const DEFAULT_THRESHOLD: f32 = 0.7;
/// Backend batch-size ceiling for one `add_documents` call. The layer does
/// not auto-split; callers chunk larger inputs themselves so write behavior
/// stays predictable.
pub const MAX_BATCH_SIZE: usize = 100;

/// Threshold filtering happens after retrieval, so the backend is asked for
/// more raw candidates than the caller's limit.
const OVERFETCH_FACTOR: usize = 4;

pub(crate) const SCAN_PAGE_SIZE: usize = 100;

/// Options for [`VectorCollection::query`].
#[derive(Clone, Debug)]
pub struct QueryOptions {
    /// Maximum results returned, default 5.
    pub limit: usize,
    /// Results scoring below this are discarded after retrieval, default 0.7.
    pub threshold: f32,
    /// Exact-match predicate on `metadata.category`, applied backend-side.
    pub category: Option<String>,
    /// Exact-match predicate on `metadata.source`, applied backend-side.
    pub source: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
            category: None,
            source: None,
        }
    }
}

/// One query hit. `score` is normalized similarity in `[0,1]`, higher is
/// more similar.
#[derive(Clone, Debug)]
pub struct QueryMatch {
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}

/// Aggregate collection statistics from a full metadata scan.
#[derive(Clone, Debug)]
pub struct CollectionStats {
    pub total_documents: usize,
    pub categories: BTreeMap<String, usize>,
    pub sources: BTreeMap<String, usize>,
    pub average_chunk_size: f64,
    /// Max `lastModified` across documents, or the scan time if none parse.
    pub last_updated: DateTime<Utc>,
}

/// A named, provider-bound document collection in a vector store backend.
///
/// Operations are sequences of a few network calls plus local
/// transformation; there is no internal concurrency, no timeout and no
/// retry. Concurrent callers against the same collection race at the
/// backend's upsert granularity.
pub struct VectorCollection {
    embedder: Arc<dyn Embedding>,
    pub(crate) store: Arc<dyn VectorStore>,
    ready: AtomicBool,
}

impl VectorCollection {
    pub fn new(embedder: Arc<dyn Embedding>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            ready: AtomicBool::new(false),
        }
    }

    /// Establishes the collection binding, creating the collection if
    /// absent and probing its vector dimension against the provider's.
    ///
    /// Idempotent: after the first success, further calls are no-ops.
    pub async fn initialize(&self) -> Result<(), CollectionError> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }

        self.store
            .ensure_collection(self.embedder.dimension())
            .await?;
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Semantic query, highest score first, at most `options.limit` results.
    ///
    /// Category/source predicates narrow the candidate pool backend-side
    /// before ranking. The threshold is applied after retrieval; a
    /// provider-mismatched collection can legitimately return zero results
    /// here without raising an error.
    pub async fn query(
        &self,
        text: &str,
        options: &QueryOptions,
    ) -> Result<Vec<QueryMatch>, CollectionError> {
        if text.trim().is_empty() {
            return Err(CollectionError::InvalidArgument(
                "query text cannot be empty".to_string(),
            ));
        }
        if options.limit == 0 {
            return Err(CollectionError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&options.threshold) {
            return Err(CollectionError::InvalidArgument(format!(
                "threshold must be in [0,1], got {}",
                options.threshold
            )));
        }

        let filter = build_filter(options.category.as_deref(), options.source.as_deref());
        let embedding = self.embedder.embed(text).await?;

        let raw = self
            .store
            .search(
                &embedding,
                options.limit.saturating_mul(OVERFETCH_FACTOR),
                filter.as_ref(),
            )
            .await?;

        let mut matches: Vec<QueryMatch> = raw
            .into_iter()
            .map(|result| QueryMatch {
                score: score_from_distance(result.distance),
                content: result.document.content,
                metadata: result.document.metadata,
            })
            .filter(|hit| hit.score >= options.threshold)
            .collect();

        matches.sort_by(|left, right| right.score.total_cmp(&left.score));
        matches.truncate(options.limit);
        Ok(matches)
    }

    /// [`query`](Self::query) with the category predicate forced, whatever
    /// the options say.
    pub async fn search_by_category(
        &self,
        category: &str,
        text: &str,
        options: &QueryOptions,
    ) -> Result<Vec<QueryMatch>, CollectionError> {
        let options = QueryOptions {
            category: Some(category.to_string()),
            ..options.clone()
        };
        self.query(text, &options).await
    }

    /// Embeds and upserts a batch of documents.
    ///
    /// All contents are embedded in one provider call; if that call fails
    /// the whole batch is rejected with no partial writes. The backend
    /// imposes a batch ceiling of [`MAX_BATCH_SIZE`]; larger batches are
    /// passed through unsplit and fail at the backend.
    pub async fn add_documents(&self, docs: Vec<Document>) -> Result<(), CollectionError> {
        if docs.is_empty() {
            return Err(CollectionError::InvalidArgument(
                "add_documents requires at least one document".to_string(),
            ));
        }
        for doc in &docs {
            if doc.id.trim().is_empty() {
                return Err(CollectionError::InvalidArgument(
                    "document id cannot be empty".to_string(),
                ));
            }
            if doc.content.is_empty() {
                return Err(CollectionError::InvalidArgument(format!(
                    "document '{}' has empty content",
                    doc.id
                )));
            }
        }

        let texts: Vec<String> = docs.iter().map(|doc| doc.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let docs_with_embeddings = docs
            .into_iter()
            .zip(embeddings)
            .map(|(mut doc, embedding)| {
                doc.embedding = Some(embedding);
                doc
            })
            .collect();

        self.store.upsert(docs_with_embeddings).await?;
        Ok(())
    }

    /// Full metadata scan producing aggregate statistics.
    ///
    /// O(collection size); an operational call, never part of the query
    /// path.
    pub async fn get_stats(&self) -> Result<CollectionStats, CollectionError> {
        let mut total_documents = 0_usize;
        let mut total_chars = 0_u64;
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut sources: BTreeMap<String, usize> = BTreeMap::new();
        let mut last_updated: Option<DateTime<Utc>> = None;

        let mut offset = None;
        loop {
            let page = self.store.scan(offset, SCAN_PAGE_SIZE).await?;
            for doc in &page.documents {
                total_documents += 1;
                total_chars += doc.content.chars().count() as u64;
                if let Some(category) = &doc.metadata.category {
                    *categories.entry(category.clone()).or_default() += 1;
                }
                if let Some(source) = &doc.metadata.source {
                    *sources.entry(source.clone()).or_default() += 1;
                }
                if let Some(modified) = parse_last_modified(doc) {
                    last_updated = Some(match last_updated {
                        Some(current) => current.max(modified),
                        None => modified,
                    });
                }
            }
            match page.next_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        let average_chunk_size = if total_documents == 0 {
            0.0
        } else {
            total_chars as f64 / total_documents as f64
        };

        Ok(CollectionStats {
            total_documents,
            categories,
            sources,
            average_chunk_size,
            last_updated: last_updated.unwrap_or_else(Utc::now),
        })
    }

    /// Documents whose `lastModified` falls within the past `days`,
    /// most-recent-first. Documents without a parseable timestamp are
    /// excluded, never treated as recent or stale by default.
    pub async fn get_recent_docs(&self, days: u32) -> Result<Vec<Document>, CollectionError> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let mut recent: Vec<(DateTime<Utc>, Document)> = Vec::new();

        let mut offset = None;
        loop {
            let page = self.store.scan(offset, SCAN_PAGE_SIZE).await?;
            for doc in page.documents {
                if let Some(modified) = parse_last_modified(&doc) {
                    if modified >= cutoff {
                        recent.push((modified, doc));
                    }
                }
            }
            match page.next_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        recent.sort_by(|left, right| right.0.cmp(&left.0));
        Ok(recent.into_iter().map(|(_, doc)| doc).collect())
    }

    /// Deletes every document. Requires an explicit `confirm = true`;
    /// otherwise reports the precondition failure and deletes nothing.
    pub async fn clear_collection(&self, confirm: bool) -> Result<(), CollectionError> {
        if !confirm {
            return Err(CollectionError::InvalidArgument(
                "clear_collection requires confirm = true; nothing was deleted".to_string(),
            ));
        }

        self.store.clear().await?;
        Ok(())
    }
}

fn build_filter(category: Option<&str>, source: Option<&str>) -> Option<MetadataFilter> {
    let mut filters = Vec::new();
    if let Some(category) = category {
        filters.push(MetadataFilter::eq("category", category));
    }
    if let Some(source) = source {
        filters.push(MetadataFilter::eq("source", source));
    }

    match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(MetadataFilter::All(filters)),
    }
}

/// `score = 1 - distance` for a normalized distance; values outside `[0,1]`
/// (cosine backends can report distances up to 2) are clamped and flagged.
fn score_from_distance(distance: f32) -> f32 {
    let score = 1.0 - distance;
    if score.is_nan() {
        tracing::warn!(distance, "backend reported NaN distance; scoring as 0");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&score) {
        tracing::warn!(distance, score, "similarity score outside [0,1]; clamping");
        return score.clamp(0.0, 1.0);
    }
    score
}

fn parse_last_modified(doc: &Document) -> Option<DateTime<Utc>> {
    let raw = doc.metadata.last_modified.as_deref()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(err) => {
            tracing::warn!(
                id = %doc.id,
                value = %raw,
                error = %err,
                "unparseable lastModified timestamp; excluding document"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_filter_combines_category_and_source() {
        assert!(build_filter(None, None).is_none());

        let single = build_filter(Some("ops"), None).expect("filter expected");
        assert!(matches!(single, MetadataFilter::Eq(key, _) if key == "category"));

        let both = build_filter(Some("ops"), Some("handbook")).expect("filter expected");
        match both {
            MetadataFilter::All(filters) => assert_eq!(filters.len(), 2),
            other => panic!("unexpected filter: {other:?}"),
        }
    }

    #[test]
    fn scores_are_clamped_into_unit_range() {
        assert_eq!(score_from_distance(0.0), 1.0);
        assert!((score_from_distance(0.25) - 0.75).abs() < 1e-6);
        assert_eq!(score_from_distance(1.5), 0.0);
        assert_eq!(score_from_distance(-0.5), 1.0);
        assert_eq!(score_from_distance(f32::NAN), 0.0);
    }
}
