use std::sync::Arc;

use chrono::{Duration, Utc};
use semvault::{
    CollectionError, HashEmbedder, InMemoryVectorStore, QueryOptions, VectorCollection,
};
use semvault_core::{Document, Metadata, VectorStore};

const DIM: usize = 16;

fn make_collection() -> (VectorCollection, Arc<InMemoryVectorStore>) {
    let store = Arc::new(InMemoryVectorStore::new());
    let collection = VectorCollection::new(Arc::new(HashEmbedder::new(DIM)), store.clone());
    (collection, store)
}

fn doc(id: &str, content: &str) -> Document {
    Document::new(id, content, Metadata::default())
}

fn doc_with(id: &str, content: &str, category: Option<&str>, source: Option<&str>) -> Document {
    Document::new(
        id,
        content,
        Metadata {
            category: category.map(str::to_string),
            source: source.map(str::to_string),
            ..Default::default()
        },
    )
}

fn open_options() -> QueryOptions {
    QueryOptions {
        limit: 10,
        threshold: 0.0,
        ..Default::default()
    }
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let (collection, _) = make_collection();
    collection.initialize().await.expect("first init");
    collection.initialize().await.expect("second init is a no-op");
}

#[tokio::test]
async fn initialize_detects_provider_mismatch() {
    let store = Arc::new(InMemoryVectorStore::new());
    store
        .ensure_collection(DIM * 2)
        .await
        .expect("seed collection with a different dimension");

    let collection = VectorCollection::new(Arc::new(HashEmbedder::new(DIM)), store);
    let err = collection
        .initialize()
        .await
        .expect_err("dimension probe should fail");
    assert!(matches!(err, CollectionError::ProviderMismatch(_)));
}

#[tokio::test]
async fn query_returns_at_most_limit_sorted_by_score() {
    let (collection, _) = make_collection();
    let docs = (0..6)
        .map(|n| doc(&format!("d-{n}"), &format!("document number {n}")))
        .collect();
    collection.add_documents(docs).await.expect("add should succeed");

    let options = QueryOptions {
        limit: 3,
        threshold: 0.0,
        ..Default::default()
    };
    let results = collection
        .query("document number 2", &options)
        .await
        .expect("query should succeed");

    assert!(results.len() <= 3);
    assert!(results
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}

#[tokio::test]
async fn every_result_meets_the_threshold() {
    let (collection, _) = make_collection();
    let docs = (0..5)
        .map(|n| doc(&format!("d-{n}"), &format!("text {n}")))
        .collect();
    collection.add_documents(docs).await.expect("add should succeed");

    let options = QueryOptions {
        limit: 10,
        threshold: 0.8,
        ..Default::default()
    };
    let results = collection
        .query("text 0", &options)
        .await
        .expect("query should succeed");
    assert!(results.iter().all(|hit| hit.score >= 0.8));
}

#[tokio::test]
async fn raising_the_threshold_never_increases_the_result_count() {
    let (collection, _) = make_collection();
    let docs = (0..5)
        .map(|n| doc(&format!("d-{n}"), &format!("text {n}")))
        .collect();
    collection.add_documents(docs).await.expect("add should succeed");

    let loose = collection
        .query("text 0", &open_options())
        .await
        .expect("query should succeed");
    let strict = collection
        .query(
            "text 0",
            &QueryOptions {
                limit: 10,
                threshold: 0.95,
                ..Default::default()
            },
        )
        .await
        .expect("query should succeed");

    assert!(strict.len() <= loose.len());
}

#[tokio::test]
async fn exact_text_self_match_scores_near_one() {
    let (collection, _) = make_collection();
    let added = doc("d-1", "an unmistakable sentence about gardening");
    collection
        .add_documents(vec![added.clone()])
        .await
        .expect("add should succeed");

    let options = QueryOptions {
        limit: 1,
        threshold: 0.9,
        ..Default::default()
    };
    let results = collection
        .query(&added.content, &options)
        .await
        .expect("query should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, added.content);
    assert!(results[0].score > 0.99);
}

#[tokio::test]
async fn matching_ignores_token_case_and_extra_whitespace() {
    let (collection, _) = make_collection();
    collection
        .add_documents(vec![doc("d-1", "hello world")])
        .await
        .expect("add should succeed");

    let options = QueryOptions {
        limit: 1,
        threshold: 0.95,
        ..Default::default()
    };
    let results = collection
        .query("HELLO   World", &options)
        .await
        .expect("query should succeed");

    assert_eq!(results.len(), 1);
    assert!(results[0].score > 0.99);
}

#[tokio::test]
async fn an_extreme_limit_is_tolerated() {
    let (collection, _) = make_collection();
    collection
        .add_documents(vec![doc("d-1", "only document")])
        .await
        .expect("add should succeed");

    let options = QueryOptions {
        limit: usize::MAX,
        threshold: 0.0,
        ..Default::default()
    };
    let results = collection
        .query("only document", &options)
        .await
        .expect("query should succeed");
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn re_adding_an_id_overwrites_the_prior_document() {
    let (collection, store) = make_collection();
    collection
        .add_documents(vec![doc_with("d-1", "old text", Some("a"), None)])
        .await
        .expect("first add");
    collection
        .add_documents(vec![doc_with("d-1", "new text", Some("b"), None)])
        .await
        .expect("second add");

    let page = store.scan(None, 100).await.expect("scan should succeed");
    let matching: Vec<_> = page
        .documents
        .iter()
        .filter(|doc| doc.id == "d-1")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].content, "new text");
    assert_eq!(matching[0].metadata.category.as_deref(), Some("b"));
}

#[tokio::test]
async fn category_and_source_filters_narrow_the_candidate_pool() {
    let (collection, _) = make_collection();
    collection
        .add_documents(vec![
            doc_with("d-1", "shared words", Some("ops"), Some("handbook")),
            doc_with("d-2", "shared words", Some("dev"), Some("handbook")),
            doc_with("d-3", "shared words", Some("ops"), Some("wiki")),
        ])
        .await
        .expect("add should succeed");

    let options = QueryOptions {
        limit: 10,
        threshold: 0.0,
        category: Some("ops".to_string()),
        source: Some("handbook".to_string()),
    };
    let results = collection
        .query("shared words", &options)
        .await
        .expect("query should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].metadata.category.as_deref(), Some("ops"));
    assert_eq!(results[0].metadata.source.as_deref(), Some("handbook"));
}

#[tokio::test]
async fn search_by_category_overrides_a_conflicting_option() {
    let (collection, _) = make_collection();
    collection
        .add_documents(vec![
            doc_with("d-1", "same text", Some("ops"), None),
            doc_with("d-2", "same text", Some("dev"), None),
        ])
        .await
        .expect("add should succeed");

    let options = QueryOptions {
        limit: 10,
        threshold: 0.0,
        category: Some("ops".to_string()),
        ..Default::default()
    };
    let results = collection
        .search_by_category("dev", "same text", &options)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].metadata.category.as_deref(), Some("dev"));
}

#[tokio::test]
async fn empty_query_text_is_a_caller_error() {
    let (collection, _) = make_collection();
    let err = collection
        .query("   ", &QueryOptions::default())
        .await
        .expect_err("empty text should fail");
    assert!(matches!(err, CollectionError::InvalidArgument(_)));
}

#[tokio::test]
async fn zero_limit_and_out_of_range_threshold_are_rejected() {
    let (collection, _) = make_collection();

    let err = collection
        .query(
            "hello",
            &QueryOptions {
                limit: 0,
                ..Default::default()
            },
        )
        .await
        .expect_err("zero limit should fail");
    assert!(matches!(err, CollectionError::InvalidArgument(_)));

    let err = collection
        .query(
            "hello",
            &QueryOptions {
                threshold: 1.5,
                ..Default::default()
            },
        )
        .await
        .expect_err("threshold above 1 should fail");
    assert!(matches!(err, CollectionError::InvalidArgument(_)));
}

#[tokio::test]
async fn querying_an_empty_collection_returns_no_results() {
    let (collection, _) = make_collection();
    let results = collection
        .query("anything", &open_options())
        .await
        .expect("query should succeed");
    assert!(results.is_empty());
}

#[tokio::test]
async fn add_documents_validates_its_batch() {
    let (collection, _) = make_collection();

    let err = collection
        .add_documents(Vec::new())
        .await
        .expect_err("empty batch should fail");
    assert!(matches!(err, CollectionError::InvalidArgument(_)));

    let err = collection
        .add_documents(vec![doc("  ", "content")])
        .await
        .expect_err("blank id should fail");
    assert!(matches!(err, CollectionError::InvalidArgument(_)));

    let err = collection
        .add_documents(vec![doc("d-1", "")])
        .await
        .expect_err("empty content should fail");
    assert!(matches!(err, CollectionError::InvalidArgument(_)));
}

#[tokio::test]
async fn stats_aggregate_counts_sizes_and_timestamps() {
    let (collection, store) = make_collection();
    let newest = "2026-08-29T10:00:00Z";
    let mut d1 = doc_with("d-1", "abcd", Some("ops"), Some("handbook"));
    d1.metadata.last_modified = Some("2026-08-01T00:00:00Z".to_string());
    let mut d2 = doc_with("d-2", "abcdefgh", Some("ops"), Some("wiki"));
    d2.metadata.last_modified = Some(newest.to_string());
    let d3 = doc_with("d-3", "abcd", Some("dev"), None);

    collection
        .add_documents(vec![d1, d2, d3])
        .await
        .expect("add should succeed");

    let stats = collection.get_stats().await.expect("stats should succeed");
    assert_eq!(stats.total_documents, 3);
    assert_eq!(
        stats.total_documents,
        store.count().await.expect("count should succeed")
    );
    assert_eq!(stats.categories.get("ops"), Some(&2));
    assert_eq!(stats.categories.get("dev"), Some(&1));
    assert_eq!(stats.sources.get("handbook"), Some(&1));
    assert_eq!(stats.sources.get("wiki"), Some(&1));
    assert!((stats.average_chunk_size - 16.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.last_updated.to_rfc3339(), "2026-08-29T10:00:00+00:00");
}

#[tokio::test]
async fn stats_on_an_empty_collection_fall_back_to_scan_time() {
    let (collection, _) = make_collection();
    let before = Utc::now();
    let stats = collection.get_stats().await.expect("stats should succeed");
    assert_eq!(stats.total_documents, 0);
    assert_eq!(stats.average_chunk_size, 0.0);
    assert!(stats.last_updated >= before);
}

#[tokio::test]
async fn recent_docs_exclude_old_and_undated_documents() {
    let (collection, _) = make_collection();
    let now = Utc::now();

    let mut today = doc("d-today", "changed today");
    today.metadata.last_modified = Some(now.to_rfc3339());
    let mut last_week = doc("d-week", "changed ten days ago");
    last_week.metadata.last_modified = Some((now - Duration::days(10)).to_rfc3339());
    let undated = doc("d-undated", "no timestamp at all");

    collection
        .add_documents(vec![today, last_week, undated])
        .await
        .expect("add should succeed");

    let recent = collection
        .get_recent_docs(7)
        .await
        .expect("recent should succeed");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, "d-today");
}

#[tokio::test]
async fn recent_docs_are_ordered_most_recent_first() {
    let (collection, _) = make_collection();
    let now = Utc::now();

    let mut older = doc("d-older", "two days ago");
    older.metadata.last_modified = Some((now - Duration::days(2)).to_rfc3339());
    let mut newer = doc("d-newer", "one hour ago");
    newer.metadata.last_modified = Some((now - Duration::hours(1)).to_rfc3339());

    collection
        .add_documents(vec![older, newer])
        .await
        .expect("add should succeed");

    let recent = collection
        .get_recent_docs(7)
        .await
        .expect("recent should succeed");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, "d-newer");
    assert_eq!(recent[1].id, "d-older");
}

#[tokio::test]
async fn clear_requires_explicit_confirmation() {
    let (collection, store) = make_collection();
    collection
        .add_documents(vec![doc("d-1", "keep me")])
        .await
        .expect("add should succeed");

    let err = collection
        .clear_collection(false)
        .await
        .expect_err("unconfirmed clear should fail");
    assert!(matches!(err, CollectionError::InvalidArgument(_)));
    assert_eq!(store.count().await.expect("count"), 1);

    collection
        .clear_collection(true)
        .await
        .expect("confirmed clear should succeed");
    assert_eq!(store.count().await.expect("count"), 0);
}
