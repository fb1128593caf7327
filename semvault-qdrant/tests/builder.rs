use std::time::Duration;

use semvault_qdrant::{QdrantStoreError, QdrantVectorStore};

#[test]
fn build_requires_a_base_url() {
    let err = QdrantVectorStore::builder()
        .collection("docs")
        .build()
        .expect_err("missing base_url should fail");
    assert!(matches!(err, QdrantStoreError::EmptyBaseUrl));
}

#[test]
fn build_requires_a_collection() {
    let err = QdrantVectorStore::builder()
        .base_url("http://localhost:6333")
        .build()
        .expect_err("missing collection should fail");
    assert!(matches!(err, QdrantStoreError::EmptyCollection));

    let err = QdrantVectorStore::builder()
        .base_url("http://localhost:6333")
        .collection("   ")
        .build()
        .expect_err("blank collection should fail");
    assert!(matches!(err, QdrantStoreError::EmptyCollection));
}

#[test]
fn build_rejects_collection_names_that_break_request_paths() {
    for bad in ["team/docs", "docs?x", "two words", "a#b", "pct%20"] {
        let err = QdrantVectorStore::builder()
            .base_url("http://localhost:6333")
            .collection(bad)
            .build()
            .expect_err("bad collection name should fail");
        assert!(
            matches!(err, QdrantStoreError::InvalidCollectionName(ref name) if name == bad),
            "'{bad}' produced {err:?}"
        );
    }
}

#[test]
fn build_normalizes_base_url_and_collection() {
    let store = QdrantVectorStore::builder()
        .base_url("http://localhost:6333/")
        .collection("  docs  ")
        .build()
        .expect("store should build");
    assert_eq!(store.base_url(), "http://localhost:6333");
    assert_eq!(store.collection(), "docs");
}

#[test]
fn blank_api_key_is_treated_as_absent() {
    let store = QdrantVectorStore::builder()
        .base_url("http://localhost:6333")
        .collection("docs")
        .api_key("   ")
        .build()
        .expect("store should build");
    assert!(store.api_key().is_none());
}

#[test]
fn builder_keeps_configuration() {
    let store = QdrantVectorStore::builder()
        .base_url("http://localhost:6333")
        .collection("docs")
        .api_key("secret")
        .request_timeout(Duration::from_secs(5))
        .build()
        .expect("store should build");
    assert_eq!(store.base_url(), "http://localhost:6333");
    assert_eq!(store.collection(), "docs");
    assert_eq!(store.api_key(), Some("secret"));
}
