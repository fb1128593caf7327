#![cfg(feature = "ollama")]

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use semvault_core::Embedding;
use semvault_embeddings::OllamaEmbedding;

#[tokio::test]
async fn embed_maps_single_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.4, 0.5]]
        })))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedding::new(server.uri(), "nomic-embed-text", 2);
    let out = embedder.embed("hello").await.expect("embed should succeed");
    assert_eq!(out, vec![0.4, 0.5]);
}

#[tokio::test]
async fn embed_batch_sends_all_inputs_in_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({
            "input": ["first", "second"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0], [0.0, 1.0]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OllamaEmbedding::new(server.uri(), "nomic-embed-text", 2);
    let out = embedder
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .expect("batch embed should succeed");
    assert_eq!(out.len(), 2);
}

#[tokio::test]
async fn embed_rejects_wrong_dimension() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.1, 0.2, 0.3]]
        })))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedding::new(server.uri(), "nomic-embed-text", 2);
    let err = embedder.embed("hello").await.expect_err("dimension should be rejected");
    assert!(err.to_string().contains("dimension"));
}

#[tokio::test]
async fn a_429_maps_to_rate_limited_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedding::new(server.uri(), "nomic-embed-text", 2);
    let err = embedder.embed("hello").await.expect_err("429 should surface");
    match err {
        semvault_core::EmbeddingError::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(std::time::Duration::from_secs(3)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn embed_surfaces_http_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedding::new(server.uri(), "nomic-embed-text", 2);
    let err = embedder.embed("hello").await.expect_err("http error should surface");
    assert!(matches!(err, semvault_core::EmbeddingError::Provider(_)));
}
