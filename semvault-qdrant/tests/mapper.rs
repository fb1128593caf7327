use semvault_core::{Document, Metadata};
use semvault_qdrant::mapper::{
    cursor_to_offset, doc_to_point, payload_to_document, point_id_for, scored_point_to_result,
    ScoredPoint, CONTENT_PAYLOAD_KEY, DOC_ID_PAYLOAD_KEY,
};
use semvault_qdrant::QdrantStoreError;
use serde_json::{json, Map, Value};

fn doc_with_embedding(id: &str) -> Document {
    let mut doc = Document::new(
        id,
        "some chunk text",
        Metadata {
            category: Some("ops".to_string()),
            ..Default::default()
        },
    );
    doc.embedding = Some(vec![0.1, 0.2]);
    doc
}

#[test]
fn point_id_is_stable_for_the_same_document_id() {
    let first = point_id_for("guide-chunk-3").expect("id should map");
    let second = point_id_for("guide-chunk-3").expect("id should map");
    let other = point_id_for("guide-chunk-4").expect("id should map");

    assert_eq!(first, second);
    assert_ne!(first, other);
}

#[test]
fn empty_document_id_is_rejected() {
    let err = point_id_for("  ").expect_err("blank id should fail");
    assert!(matches!(err, QdrantStoreError::InvalidDocumentId(_)));
}

#[test]
fn doc_to_point_keeps_id_content_and_metadata_in_payload() {
    let point = doc_to_point(doc_with_embedding("guide-chunk-3")).expect("doc should map");

    assert_eq!(point.vector, vec![0.1, 0.2]);
    assert_eq!(
        point.payload.get(DOC_ID_PAYLOAD_KEY),
        Some(&json!("guide-chunk-3"))
    );
    assert_eq!(
        point.payload.get(CONTENT_PAYLOAD_KEY),
        Some(&json!("some chunk text"))
    );
    assert_eq!(point.payload.get("category"), Some(&json!("ops")));
}

#[test]
fn doc_without_embedding_is_rejected() {
    let doc = Document::new("guide-chunk-3", "text", Metadata::default());
    let err = doc_to_point(doc).expect_err("missing embedding should fail");
    assert!(matches!(err, QdrantStoreError::MissingEmbedding { .. }));
}

#[test]
fn payload_round_trips_back_to_a_document() {
    let point = doc_to_point(doc_with_embedding("guide-chunk-3")).expect("doc should map");
    let doc = payload_to_document(&json!(point.id), point.payload).expect("payload should map");

    assert_eq!(doc.id, "guide-chunk-3");
    assert_eq!(doc.content, "some chunk text");
    assert_eq!(doc.metadata.category.as_deref(), Some("ops"));
    assert!(doc.embedding.is_none());
}

#[test]
fn payload_without_content_is_rejected() {
    let mut payload = Map::new();
    payload.insert(DOC_ID_PAYLOAD_KEY.to_string(), json!("guide-chunk-3"));

    let err = payload_to_document(&json!("some-uuid"), payload)
        .expect_err("missing content should fail");
    assert!(matches!(err, QdrantStoreError::MissingContentPayload { .. }));
}

#[test]
fn scroll_cursor_keeps_the_offset_type_qdrant_reported() {
    // Integer point-id offsets must go back as numbers, not quoted strings.
    assert_eq!(cursor_to_offset("42".to_string()), json!(42));
    assert_eq!(
        cursor_to_offset("123e4567-e89b-12d3-a456-426614174000".to_string()),
        json!("123e4567-e89b-12d3-a456-426614174000")
    );
}

#[test]
fn scored_point_converts_similarity_to_distance() {
    let mut payload = Map::new();
    payload.insert(DOC_ID_PAYLOAD_KEY.to_string(), json!("a-1"));
    payload.insert(CONTENT_PAYLOAD_KEY.to_string(), json!("text"));

    let result = scored_point_to_result(ScoredPoint {
        id: Value::String("some-uuid".to_string()),
        score: 0.9,
        payload,
    })
    .expect("point should map");

    assert!((result.distance - 0.1).abs() < 1e-6);
    assert_eq!(result.document.id, "a-1");
}
