use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use uuid::Uuid;

use semvault_core::{Document, Metadata, SearchResult};

use crate::QdrantStoreError;

/// Reserved payload key carrying the raw document text.
pub const CONTENT_PAYLOAD_KEY: &str = "__semvault_content";
/// Reserved payload key carrying the caller-assigned document id. Qdrant
/// only accepts UUID or integer point ids, so the point id is a UUIDv5
/// derived from this value; re-adding the same document id lands on the
/// same point and overwrites it.
pub const DOC_ID_PAYLOAD_KEY: &str = "__semvault_id";

#[derive(Debug, Clone, Serialize)]
pub struct UpsertPointsRequest {
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletePointsRequest {
    pub points: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteByFilterRequest {
    pub filter: JsonValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPointsRequest {
    pub vector: Vec<f32>,
    pub limit: usize,
    pub with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrollPointsRequest {
    pub limit: usize,
    pub with_payload: bool,
    pub with_vector: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountPointsRequest {
    pub exact: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCollectionRequest {
    pub vectors: VectorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorsConfig {
    pub size: usize,
    pub distance: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub result: T,
}

#[derive(Debug, Deserialize)]
pub struct CollectionInfo {
    pub config: CollectionConfig,
}

#[derive(Debug, Deserialize)]
pub struct CollectionConfig {
    pub params: CollectionParams,
}

#[derive(Debug, Deserialize)]
pub struct CollectionParams {
    pub vectors: VectorsConfig,
}

#[derive(Debug, Deserialize)]
pub struct CountResult {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScoredPoint {
    pub id: JsonValue,
    pub score: f32,
    #[serde(default)]
    pub payload: JsonMap<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
pub struct ScrollResult {
    #[serde(default)]
    pub points: Vec<Record>,
    #[serde(default)]
    pub next_page_offset: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
pub struct Record {
    pub id: JsonValue,
    #[serde(default)]
    pub payload: JsonMap<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: JsonMap<String, JsonValue>,
}

/// Scroll cursors cross the store contract as strings, but Qdrant expects
/// the offset typed the way it reported it: an integer point id sent back
/// as a quoted string would be rejected. Anything that parses as JSON goes
/// back verbatim; everything else is a plain (UUID) string.
pub fn cursor_to_offset(cursor: String) -> JsonValue {
    serde_json::from_str(&cursor).unwrap_or(JsonValue::String(cursor))
}

pub fn point_id_for(doc_id: &str) -> Result<String, QdrantStoreError> {
    if doc_id.trim().is_empty() {
        return Err(QdrantStoreError::InvalidDocumentId(doc_id.to_string()));
    }

    Ok(Uuid::new_v5(&Uuid::NAMESPACE_OID, doc_id.as_bytes()).to_string())
}

pub fn doc_to_point(mut doc: Document) -> Result<Point, QdrantStoreError> {
    let point_id = point_id_for(&doc.id)?;
    let vector = doc
        .embedding
        .take()
        .ok_or_else(|| QdrantStoreError::MissingEmbedding { id: doc.id.clone() })?;

    let mut payload = JsonMap::new();
    payload.insert(
        DOC_ID_PAYLOAD_KEY.to_string(),
        JsonValue::String(doc.id.clone()),
    );
    payload.insert(
        CONTENT_PAYLOAD_KEY.to_string(),
        JsonValue::String(doc.content),
    );

    let metadata = serde_json::to_value(&doc.metadata)
        .map_err(|err| QdrantStoreError::InvalidPayload {
            point_id: doc.id.clone(),
            reason: err.to_string(),
        })?;
    if let JsonValue::Object(fields) = metadata {
        for (key, value) in fields {
            payload.insert(key, value);
        }
    }

    Ok(Point {
        id: point_id,
        vector,
        payload,
    })
}

pub fn payload_to_document(
    id: &JsonValue,
    payload: JsonMap<String, JsonValue>,
) -> Result<Document, QdrantStoreError> {
    let point_id = match id {
        JsonValue::String(value) => value.clone(),
        other => other.to_string(),
    };

    let mut content: Option<String> = None;
    let mut doc_id: Option<String> = None;
    let mut metadata_fields = JsonMap::new();

    for (key, value) in payload {
        match key.as_str() {
            CONTENT_PAYLOAD_KEY => {
                let text = value
                    .as_str()
                    .ok_or_else(|| QdrantStoreError::InvalidPayload {
                        point_id: point_id.clone(),
                        reason: format!("'{CONTENT_PAYLOAD_KEY}' must be a string"),
                    })?;
                content = Some(text.to_string());
            }
            DOC_ID_PAYLOAD_KEY => {
                let text = value
                    .as_str()
                    .ok_or_else(|| QdrantStoreError::InvalidPayload {
                        point_id: point_id.clone(),
                        reason: format!("'{DOC_ID_PAYLOAD_KEY}' must be a string"),
                    })?;
                doc_id = Some(text.to_string());
            }
            _ => {
                metadata_fields.insert(key, value);
            }
        }
    }

    let content = content.ok_or_else(|| QdrantStoreError::MissingContentPayload {
        point_id: point_id.clone(),
    })?;

    let metadata: Metadata = serde_json::from_value(JsonValue::Object(metadata_fields))
        .map_err(|err| QdrantStoreError::InvalidPayload {
            point_id: point_id.clone(),
            reason: err.to_string(),
        })?;

    Ok(Document {
        // Older points without the id payload fall back to the point id.
        id: doc_id.unwrap_or(point_id),
        content,
        metadata,
        embedding: None,
    })
}

/// Qdrant reports a cosine similarity score; the store contract speaks in
/// distances, lower is closer.
pub fn scored_point_to_result(point: ScoredPoint) -> Result<SearchResult, QdrantStoreError> {
    let distance = 1.0 - point.score;
    let document = payload_to_document(&point.id, point.payload)?;

    Ok(SearchResult { document, distance })
}
