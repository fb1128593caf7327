use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Metadata attached to a document.
///
/// The named fields are the keys the access layer filters and aggregates on;
/// everything else round-trips through the flattened `extra` map untouched.
/// Wire names are camelCase (`filePath`, `lastModified`) to match the backup
/// file format.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "filePath", skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// ISO-8601 timestamp string, e.g. `2026-08-30T12:00:00Z`.
    #[serde(rename = "lastModified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.category.is_none()
            && self.file_path.is_none()
            && self.title.is_none()
            && self.last_modified.is_none()
            && self.extra.is_empty()
    }
}

/// The unit of storage. Ids are caller-assigned and unique within a
/// collection; re-adding an id overwrites the prior document.
///
/// `embedding` is derived from `content` at write time and is never
/// populated on documents coming back from a read.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
            embedding: None,
        }
    }
}
