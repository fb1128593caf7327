use std::sync::Arc;

use semvault::{QueryMatch, QueryOptions, VectorCollection, DEFAULT_LIMIT, DEFAULT_THRESHOLD};
use semvault_core::{Document, Metadata, Value};
use serde::Deserialize;
use serde_json::json;

use crate::{Tool, ToolError};

pub(crate) const FIND_TOOLS_NAME: &str = "find_tools";
pub(crate) const FIND_TOOLS_DESCRIPTION: &str =
    "Find available tools by keyword match against tool names and descriptions";

fn parse_args<T: for<'de> Deserialize<'de>>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::InvalidInput(err.to_string()))
}

fn matches_to_payload(matches: Vec<QueryMatch>) -> Result<Value, ToolError> {
    let results = matches
        .into_iter()
        .map(|hit| {
            let metadata = serde_json::to_value(&hit.metadata)
                .map_err(|err| ToolError::InvalidInput(err.to_string()))?;
            Ok(json!({
                "content": hit.content,
                "metadata": metadata,
                "score": hit.score,
            }))
        })
        .collect::<Result<Vec<Value>, ToolError>>()?;

    Ok(json!({ "results": results }))
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_days() -> u32 {
    7
}

// --- query_vector_db ---

#[derive(Deserialize)]
struct QueryArgs {
    text: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default = "default_threshold")]
    threshold: f32,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

pub struct QueryVectorDbTool {
    collection: Arc<VectorCollection>,
}

impl QueryVectorDbTool {
    pub fn new(collection: Arc<VectorCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl Tool for QueryVectorDbTool {
    fn name(&self) -> &str {
        "query_vector_db"
    }

    fn description(&self) -> &str {
        "Semantic search over the document collection with optional category/source filters"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Query text" },
                "limit": { "type": "integer", "minimum": 1, "default": DEFAULT_LIMIT },
                "threshold": { "type": "number", "minimum": 0, "maximum": 1, "default": DEFAULT_THRESHOLD },
                "category": { "type": "string" },
                "source": { "type": "string" }
            },
            "required": ["text"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: QueryArgs = parse_args(args)?;
        let options = QueryOptions {
            limit: args.limit,
            threshold: args.threshold,
            category: args.category,
            source: args.source,
        };
        let matches = self.collection.query(&args.text, &options).await?;
        matches_to_payload(matches)
    }
}

// --- search_by_category ---

#[derive(Deserialize)]
struct SearchByCategoryArgs {
    category: String,
    text: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default = "default_threshold")]
    threshold: f32,
    #[serde(default)]
    source: Option<String>,
}

pub struct SearchByCategoryTool {
    collection: Arc<VectorCollection>,
}

impl SearchByCategoryTool {
    pub fn new(collection: Arc<VectorCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl Tool for SearchByCategoryTool {
    fn name(&self) -> &str {
        "search_by_category"
    }

    fn description(&self) -> &str {
        "Semantic search scoped to one metadata category"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": { "type": "string" },
                "text": { "type": "string" },
                "limit": { "type": "integer", "minimum": 1, "default": DEFAULT_LIMIT },
                "threshold": { "type": "number", "minimum": 0, "maximum": 1, "default": DEFAULT_THRESHOLD },
                "source": { "type": "string" }
            },
            "required": ["category", "text"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: SearchByCategoryArgs = parse_args(args)?;
        let options = QueryOptions {
            limit: args.limit,
            threshold: args.threshold,
            category: None,
            source: args.source,
        };
        let matches = self
            .collection
            .search_by_category(&args.category, &args.text, &options)
            .await?;
        matches_to_payload(matches)
    }
}

// --- get_stats ---

pub struct GetStatsTool {
    collection: Arc<VectorCollection>,
}

impl GetStatsTool {
    pub fn new(collection: Arc<VectorCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl Tool for GetStatsTool {
    fn name(&self) -> &str {
        "get_stats"
    }

    fn description(&self) -> &str {
        "Aggregate collection statistics: document count, categories, sources, sizes"
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn invoke(&self, _args: Value) -> Result<Value, ToolError> {
        let stats = self.collection.get_stats().await?;
        Ok(json!({
            "totalDocuments": stats.total_documents,
            "categories": stats.categories,
            "sources": stats.sources,
            "averageChunkSize": stats.average_chunk_size,
            "lastUpdated": stats.last_updated.to_rfc3339(),
        }))
    }
}

// --- get_recent_docs ---

#[derive(Deserialize)]
struct RecentArgs {
    #[serde(default = "default_days")]
    days: u32,
}

pub struct GetRecentDocsTool {
    collection: Arc<VectorCollection>,
}

impl GetRecentDocsTool {
    pub fn new(collection: Arc<VectorCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl Tool for GetRecentDocsTool {
    fn name(&self) -> &str {
        "get_recent_docs"
    }

    fn description(&self) -> &str {
        "Documents modified within the past N days, most recent first"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days": { "type": "integer", "minimum": 0, "default": 7 }
            }
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: RecentArgs = parse_args(args)?;
        let docs = self.collection.get_recent_docs(args.days).await?;
        let documents = docs
            .into_iter()
            .map(|doc| serde_json::to_value(&doc))
            .collect::<Result<Vec<Value>, _>>()
            .map_err(|err| ToolError::InvalidInput(err.to_string()))?;
        Ok(json!({ "documents": documents }))
    }
}

// --- add_documents ---

#[derive(Deserialize)]
struct AddDocumentsArgs {
    documents: Vec<IncomingDocument>,
}

#[derive(Deserialize)]
struct IncomingDocument {
    id: String,
    content: String,
    #[serde(default)]
    metadata: Metadata,
}

pub struct AddDocumentsTool {
    collection: Arc<VectorCollection>,
}

impl AddDocumentsTool {
    pub fn new(collection: Arc<VectorCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl Tool for AddDocumentsTool {
    fn name(&self) -> &str {
        "add_documents"
    }

    fn description(&self) -> &str {
        "Embed and upsert a batch of documents; the batch fails atomically"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "documents": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "content": { "type": "string" },
                            "metadata": { "type": "object" }
                        },
                        "required": ["id", "content"]
                    }
                }
            },
            "required": ["documents"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: AddDocumentsArgs = parse_args(args)?;
        let docs: Vec<Document> = args
            .documents
            .into_iter()
            .map(|doc| Document::new(doc.id, doc.content, doc.metadata))
            .collect();
        let added = docs.len();
        self.collection.add_documents(docs).await?;
        Ok(json!({ "added": added }))
    }
}

// --- backup_database ---

#[derive(Deserialize)]
struct BackupArgs {
    path: String,
}

pub struct BackupDatabaseTool {
    collection: Arc<VectorCollection>,
}

impl BackupDatabaseTool {
    pub fn new(collection: Arc<VectorCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl Tool for BackupDatabaseTool {
    fn name(&self) -> &str {
        "backup_database"
    }

    fn description(&self) -> &str {
        "Export the whole collection to a line-delimited JSON backup file"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Backup file path, overwritten if present" }
            },
            "required": ["path"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: BackupArgs = parse_args(args)?;
        let records = self.collection.export_backup(&args.path).await?;
        Ok(json!({ "path": args.path, "records": records }))
    }
}

// --- restore_database ---

#[derive(Deserialize)]
struct RestoreArgs {
    path: String,
    #[serde(default)]
    clear: bool,
}

pub struct RestoreDatabaseTool {
    collection: Arc<VectorCollection>,
}

impl RestoreDatabaseTool {
    pub fn new(collection: Arc<VectorCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl Tool for RestoreDatabaseTool {
    fn name(&self) -> &str {
        "restore_database"
    }

    fn description(&self) -> &str {
        "Restore a collection from a backup file, optionally clearing it first"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
                "clear": { "type": "boolean", "default": false }
            },
            "required": ["path"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: RestoreArgs = parse_args(args)?;
        let imported = self.collection.import_backup(&args.path, args.clear).await?;
        Ok(json!({ "imported": imported, "cleared": args.clear }))
    }
}

// --- find_tools ---

#[derive(Deserialize)]
struct FindToolsArgs {
    keyword: String,
}

/// Keyword discovery over the static tool list. Plain substring match on
/// name and description; tools themselves are not semantically indexed.
pub struct FindToolsTool {
    catalog: Vec<(String, String)>,
}

impl FindToolsTool {
    pub fn new(catalog: Vec<(String, String)>) -> Self {
        Self { catalog }
    }
}

#[async_trait::async_trait]
impl Tool for FindToolsTool {
    fn name(&self) -> &str {
        FIND_TOOLS_NAME
    }

    fn description(&self) -> &str {
        FIND_TOOLS_DESCRIPTION
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "keyword": { "type": "string" }
            },
            "required": ["keyword"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: FindToolsArgs = parse_args(args)?;
        let keyword = args.keyword.to_lowercase();
        let tools = self
            .catalog
            .iter()
            .filter(|(name, description)| {
                name.to_lowercase().contains(&keyword)
                    || description.to_lowercase().contains(&keyword)
            })
            .map(|(name, description)| {
                json!({ "name": name, "description": description })
            })
            .collect::<Vec<Value>>();
        Ok(json!({ "tools": tools }))
    }
}
