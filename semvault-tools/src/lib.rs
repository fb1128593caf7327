//! Protocol tool surface for semvault.
//!
//! Each tool maps 1:1 to one public operation of the access layer, plus a
//! discovery tool that filters the static tool list by keyword. Invocation
//! errors come back as structured `{"error": {...}}` payloads; nothing is
//! thrown across the protocol boundary.

mod tools;

use std::sync::Arc;

use semvault::{CollectionError, VectorCollection};
use semvault_core::Value;
use serde_json::json;
use thiserror::Error;

pub use tools::{
    AddDocumentsTool, BackupDatabaseTool, FindToolsTool, GetRecentDocsTool, GetStatsTool,
    QueryVectorDbTool, RestoreDatabaseTool, SearchByCategoryTool,
};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidInput(_) => "invalid_argument",
            ToolError::Collection(err) => err.kind(),
        }
    }
}

#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;
}

/// Static tool list with name-based dispatch.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Builds the full tool set for one collection.
    pub fn for_collection(collection: Arc<VectorCollection>) -> Self {
        let mut registry = Self { tools: Vec::new() };
        registry.register(Arc::new(QueryVectorDbTool::new(collection.clone())));
        registry.register(Arc::new(SearchByCategoryTool::new(collection.clone())));
        registry.register(Arc::new(GetStatsTool::new(collection.clone())));
        registry.register(Arc::new(GetRecentDocsTool::new(collection.clone())));
        registry.register(Arc::new(AddDocumentsTool::new(collection.clone())));
        registry.register(Arc::new(BackupDatabaseTool::new(collection.clone())));
        registry.register(Arc::new(RestoreDatabaseTool::new(collection)));

        let catalog = registry.catalog_with_discovery();
        registry.register(Arc::new(FindToolsTool::new(catalog)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Tool descriptors for protocol listing.
    pub fn list(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.schema(),
                })
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Dispatches by tool name. Always returns a payload: results on
    /// success, `{"error": {"kind", "message"}}` on any failure.
    pub async fn dispatch(&self, name: &str, args: Value) -> Value {
        let Some(tool) = self.tools.iter().find(|tool| tool.name() == name) else {
            return error_payload("unknown_tool", &format!("no tool named '{name}'"));
        };

        match tool.invoke(args).await {
            Ok(result) => result,
            Err(err) => error_payload(err.kind(), &err.to_string()),
        }
    }

    fn catalog_with_discovery(&self) -> Vec<(String, String)> {
        let mut catalog: Vec<(String, String)> = self
            .tools
            .iter()
            .map(|tool| (tool.name().to_string(), tool.description().to_string()))
            .collect();
        catalog.push((
            tools::FIND_TOOLS_NAME.to_string(),
            tools::FIND_TOOLS_DESCRIPTION.to_string(),
        ));
        catalog
    }
}

fn error_payload(kind: &str, message: &str) -> Value {
    json!({
        "error": {
            "kind": kind,
            "message": message,
        }
    })
}
