use std::sync::Arc;

use semvault::{HashEmbedder, InMemoryVectorStore, VectorCollection};
use semvault_tools::ToolRegistry;
use serde_json::json;

fn make_registry() -> ToolRegistry {
    let collection = Arc::new(VectorCollection::new(
        Arc::new(HashEmbedder::new(8)),
        Arc::new(InMemoryVectorStore::new()),
    ));
    ToolRegistry::for_collection(collection)
}

#[tokio::test]
async fn registry_exposes_one_tool_per_operation() {
    let registry = make_registry();
    let names = registry.names();

    for expected in [
        "query_vector_db",
        "search_by_category",
        "get_stats",
        "get_recent_docs",
        "add_documents",
        "backup_database",
        "restore_database",
        "find_tools",
    ] {
        assert!(names.contains(&expected), "missing tool '{expected}'");
    }
}

#[tokio::test]
async fn unknown_tool_returns_a_structured_error_payload() {
    let registry = make_registry();
    let payload = registry.dispatch("definitely_not_a_tool", json!({})).await;
    assert_eq!(payload["error"]["kind"], "unknown_tool");
}

#[tokio::test]
async fn add_then_query_round_trips_through_the_tools() {
    let registry = make_registry();

    let added = registry
        .dispatch(
            "add_documents",
            json!({
                "documents": [
                    { "id": "a-1", "content": "notes about deployment", "metadata": { "category": "ops" } }
                ]
            }),
        )
        .await;
    assert_eq!(added["added"], 1);

    let found = registry
        .dispatch(
            "query_vector_db",
            json!({ "text": "notes about deployment", "limit": 1, "threshold": 0.9 }),
        )
        .await;
    let results = found["results"].as_array().expect("results array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["content"], "notes about deployment");
    assert_eq!(results[0]["metadata"]["category"], "ops");
}

#[tokio::test]
async fn invocation_errors_become_error_payloads_with_a_kind() {
    let registry = make_registry();

    let payload = registry
        .dispatch("query_vector_db", json!({ "text": "   " }))
        .await;
    assert_eq!(payload["error"]["kind"], "invalid_argument");

    let payload = registry
        .dispatch("query_vector_db", json!({ "limit": 3 }))
        .await;
    assert_eq!(payload["error"]["kind"], "invalid_argument");
}

#[tokio::test]
async fn get_stats_reports_camel_case_fields() {
    let registry = make_registry();
    let stats = registry.dispatch("get_stats", json!({})).await;
    assert_eq!(stats["totalDocuments"], 0);
    assert!(stats["categories"].is_object());
    assert!(stats["lastUpdated"].is_string());
}

#[tokio::test]
async fn find_tools_filters_by_keyword_case_insensitively() {
    let registry = make_registry();

    let payload = registry
        .dispatch("find_tools", json!({ "keyword": "BACKUP" }))
        .await;
    let tools = payload["tools"].as_array().expect("tools array");
    let names: Vec<&str> = tools
        .iter()
        .map(|tool| tool["name"].as_str().expect("tool name"))
        .collect();
    assert!(names.contains(&"backup_database"));
    assert!(names.contains(&"restore_database"));
    assert!(!names.contains(&"get_stats"));
}

#[tokio::test]
async fn search_by_category_tool_forces_the_category() {
    let registry = make_registry();

    registry
        .dispatch(
            "add_documents",
            json!({
                "documents": [
                    { "id": "a-1", "content": "same words", "metadata": { "category": "ops" } },
                    { "id": "a-2", "content": "same words", "metadata": { "category": "dev" } }
                ]
            }),
        )
        .await;

    let payload = registry
        .dispatch(
            "search_by_category",
            json!({ "category": "dev", "text": "same words", "threshold": 0.0, "limit": 10 }),
        )
        .await;
    let results = payload["results"].as_array().expect("results array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["metadata"]["category"], "dev");
}
