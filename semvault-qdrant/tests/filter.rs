use semvault_core::MetadataFilter;
use semvault_qdrant::filter::to_qdrant_filter;
use semvault_qdrant::QdrantStoreError;
use serde_json::json;

#[test]
fn eq_filter_maps_to_match_condition() {
    let filter = MetadataFilter::eq("category", "ops");

    let payload = to_qdrant_filter(&filter).expect("eq filter should convert");
    assert_eq!(
        payload,
        json!({
            "must": [{ "key": "category", "match": { "value": "ops" } }]
        })
    );
}

#[test]
fn all_filter_concatenates_must_conditions() {
    let filter = MetadataFilter::All(vec![
        MetadataFilter::eq("category", "ops"),
        MetadataFilter::eq("source", "handbook"),
    ]);

    let payload = to_qdrant_filter(&filter).expect("all filter should convert");
    let must = payload["must"].as_array().expect("must should be an array");
    assert_eq!(must.len(), 2);
    assert_eq!(must[0]["key"], "category");
    assert_eq!(must[1]["key"], "source");
}

#[test]
fn empty_all_filter_is_rejected() {
    let err = to_qdrant_filter(&MetadataFilter::All(Vec::new()))
        .expect_err("empty all filter should fail");
    assert!(matches!(err, QdrantStoreError::UnsupportedFilter(_)));
}
