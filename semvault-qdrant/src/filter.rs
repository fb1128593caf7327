use serde_json::{json, Value};

use semvault_core::MetadataFilter;

use crate::QdrantStoreError;

/// Translates a [`MetadataFilter`] into a Qdrant filter payload.
pub fn to_qdrant_filter(filter: &MetadataFilter) -> Result<Value, QdrantStoreError> {
    let must = conditions(filter)?;
    Ok(json!({ "must": must }))
}

fn conditions(filter: &MetadataFilter) -> Result<Vec<Value>, QdrantStoreError> {
    match filter {
        MetadataFilter::Eq(key, value) => Ok(vec![json!({
            "key": key,
            "match": { "value": value }
        })]),
        MetadataFilter::All(filters) => {
            if filters.is_empty() {
                return Err(QdrantStoreError::UnsupportedFilter(
                    "all(...) filter must not be empty".to_string(),
                ));
            }

            let mut must = Vec::with_capacity(filters.len());
            for nested in filters {
                must.extend(conditions(nested)?);
            }
            Ok(must)
        }
    }
}
