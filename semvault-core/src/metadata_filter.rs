use serde::{Deserialize, Serialize};

use crate::Value;

/// Backend-side metadata predicate, applied before similarity ranking so it
/// narrows the candidate pool rather than just the displayed output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum MetadataFilter {
    /// Exact match on one metadata key.
    Eq(String, Value),
    /// Conjunction of filters.
    All(Vec<MetadataFilter>),
}

impl MetadataFilter {
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        MetadataFilter::Eq(key.into(), value.into())
    }
}
