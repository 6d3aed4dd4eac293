//! Filters for content list queries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Filter passed to `get_content_list`
///
/// Matching is an OR over `key_fields`: a record matches when any key field
/// contains the query value (case-insensitive). The value for a field is
/// `query` when set, otherwise that field's entry in `key_values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFilter {
    /// Fields to match against
    #[serde(default)]
    pub key_fields: Option<Vec<String>>,

    /// Per-field search values
    #[serde(default)]
    pub key_values: HashMap<String, String>,

    /// Search value applied to every key field
    #[serde(default)]
    pub query: Option<String>,
}

impl ContentFilter {
    /// Create a filter over the given key fields
    pub fn new(key_fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key_fields: Some(key_fields.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Set the shared query value
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set a per-field value
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_values.insert(field.into(), value.into());
        self
    }

    /// Search value for a key field (empty when nothing applies)
    pub fn value_for(&self, field: &str) -> &str {
        self.query
            .as_deref()
            .or_else(|| self.key_values.get(field).map(String::as_str))
            .unwrap_or("")
    }
}
