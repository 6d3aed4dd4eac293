//! Provider registration records.

use serde::{Deserialize, Serialize};

/// Persisted metadata describing one registered content provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Factory identifier used to build the provider
    pub handler: String,

    /// Unique provider name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Supported content type names
    #[serde(rename = "type", default)]
    pub content_types: Vec<String>,

    /// Optional provider category
    #[serde(default)]
    pub category: Option<String>,
}

impl ProviderRecord {
    /// Create a new record
    pub fn new(
        handler: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            handler: handler.into(),
            name: name.into(),
            title: title.into(),
            content_types: Vec::new(),
            category: None,
        }
    }

    /// Add a supported content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_types.push(content_type.into());
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Check whether the provider supports a content type
    pub fn supports(&self, content_type: &str) -> bool {
        self.content_types.iter().any(|t| t == content_type)
    }
}
