//! Content items returned by providers.
//!
//! An item is an immutable snapshot of one record from a data source: the raw
//! payload, a display title and a string identifier.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw content payload (opaque key-value mapping)
pub type ContentData = Map<String, Value>;

/// A single piece of content produced by a provider or the manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    content: ContentData,
    title: String,
    id: String,
}

impl ContentItem {
    /// Create a new content item
    pub fn new(content: ContentData, title: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            content,
            title: title.into(),
            id: id.into(),
        }
    }

    /// Item payload
    pub fn content(&self) -> &ContentData {
        &self.content
    }

    /// Item title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Item identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read a single payload value
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.content.get(key)
    }

    /// Consume the item, returning its payload
    pub fn into_content(self) -> ContentData {
        self.content
    }
}

/// Resolve an item identifier from a payload: `uuid` first, then `id`.
///
/// Numbers are rendered without quotes; other non-string values are ignored.
pub fn resolve_content_id(data: &ContentData) -> Option<String> {
    ["uuid", "id"].iter().find_map(|key| match data.get(*key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
