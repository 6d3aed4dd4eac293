//! In-memory array provider.
//!
//! Serves a list of JSON records. Records can be supplied directly or loaded
//! from a file containing a JSON array of objects.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use super::query::matches_filter;
use super::{page_offset, ContentProvider, ProviderInfo};
use crate::domain::{resolve_content_id, ContentData, ContentFilter, ContentItem};
use crate::error::Result;

/// Content provider over an in-memory list of records
pub struct ArrayProvider {
    handler: String,
    info: ProviderInfo,
    items: RwLock<Vec<ContentData>>,
}

impl ArrayProvider {
    /// Create a provider over the given records
    pub fn new(handler: impl Into<String>, info: ProviderInfo, items: Vec<ContentData>) -> Self {
        Self {
            handler: handler.into(),
            info,
            items: RwLock::new(items),
        }
    }

    /// Create a provider from JSON values; non-object values are skipped
    pub fn from_values(
        handler: impl Into<String>,
        info: ProviderInfo,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        let items = values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Self::new(handler, info, items)
    }

    /// Load records from a JSON array file
    pub async fn from_json_file(
        handler: impl Into<String>,
        info: ProviderInfo,
        path: &Path,
    ) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read array source: {}", path.display()))?;

        let values: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse array source: {}", path.display()))?;

        Ok(Self::from_values(handler, info, values))
    }

    /// Consume the provider, returning its records
    pub fn into_items(self) -> Vec<ContentData> {
        self.items.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn find(&self, key: &str) -> Option<ContentData> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.iter().find(|item| record_has_key(item, key)).cloned()
    }
}

/// Whether `uuid`, `id` or `slug` of a record equals `key`
fn record_has_key(record: &ContentData, key: &str) -> bool {
    ["uuid", "id", "slug"]
        .iter()
        .any(|field| match record.get(*field) {
            Some(Value::String(s)) => s == key,
            Some(Value::Number(n)) => n.to_string() == key,
            _ => false,
        })
}

#[async_trait]
impl ContentProvider for ArrayProvider {
    fn handler(&self) -> &str {
        &self.handler
    }

    fn info(&self) -> &ProviderInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ProviderInfo {
        &mut self.info
    }

    async fn get_content(&self, key: &str) -> Result<Option<ContentData>> {
        Ok(self.find(key))
    }

    async fn get_content_list(
        &self,
        filter: Option<&ContentFilter>,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<ContentItem>> {
        let title = self.item_title();
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);

        let mut matched = Vec::new();
        for item in items.iter() {
            if let Some(filter) = filter {
                if !matches_filter(item, filter)? {
                    continue;
                }
            }
            matched.push(item);
        }

        Ok(matched
            .into_iter()
            .skip(page_offset(page, per_page))
            .take(per_page)
            .map(|item| {
                let id = resolve_content_id(item).unwrap_or_default();
                ContentItem::new(item.clone(), title.clone(), id)
            })
            .collect())
    }

    async fn create_item(
        &self,
        data: ContentData,
        _content_type: Option<&str>,
    ) -> Result<Option<ContentData>> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.push(data.clone());
        Ok(Some(data))
    }

    async fn save_item(
        &self,
        key: &str,
        data: ContentData,
        _content_type: Option<&str>,
    ) -> Result<bool> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.iter_mut().find(|item| record_has_key(item, key)) {
            Some(item) => {
                item.extend(data);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn items_count(&self) -> Result<Option<u64>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(Some(items.len() as u64))
    }
}
