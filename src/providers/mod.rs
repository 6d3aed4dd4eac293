//! Content providers.
//!
//! A provider adapts one family of data sources (a database table, a static
//! array) to a uniform interface for fetching and listing content items.
//! Concrete providers implement the two lookups; everything else has a
//! shared default.

pub mod array;
pub mod factory;
pub mod query;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::content_type::ContentTypeDescriptor;
use crate::domain::{resolve_content_id, ContentData, ContentFilter, ContentItem};
use crate::error::{ContentError, Result};

// Re-export the concrete providers
pub use array::ArrayProvider;
pub use factory::ProviderFactories;
pub use query::ModelQuery;
pub use sqlite::SqliteProvider;

/// Content type every provider supports unless told otherwise
pub const DEFAULT_CONTENT_TYPE: &str = "text";

/// Default page size for list queries
pub const DEFAULT_PER_PAGE: usize = 20;

/// Identity metadata shared by all providers
#[derive(Debug, Clone, Default)]
pub struct ProviderInfo {
    /// Unique provider name
    pub name: Option<String>,

    /// Human-readable title
    pub title: Option<String>,

    /// Optional category
    pub category: Option<String>,

    /// Supported content type names (`None` means `["text"]`)
    pub content_types: Option<Vec<String>>,

    /// Content type attached when resolved through the manager
    pub content_type: Option<Arc<ContentTypeDescriptor>>,
}

impl ProviderInfo {
    /// Create provider info with a name and title
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the supported content types
    pub fn with_content_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.content_types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

/// Trait for content providers
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Factory identifier this provider is built from
    fn handler(&self) -> &str;

    /// Identity metadata
    fn info(&self) -> &ProviderInfo;

    fn info_mut(&mut self) -> &mut ProviderInfo;

    /// Fetch raw content by id, uuid or slug
    async fn get_content(&self, key: &str) -> Result<Option<ContentData>>;

    /// List content items, optionally filtered. `page` is 1-based.
    async fn get_content_list(
        &self,
        filter: Option<&ContentFilter>,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<ContentItem>>;

    /// Provider name; fails when unset
    fn provider_name(&self) -> Result<&str> {
        self.info()
            .name
            .as_deref()
            .ok_or(ContentError::MissingProviderName)
    }

    fn provider_title(&self) -> Option<&str> {
        self.info().title.as_deref()
    }

    fn provider_category(&self) -> Option<&str> {
        self.info().category.as_deref()
    }

    /// Supported content type names (defaults to `["text"]`)
    fn supported_content_types(&self) -> Vec<String> {
        self.info()
            .content_types
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_CONTENT_TYPE.to_string()])
    }

    /// Content type attached by the manager
    fn content_type(&self) -> Option<Arc<ContentTypeDescriptor>> {
        self.info().content_type.clone()
    }

    fn set_content_type(&mut self, content_type: Arc<ContentTypeDescriptor>) {
        self.info_mut().content_type = Some(content_type);
    }

    /// Title given to items produced by this provider
    fn item_title(&self) -> String {
        let info = self.info();
        info.content_type
            .as_ref()
            .map(|t| t.display_title().to_string())
            .or_else(|| info.title.clone())
            .or_else(|| info.name.clone())
            .unwrap_or_default()
    }

    /// Fetch a content item; its id is the payload's `uuid` or `id`, else `key`
    async fn get(&self, key: &str) -> Result<Option<ContentItem>> {
        let Some(data) = self.get_content(key).await? else {
            return Ok(None);
        };

        let id = resolve_content_id(&data).unwrap_or_else(|| key.to_string());
        Ok(Some(ContentItem::new(data, self.item_title(), id)))
    }

    /// Create a new record. Read-only providers return `None`.
    async fn create_item(
        &self,
        _data: ContentData,
        _content_type: Option<&str>,
    ) -> Result<Option<ContentData>> {
        Ok(None)
    }

    /// Update the record at `key`. Read-only providers return `false`.
    async fn save_item(
        &self,
        _key: &str,
        _data: ContentData,
        _content_type: Option<&str>,
    ) -> Result<bool> {
        Ok(false)
    }

    /// Total number of records, when the provider can count them
    async fn items_count(&self) -> Result<Option<u64>> {
        Ok(None)
    }
}

/// Row offset for a 1-based page (page 0 is treated as page 1)
pub(crate) fn page_offset(page: usize, per_page: usize) -> usize {
    page.max(1).saturating_sub(1).saturating_mul(per_page)
}
