//! Domain types for the content registry.
//!
//! This module contains the plain data structures:
//! - ContentItem: One piece of content returned by a provider
//! - ContentSelector: Compact string address of a content item
//! - ContentFilter: List query filter
//! - ProviderRecord: Persisted provider registration

pub mod filter;
pub mod item;
pub mod record;
pub mod selector;

// Re-export commonly used types
pub use filter::ContentFilter;
pub use item::{resolve_content_id, ContentData, ContentItem};
pub use record::ProviderRecord;
pub use selector::{ContentSelector, SelectorType};
