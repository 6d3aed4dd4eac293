//! contentkit - Content provider registry
//!
//! Lets an application register named content providers (adapters over data
//! sources such as SQLite tables or JSON arrays), associate them with content
//! types, and address individual items with compact selector strings.
//!
//! # Architecture
//!
//! - Registrations are persisted to a JSON providers file
//! - Providers are rebuilt from their handler identifier via a factory table
//! - Content types and the type to providers index live in memory
//!
//! # Modules
//!
//! - `domain`: Data structures (ContentItem, ContentSelector, ProviderRecord)
//! - `content_type`: Content type descriptors, actions and registry
//! - `providers`: Provider capability plus SQLite and array providers
//! - `core`: Providers file store and ContentManager
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Register a provider configured in .contentkit/config.yaml
//! contentkit register site.pages
//!
//! # Fetch an item by selector
//! contentkit get 'content>pages,text:slug:home'
//! ```

pub mod cli;
pub mod config;
pub mod content_type;
pub mod core;
pub mod domain;
pub mod error;
pub mod providers;

// Re-export main types at crate root for convenience
pub use content_type::{ContentTypeDescriptor, ContentTypeRegistry, ContentTypeSchema};
pub use core::{ContentManager, ManagerOptions};
pub use domain::{ContentData, ContentFilter, ContentItem, ContentSelector, ProviderRecord, SelectorType};
pub use error::{ContentError, Result};
pub use providers::{ContentProvider, ProviderFactories, ProviderInfo};
