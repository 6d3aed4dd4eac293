//! Error taxonomy for the content registry.
//!
//! Structural and configuration problems are errors. "Not found" is never an
//! error: lookups return `Ok(None)` or `false` instead.

use thiserror::Error;

/// Errors raised by selectors, content types, providers and the manager
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Not a valid content provider: handler '{0}' has no registered factory")]
    InvalidProviderType(String),

    #[error("Not a valid content provider name")]
    MissingProviderName,

    #[error("Content provider '{0}' has no title")]
    MissingProviderTitle(String),

    #[error("Not a valid content selector type: {0}")]
    InvalidSelectorType(String),

    #[error("Content type defined by {0} did not set a name")]
    MissingContentTypeName(String),

    #[error("Unknown content action handler: {0}")]
    UnknownActionHandler(String),

    #[error("Invalid content filter: {0}")]
    InvalidFilter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result alias used throughout the library
pub type Result<T, E = ContentError> = std::result::Result<T, E>;
