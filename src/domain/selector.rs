//! Content selectors.
//!
//! A selector is a compact string addressing one content item:
//!
//! ```text
//! {type}>{provider}[,{content_type}]:{key_fields...}:{key_values...}
//! ```
//!
//! e.g. `content>blog,post:title:hello` selects the `post` item of provider
//! `blog` whose `title` is `hello`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::filter::ContentFilter;
use crate::error::{ContentError, Result};

/// Kind of data source a selector points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorType {
    /// Registered content provider
    Content,

    /// Database model
    Model,

    /// Static array
    Array,
}

impl fmt::Display for SelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorType::Content => write!(f, "content"),
            SelectorType::Model => write!(f, "model"),
            SelectorType::Array => write!(f, "array"),
        }
    }
}

impl FromStr for SelectorType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "content" => Ok(SelectorType::Content),
            "model" => Ok(SelectorType::Model),
            "array" => Ok(SelectorType::Array),
            other => Err(ContentError::InvalidSelectorType(other.to_string())),
        }
    }
}

/// Decoded content selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSelector {
    /// Selector type
    #[serde(rename = "type")]
    pub kind: SelectorType,

    /// Provider, model or array name
    pub provider: String,

    /// Content type name (absent when the provider segment has no comma)
    pub content_type: Option<String>,

    /// Key field names
    pub key_fields: Vec<String>,

    /// Key values, positionally matching `key_fields`
    pub key_values: Vec<String>,
}

impl ContentSelector {
    /// Build a selector string. No validation is applied to the parts.
    pub fn create(
        provider: &str,
        content_type: &str,
        key_fields: &str,
        key: &str,
        kind: SelectorType,
    ) -> String {
        format!("{}>{},{}:{}:{}", kind, provider, content_type, key_fields, key)
    }

    /// Parse a selector string.
    ///
    /// Returns `Ok(None)` for an empty string. Missing segments become empty
    /// strings before splitting, so absent key lists decode as `[""]`.
    pub fn parse(selector: &str) -> Result<Option<Self>> {
        if selector.is_empty() {
            return Ok(None);
        }

        let mut tokens = selector.split('>');
        let kind: SelectorType = tokens.next().unwrap_or_default().parse()?;
        let params = tokens.next().unwrap_or_default();

        let mut segments = params.split(':');
        let provider_segment = segments.next().unwrap_or_default();
        let key_fields = segments.next().unwrap_or_default();
        let key_values = segments.next().unwrap_or_default();

        let mut provider_tokens = provider_segment.split(',');
        let provider = provider_tokens.next().unwrap_or_default().to_string();
        let content_type = provider_tokens.next().map(str::to_string);

        Ok(Some(Self {
            kind,
            provider,
            content_type,
            key_fields: split_list(key_fields),
            key_values: split_list(key_values),
        }))
    }

    /// Check a selector without raising errors.
    ///
    /// Requires a known type and a non-empty segment after `>`.
    pub fn is_valid(selector: &str) -> bool {
        if selector.is_empty() {
            return false;
        }

        let mut tokens = selector.split('>');
        let kind = tokens.next().unwrap_or_default();
        if kind.parse::<SelectorType>().is_err() {
            return false;
        }

        matches!(tokens.next(), Some(params) if !params.is_empty())
    }

    /// Convert the key fields and values into a list filter
    pub fn to_filter(&self) -> ContentFilter {
        let mut filter = ContentFilter::new(self.key_fields.iter().cloned());
        for (field, value) in self.key_fields.iter().zip(&self.key_values) {
            filter.key_values.insert(field.clone(), value.clone());
        }
        filter
    }

    /// Lookup key: the key values joined back with commas
    pub fn key(&self) -> String {
        self.key_values.join(",")
    }
}

impl fmt::Display for ContentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.kind, self.provider)?;
        if let Some(ref content_type) = self.content_type {
            write!(f, ",{}", content_type)?;
        }
        write!(
            f,
            ":{}:{}",
            self.key_fields.join(","),
            self.key_values.join(",")
        )
    }
}

fn split_list(segment: &str) -> Vec<String> {
    segment.split(',').map(str::to_string).collect()
}
