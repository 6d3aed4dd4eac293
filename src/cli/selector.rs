//! Selector CLI subcommands.
//!
//! Provides commands to:
//! - `parse`: Decode a selector and print its parts as JSON
//! - `check`: Validate a selector (exit status reflects validity)
//! - `create`: Build a selector string from its parts

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};

use crate::domain::{ContentSelector, SelectorType};

/// Selector-related subcommands
#[derive(Subcommand, Debug)]
pub enum SelectorCommands {
    /// Decode a selector
    Parse {
        /// Selector string (e.g. "content>blog,post:title:hello")
        selector: String,
    },

    /// Check whether a selector is valid
    Check {
        /// Selector string
        selector: String,
    },

    /// Build a selector from its parts
    Create {
        /// Provider name
        provider: String,

        /// Content type name
        content_type: String,

        /// Key fields (comma-separated)
        key_fields: String,

        /// Key values (comma-separated)
        key: String,

        /// Selector type
        #[arg(short = 't', long = "type", value_enum, default_value = "content")]
        kind: SelectorKind,
    },
}

/// Selector type for CLI (maps to SelectorType)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SelectorKind {
    /// Registered content provider
    Content,

    /// Database model
    Model,

    /// Static array
    Array,
}

impl From<SelectorKind> for SelectorType {
    fn from(kind: SelectorKind) -> Self {
        match kind {
            SelectorKind::Content => SelectorType::Content,
            SelectorKind::Model => SelectorType::Model,
            SelectorKind::Array => SelectorType::Array,
        }
    }
}

impl SelectorCommands {
    /// Execute the selector subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            SelectorCommands::Parse { selector } => parse(&selector),
            SelectorCommands::Check { selector } => check(&selector),
            SelectorCommands::Create {
                provider,
                content_type,
                key_fields,
                key,
                kind,
            } => {
                println!(
                    "{}",
                    ContentSelector::create(&provider, &content_type, &key_fields, &key, kind.into())
                );
                Ok(())
            }
        }
    }
}

fn parse(selector: &str) -> Result<()> {
    let parsed = ContentSelector::parse(selector)
        .with_context(|| format!("Failed to parse selector: {}", selector))?;

    match parsed {
        Some(parsed) => println!("{}", serde_json::to_string_pretty(&parsed)?),
        None => println!("(empty selector)"),
    }

    Ok(())
}

fn check(selector: &str) -> Result<()> {
    if ContentSelector::is_valid(selector) {
        println!("valid");
        Ok(())
    } else {
        anyhow::bail!("Not a valid content selector: {:?}", selector)
    }
}
