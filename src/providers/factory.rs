//! Provider factory table.
//!
//! Registration records store a handler identifier; the manager turns it back
//! into a provider instance through the constructor registered here at
//! startup.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use super::{ArrayProvider, ContentProvider, ProviderInfo, SqliteProvider};
use crate::config::{SourceConfig, SourceKind};
use crate::error::Result;

type ProviderFactory = Arc<dyn Fn() -> Result<Box<dyn ContentProvider>> + Send + Sync>;

/// Handler identifier to provider constructor table
#[derive(Default, Clone)]
pub struct ProviderFactories {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a handler identifier (replaces any previous one)
    pub fn register<F>(&mut self, handler: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn ContentProvider>> + Send + Sync + 'static,
    {
        self.factories.insert(handler.into(), Arc::new(factory));
    }

    /// Build a provider; `None` when the handler is unknown
    pub fn create(&self, handler: &str) -> Option<Result<Box<dyn ContentProvider>>> {
        self.factories.get(handler).map(|factory| factory())
    }

    pub fn contains(&self, handler: &str) -> bool {
        self.factories.contains_key(handler)
    }

    /// Build factories for configured data sources
    pub async fn from_sources(sources: &[SourceConfig]) -> anyhow::Result<Self> {
        let mut factories = Self::new();
        for source in sources {
            factories.register_source(source).await?;
        }
        Ok(factories)
    }

    /// Register a factory for one configured data source.
    ///
    /// SQLite sources open a connection per instance; JSON sources are read
    /// once here and copied into each instance.
    pub async fn register_source(&mut self, source: &SourceConfig) -> anyhow::Result<()> {
        let mut info = ProviderInfo::new(&source.name, &source.title);
        info.category = source.category.clone();
        info.content_types = source.types.clone();
        let handler = source.handler.clone();

        match source.kind {
            SourceKind::Sqlite => {
                let table = source
                    .table
                    .clone()
                    .with_context(|| format!("SQLite source '{}' has no table", source.handler))?;
                let path = source.path.clone();
                self.register(source.handler.clone(), move || {
                    Ok(Box::new(SqliteProvider::open(
                        handler.clone(),
                        &path,
                        table.clone(),
                        info.clone(),
                    )?))
                });
            }
            SourceKind::Json => {
                let items = ArrayProvider::from_json_file(handler.clone(), info.clone(), &source.path)
                    .await?
                    .into_items();
                self.register(source.handler.clone(), move || {
                    Ok(Box::new(ArrayProvider::new(
                        handler.clone(),
                        info.clone(),
                        items.clone(),
                    )))
                });
            }
        }

        debug!(handler = %source.handler, kind = ?source.kind, "Registered provider source");
        Ok(())
    }

    /// Registered handler identifiers, sorted
    pub fn handlers(&self) -> Vec<&str> {
        let mut handlers: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        handlers.sort_unstable();
        handlers
    }
}

impl std::fmt::Debug for ProviderFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactories")
            .field("handlers", &self.handlers())
            .finish()
    }
}
