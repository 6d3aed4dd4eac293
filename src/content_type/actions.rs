//! Content actions.
//!
//! Content types list action handlers by identifier. Identifiers resolve to
//! instances through an [`ActionFactories`] table filled at startup.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::ContentItem;
use crate::error::Result;

/// An operation that can be applied to items of a content type
pub trait ContentAction: Send + Sync {
    /// Action name (key in the map returned by `actions()`)
    fn name(&self) -> &str;

    /// Human-readable title
    fn title(&self) -> Option<&str> {
        None
    }

    /// Run the action against an item
    fn execute(&self, item: &ContentItem) -> Result<Value>;
}

type ActionFactory = Arc<dyn Fn() -> Box<dyn ContentAction> + Send + Sync>;

/// Identifier to constructor table for content actions
#[derive(Default, Clone)]
pub struct ActionFactories {
    factories: HashMap<String, ActionFactory>,
}

impl ActionFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under an identifier (replaces any previous one)
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn ContentAction> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
    }

    /// Build a new action instance
    pub fn create(&self, id: &str) -> Option<Box<dyn ContentAction>> {
        self.factories.get(id).map(|factory| factory())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }
}

impl std::fmt::Debug for ActionFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionFactories")
            .field("ids", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
