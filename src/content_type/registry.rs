//! In-memory content type catalog.
//!
//! Holds registered content type descriptors plus the index of provider names
//! per content type. Nothing here is persisted: content types are registered
//! by bootstrap code, the index is rebuilt from provider registrations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::actions::{ActionFactories, ContentAction};
use super::descriptor::{ContentTypeDescriptor, ContentTypeSchema};
use crate::error::Result;

/// Content type name to descriptor mapping, with a type to providers index
#[derive(Debug, Default)]
pub struct ContentTypeRegistry {
    types: HashMap<String, Arc<ContentTypeDescriptor>>,
    providers: HashMap<String, Vec<String>>,
    actions: ActionFactories,
}

impl ContentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing one with the same name
    pub fn register(&mut self, descriptor: ContentTypeDescriptor) -> Arc<ContentTypeDescriptor> {
        let descriptor = Arc::new(descriptor);
        debug!("Registered content type: {}", descriptor.name());
        self.types
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        descriptor
    }

    /// Build and register a content type from its schema
    pub fn register_schema<S: ContentTypeSchema>(
        &mut self,
        schema: &S,
    ) -> Result<Arc<ContentTypeDescriptor>> {
        Ok(self.register(ContentTypeDescriptor::build(schema)?))
    }

    pub fn has(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ContentTypeDescriptor>> {
        self.types.get(name).cloned()
    }

    /// Registered content type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Append a provider to a content type's list. Duplicates are kept.
    pub fn add_provider(&mut self, content_type: &str, provider: &str) {
        self.providers
            .entry(content_type.to_string())
            .or_default()
            .push(provider.to_string());
    }

    /// Providers indexed for a content type, in registration order
    pub fn providers(&self, content_type: &str) -> &[String] {
        self.providers
            .get(content_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Remove a provider from every content type's list
    pub fn remove_provider(&mut self, provider: &str) {
        for names in self.providers.values_mut() {
            names.retain(|name| name != provider);
        }
    }

    /// Action factory table shared by all content types
    pub fn action_factories(&self) -> &ActionFactories {
        &self.actions
    }

    pub fn action_factories_mut(&mut self) -> &mut ActionFactories {
        &mut self.actions
    }

    /// Resolve the actions of a content type (`Ok(None)` if the type is unknown)
    pub fn actions(&self, name: &str) -> Result<Option<HashMap<String, Box<dyn ContentAction>>>> {
        match self.types.get(name) {
            Some(descriptor) => descriptor.actions(&self.actions).map(Some),
            None => Ok(None),
        }
    }
}
