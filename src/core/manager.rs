//! Content provider registry manager.
//!
//! Coordinates the persisted providers file, the provider factory table and
//! the content type registry: registers and unregisters providers, resolves
//! provider/content-type pairs into provider instances, and wraps raw data
//! into content items.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::store::{ProviderStore, StoreLock};
use crate::content_type::ContentTypeRegistry;
use crate::domain::{resolve_content_id, ContentData, ContentItem, ContentSelector, ProviderRecord};
use crate::error::{ContentError, Result};
use crate::providers::{ContentProvider, ProviderFactories};

/// Key fields looked up directly with `ContentProvider::get`
const DIRECT_KEY_FIELDS: [&str; 3] = ["uuid", "id", "slug"];

/// Behavior switches for the manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Index a provider under its content types when it is registered
    pub index_on_register: bool,

    /// Remove an unregistered provider from the content type index
    pub prune_index_on_unregister: bool,

    /// Apply the `content_type` argument of `providers()`
    pub filter_providers_by_content_type: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            index_on_register: true,
            prune_index_on_unregister: false,
            filter_providers_by_content_type: false,
        }
    }
}

/// Registry of content providers backed by a providers file
#[derive(Debug)]
pub struct ContentManager {
    /// Path to the providers file
    providers_file: PathBuf,

    /// Loaded registration records (`None` until first load)
    store: Option<ProviderStore>,

    /// Content types and the type to providers index
    types: ContentTypeRegistry,

    /// Handler identifier to provider constructor table
    factories: ProviderFactories,

    options: ManagerOptions,
}

impl ContentManager {
    /// Create a manager with default options
    pub fn new(providers_file: impl Into<PathBuf>, factories: ProviderFactories) -> Self {
        Self::with_options(providers_file, factories, ManagerOptions::default())
    }

    /// Create a manager with explicit options
    pub fn with_options(
        providers_file: impl Into<PathBuf>,
        factories: ProviderFactories,
        options: ManagerOptions,
    ) -> Self {
        Self {
            providers_file: providers_file.into(),
            store: None,
            types: ContentTypeRegistry::new(),
            factories,
            options,
        }
    }

    pub fn providers_file(&self) -> &Path {
        &self.providers_file
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    pub fn factories(&self) -> &ProviderFactories {
        &self.factories
    }

    pub fn factories_mut(&mut self) -> &mut ProviderFactories {
        &mut self.factories
    }

    pub fn type_registry(&self) -> &ContentTypeRegistry {
        &self.types
    }

    pub fn type_registry_mut(&mut self) -> &mut ContentTypeRegistry {
        &mut self.types
    }

    /// Check whether a content type is registered
    pub fn has_content_type(&self, name: &str) -> bool {
        self.types.has(name)
    }

    /// Load the providers file unless already loaded (or `reload` is set)
    pub fn load(&mut self, reload: bool) -> Result<()> {
        if self.store.is_none() || reload {
            self.store = Some(ProviderStore::load(&self.providers_file)?);
        }
        Ok(())
    }

    fn records(&mut self) -> Result<&[ProviderRecord]> {
        self.load(false)?;
        Ok(self.store.as_ref().map(ProviderStore::records).unwrap_or_default())
    }

    /// List registration records.
    ///
    /// Without arguments every record is returned. Otherwise records are kept
    /// when their category equals `category` exactly (an absent category only
    /// matches absent). Empty strings count as absent arguments. `content_type` is only applied when
    /// `filter_providers_by_content_type` is enabled.
    pub fn providers(
        &mut self,
        category: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<Vec<ProviderRecord>> {
        let filter_type = self.options.filter_providers_by_content_type;
        let category = category.filter(|c| !c.is_empty());
        let content_type = content_type.filter(|t| !t.is_empty());
        let records = self.records()?;

        if category.is_none() && content_type.is_none() {
            return Ok(records.to_vec());
        }

        Ok(records
            .iter()
            .filter(|r| r.category.as_deref() == category)
            .filter(|r| match content_type {
                Some(t) if filter_type => r.supports(t),
                _ => true,
            })
            .cloned()
            .collect())
    }

    /// Build a registered provider by name.
    ///
    /// `Ok(None)` when no record exists or its handler has no factory.
    pub fn provider(&mut self, name: &str) -> Result<Option<Box<dyn ContentProvider>>> {
        self.load(false)?;

        let Some(record) = self.store.as_ref().and_then(|s| s.get(name)) else {
            return Ok(None);
        };

        match self.factories.create(&record.handler) {
            Some(provider) => provider.map(Some),
            None => {
                warn!(
                    provider = name,
                    handler = %record.handler,
                    "No factory registered for provider handler"
                );
                Ok(None)
            }
        }
    }

    /// Check whether a provider can be built
    pub fn has_provider(&mut self, name: &str) -> Result<bool> {
        Ok(self.provider(name)?.is_some())
    }

    /// Resolve a content type to a provider carrying its descriptor.
    ///
    /// Without `provider_name` the first provider indexed for the type is
    /// used. `Ok(None)` when the type or the provider is missing.
    pub fn content_type(
        &mut self,
        name: &str,
        provider_name: Option<&str>,
    ) -> Result<Option<Box<dyn ContentProvider>>> {
        let descriptor = self.types.get(name);
        let provider_name = match provider_name.filter(|n| !n.is_empty()) {
            Some(n) => Some(n.to_string()),
            None => self.types.providers(name).first().cloned(),
        };

        let (Some(descriptor), Some(provider_name)) = (descriptor, provider_name) else {
            return Ok(None);
        };

        let Some(mut provider) = self.provider(&provider_name)? else {
            return Ok(None);
        };

        provider.set_content_type(descriptor);
        Ok(Some(provider))
    }

    /// Wrap raw data into a content item of a registered content type.
    ///
    /// Non-object data is wrapped as `{"0": data}`. The id comes from `uuid`,
    /// then `id`, else a fresh UUID.
    pub fn create_item(&self, data: Value, content_type: &str) -> Option<ContentItem> {
        let descriptor = self.types.get(content_type)?;

        let data = match data {
            Value::Object(map) => map,
            other => {
                let mut map = ContentData::new();
                map.insert("0".to_string(), other);
                map
            }
        };

        let id = resolve_content_id(&data).unwrap_or_else(|| Uuid::new_v4().to_string());
        Some(ContentItem::new(data, descriptor.display_title(), id))
    }

    /// Register a provider and persist its record.
    ///
    /// The providers file is re-read under the store lock so concurrent edits
    /// by other processes are kept.
    #[instrument(skip(self, provider), fields(handler = provider.handler()))]
    pub fn register_provider(&mut self, provider: &dyn ContentProvider) -> Result<()> {
        if !self.factories.contains(provider.handler()) {
            return Err(ContentError::InvalidProviderType(
                provider.handler().to_string(),
            ));
        }

        let record = self.resolve_provider_details(provider)?;

        let _lock = StoreLock::acquire(&self.providers_file)?;
        let mut store = ProviderStore::load(&self.providers_file)?;
        store.insert(record.clone());

        if self.options.index_on_register {
            for content_type in &record.content_types {
                self.types.add_provider(content_type, &record.name);
            }
        }

        store.save(&self.providers_file)?;
        self.store = Some(store);

        info!(provider = %record.name, "Registered content provider");
        Ok(())
    }

    /// Unregister a provider and persist the change.
    ///
    /// Like registration, the providers file is re-read under the store lock.
    /// A provider that cannot be resolved counts as already removed. The
    /// content type index keeps the name unless `prune_index_on_unregister`
    /// is enabled.
    #[instrument(skip(self))]
    pub fn unregister_provider(&mut self, name: &str) -> Result<()> {
        let Some(provider) = self.provider(name)? else {
            debug!("Provider not registered, nothing to remove");
            return Ok(());
        };
        let name = provider.provider_name()?.to_string();

        let _lock = StoreLock::acquire(&self.providers_file)?;
        let mut store = ProviderStore::load(&self.providers_file)?;
        store.remove(&name);

        if self.options.prune_index_on_unregister {
            self.types.remove_provider(&name);
        }

        store.save(&self.providers_file)?;
        self.store = Some(store);

        info!(provider = %name, "Unregistered content provider");
        Ok(())
    }

    /// Project a provider's metadata into a registration record
    pub fn resolve_provider_details(&self, provider: &dyn ContentProvider) -> Result<ProviderRecord> {
        let name = provider.provider_name()?;
        let title = provider
            .provider_title()
            .ok_or_else(|| ContentError::MissingProviderTitle(name.to_string()))?;

        Ok(ProviderRecord {
            handler: provider.handler().to_string(),
            name: name.to_string(),
            title: title.to_string(),
            content_types: provider.supported_content_types(),
            category: provider.provider_category().map(str::to_string),
        })
    }

    /// Index every persisted record under its content types.
    ///
    /// The content type index lives in memory only; call this at startup to
    /// rebuild it from the providers file. Names already indexed for a type
    /// are not added twice.
    pub fn index_registered_providers(&mut self) -> Result<()> {
        self.load(false)?;
        let Some(store) = self.store.as_ref() else {
            return Ok(());
        };

        for record in store.records() {
            for content_type in &record.content_types {
                if !self.types.providers(content_type).contains(&record.name) {
                    self.types.add_provider(content_type, &record.name);
                }
            }
        }

        Ok(())
    }

    /// Resolve the provider a selector points at.
    ///
    /// With a content type the provider is resolved through `content_type`,
    /// otherwise by name.
    pub fn resolve_selector(
        &mut self,
        selector: &ContentSelector,
    ) -> Result<Option<Box<dyn ContentProvider>>> {
        match selector.content_type.as_deref().filter(|t| !t.is_empty()) {
            Some(content_type) => self.content_type(content_type, Some(&selector.provider)),
            None => self.provider(&selector.provider),
        }
    }

    /// Fetch the item a selector addresses.
    ///
    /// A single `uuid`, `id` or `slug` key field is an exact lookup; other key
    /// fields return the first item of the key-field search. Empty key fields
    /// are ignored; a selector with none left addresses nothing.
    pub async fn fetch(&mut self, selector: &ContentSelector) -> Result<Option<ContentItem>> {
        let Some(provider) = self.resolve_selector(selector)? else {
            return Ok(None);
        };

        match selector.key_fields.as_slice() {
            [field] if DIRECT_KEY_FIELDS.contains(&field.as_str()) => {
                provider.get(&selector.key()).await
            }
            fields => {
                let fields: Vec<&String> = fields.iter().filter(|f| !f.is_empty()).collect();
                if fields.is_empty() {
                    return Ok(None);
                }

                let mut filter = selector.to_filter();
                filter.key_fields = Some(fields.into_iter().cloned().collect());
                let items = provider.get_content_list(Some(&filter), 1, 1).await?;
                Ok(items.into_iter().next())
            }
        }
    }
}
