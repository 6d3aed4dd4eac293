//! Command-line interface for contentkit.
//!
//! Provides commands for inspecting, registering and unregistering content
//! providers, resolving selectors, and fetching or listing content.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::content_type::TextContentType;
use crate::core::ContentManager;
use crate::domain::{ContentFilter, ContentItem, ContentSelector};
use crate::providers::{ProviderFactories, DEFAULT_PER_PAGE};

pub mod selector;

/// contentkit - Content provider registry
#[derive(Parser, Debug)]
#[command(name = "contentkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered providers
    Providers {
        /// Only providers in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only providers supporting this content type (when enabled in config)
        #[arg(short = 't', long)]
        content_type: Option<String>,
    },

    /// Register the provider built by a configured handler
    Register {
        /// Handler identifier (see `sources` in the config file)
        handler: String,
    },

    /// Unregister a provider
    Unregister {
        /// Provider name
        name: String,
    },

    /// Fetch the item addressed by a selector
    Get {
        /// Selector string (e.g. "content>blog,post:uuid:abc")
        selector: String,
    },

    /// List items of a provider
    List {
        /// Provider name
        provider: String,

        /// Resolve through this content type
        #[arg(short = 't', long)]
        content_type: Option<String>,

        /// Search value applied to every key field
        #[arg(short, long)]
        query: Option<String>,

        /// Key fields to search (comma-separated)
        #[arg(short, long)]
        fields: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Items per page
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },

    /// List content types and their providers
    Types,

    /// Work with content selectors
    Selector {
        #[command(subcommand)]
        command: selector::SelectorCommands,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Providers {
                category,
                content_type,
            } => list_providers(category.as_deref(), content_type.as_deref()).await,
            Commands::Register { handler } => register(&handler).await,
            Commands::Unregister { name } => unregister(&name).await,
            Commands::Get { selector } => get_item(&selector).await,
            Commands::List {
                provider,
                content_type,
                query,
                fields,
                page,
                per_page,
            } => {
                let filter = build_filter(query, fields);
                list_items(&provider, content_type.as_deref(), filter, page, per_page).await
            }
            Commands::Types => list_types().await,
            Commands::Selector { command } => command.execute(),
            Commands::Config => show_config(),
        }
    }
}

/// Build a manager from the resolved configuration
async fn open_manager() -> Result<ContentManager> {
    let cfg = crate::config::config()?;

    let factories = ProviderFactories::from_sources(&cfg.sources).await?;
    let mut manager =
        ContentManager::with_options(&cfg.providers_file, factories, cfg.manager.clone());

    let registry = manager.type_registry_mut();
    registry.register_schema(&TextContentType)?;
    for declared in &cfg.content_types {
        registry
            .register_schema(declared)
            .with_context(|| format!("Invalid content type in config: {}", declared.name))?;
    }

    manager.index_registered_providers()?;
    debug!(providers_file = %cfg.providers_file.display(), "Content manager ready");

    Ok(manager)
}

fn build_filter(query: Option<String>, fields: Option<String>) -> Option<ContentFilter> {
    if query.is_none() && fields.is_none() {
        return None;
    }

    let fields = fields.unwrap_or_else(|| "title".to_string());
    let mut filter = ContentFilter::new(fields.split(',').map(str::trim));
    filter.query = query;
    Some(filter)
}

fn print_items(items: &[ContentItem]) {
    println!("{:<38} {:<40}", "ID", "TITLE");
    println!("{}", "-".repeat(80));

    for item in items {
        let label = item
            .value("title")
            .and_then(|v| v.as_str())
            .unwrap_or(item.title());
        let label = if label.chars().count() > 40 {
            format!("{}...", label.chars().take(37).collect::<String>())
        } else {
            label.to_string()
        };
        println!("{:<38} {:<40}", item.id(), label);
    }
}

/// List registered providers
async fn list_providers(category: Option<&str>, content_type: Option<&str>) -> Result<()> {
    let mut manager = open_manager().await?;
    let records = manager.providers(category, content_type)?;

    if records.is_empty() {
        println!("No providers registered. Use 'contentkit register <handler>' to add one.");
        return Ok(());
    }

    println!("{:<20} {:<24} {:<12} {:<20}", "NAME", "HANDLER", "CATEGORY", "TYPES");
    println!("{}", "-".repeat(80));

    for record in &records {
        println!(
            "{:<20} {:<24} {:<12} {:<20}",
            record.name,
            record.handler,
            record.category.as_deref().unwrap_or("-"),
            record.content_types.join(",")
        );
    }

    println!("\nTotal: {} providers", records.len());

    Ok(())
}

/// Register the provider built by a handler
async fn register(handler: &str) -> Result<()> {
    let mut manager = open_manager().await?;

    let provider = manager
        .factories()
        .create(handler)
        .with_context(|| format!("Unknown provider handler: {}", handler))??;

    manager.register_provider(provider.as_ref())?;
    println!(
        "Registered provider '{}' ({})",
        provider.provider_name()?,
        handler
    );

    Ok(())
}

/// Unregister a provider
async fn unregister(name: &str) -> Result<()> {
    let mut manager = open_manager().await?;
    let existed = manager.has_provider(name)?;

    manager.unregister_provider(name)?;

    if existed {
        println!("Unregistered provider '{}'", name);
    } else {
        println!("Provider '{}' is not registered", name);
    }

    Ok(())
}

/// Fetch the item addressed by a selector
async fn get_item(selector: &str) -> Result<()> {
    let parsed = ContentSelector::parse(selector)?
        .context("Selector is empty")?;

    let mut manager = open_manager().await?;
    match manager.fetch(&parsed).await? {
        Some(item) => println!("{}", serde_json::to_string_pretty(&item)?),
        None => anyhow::bail!("No content found for selector: {}", selector),
    }

    Ok(())
}

/// List items of a provider
async fn list_items(
    provider_name: &str,
    content_type: Option<&str>,
    filter: Option<ContentFilter>,
    page: usize,
    per_page: usize,
) -> Result<()> {
    let mut manager = open_manager().await?;

    let provider = match content_type {
        Some(content_type) => manager.content_type(content_type, Some(provider_name))?,
        None => manager.provider(provider_name)?,
    }
    .with_context(|| format!("Provider not found: {}", provider_name))?;

    let items = provider
        .get_content_list(filter.as_ref(), page, per_page)
        .await?;

    if items.is_empty() {
        println!("No items found.");
        return Ok(());
    }

    print_items(&items);

    match provider.items_count().await? {
        Some(total) => println!("\nPage {}: {} of {} items", page, items.len(), total),
        None => println!("\nPage {}: {} items", page, items.len()),
    }

    Ok(())
}

/// List content types and the providers indexed for them
async fn list_types() -> Result<()> {
    let manager = open_manager().await?;
    let registry = manager.type_registry();

    for name in registry.names() {
        let Some(descriptor) = registry.get(name) else {
            continue;
        };

        println!("{} ({})", descriptor.name(), descriptor.display_title());
        if let Some(category) = descriptor.category() {
            println!("  Category:  {}", category);
        }
        let fields: Vec<String> = descriptor
            .fields()
            .iter()
            .map(|f| format!("{}:{}", f.name, f.field_type))
            .collect();
        println!("  Fields:    {}", fields.join(", "));
        if !descriptor.action_handlers().is_empty() {
            println!("  Actions:   {}", descriptor.action_handlers().join(", "));
        }
        let providers = registry.providers(name);
        if providers.is_empty() {
            println!("  Providers: (none)");
        } else {
            println!("  Providers: {}", providers.join(", "));
        }
    }

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = crate::config::config()?;

    println!("{}", "=".repeat(64));
    println!("  contentkit configuration");
    println!("{}", "=".repeat(64));
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:           {}", cfg.home.display());
    println!("  Providers file: {}", cfg.providers_file.display());
    println!();
    println!("Manager:");
    println!("  Index on register:         {}", cfg.manager.index_on_register);
    println!("  Prune index on unregister: {}", cfg.manager.prune_index_on_unregister);
    println!(
        "  Filter by content type:    {}",
        cfg.manager.filter_providers_by_content_type
    );
    println!();
    println!("Sources:");
    if cfg.sources.is_empty() {
        println!("  (none)");
    } else {
        for source in &cfg.sources {
            println!(
                "  {} [{:?}] {} -> {}",
                source.handler,
                source.kind,
                source.name,
                source.path.display()
            );
        }
    }
    println!();
    println!("Declared content types: {}", cfg.content_types.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_list() {
        let cli = Cli::parse_from([
            "contentkit", "list", "blog", "-q", "rust", "-f", "title,slug", "--page", "2",
        ]);

        match cli.command {
            Commands::List {
                provider,
                query,
                fields,
                page,
                per_page,
                ..
            } => {
                assert_eq!(provider, "blog");
                assert_eq!(query.as_deref(), Some("rust"));
                assert_eq!(fields.as_deref(), Some("title,slug"));
                assert_eq!(page, 2);
                assert_eq!(per_page, DEFAULT_PER_PAGE);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_build_filter() {
        assert!(build_filter(None, None).is_none());

        let filter = build_filter(Some("rust".to_string()), None).unwrap();
        assert_eq!(filter.key_fields, Some(vec!["title".to_string()]));
        assert_eq!(filter.value_for("title"), "rust");

        let filter = build_filter(None, Some("title, slug".to_string())).unwrap();
        assert_eq!(
            filter.key_fields,
            Some(vec!["title".to_string(), "slug".to_string()])
        );
    }
}
