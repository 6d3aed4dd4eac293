//! Configuration for contentkit.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CONTENTKIT_HOME, CONTENTKIT_PROVIDERS_FILE)
//! 2. Config file (.contentkit/config.yaml)
//! 3. Defaults (~/.contentkit)
//!
//! Config file discovery:
//! - Searches current directory and parents for .contentkit/config.yaml
//! - `paths.home` is relative to the .contentkit/ directory
//! - Source paths are relative to the project root (parent of .contentkit/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::content_type::DeclaredContentType;
use crate::core::ManagerOptions;

/// Providers file name inside `<home>/config/`
pub const PROVIDERS_FILE_NAME: &str = "content-providers.json";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub manager: Option<ManagerConfig>,
    #[serde(default)]
    pub content_types: Vec<DeclaredContentType>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .contentkit/)
    pub home: Option<String>,
    /// Providers file (relative to home)
    pub providers_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagerConfig {
    pub index_on_register: Option<bool>,
    pub prune_index_on_unregister: Option<bool>,
    pub filter_providers_by_content_type: Option<bool>,
}

impl ManagerConfig {
    fn resolve(&self) -> ManagerOptions {
        let defaults = ManagerOptions::default();
        ManagerOptions {
            index_on_register: self.index_on_register.unwrap_or(defaults.index_on_register),
            prune_index_on_unregister: self
                .prune_index_on_unregister
                .unwrap_or(defaults.prune_index_on_unregister),
            filter_providers_by_content_type: self
                .filter_providers_by_content_type
                .unwrap_or(defaults.filter_providers_by_content_type),
        }
    }
}

/// Kind of data source behind a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// SQLite table
    Sqlite,

    /// JSON file holding an array of records
    Json,
}

/// A data source exposed as a content provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Factory identifier stored in registration records
    pub handler: String,
    pub kind: SourceKind,
    /// Database or JSON file path (relative to the project root)
    pub path: PathBuf,
    /// Table name (sqlite sources)
    #[serde(default)]
    pub table: Option<String>,
    /// Provider name
    pub name: String,
    /// Provider title
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Supported content types (defaults to ["text"])
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the state directory
    pub home: PathBuf,
    /// Absolute path to the providers file
    pub providers_file: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Manager behavior switches
    pub manager: ManagerOptions,
    /// Content types declared in the config file
    pub content_types: Vec<DeclaredContentType>,
    /// Data sources with resolved paths
    pub sources: Vec<SourceConfig>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".contentkit").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Default providers file location under a home directory
fn default_providers_file(home: &Path) -> PathBuf {
    home.join("config").join(PROVIDERS_FILE_NAME)
}

/// Build the resolved configuration from an optional config file
fn resolve_config(config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".contentkit");

    let env_home = std::env::var("CONTENTKIT_HOME").ok().map(PathBuf::from);
    let env_providers = std::env::var("CONTENTKIT_PROVIDERS_FILE")
        .ok()
        .map(PathBuf::from);

    let Some(config_path) = config_path else {
        // No config file - use env vars or defaults
        let home = env_home.unwrap_or(default_home);
        let providers_file = env_providers.unwrap_or_else(|| default_providers_file(&home));

        return Ok(ResolvedConfig {
            home,
            providers_file,
            config_file: None,
            manager: ManagerOptions::default(),
            content_types: Vec::new(),
            sources: Vec::new(),
        });
    };

    let config = load_config_file(config_path)?;

    // .contentkit/ and the project root above it
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let base_dir = config_dir.parent().unwrap_or(Path::new("."));

    let home = if let Some(home) = env_home {
        home
    } else if let Some(ref home_path) = config.paths.home {
        resolve_path(config_dir, home_path)
    } else {
        default_home
    };

    let providers_file = if let Some(path) = env_providers {
        path
    } else if let Some(ref path) = config.paths.providers_file {
        resolve_path(&home, path)
    } else {
        default_providers_file(&home)
    };

    let manager = config
        .manager
        .as_ref()
        .map(ManagerConfig::resolve)
        .unwrap_or_default();

    let sources = config
        .sources
        .into_iter()
        .map(|mut source| {
            source.path = resolve_path(base_dir, &source.path.to_string_lossy());
            source
        })
        .collect();

    Ok(ResolvedConfig {
        home,
        providers_file,
        config_file: Some(config_path.to_path_buf()),
        manager,
        content_types: config.content_types,
        sources,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    resolve_config(find_config_file().as_deref())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the contentkit state directory.
pub fn contentkit_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the providers file path.
pub fn providers_file() -> Result<PathBuf> {
    Ok(config()?.providers_file.clone())
}
