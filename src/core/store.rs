//! Providers file persistence.
//!
//! The providers file is a small JSON document holding every registration
//! record in insertion order:
//!
//! ```json
//! {
//!   "version": 1,
//!   "providers": [
//!     { "handler": "blog.posts", "name": "blog", "title": "Blog",
//!       "type": ["post"], "category": "news" }
//!   ]
//! }
//! ```
//!
//! The whole file is read and rewritten on every change. Writers hold an
//! exclusive lock on a sidecar `.lock` file for the read-modify-write cycle.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ProviderRecord;
use crate::error::Result;

/// Current providers file format version
pub const STORE_VERSION: u32 = 1;

/// All provider registration records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStore {
    /// File format version
    pub version: u32,

    /// Records in insertion order, unique by name
    #[serde(default)]
    pub providers: Vec<ProviderRecord>,
}

impl Default for ProviderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            providers: Vec::new(),
        }
    }

    /// Load the store from disk (a missing file is an empty store)
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let store: Self = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} provider records from {}",
            store.providers.len(),
            path.display()
        );
        Ok(store)
    }

    /// Write the store to disk, replacing the file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut file = tempfile::NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n")?;
        file.flush()?;
        file.persist(path).map_err(|e| e.error)?;

        debug!(
            "Saved {} provider records to {}",
            self.providers.len(),
            path.display()
        );
        Ok(())
    }

    /// Insert a record, replacing one with the same name in place
    pub fn insert(&mut self, record: ProviderRecord) {
        if let Some(existing) = self.providers.iter_mut().find(|r| r.name == record.name) {
            *existing = record;
        } else {
            self.providers.push(record);
        }
    }

    /// Get a record by provider name
    pub fn get(&self, name: &str) -> Option<&ProviderRecord> {
        self.providers.iter().find(|r| r.name == name)
    }

    /// Remove a record by provider name
    pub fn remove(&mut self, name: &str) -> Option<ProviderRecord> {
        let pos = self.providers.iter().position(|r| r.name == name)?;
        Some(self.providers.remove(pos))
    }

    pub fn records(&self) -> &[ProviderRecord] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Exclusive advisory lock guarding a providers file
///
/// Released when dropped.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Block until the lock for `store_path` is held
    pub fn acquire(store_path: &Path) -> Result<Self> {
        let path = lock_path(store_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        FileExt::lock_exclusive(&file)?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Sidecar lock file path (`<file>.lock`)
pub fn lock_path(store_path: &Path) -> PathBuf {
    let mut name = store_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
