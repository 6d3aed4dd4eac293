//! Core registry logic.
//!
//! This module contains:
//! - ProviderStore: Persisted provider registration records
//! - ContentManager: Provider registration and resolution

pub mod manager;
pub mod store;

// Re-export commonly used types
pub use manager::{ContentManager, ManagerOptions};
pub use store::{lock_path, ProviderStore, StoreLock, STORE_VERSION};
