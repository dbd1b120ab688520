//! Collection store abstraction and backends for the Paulo Cell backend.
//!
//! The store holds named, ordered collections of JSON records: one active
//! and one shadow (`deleted_*`) collection per entity kind. The trait adds
//! one operation beyond the original key-value contract, `write_batch`,
//! which applies a set of whole-collection rewrites atomically; the trash
//! subsystem stages every cascade through it.

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{MemoryStore, SqliteStore};
pub use error::{StoreError, StoreResult};
pub use traits::{CollectionStore, WriteBatch};

use paulocell_core::config::StoreConfig;
use std::sync::Arc;

/// Create a collection store from configuration.
pub async fn from_config(config: &StoreConfig) -> StoreResult<Arc<dyn CollectionStore>> {
    match config {
        StoreConfig::Sqlite { path } => {
            tracing::info!(path = %path.display(), "Opening SQLite collection store");
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn CollectionStore>)
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory collection store; data will not survive restarts");
            Ok(Arc::new(MemoryStore::new()) as Arc<dyn CollectionStore>)
        }
    }
}
