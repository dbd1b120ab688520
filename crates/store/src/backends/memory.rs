//! In-memory collection store.

use crate::error::StoreResult;
use crate::traits::{CollectionStore, WriteBatch};
use async_trait::async_trait;
use paulocell_core::Collection;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Collection store backed by process memory.
///
/// Contents vanish on restart, like the browser-local storage the original
/// frontend used. Batches apply under a single write lock, so readers never
/// observe a half-applied cascade.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn get_collection(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection.name()).cloned().unwrap_or_default())
    }

    async fn put_collection(
        &self,
        collection: Collection,
        records: Vec<Value>,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections.insert(collection.name(), records);
        Ok(())
    }

    async fn append(&self, collection: Collection, record: Value) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections.entry(collection.name()).or_default().push(record);
        Ok(())
    }

    async fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        for (collection, records) in batch.into_writes() {
            collections.insert(collection.name(), records);
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
