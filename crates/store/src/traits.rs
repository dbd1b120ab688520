//! Collection store trait definitions.

use crate::error::StoreResult;
use async_trait::async_trait;
use paulocell_core::Collection;
use serde_json::Value;

/// A staged set of whole-collection rewrites, applied atomically.
///
/// Cascade operations touch up to eight collections; staging every rewrite
/// in a batch and committing it in one step is what makes "false means
/// nothing changed" literally true for the caller. Later puts for the same
/// collection override earlier ones.
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<(Collection, Vec<Value>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a full rewrite of a collection.
    pub fn put(&mut self, collection: Collection, records: Vec<Value>) {
        self.writes.push((collection, records));
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Consume the batch, yielding the staged writes in order.
    pub fn into_writes(self) -> Vec<(Collection, Vec<Value>)> {
        self.writes
    }
}

/// Ordered record collections keyed by name.
///
/// The contract is storage-agnostic: the reference system backed this with
/// browser-local storage, the backends here use SQLite or process memory.
/// Records are opaque JSON values at this layer; typing happens above.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Current contents of a collection; empty if it has never been written.
    async fn get_collection(&self, collection: Collection) -> StoreResult<Vec<Value>>;

    /// Atomically replace a collection's contents.
    async fn put_collection(&self, collection: Collection, records: Vec<Value>)
    -> StoreResult<()>;

    /// Append a single record. The default is the read-append-write
    /// composition; backends may override with something atomic.
    async fn append(&self, collection: Collection, record: Value) -> StoreResult<()> {
        let mut records = self.get_collection(collection).await?;
        records.push(record);
        self.put_collection(collection, records).await
    }

    /// Atomically apply a set of whole-collection rewrites: either every
    /// staged write lands or none do.
    async fn write_batch(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Check backend connectivity and health.
    async fn health_check(&self) -> StoreResult<()>;
}
