//! Common test utilities and fixtures.

use async_trait::async_trait;
use paulocell_core::config::TrashConfig;
use paulocell_core::{Collection, Customer, Device, Document, Entity, Service, Trashed};
use paulocell_store::{CollectionStore, MemoryStore, StoreError, StoreResult, WriteBatch};
use paulocell_trash::TrashBin;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use time::OffsetDateTime;

/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub fn test_bin() -> (Arc<MemoryStore>, TrashBin) {
    let store = Arc::new(MemoryStore::new());
    let bin = TrashBin::new(store.clone(), &TrashConfig::default());
    (store, bin)
}

#[allow(dead_code)]
pub fn customer(id: &str, name: &str) -> Customer {
    let mut extra = Map::new();
    extra.insert("name".into(), Value::String(name.into()));
    Customer {
        id: id.into(),
        extra,
    }
}

#[allow(dead_code)]
pub fn device(id: &str, owner: &str) -> Device {
    Device {
        id: id.into(),
        owner: owner.into(),
        extra: Map::new(),
    }
}

#[allow(dead_code)]
pub fn service(id: &str, customer_id: &str, device_id: Option<&str>) -> Service {
    Service {
        id: id.into(),
        customer_id: customer_id.into(),
        device_id: device_id.map(Into::into),
        extra: Map::new(),
    }
}

#[allow(dead_code)]
pub fn document(id: &str, customer_id: &str) -> Document {
    Document {
        id: id.into(),
        customer_id: customer_id.into(),
        extra: Map::new(),
    }
}

/// Seed an active collection with typed records.
#[allow(dead_code)]
pub async fn seed_active<R: Entity>(store: &dyn CollectionStore, records: &[R]) {
    let values = records
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();
    store.put_collection(R::KIND.active(), values).await.unwrap();
}

/// Seed a shadow collection with root tombstones deleted `age_days` ago.
#[allow(dead_code)]
pub async fn seed_trashed<R: Entity>(store: &dyn CollectionStore, records: Vec<R>, age_days: i64) {
    let deleted_at = OffsetDateTime::now_utc() - time::Duration::days(age_days);
    let values = records
        .into_iter()
        .map(|r| serde_json::to_value(Trashed::root(r, deleted_at)).unwrap())
        .collect();
    store.put_collection(R::KIND.trash(), values).await.unwrap();
}

#[allow(dead_code)]
pub async fn active_ids<R: Entity>(store: &dyn CollectionStore) -> Vec<String> {
    store
        .get_collection(R::KIND.active())
        .await
        .unwrap()
        .into_iter()
        .map(|v| v["id"].as_str().unwrap().to_owned())
        .collect()
}

#[allow(dead_code)]
pub async fn trash_ids<R: Entity>(store: &dyn CollectionStore) -> Vec<String> {
    store
        .get_collection(R::KIND.trash())
        .await
        .unwrap()
        .into_iter()
        .map(|v| v["id"].as_str().unwrap().to_owned())
        .collect()
}

/// A store wrapper whose batch commits can be made to fail, for verifying
/// that failed operations leave every collection untouched.
#[allow(dead_code)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_batches: AtomicBool,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            fail_batches: AtomicBool::new(false),
        })
    }

    pub fn fail_batches(&self, fail: bool) {
        self.fail_batches.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CollectionStore for FailingStore {
    async fn get_collection(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        self.inner.get_collection(collection).await
    }

    async fn put_collection(&self, collection: Collection, records: Vec<Value>) -> StoreResult<()> {
        self.inner.put_collection(collection, records).await
    }

    async fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(StoreError::Internal("injected batch failure".into()));
        }
        self.inner.write_batch(batch).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }
}
