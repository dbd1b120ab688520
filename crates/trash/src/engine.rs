//! The trash bin: cascade deletion, restoration and permanent purge.
//!
//! A customer and its devices, services and documents move to and from the
//! shadow collections as one family. Every operation stages its collection
//! rewrites in a [`WriteBatch`] and commits them in one step, so a `false`
//! result always means nothing changed.

use crate::error::{TrashError, TrashResult};
use paulocell_core::config::TrashConfig;
use paulocell_core::{Collection, Customer, Device, Document, Entity, Service, Trashed};
use paulocell_store::{CollectionStore, WriteBatch};
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;

/// Counts of dependent records touched by a customer- or device-rooted
/// cascade, for logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeStats {
    pub devices: usize,
    pub services: usize,
    pub documents: usize,
}

/// The trash bin over a collection store.
///
/// The `try_*` methods return `Ok(false)` when the root id is not where the
/// operation expects it (active collection for moves, shadow collection for
/// restores and purges) and propagate store faults as errors. The plain
/// methods are the boundary the UI layer calls: they absorb faults into
/// `false` (or an empty list), logging the cause.
#[derive(Clone)]
pub struct TrashBin {
    store: Arc<dyn CollectionStore>,
    retention: time::Duration,
}

impl TrashBin {
    /// Create a trash bin with the configured retention window.
    pub fn new(store: Arc<dyn CollectionStore>, config: &TrashConfig) -> Self {
        Self {
            store,
            retention: time::Duration::days(i64::from(config.retention_days)),
        }
    }

    /// Create a trash bin with an explicit retention window.
    pub fn with_retention(store: Arc<dyn CollectionStore>, retention: time::Duration) -> Self {
        Self { store, retention }
    }

    pub(crate) fn retention(&self) -> time::Duration {
        self.retention
    }

    pub(crate) fn store(&self) -> &Arc<dyn CollectionStore> {
        &self.store
    }

    // =========================================================================
    // Typed collection access
    // =========================================================================

    async fn load_active<R: Entity>(&self) -> TrashResult<Vec<R>> {
        let values = self.store.get_collection(R::KIND.active()).await?;
        decode(R::KIND.active(), values)
    }

    pub(crate) async fn load_trash<R: Entity>(&self) -> TrashResult<Vec<Trashed<R>>> {
        let values = self.store.get_collection(R::KIND.trash()).await?;
        decode(R::KIND.trash(), values)
    }

    // =========================================================================
    // Cascade deletion engine
    // =========================================================================

    /// Move a customer and everything that references it to the trash.
    ///
    /// Devices matching on `owner` and services/documents matching on
    /// `customerId` follow the customer into the shadow collections, all
    /// stamped with the same deletion instant and tagged with the customer
    /// id for later restore or purge.
    pub async fn try_move_customer_to_trash(&self, customer_id: &str) -> TrashResult<bool> {
        let mut customers = self.load_active::<Customer>().await?;
        let Some(idx) = customers.iter().position(|c| c.id == customer_id) else {
            return Ok(false);
        };
        let customer = customers.remove(idx);
        let now = OffsetDateTime::now_utc();

        let mut batch = WriteBatch::new();
        let stats = CascadeStats {
            devices: self
                .stage_cascade_out::<Device, _, _>(
                    &mut batch,
                    |d| d.owner == customer_id,
                    |d| Trashed::with_customer(d, now, customer_id),
                )
                .await?,
            services: self
                .stage_cascade_out::<Service, _, _>(
                    &mut batch,
                    |s| s.customer_id == customer_id,
                    |s| Trashed::with_customer(s, now, customer_id),
                )
                .await?,
            documents: self
                .stage_cascade_out::<Document, _, _>(
                    &mut batch,
                    |d| d.customer_id == customer_id,
                    |d| Trashed::with_customer(d, now, customer_id),
                )
                .await?,
        };

        let mut trash = self.load_trash::<Customer>().await?;
        trash.push(Trashed::root(customer, now));
        batch.put(Customer::KIND.active(), encode(&customers)?);
        batch.put(Customer::KIND.trash(), encode(&trash)?);

        self.store.write_batch(batch).await?;
        tracing::info!(
            customer_id,
            devices = stats.devices,
            services = stats.services,
            documents = stats.documents,
            "Moved customer and related records to trash"
        );
        Ok(true)
    }

    /// Move a single device to the trash, dragging along the services that
    /// reference it. Documents carry no device back-reference, so the
    /// device cascade does not reach them.
    pub async fn try_move_device_to_trash(&self, device_id: &str) -> TrashResult<bool> {
        let mut devices = self.load_active::<Device>().await?;
        let Some(idx) = devices.iter().position(|d| d.id == device_id) else {
            return Ok(false);
        };
        let device = devices.remove(idx);
        let now = OffsetDateTime::now_utc();

        let mut batch = WriteBatch::new();
        let services = self
            .stage_cascade_out::<Service, _, _>(
                &mut batch,
                |s| s.device_id.as_deref() == Some(device_id),
                |s| Trashed::with_device(s, now, device_id),
            )
            .await?;

        let mut trash = self.load_trash::<Device>().await?;
        trash.push(Trashed::root(device, now));
        batch.put(Device::KIND.active(), encode(&devices)?);
        batch.put(Device::KIND.trash(), encode(&trash)?);

        self.store.write_batch(batch).await?;
        tracing::info!(device_id, services, "Moved device and related services to trash");
        Ok(true)
    }

    /// Move a single service to the trash. No dependents.
    pub async fn try_move_service_to_trash(&self, service_id: &str) -> TrashResult<bool> {
        self.try_move_leaf_to_trash::<Service>(service_id).await
    }

    /// Move a single document to the trash. No dependents.
    pub async fn try_move_document_to_trash(&self, document_id: &str) -> TrashResult<bool> {
        self.try_move_leaf_to_trash::<Document>(document_id).await
    }

    async fn try_move_leaf_to_trash<R: Entity>(&self, id: &str) -> TrashResult<bool> {
        let mut active = self.load_active::<R>().await?;
        let Some(idx) = active.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        let record = active.remove(idx);

        let mut trash = self.load_trash::<R>().await?;
        trash.push(Trashed::root(record, OffsetDateTime::now_utc()));

        let mut batch = WriteBatch::new();
        batch.put(R::KIND.active(), encode(&active)?);
        batch.put(R::KIND.trash(), encode(&trash)?);
        self.store.write_batch(batch).await?;

        tracing::info!(id, kind = %R::KIND, "Moved record to trash");
        Ok(true)
    }

    /// Move every dependent of kind `R` selected by `select` from its
    /// active collection into its shadow collection, staging both rewrites.
    async fn stage_cascade_out<R, F, G>(
        &self,
        batch: &mut WriteBatch,
        select: F,
        tag: G,
    ) -> TrashResult<usize>
    where
        R: Entity,
        F: Fn(&R) -> bool,
        G: Fn(R) -> Trashed<R>,
    {
        let active = self.load_active::<R>().await?;
        let (moved, kept): (Vec<R>, Vec<R>) = active.into_iter().partition(|r| select(r));
        if moved.is_empty() {
            return Ok(0);
        }

        let count = moved.len();
        let mut trash = self.load_trash::<R>().await?;
        trash.extend(moved.into_iter().map(tag));

        batch.put(R::KIND.active(), encode(&kept)?);
        batch.put(R::KIND.trash(), encode(&trash)?);
        Ok(count)
    }

    // =========================================================================
    // Restoration engine
    // =========================================================================

    /// Restore a customer from the trash together with every dependent that
    /// was cascaded with it. Restored records are appended at the end of
    /// their active collections with the deletion metadata stripped.
    pub async fn try_restore_customer_from_trash(&self, customer_id: &str) -> TrashResult<bool> {
        let mut trash = self.load_trash::<Customer>().await?;
        let Some(idx) = trash.iter().position(|c| c.id() == customer_id) else {
            return Ok(false);
        };
        let root = trash.remove(idx);

        let mut batch = WriteBatch::new();
        let stats = CascadeStats {
            devices: self
                .stage_cascade_back::<Device, _>(&mut batch, |d| {
                    d.deleted_with_customer.as_deref() == Some(customer_id)
                })
                .await?,
            services: self
                .stage_cascade_back::<Service, _>(&mut batch, |s| {
                    s.deleted_with_customer.as_deref() == Some(customer_id)
                })
                .await?,
            documents: self
                .stage_cascade_back::<Document, _>(&mut batch, |d| {
                    d.deleted_with_customer.as_deref() == Some(customer_id)
                })
                .await?,
        };

        let mut active = self.load_active::<Customer>().await?;
        active.push(root.into_record());
        batch.put(Customer::KIND.active(), encode(&active)?);
        batch.put(Customer::KIND.trash(), encode(&trash)?);

        self.store.write_batch(batch).await?;
        tracing::info!(
            customer_id,
            devices = stats.devices,
            services = stats.services,
            documents = stats.documents,
            "Restored customer and related records from trash"
        );
        Ok(true)
    }

    /// Restore a device and the services that were cascaded with it.
    pub async fn try_restore_device_from_trash(&self, device_id: &str) -> TrashResult<bool> {
        let mut trash = self.load_trash::<Device>().await?;
        let Some(idx) = trash.iter().position(|d| d.id() == device_id) else {
            return Ok(false);
        };
        let root = trash.remove(idx);

        let mut batch = WriteBatch::new();
        let services = self
            .stage_cascade_back::<Service, _>(&mut batch, |s| {
                s.deleted_with_device.as_deref() == Some(device_id)
            })
            .await?;

        let mut active = self.load_active::<Device>().await?;
        active.push(root.into_record());
        batch.put(Device::KIND.active(), encode(&active)?);
        batch.put(Device::KIND.trash(), encode(&trash)?);

        self.store.write_batch(batch).await?;
        tracing::info!(device_id, services, "Restored device and related services from trash");
        Ok(true)
    }

    /// Restore a single service from the trash.
    pub async fn try_restore_service_from_trash(&self, service_id: &str) -> TrashResult<bool> {
        self.try_restore_leaf_from_trash::<Service>(service_id).await
    }

    /// Restore a single document from the trash.
    pub async fn try_restore_document_from_trash(&self, document_id: &str) -> TrashResult<bool> {
        self.try_restore_leaf_from_trash::<Document>(document_id).await
    }

    async fn try_restore_leaf_from_trash<R: Entity>(&self, id: &str) -> TrashResult<bool> {
        let mut trash = self.load_trash::<R>().await?;
        let Some(idx) = trash.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        let record = trash.remove(idx).into_record();

        let mut active = self.load_active::<R>().await?;
        active.push(record);

        let mut batch = WriteBatch::new();
        batch.put(R::KIND.active(), encode(&active)?);
        batch.put(R::KIND.trash(), encode(&trash)?);
        self.store.write_batch(batch).await?;

        tracing::info!(id, kind = %R::KIND, "Restored record from trash");
        Ok(true)
    }

    /// Move dependents of kind `R` selected by `select` back from the
    /// shadow collection into the active collection, stripping the deletion
    /// metadata.
    async fn stage_cascade_back<R, F>(&self, batch: &mut WriteBatch, select: F) -> TrashResult<usize>
    where
        R: Entity,
        F: Fn(&Trashed<R>) -> bool,
    {
        let trash = self.load_trash::<R>().await?;
        let (restored, kept): (Vec<_>, Vec<_>) = trash.into_iter().partition(|r| select(r));
        if restored.is_empty() {
            return Ok(0);
        }

        let count = restored.len();
        let mut active = self.load_active::<R>().await?;
        active.extend(restored.into_iter().map(Trashed::into_record));

        batch.put(R::KIND.active(), encode(&active)?);
        batch.put(R::KIND.trash(), encode(&kept)?);
        Ok(count)
    }

    // =========================================================================
    // Permanent-purge engine
    // =========================================================================

    /// Permanently delete a trashed customer and every dependent tombstone
    /// tagged with its id. Irreversible; nothing is retained.
    pub async fn try_permanently_delete_customer(&self, customer_id: &str) -> TrashResult<bool> {
        let mut trash = self.load_trash::<Customer>().await?;
        let Some(idx) = trash.iter().position(|c| c.id() == customer_id) else {
            return Ok(false);
        };
        trash.remove(idx);

        let mut batch = WriteBatch::new();
        let stats = CascadeStats {
            devices: self
                .stage_purge_dependents::<Device, _>(&mut batch, |d| {
                    d.deleted_with_customer.as_deref() == Some(customer_id)
                })
                .await?,
            services: self
                .stage_purge_dependents::<Service, _>(&mut batch, |s| {
                    s.deleted_with_customer.as_deref() == Some(customer_id)
                })
                .await?,
            documents: self
                .stage_purge_dependents::<Document, _>(&mut batch, |d| {
                    d.deleted_with_customer.as_deref() == Some(customer_id)
                })
                .await?,
        };
        batch.put(Customer::KIND.trash(), encode(&trash)?);

        self.store.write_batch(batch).await?;
        tracing::info!(
            customer_id,
            devices = stats.devices,
            services = stats.services,
            documents = stats.documents,
            "Permanently deleted customer and related tombstones"
        );
        Ok(true)
    }

    /// Permanently delete a trashed device and the service tombstones
    /// tagged with its id.
    pub async fn try_permanently_delete_device(&self, device_id: &str) -> TrashResult<bool> {
        let mut trash = self.load_trash::<Device>().await?;
        let Some(idx) = trash.iter().position(|d| d.id() == device_id) else {
            return Ok(false);
        };
        trash.remove(idx);

        let mut batch = WriteBatch::new();
        let services = self
            .stage_purge_dependents::<Service, _>(&mut batch, |s| {
                s.deleted_with_device.as_deref() == Some(device_id)
            })
            .await?;
        batch.put(Device::KIND.trash(), encode(&trash)?);

        self.store.write_batch(batch).await?;
        tracing::info!(device_id, services, "Permanently deleted device and related tombstones");
        Ok(true)
    }

    /// Permanently delete a single trashed service.
    pub async fn try_permanently_delete_service(&self, service_id: &str) -> TrashResult<bool> {
        self.try_permanently_delete_leaf::<Service>(service_id).await
    }

    /// Permanently delete a single trashed document.
    pub async fn try_permanently_delete_document(&self, document_id: &str) -> TrashResult<bool> {
        self.try_permanently_delete_leaf::<Document>(document_id).await
    }

    async fn try_permanently_delete_leaf<R: Entity>(&self, id: &str) -> TrashResult<bool> {
        let mut trash = self.load_trash::<R>().await?;
        let Some(idx) = trash.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        trash.remove(idx);

        self.store
            .put_collection(R::KIND.trash(), encode(&trash)?)
            .await?;

        tracing::info!(id, kind = %R::KIND, "Permanently deleted record");
        Ok(true)
    }

    /// Drop dependent tombstones of kind `R` selected by `select`, staging
    /// the shadow-collection rewrite.
    async fn stage_purge_dependents<R, F>(
        &self,
        batch: &mut WriteBatch,
        select: F,
    ) -> TrashResult<usize>
    where
        R: Entity,
        F: Fn(&Trashed<R>) -> bool,
    {
        let trash = self.load_trash::<R>().await?;
        let before = trash.len();
        let kept: Vec<_> = trash.into_iter().filter(|r| !select(r)).collect();
        let purged = before - kept.len();
        if purged > 0 {
            batch.put(R::KIND.trash(), encode(&kept)?);
        }
        Ok(purged)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    pub async fn try_deleted_customers(&self) -> TrashResult<Vec<Trashed<Customer>>> {
        self.load_trash::<Customer>().await
    }

    pub async fn try_deleted_devices(&self) -> TrashResult<Vec<Trashed<Device>>> {
        self.load_trash::<Device>().await
    }

    pub async fn try_deleted_services(&self) -> TrashResult<Vec<Trashed<Service>>> {
        self.load_trash::<Service>().await
    }

    pub async fn try_deleted_documents(&self) -> TrashResult<Vec<Trashed<Document>>> {
        self.load_trash::<Document>().await
    }
}

// =============================================================================
// The absorbing facade: what the UI layer calls
// =============================================================================

impl TrashBin {
    pub async fn move_customer_to_trash(&self, customer_id: &str) -> bool {
        absorb("move_customer_to_trash", self.try_move_customer_to_trash(customer_id).await)
    }

    pub async fn move_device_to_trash(&self, device_id: &str) -> bool {
        absorb("move_device_to_trash", self.try_move_device_to_trash(device_id).await)
    }

    pub async fn move_service_to_trash(&self, service_id: &str) -> bool {
        absorb("move_service_to_trash", self.try_move_service_to_trash(service_id).await)
    }

    pub async fn move_document_to_trash(&self, document_id: &str) -> bool {
        absorb("move_document_to_trash", self.try_move_document_to_trash(document_id).await)
    }

    pub async fn restore_customer_from_trash(&self, customer_id: &str) -> bool {
        absorb(
            "restore_customer_from_trash",
            self.try_restore_customer_from_trash(customer_id).await,
        )
    }

    pub async fn restore_device_from_trash(&self, device_id: &str) -> bool {
        absorb(
            "restore_device_from_trash",
            self.try_restore_device_from_trash(device_id).await,
        )
    }

    pub async fn restore_service_from_trash(&self, service_id: &str) -> bool {
        absorb(
            "restore_service_from_trash",
            self.try_restore_service_from_trash(service_id).await,
        )
    }

    pub async fn restore_document_from_trash(&self, document_id: &str) -> bool {
        absorb(
            "restore_document_from_trash",
            self.try_restore_document_from_trash(document_id).await,
        )
    }

    pub async fn permanently_delete_customer(&self, customer_id: &str) -> bool {
        absorb(
            "permanently_delete_customer",
            self.try_permanently_delete_customer(customer_id).await,
        )
    }

    pub async fn permanently_delete_device(&self, device_id: &str) -> bool {
        absorb(
            "permanently_delete_device",
            self.try_permanently_delete_device(device_id).await,
        )
    }

    pub async fn permanently_delete_service(&self, service_id: &str) -> bool {
        absorb(
            "permanently_delete_service",
            self.try_permanently_delete_service(service_id).await,
        )
    }

    pub async fn permanently_delete_document(&self, document_id: &str) -> bool {
        absorb(
            "permanently_delete_document",
            self.try_permanently_delete_document(document_id).await,
        )
    }

    pub async fn deleted_customers(&self) -> Vec<Trashed<Customer>> {
        absorb_list("deleted_customers", self.try_deleted_customers().await)
    }

    pub async fn deleted_devices(&self) -> Vec<Trashed<Device>> {
        absorb_list("deleted_devices", self.try_deleted_devices().await)
    }

    pub async fn deleted_services(&self) -> Vec<Trashed<Service>> {
        absorb_list("deleted_services", self.try_deleted_services().await)
    }

    pub async fn deleted_documents(&self) -> Vec<Trashed<Document>> {
        absorb_list("deleted_documents", self.try_deleted_documents().await)
    }
}

fn absorb(op: &'static str, result: TrashResult<bool>) -> bool {
    match result {
        Ok(changed) => changed,
        Err(error) => {
            tracing::error!(op, error = %error, "Trash operation failed");
            false
        }
    }
}

fn absorb_list<T>(op: &'static str, result: TrashResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(error) => {
            tracing::error!(op, error = %error, "Trash listing failed");
            Vec::new()
        }
    }
}

// =============================================================================
// JSON <-> typed record conversion
// =============================================================================

fn decode<T: serde::de::DeserializeOwned>(
    collection: Collection,
    values: Vec<serde_json::Value>,
) -> TrashResult<Vec<T>> {
    values
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).map_err(|source| TrashError::Record {
                collection: collection.name(),
                source,
            })
        })
        .collect()
}

pub(crate) fn encode<T: Serialize>(items: &[T]) -> TrashResult<Vec<serde_json::Value>> {
    items
        .iter()
        .map(|item| {
            serde_json::to_value(item).map_err(|source| TrashError::Record {
                collection: "<encode>",
                source,
            })
        })
        .collect()
}
