//! Retention sweep: periodic purge of trash entries older than the
//! retention window.

use crate::engine::TrashBin;
use crate::error::TrashResult;
use paulocell_core::{Customer, Device, Document, Entity, Service, Trashed};
use paulocell_store::WriteBatch;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Per-kind counts of trash entries removed by one sweep.
///
/// Only top-level removals are counted: a device purged because its
/// expired customer was purged in the same pass does not inflate
/// `devices`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    pub customers: usize,
    pub devices: usize,
    pub services: usize,
    pub documents: usize,
}

impl SweepStats {
    pub fn total(&self) -> usize {
        self.customers + self.devices + self.services + self.documents
    }
}

impl TrashBin {
    /// Purge every trash entry that has been deleted for longer than the
    /// retention window.
    ///
    /// Customers go first so that dependents purged alongside an expired
    /// customer are gone before the dependent kinds are examined. Each
    /// kind reads fresh state, so nothing is counted twice.
    pub async fn try_cleanup_expired(&self) -> TrashResult<SweepStats> {
        let cutoff = OffsetDateTime::now_utc() - self.retention();
        let mut stats = SweepStats::default();

        for expired in self.expired_ids::<Customer>(cutoff).await? {
            if self.try_permanently_delete_customer(&expired).await? {
                stats.customers += 1;
            }
        }
        for expired in self.expired_ids::<Device>(cutoff).await? {
            if self.try_permanently_delete_device(&expired).await? {
                stats.devices += 1;
            }
        }
        stats.services += self.purge_expired_leaves::<Service>(cutoff).await?;
        stats.documents += self.purge_expired_leaves::<Document>(cutoff).await?;

        if stats.total() > 0 {
            tracing::info!(
                customers = stats.customers,
                devices = stats.devices,
                services = stats.services,
                documents = stats.documents,
                "Purged expired trash entries"
            );
        } else {
            tracing::debug!("No expired trash entries");
        }
        Ok(stats)
    }

    /// Sweep expired trash entries, absorbing faults.
    ///
    /// Returns the total number of entries removed, or `-1` if the sweep
    /// failed. A partial sweep that fails midway leaves the entries it
    /// already purged removed.
    pub async fn cleanup_expired_trash_items(&self) -> i64 {
        match self.try_cleanup_expired().await {
            Ok(stats) => stats.total() as i64,
            Err(error) => {
                tracing::error!(error = %error, "Trash sweep failed");
                -1
            }
        }
    }

    async fn expired_ids<R: Entity>(&self, cutoff: OffsetDateTime) -> TrashResult<Vec<String>> {
        let trash = self.load_trash::<R>().await?;
        Ok(trash
            .iter()
            .filter(|entry| entry.deleted_at < cutoff)
            .map(|entry| entry.id().to_owned())
            .collect())
    }

    /// Purge all expired entries of a dependent-free kind in one rewrite.
    async fn purge_expired_leaves<R: Entity>(&self, cutoff: OffsetDateTime) -> TrashResult<usize> {
        let trash = self.load_trash::<R>().await?;
        let before = trash.len();
        let kept: Vec<Trashed<R>> = trash
            .into_iter()
            .filter(|entry| entry.deleted_at >= cutoff)
            .collect();
        let purged = before - kept.len();
        if purged > 0 {
            let mut batch = WriteBatch::new();
            batch.put(R::KIND.trash(), crate::engine::encode(&kept)?);
            self.store().write_batch(batch).await?;
        }
        Ok(purged)
    }
}

/// Background task that sweeps the trash on a fixed interval.
///
/// The first sweep runs immediately at spawn. Call [`Sweeper::shutdown`]
/// for an orderly stop.
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweep loop on the current runtime.
    pub fn spawn(bin: TrashBin, interval: std::time::Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            tracing::info!(interval_secs = interval.as_secs(), "Trash sweeper started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        bin.cleanup_expired_trash_items().await;
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::info!("Trash sweeper stopped");
                        return;
                    }
                }
            }
        });
        Self { shutdown_tx, handle }
    }

    /// Stop the sweep loop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
