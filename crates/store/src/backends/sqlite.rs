//! SQLite-backed collection store.

use crate::error::{StoreError, StoreResult};
use crate::traits::{CollectionStore, WriteBatch};
use async_trait::async_trait;
use paulocell_core::Collection;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS collections (
    collection TEXT NOT NULL,
    position   INTEGER NOT NULL,
    record     TEXT NOT NULL,
    PRIMARY KEY (collection, position)
);
";

/// Collection store backed by a SQLite database file.
///
/// Each collection is a run of rows ordered by `position`; records are
/// stored as JSON text. Batches run in a single transaction.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) a SQLite store at the given path.
    pub async fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Internal(format!("create {}: {e}", parent.display())))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection
            // avoids persistent "database is locked" failures under load.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn put_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        collection: Collection,
        records: &[Value],
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM collections WHERE collection = ?")
            .bind(collection.name())
            .execute(&mut **tx)
            .await?;

        for (position, record) in records.iter().enumerate() {
            sqlx::query("INSERT INTO collections (collection, position, record) VALUES (?, ?, ?)")
                .bind(collection.name())
                .bind(position as i64)
                .bind(record.to_string())
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl CollectionStore for SqliteStore {
    async fn get_collection(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT record FROM collections WHERE collection = ? ORDER BY position",
        )
        .bind(collection.name())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|raw| {
                serde_json::from_str(raw).map_err(|source| StoreError::MalformedRecord {
                    collection: collection.name(),
                    source,
                })
            })
            .collect()
    }

    async fn put_collection(
        &self,
        collection: Collection,
        records: Vec<Value>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::put_in_tx(&mut tx, collection, &records).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn append(&self, collection: Collection, record: Value) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let next: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM collections WHERE collection = ?",
        )
        .bind(collection.name())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO collections (collection, position, record) VALUES (?, ?, ?)")
            .bind(collection.name())
            .bind(next)
            .bind(record.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for (collection, records) in batch.into_writes() {
            Self::put_in_tx(&mut tx, collection, &records).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
