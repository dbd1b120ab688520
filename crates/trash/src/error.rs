//! Trash subsystem error types.

use thiserror::Error;

/// Trash operation errors.
///
/// "Not found" is never an error here: operations on unknown ids resolve to
/// `Ok(false)` so callers can treat them as no-ops. Errors mean the store
/// itself misbehaved.
#[derive(Debug, Error)]
pub enum TrashError {
    #[error("store error: {0}")]
    Store(#[from] paulocell_store::StoreError),

    #[error("malformed record in collection '{collection}': {source}")]
    Record {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for trash operations.
pub type TrashResult<T> = std::result::Result<T, TrashError>;
