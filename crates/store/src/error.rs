//! Collection store error types.

use thiserror::Error;

/// Collection store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed record in collection '{collection}': {source}")]
    MalformedRecord {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for collection store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
