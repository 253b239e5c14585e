use thiserror::Error;

use crate::lock::LockError;
use crate::snapshot::SnapshotError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The stored snapshot does not parse as a record array. Never repaired
    /// automatically.
    #[error("malformed snapshot for {collection}: {reason}")]
    MalformedSnapshot { collection: String, reason: String },

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("lock error on {collection}: {source}")]
    Lock {
        collection: String,
        #[source]
        source: LockError,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        StoreError::InvalidState(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, StoreError::InvalidState(_))
    }
}
