use std::sync::Arc;

use super::{Lock, LockError};

/// Factory trait for obtaining per-key locks.
///
/// `RecordStore` asks for one lock per collection name, so mutations of
/// different collections never contend with each other.
pub trait LockManager: Send + Sync {
    /// The concrete lock type returned by this manager.
    type Lock: Lock;

    /// Get (or create) the lock for the given key.
    ///
    /// Repeated calls with the same `key` must return the same `Arc`.
    fn get_lock(&self, key: &str) -> Result<Arc<Self::Lock>, LockError>;
}
