//! Per-collection exclusive access: the concurrency controller.
//!
//! Every mutation runs load -> mutate -> persist while holding the
//! collection's FIFO lock, so each one observes all mutations that completed
//! before it. Once the body starts it always runs to completion; the only
//! point a caller can give up is while queued for the lock.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::events::{self, StoreEvent};
use crate::lock::{LockGuard, LockManager};
use crate::record::Record;
use crate::snapshot::{SnapshotError, SnapshotRecord, SnapshotStore};

use super::{codec, RecordStore, StorageMode};

/// What an exclusive-access body decided.
#[derive(Debug)]
pub enum Mutation<R, T> {
    /// Persist the given records as the collection's next snapshot, then
    /// hand the value back to the caller.
    Commit(Vec<R>, T),
    /// Leave the snapshot untouched.
    Unchanged(T),
}

impl<S: SnapshotStore> RecordStore<S> {
    /// Run `f` on a fully materialized copy of `R`'s collection while no
    /// other mutation of that collection can run.
    ///
    /// If `f` returns `Mutation::Commit`, the next snapshot is persisted
    /// (durably, or in volatile fallback if the medium rejects the write)
    /// before the lock is released. If `f` fails, or the commit holds
    /// duplicate ids or breaks a record's `check_update`, nothing is written
    /// and the previous snapshot stays authoritative.
    pub fn with_exclusive_access<R, T, F>(&self, f: F) -> Result<T, StoreError>
    where
        R: Record,
        F: FnOnce(Vec<R>) -> Result<Mutation<R, T>, StoreError>,
    {
        let (value, _) = self.transact(f)?;
        Ok(value)
    }

    /// `with_exclusive_access`, also reporting where the snapshot was
    /// committed (`None` when nothing was written).
    pub(crate) fn transact<R, T, F>(&self, f: F) -> Result<(T, Option<StorageMode>), StoreError>
    where
        R: Record,
        F: FnOnce(Vec<R>) -> Result<Mutation<R, T>, StoreError>,
    {
        self.serialized(R::COLLECTION, || {
            let current = self.load::<R>()?;
            let before: HashMap<String, R> = current
                .iter()
                .map(|record| (record.id().to_string(), record.clone()))
                .collect();
            match f(current)? {
                Mutation::Commit(next, value) => {
                    check_commit(&before, &next)?;
                    let mode = self.persist(&next)?;
                    Ok((value, Some(mode)))
                }
                Mutation::Unchanged(value) => Ok((value, None)),
            }
        })
    }

    /// Hold `collection`'s lock for the duration of `f`.
    pub(crate) fn serialized<T, F>(&self, collection: &str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce() -> Result<T, StoreError>,
    {
        let lock_error = |source| StoreError::Lock {
            collection: collection.to_string(),
            source,
        };
        let lock = self.locks.get_lock(collection).map_err(lock_error)?;
        let _guard = LockGuard::acquire(lock, self.lock_timeout).map_err(lock_error)?;
        f()
    }

    /// Write the next snapshot of `R`'s collection. Callers must hold the
    /// collection's lock.
    pub(crate) fn persist<R: Record>(&self, records: &[R]) -> Result<StorageMode, StoreError> {
        let collection = R::COLLECTION;
        let data = codec::encode(records, self.pretty)?;

        if self.fallback.is_active(collection)? && self.fallback.set(collection, data.clone())? {
            debug!(collection, records = records.len(), "snapshot held in volatile fallback");
            return Ok(StorageMode::Volatile);
        }

        let snapshot = SnapshotRecord::new(collection, data);
        match self.snapshots.store(&snapshot) {
            Ok(()) => {
                debug!(collection, records = records.len(), "snapshot committed");
                Ok(StorageMode::Durable)
            }
            Err(SnapshotError::WriteFailure { reason, .. }) => {
                if let Some(state) = self.fallback.enter(collection, reason, snapshot.data)? {
                    warn!(
                        collection,
                        reason = %state.reason,
                        "durable write rejected; collection now served from volatile memory"
                    );
                    self.notify(events::COLLECTION_FALLBACK, || {
                        StoreEvent::fallback(collection, &state.reason)
                    });
                }
                Ok(StorageMode::Volatile)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Ids stay unique and every surviving record passes its own
/// `Record::check_update` against the stored version.
fn check_commit<R: Record>(before: &HashMap<String, R>, next: &[R]) -> Result<(), StoreError> {
    if let Some(duplicate) = codec::duplicate_id(next) {
        return Err(StoreError::invalid_state(format!(
            "{} would hold duplicate id {}",
            R::COLLECTION,
            duplicate
        )));
    }
    for record in next {
        if let Some(stored) = before.get(record.id()) {
            record.check_update(stored)?;
        }
    }
    Ok(())
}
