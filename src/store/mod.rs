//! RecordStore - the engine every caller goes through.
//!
//! Mutations (`create`, `update`, `delete`, `seed`) run as one serialized
//! read-modify-write transaction per collection. Reads (`get`, `list`,
//! `find`, `stats`) take no lock and see the latest committed snapshot.
//!
//! A collection whose durable medium rejects a write moves to volatile
//! fallback for the rest of the process; callers see no difference beyond
//! [`RecordStore::mode`].

mod codec;
mod exclusive;
mod records;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::StoreError;
#[cfg(feature = "emitter")]
use crate::events::StoreEvents;
use crate::events::{self, StoreEvent};
use crate::fallback::{FallbackState, FallbackStore};
use crate::lock::InMemoryLockManager;
use crate::record::{Record, RecordMeta, Status};
use crate::snapshot::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore};

pub use exclusive::Mutation;
pub use records::Records;

/// Where a collection's state currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    Durable,
    Volatile,
}

/// Record counts per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats<St: Ord> {
    pub total: usize,
    pub by_status: BTreeMap<St, usize>,
}

impl<St: Status> CollectionStats<St> {
    pub fn count(&self, status: St) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub inserted_count: usize,
}

pub struct RecordStore<S = FileSnapshotStore> {
    snapshots: S,
    fallback: FallbackStore,
    locks: InMemoryLockManager,
    lock_timeout: Option<Duration>,
    pretty: bool,
    #[cfg(feature = "emitter")]
    events: StoreEvents,
}

impl RecordStore<FileSnapshotStore> {
    /// File-backed store in `config.data_dir`.
    pub fn open(config: &StoreConfig) -> Self {
        let snapshots = FileSnapshotStore::new(&config.data_dir).read_only(config.read_only);
        Self::with_config(snapshots, config)
    }
}

impl RecordStore<InMemorySnapshotStore> {
    /// Store over a fresh in-memory medium.
    pub fn in_memory() -> Self {
        Self::new(InMemorySnapshotStore::new())
    }
}

impl<S: SnapshotStore> RecordStore<S> {
    /// Store over `snapshots` with `StoreConfig::default()` settings.
    pub fn new(snapshots: S) -> Self {
        let defaults = StoreConfig::default();
        RecordStore {
            snapshots,
            fallback: FallbackStore::new(),
            locks: InMemoryLockManager::new(),
            lock_timeout: defaults.lock_timeout,
            pretty: defaults.pretty,
            #[cfg(feature = "emitter")]
            events: StoreEvents::new(),
        }
    }

    pub fn with_config(snapshots: S, config: &StoreConfig) -> Self {
        let mut store = Self::new(snapshots);
        store.lock_timeout = config.lock_timeout;
        store.pretty = config.pretty;
        store
    }

    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Access the durable medium.
    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    #[cfg(feature = "emitter")]
    pub fn events(&self) -> &StoreEvents {
        &self.events
    }

    /// Typed accessor for one collection.
    pub fn records<R: Record>(&self) -> Records<'_, S, R> {
        Records::new(self)
    }

    // ------------------------------------------------------------------
    // Degraded-mode observability
    // ------------------------------------------------------------------

    pub fn mode(&self, collection: &str) -> Result<StorageMode, StoreError> {
        if self.fallback.is_active(collection)? {
            Ok(StorageMode::Volatile)
        } else {
            Ok(StorageMode::Durable)
        }
    }

    pub fn fallback_state(&self, collection: &str) -> Result<Option<FallbackState>, StoreError> {
        Ok(self.fallback.state(collection)?)
    }

    /// Every collection currently held in volatile memory.
    pub fn fallback_collections(&self) -> Result<Vec<FallbackState>, StoreError> {
        Ok(self.fallback.states()?)
    }

    // ------------------------------------------------------------------
    // Reads (no lock)
    // ------------------------------------------------------------------

    /// The latest committed snapshot. A collection that was never written
    /// is empty.
    pub fn load<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        if let Some(data) = self.fallback.get(R::COLLECTION)? {
            return codec::decode(&data);
        }
        match self.snapshots.load(R::COLLECTION)? {
            Some(snapshot) => codec::decode(&snapshot.data),
            None => Ok(Vec::new()),
        }
    }

    pub fn get<R: Record>(&self, id: &str) -> Result<Option<R>, StoreError> {
        Ok(self.load::<R>()?.into_iter().find(|record| record.id() == id))
    }

    pub fn list<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        self.load()
    }

    pub fn find<R, F>(&self, predicate: F) -> Result<Vec<R>, StoreError>
    where
        R: Record,
        F: Fn(&R) -> bool,
    {
        let mut records = self.load::<R>()?;
        records.retain(|record| predicate(record));
        Ok(records)
    }

    pub fn find_one<R, F>(&self, predicate: F) -> Result<Option<R>, StoreError>
    where
        R: Record,
        F: Fn(&R) -> bool,
    {
        Ok(self.load::<R>()?.into_iter().find(|record| predicate(record)))
    }

    pub fn count<R: Record>(&self) -> Result<usize, StoreError> {
        Ok(self.load::<R>()?.len())
    }

    pub fn stats<R: Record>(&self) -> Result<CollectionStats<R::Status>, StoreError> {
        let records = self.load::<R>()?;
        let mut by_status: BTreeMap<R::Status, usize> = <R::Status as Status>::ALL
            .iter()
            .map(|status| (*status, 0))
            .collect();
        for record in &records {
            *by_status.entry(record.status()).or_insert(0) += 1;
        }
        Ok(CollectionStats {
            total: records.len(),
            by_status,
        })
    }

    // ------------------------------------------------------------------
    // Mutations (serialized per collection)
    // ------------------------------------------------------------------

    /// Build a record from `draft`, stamp id and timestamps, append it.
    pub fn create<R: Record>(&self, draft: R::Draft) -> Result<R, StoreError> {
        let (created, mode) = self.transact(|mut records: Vec<R>| {
            let record = R::from_draft(draft, RecordMeta::new(Utc::now()))?;
            records.push(record.clone());
            Ok(Mutation::Commit(records, record))
        })?;

        debug!(collection = R::COLLECTION, id = created.id(), "record created");
        if let Some(mode) = mode {
            self.notify(events::RECORD_CREATED, || {
                StoreEvent::record(R::COLLECTION, created.id(), created.meta().version(), mode)
            });
        }
        Ok(created)
    }

    /// Merge `patch` into the record with `id`.
    pub fn update<R: Record>(&self, id: &str, patch: R::Patch) -> Result<R, StoreError> {
        let (updated, ()) = self.update_with(id, move |record: &mut R| record.apply_patch(patch))?;
        Ok(updated)
    }

    /// Serialized read-modify-write of one record. `f` may reject the change;
    /// then nothing is persisted. On success `updatedAt` and `version`
    /// advance.
    pub fn update_with<R, T, F>(&self, id: &str, f: F) -> Result<(R, T), StoreError>
    where
        R: Record,
        F: FnOnce(&mut R) -> Result<T, StoreError>,
    {
        let ((updated, output), mode) = self.transact(|mut records: Vec<R>| {
            let record = records
                .iter_mut()
                .find(|record| record.id() == id)
                .ok_or_else(|| StoreError::not_found(R::COLLECTION, id))?;
            let output = f(record)?;
            record.meta_mut().touch(Utc::now());
            let updated = record.clone();
            Ok(Mutation::Commit(records, (updated, output)))
        })?;

        debug!(
            collection = R::COLLECTION,
            id,
            version = updated.meta().version(),
            "record updated"
        );
        if let Some(mode) = mode {
            self.notify(events::RECORD_UPDATED, || {
                StoreEvent::record(R::COLLECTION, id, updated.meta().version(), mode)
            });
        }
        Ok((updated, output))
    }

    /// Remove the record with `id`. Deleting an absent id is a no-op that
    /// returns `false` and writes nothing.
    pub fn delete<R: Record>(&self, id: &str) -> Result<bool, StoreError> {
        let (removed, mode) = self.transact(|mut records: Vec<R>| {
            let before = records.len();
            records.retain(|record| record.id() != id);
            if records.len() == before {
                Ok(Mutation::Unchanged(false))
            } else {
                Ok(Mutation::Commit(records, true))
            }
        })?;

        if let Some(mode) = mode {
            debug!(collection = R::COLLECTION, id, "record deleted");
            self.notify(events::RECORD_DELETED, || {
                StoreEvent::deleted(R::COLLECTION, id, mode)
            });
        }
        Ok(removed)
    }

    /// Atomically replace the whole collection. The current snapshot is not
    /// read, so a malformed one can be reset this way.
    pub fn seed<R: Record>(&self, records: Vec<R>) -> Result<SeedSummary, StoreError> {
        if let Some(duplicate) = codec::duplicate_id(&records) {
            return Err(StoreError::invalid_state(format!(
                "seed for {} contains duplicate id {}",
                R::COLLECTION,
                duplicate
            )));
        }

        let inserted_count = records.len();
        let mode = self.serialized(R::COLLECTION, || self.persist(&records))?;

        info!(
            collection = R::COLLECTION,
            inserted_count,
            mode = ?mode,
            "collection seeded"
        );
        self.notify(events::COLLECTION_SEEDED, || {
            StoreEvent::seeded(R::COLLECTION, inserted_count, mode)
        });
        Ok(SeedSummary { inserted_count })
    }

    /// Parse a JSON array of records and `seed` it. Records missing `id`,
    /// `createdAt` or `updatedAt` are stamped now.
    pub fn seed_json<R: Record>(&self, json: &str) -> Result<SeedSummary, StoreError> {
        let records: Vec<R> = serde_json::from_str(json).map_err(|err| {
            StoreError::Serialization(format!("seed {}: {}", R::COLLECTION, err))
        })?;
        self.seed(records)
    }

    fn notify(&self, event: &str, payload: impl FnOnce() -> StoreEvent) {
        #[cfg(feature = "emitter")]
        self.events.emit(event, &payload());
        #[cfg(not(feature = "emitter"))]
        let _ = (event, payload);
    }
}
