//! Records - typed accessor for one collection.

use std::marker::PhantomData;

use crate::error::StoreError;
use crate::record::Record;
use crate::snapshot::SnapshotStore;

use super::{CollectionStats, Mutation, RecordStore, SeedSummary, StorageMode};

/// Typed view of a `RecordStore` restricted to `R`'s collection.
///
/// Domain modules add their lifecycle operations as inherent methods on
/// `Records<'_, S, Booking>` and friends.
pub struct Records<'a, S, R> {
    store: &'a RecordStore<S>,
    _marker: PhantomData<R>,
}

impl<'a, S: SnapshotStore, R: Record> Records<'a, S, R> {
    pub fn new(store: &'a RecordStore<S>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn store(&self) -> &'a RecordStore<S> {
        self.store
    }

    pub fn collection(&self) -> &'static str {
        R::COLLECTION
    }

    pub fn mode(&self) -> Result<StorageMode, StoreError> {
        self.store.mode(R::COLLECTION)
    }

    pub fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        self.store.create(draft)
    }

    pub fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        self.store.get(id)
    }

    /// Like `get`, but a missing record is `NotFound`.
    pub fn fetch(&self, id: &str) -> Result<R, StoreError> {
        self.get(id)?
            .ok_or_else(|| StoreError::not_found(R::COLLECTION, id))
    }

    pub fn update(&self, id: &str, patch: R::Patch) -> Result<R, StoreError> {
        self.store.update(id, patch)
    }

    pub fn update_with<T, F>(&self, id: &str, f: F) -> Result<(R, T), StoreError>
    where
        F: FnOnce(&mut R) -> Result<T, StoreError>,
    {
        self.store.update_with(id, f)
    }

    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete::<R>(id)
    }

    pub fn list(&self) -> Result<Vec<R>, StoreError> {
        self.store.list()
    }

    pub fn find<F>(&self, predicate: F) -> Result<Vec<R>, StoreError>
    where
        F: Fn(&R) -> bool,
    {
        self.store.find(predicate)
    }

    pub fn find_one<F>(&self, predicate: F) -> Result<Option<R>, StoreError>
    where
        F: Fn(&R) -> bool,
    {
        self.store.find_one(predicate)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        self.store.count::<R>()
    }

    pub fn stats(&self) -> Result<CollectionStats<R::Status>, StoreError> {
        self.store.stats::<R>()
    }

    pub fn seed(&self, records: Vec<R>) -> Result<SeedSummary, StoreError> {
        self.store.seed(records)
    }

    pub fn seed_json(&self, json: &str) -> Result<SeedSummary, StoreError> {
        self.store.seed_json::<R>(json)
    }

    pub fn with_exclusive_access<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(Vec<R>) -> Result<Mutation<R, T>, StoreError>,
    {
        self.store.with_exclusive_access(f)
    }
}
