use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use super::store::{validate_collection_name, SnapshotRecord, SnapshotStore};
use super::SnapshotError;

/// In-memory snapshot store backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly (cloning shares the same underlying storage). Can be
/// flipped read-only to stand in for an unwritable medium.
#[derive(Clone)]
pub struct InMemorySnapshotStore {
    storage: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    read_only: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            read_only: Arc::new(AtomicBool::new(false)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A store whose every write is rejected with `WriteFailure`.
    pub fn read_only() -> Self {
        let store = Self::new();
        store.set_read_only(true);
        store
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    /// Number of snapshots successfully written so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Place raw bytes as a collection's snapshot, bypassing the read-only
    /// switch. Used to preload fixtures, including deliberately broken ones.
    pub fn put_raw(&self, collection: &str, data: impl Into<Vec<u8>>) -> Result<(), SnapshotError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| SnapshotError::Poisoned("snapshot write"))?;
        storage.insert(collection.to_string(), data.into());
        Ok(())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self, collection: &str) -> Result<Option<SnapshotRecord>, SnapshotError> {
        validate_collection_name(collection)?;
        let storage = self
            .storage
            .read()
            .map_err(|_| SnapshotError::Poisoned("snapshot read"))?;
        Ok(storage
            .get(collection)
            .map(|data| SnapshotRecord::new(collection, data.clone())))
    }

    fn store(&self, record: &SnapshotRecord) -> Result<(), SnapshotError> {
        validate_collection_name(&record.collection)?;
        if self.is_read_only() {
            return Err(SnapshotError::WriteFailure {
                collection: record.collection.clone(),
                reason: "medium is read-only".into(),
            });
        }
        let mut storage = self
            .storage
            .write()
            .map_err(|_| SnapshotError::Poisoned("snapshot write"))?;
        storage.insert(record.collection.clone(), record.data.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
