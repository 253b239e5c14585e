use super::SnapshotError;

/// A stored snapshot: collection name and the serialized record array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub collection: String,
    pub data: Vec<u8>,
}

impl SnapshotRecord {
    pub fn new(collection: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            collection: collection.into(),
            data,
        }
    }
}

/// Trait for snapshot persistence. One snapshot per collection (latest wins).
pub trait SnapshotStore: Send + Sync {
    /// Load the current snapshot, or `None` if the collection was never written.
    fn load(&self, collection: &str) -> Result<Option<SnapshotRecord>, SnapshotError>;

    /// Replace the snapshot atomically. Any subsequent `load` sees either the
    /// previous snapshot or this one, never a mixture.
    fn store(&self, record: &SnapshotRecord) -> Result<(), SnapshotError>;
}

/// Collection names become file names, so they are restricted to
/// `[A-Za-z0-9_-]`.
pub fn validate_collection_name(collection: &str) -> Result<(), SnapshotError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SnapshotError::InvalidCollection(collection.to_string()))
    }
}
