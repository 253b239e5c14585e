use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The backing medium refused the write (read-only filesystem, sandbox,
    /// full disk). Recoverable: the engine switches the collection to
    /// volatile fallback.
    #[error("snapshot write rejected for {collection}: {reason}")]
    WriteFailure { collection: String, reason: String },

    #[error("snapshot read failed for {collection}: {reason}")]
    Io { collection: String, reason: String },

    #[error("invalid collection name: {0:?}")]
    InvalidCollection(String),

    #[error("snapshot store poisoned during {0}")]
    Poisoned(&'static str),
}

impl SnapshotError {
    pub fn is_write_failure(&self) -> bool {
        matches!(self, SnapshotError::WriteFailure { .. })
    }
}
