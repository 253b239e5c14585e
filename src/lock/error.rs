use std::time::Duration;

use thiserror::Error;

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The underlying lock primitive was poisoned (e.g. a thread panicked while holding it).
    #[error("lock poisoned: {0}")]
    Poisoned(String),
    /// The caller gave up waiting for its turn.
    #[error("timed out after {waited:?} waiting for lock")]
    Timeout { waited: Duration },
}
