//! Per-collection mutual exclusion.
//!
//! A `LockManager` hands out one `Lock` per key (collection name). The
//! in-memory implementation is a FIFO ticket lock, so writers queued on the
//! same collection are admitted strictly in arrival order.

mod error;
mod guard;
mod in_memory;
mod lock;
mod lock_manager;

pub use error::LockError;
pub use guard::LockGuard;
pub use in_memory::{InMemoryLock, InMemoryLockManager};
pub use lock::Lock;
pub use lock_manager::LockManager;
