use std::time::Duration;

use super::LockError;

/// Trait for a single lock instance.
///
/// Waiters are admitted in the order they called `lock` / `lock_timeout`.
pub trait Lock: Send + Sync {
    /// Acquire the lock, blocking until every earlier waiter has had its turn.
    fn lock(&self) -> Result<(), LockError>;

    /// Like `lock`, but give up after `timeout`. A waiter that gives up
    /// leaves the queue without disturbing the order of the others.
    fn lock_timeout(&self, timeout: Duration) -> Result<(), LockError>;

    /// Try to acquire the lock without blocking.
    /// Returns `Ok(false)` if it is held or other callers are already queued.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Release the lock.
    fn unlock(&self) -> Result<(), LockError>;
}
