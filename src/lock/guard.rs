use std::sync::Arc;
use std::time::Duration;

use super::{Lock, LockError};

/// Holds a lock for as long as it lives and releases it on drop, including
/// during unwinding.
pub struct LockGuard<L: Lock> {
    lock: Arc<L>,
}

impl<L: Lock> LockGuard<L> {
    /// Wait for the lock, optionally bounded by `timeout`.
    pub fn acquire(lock: Arc<L>, timeout: Option<Duration>) -> Result<Self, LockError> {
        match timeout {
            Some(timeout) => lock.lock_timeout(timeout)?,
            None => lock.lock()?,
        }
        Ok(Self { lock })
    }
}

impl<L: Lock> Drop for LockGuard<L> {
    fn drop(&mut self) {
        let _ = self.lock.unlock();
    }
}
