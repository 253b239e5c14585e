use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{Lock, LockError, LockManager};

#[derive(Default)]
struct TicketState {
    held: bool,
    next_ticket: u64,
    waiting: VecDeque<u64>,
}

/// In-memory FIFO lock backed by `Mutex<TicketState>` + `Condvar`.
///
/// Every caller draws a ticket and waits until it is at the head of the
/// queue and the lock is free.
pub struct InMemoryLock {
    state: Mutex<TicketState>,
    wake: Condvar,
}

impl InMemoryLock {
    pub fn new() -> Self {
        InMemoryLock {
            state: Mutex::new(TicketState::default()),
            wake: Condvar::new(),
        }
    }

    /// Number of callers currently queued behind the holder.
    pub fn queued(&self) -> Result<usize, LockError> {
        Ok(self.state()?.waiting.len())
    }

    /// Whether some caller currently holds the lock.
    pub fn is_held(&self) -> Result<bool, LockError> {
        Ok(self.state()?.held)
    }

    fn state(&self) -> Result<MutexGuard<'_, TicketState>, LockError> {
        self.state.lock().map_err(poisoned)
    }

    fn acquire(&self, deadline: Option<Instant>) -> Result<(), LockError> {
        let started = Instant::now();
        let mut state = self.state()?;
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.waiting.push_back(ticket);

        loop {
            if !state.held && state.waiting.front() == Some(&ticket) {
                state.waiting.pop_front();
                state.held = true;
                return Ok(());
            }

            match deadline {
                None => {
                    state = self.wake.wait(state).map_err(poisoned)?;
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.waiting.retain(|queued| *queued != ticket);
                        drop(state);
                        // The next ticket may now be at the head.
                        self.wake.notify_all();
                        return Err(LockError::Timeout {
                            waited: started.elapsed(),
                        });
                    }
                    let (guard, _) = self
                        .wake
                        .wait_timeout(state, deadline - now)
                        .map_err(poisoned)?;
                    state = guard;
                }
            }
        }
    }
}

impl Default for InMemoryLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Lock for InMemoryLock {
    fn lock(&self) -> Result<(), LockError> {
        self.acquire(None)
    }

    fn lock_timeout(&self, timeout: Duration) -> Result<(), LockError> {
        self.acquire(Some(Instant::now() + timeout))
    }

    fn try_lock(&self) -> Result<bool, LockError> {
        let mut state = self.state()?;
        if state.held || !state.waiting.is_empty() {
            Ok(false)
        } else {
            state.held = true;
            Ok(true)
        }
    }

    fn unlock(&self) -> Result<(), LockError> {
        let mut state = self.state()?;
        if state.held {
            state.held = false;
            drop(state);
            self.wake.notify_all();
        }
        Ok(())
    }
}

fn poisoned<T>(err: PoisonError<T>) -> LockError {
    LockError::Poisoned(err.to_string())
}

/// In-memory lock manager backed by a `HashMap<String, Arc<InMemoryLock>>`.
///
/// Lazily creates one `InMemoryLock` per unique key and returns the same
/// `Arc` for repeated lookups.
pub struct InMemoryLockManager {
    locks: Mutex<HashMap<String, Arc<InMemoryLock>>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        InMemoryLockManager {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryLockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LockManager for InMemoryLockManager {
    type Lock = InMemoryLock;

    fn get_lock(&self, key: &str) -> Result<Arc<InMemoryLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("lock manager map poisoned".into()))?;
        Ok(locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(InMemoryLock::new()))
            .clone())
    }
}
