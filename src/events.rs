//! Change notifications.
//!
//! The store emits one event per committed mutation, plus one when a
//! collection drops into volatile fallback. Payloads are JSON-encoded
//! [`StoreEvent`]s.

use serde::{Deserialize, Serialize};

use crate::store::StorageMode;

pub const RECORD_CREATED: &str = "record.created";
pub const RECORD_UPDATED: &str = "record.updated";
pub const RECORD_DELETED: &str = "record.deleted";
pub const COLLECTION_SEEDED: &str = "collection.seeded";
pub const COLLECTION_FALLBACK: &str = "collection.fallback";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEvent {
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub mode: StorageMode,
}

impl StoreEvent {
    pub fn record(collection: &str, id: &str, version: u64, mode: StorageMode) -> Self {
        Self {
            collection: collection.to_string(),
            id: Some(id.to_string()),
            version: Some(version),
            count: None,
            reason: None,
            mode,
        }
    }

    pub fn deleted(collection: &str, id: &str, mode: StorageMode) -> Self {
        Self {
            collection: collection.to_string(),
            id: Some(id.to_string()),
            version: None,
            count: None,
            reason: None,
            mode,
        }
    }

    pub fn seeded(collection: &str, count: usize, mode: StorageMode) -> Self {
        Self {
            collection: collection.to_string(),
            id: None,
            version: None,
            count: Some(count),
            reason: None,
            mode,
        }
    }

    pub fn fallback(collection: &str, reason: &str) -> Self {
        Self {
            collection: collection.to_string(),
            id: None,
            version: None,
            count: None,
            reason: Some(reason.to_string()),
            mode: StorageMode::Volatile,
        }
    }

    pub fn decode(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

#[cfg(feature = "emitter")]
pub use emitter::StoreEvents;

#[cfg(feature = "emitter")]
mod emitter {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use event_emitter_rs::EventEmitter;
    use tracing::warn;

    use super::StoreEvent;

    /// Listener registry for store events.
    ///
    /// Listeners run on emitter threads, after the mutation has been
    /// committed and its lock released.
    pub struct StoreEvents {
        emitter: Mutex<EventEmitter>,
    }

    impl Default for StoreEvents {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreEvents {
        pub fn new() -> Self {
            Self {
                emitter: Mutex::new(EventEmitter::new()),
            }
        }

        /// Register a listener; it receives the JSON-encoded `StoreEvent`.
        /// Returns the listener id.
        pub fn on<F>(&self, event: &str, listener: F) -> String
        where
            F: Fn(String) + Send + Sync + 'static,
        {
            self.emitter().on(event, listener)
        }

        pub fn remove_listener(&self, listener_id: &str) -> bool {
            self.emitter().remove_listener(listener_id).is_some()
        }

        pub(crate) fn emit(&self, event: &str, payload: &StoreEvent) {
            match serde_json::to_string(payload) {
                Ok(json) => {
                    self.emitter().emit(event, json);
                }
                Err(err) => warn!(event, error = %err, "failed to encode store event"),
            }
        }

        fn emitter(&self) -> MutexGuard<'_, EventEmitter> {
            // Listener bookkeeping stays usable after a panicking registrant.
            self.emitter.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}
