//! Volatile fallback for collections whose durable medium rejected a write.
//!
//! Once a collection is here it stays here until the process exits; the
//! durable medium is not probed again.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::SnapshotError;

/// Observable record of a collection running in degraded mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackState {
    pub collection: String,
    pub since: DateTime<Utc>,
    pub reason: String,
}

struct FallbackEntry {
    state: FallbackState,
    data: Vec<u8>,
}

/// Process-lifetime snapshot storage keyed by collection name.
///
/// Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct FallbackStore {
    entries: Arc<RwLock<HashMap<String, FallbackEntry>>>,
}

impl FallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, collection: &str) -> Result<bool, SnapshotError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SnapshotError::Poisoned("fallback read"))?;
        Ok(entries.contains_key(collection))
    }

    /// Current snapshot bytes, or `None` if the collection is durable.
    pub fn get(&self, collection: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SnapshotError::Poisoned("fallback read"))?;
        Ok(entries.get(collection).map(|entry| entry.data.clone()))
    }

    /// Replace the snapshot of a collection already in fallback mode.
    /// Returns `false` (and stores nothing) if the collection is durable.
    pub fn set(&self, collection: &str, data: Vec<u8>) -> Result<bool, SnapshotError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SnapshotError::Poisoned("fallback write"))?;
        match entries.get_mut(collection) {
            Some(entry) => {
                entry.data = data;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move a collection into fallback mode holding `data`.
    ///
    /// Returns the new state, or `None` if the collection had already entered
    /// fallback (its data is replaced, its original state kept).
    pub fn enter(
        &self,
        collection: &str,
        reason: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Option<FallbackState>, SnapshotError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SnapshotError::Poisoned("fallback write"))?;
        if let Some(entry) = entries.get_mut(collection) {
            entry.data = data;
            return Ok(None);
        }

        let state = FallbackState {
            collection: collection.to_string(),
            since: Utc::now(),
            reason: reason.into(),
        };
        entries.insert(
            collection.to_string(),
            FallbackEntry {
                state: state.clone(),
                data,
            },
        );
        Ok(Some(state))
    }

    pub fn state(&self, collection: &str) -> Result<Option<FallbackState>, SnapshotError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SnapshotError::Poisoned("fallback read"))?;
        Ok(entries.get(collection).map(|entry| entry.state.clone()))
    }

    /// Every collection currently in fallback, ordered by name.
    pub fn states(&self) -> Result<Vec<FallbackState>, SnapshotError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SnapshotError::Poisoned("fallback read"))?;
        let mut states: Vec<FallbackState> =
            entries.values().map(|entry| entry.state.clone()).collect();
        states.sort_by(|a, b| a.collection.cmp(&b.collection));
        Ok(states)
    }
}
