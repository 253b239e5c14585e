//! Records - the typed entities a `RecordStore` persists.
//!
//! Every record type names its collection, knows how to build itself from a
//! creation payload, how to merge a partial update, and which status it is
//! in. Identity and timestamps live in the flattened [`RecordMeta`].
//!
//! ## Example
//!
//! ```ignore
//! use record_store::{Booking, BookingFilter, RecordStore};
//!
//! let store = RecordStore::in_memory();
//! let booking = store.records::<Booking>().create(draft)?;
//! let upcoming = store.records::<Booking>().search(&BookingFilter::new().upcoming_only())?;
//! ```

mod meta;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

pub use meta::{new_record_id, RecordMeta};

/// Trait for types that can be stored in a collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection name for this record type (e.g. "bookings").
    /// Doubles as the snapshot file stem.
    const COLLECTION: &'static str;

    /// Caller-supplied payload for `create`.
    type Draft;

    /// Partial update for `update`. Cannot touch identity, timestamps or
    /// status.
    type Patch;

    type Status: Status;

    /// Build a new record. `meta` already carries the fresh id and timestamps.
    fn from_draft(draft: Self::Draft, meta: RecordMeta) -> Result<Self, StoreError>;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn status(&self) -> Self::Status;

    /// Merge a patch into this record. On error the record may be partially
    /// modified; the store discards it.
    fn apply_patch(&mut self, patch: Self::Patch) -> Result<(), StoreError>;

    /// Invariants between the stored record and its replacement, checked
    /// before any commit. Identity and timestamps are the store's concern.
    fn check_update(&self, _before: &Self) -> Result<(), StoreError> {
        Ok(())
    }

    fn id(&self) -> &str {
        self.meta().id()
    }
}

/// A closed set of lifecycle states.
pub trait Status:
    Copy + Ord + Eq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Every state, in lifecycle order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
}
