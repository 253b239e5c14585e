mod booking;
mod config;
mod error;
mod events;
mod fallback;
mod lock;
mod record;
mod snapshot;
mod store;
mod support;

pub use booking::{
    generate_confirmation_code, Booking, BookingDraft, BookingFilter, BookingPatch,
    BookingStatus, BOOKINGS, CONFIRMATION_CODE_LEN,
};
pub use config::{StoreConfig, ENV_DATA_DIR, ENV_LOCK_TIMEOUT_MS, ENV_PRETTY, ENV_READ_ONLY};
pub use error::StoreError;
#[cfg(feature = "emitter")]
pub use events::StoreEvents;
pub use events::{
    StoreEvent, COLLECTION_FALLBACK, COLLECTION_SEEDED, RECORD_CREATED, RECORD_DELETED,
    RECORD_UPDATED,
};
pub use fallback::{FallbackState, FallbackStore};
pub use lock::{InMemoryLock, InMemoryLockManager, Lock, LockError, LockGuard, LockManager};
pub use record::{new_record_id, Record, RecordMeta, Status};
pub use snapshot::{
    validate_collection_name, FileSnapshotStore, InMemorySnapshotStore, SnapshotError,
    SnapshotRecord, SnapshotStore,
};
pub use store::{CollectionStats, Mutation, RecordStore, Records, SeedSummary, StorageMode};
pub use support::{
    Outcome, OutcomeDraft, ResolutionOption, SupportRequest, SupportRequestDraft,
    SupportRequestPatch, SupportStatus, SUPPORT_REQUESTS,
};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
