//! Durable snapshot I/O.
//!
//! A snapshot is the complete serialized state of one collection. Stores
//! replace snapshots as a whole; a `load` never observes a partial write.

mod error;
mod file;
mod in_memory;
mod store;

pub use error::SnapshotError;
pub use file::FileSnapshotStore;
pub use in_memory::InMemorySnapshotStore;
pub use store::{validate_collection_name, SnapshotRecord, SnapshotStore};
