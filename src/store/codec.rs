//! JSON encoding of collection snapshots.

use std::collections::HashSet;

use tracing::error;

use crate::error::StoreError;
use crate::record::Record;

pub(crate) fn encode<R: Record>(records: &[R], pretty: bool) -> Result<Vec<u8>, StoreError> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(records)
    } else {
        serde_json::to_vec(records)
    };
    encoded.map_err(|err| StoreError::Serialization(format!("encode {}: {}", R::COLLECTION, err)))
}

/// Decode a snapshot. Anything that is not an array of well-formed records
/// is a `MalformedSnapshot`; nothing is skipped or repaired.
pub(crate) fn decode<R: Record>(data: &[u8]) -> Result<Vec<R>, StoreError> {
    let records: Vec<R> =
        serde_json::from_slice(data).map_err(|err| malformed::<R>(err.to_string()))?;

    if let Some(duplicate) = duplicate_id(&records) {
        return Err(malformed::<R>(format!("duplicate id {}", duplicate)));
    }
    Ok(records)
}

/// The first id that appears more than once.
pub(crate) fn duplicate_id<R: Record>(records: &[R]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .map(|record| record.id())
        .find(|id| !seen.insert(*id))
}

fn malformed<R: Record>(reason: String) -> StoreError {
    error!(collection = R::COLLECTION, reason = %reason, "malformed snapshot");
    StoreError::MalformedSnapshot {
        collection: R::COLLECTION.to_string(),
        reason,
    }
}
