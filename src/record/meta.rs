use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fresh record id: a time-ordered UUID v7.
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}

/// Identity and change tracking shared by every record.
///
/// Serialized flat into the record: `id`, `createdAt`, `updatedAt`,
/// `version`. Fields missing on input (hand-written seed files) are stamped
/// at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRecordMeta")]
pub struct RecordMeta {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl RecordMeta {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: new_record_id(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Mark a mutation: bump `version` and move `updated_at` strictly
    /// forward, even if the wall clock has not.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
        self.version += 1;
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecordMeta {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    version: Option<u64>,
}

impl From<RawRecordMeta> for RecordMeta {
    fn from(raw: RawRecordMeta) -> Self {
        let created_at = raw.created_at.unwrap_or_else(Utc::now);
        let updated_at = raw.updated_at.unwrap_or(created_at).max(created_at);
        Self {
            id: raw.id.unwrap_or_else(new_record_id),
            created_at,
            updated_at,
            version: raw.version.unwrap_or(1).max(1),
        }
    }
}
