//! Bookings collection.

mod filter;
mod lifecycle;

use std::fmt;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::record::{Record, RecordMeta, Status};

pub use filter::BookingFilter;

pub const BOOKINGS: &str = "bookings";
pub const CONFIRMATION_CODE_LEN: usize = 6;

const CONFIRMATION_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random 6-character uppercase alphanumeric code.
///
/// Uniqueness within the collection is not checked.
pub fn generate_confirmation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CONFIRMATION_CODE_LEN)
        .map(|_| CONFIRMATION_ALPHABET[rng.gen_range(0..CONFIRMATION_ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// pending -> confirmed | cancelled, confirmed -> checked_in | cancelled,
    /// checked_in -> checked_out.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (CheckedIn, CheckedOut)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::CheckedOut | BookingStatus::Cancelled)
    }

    pub fn parse(s: &str) -> Result<Self, StoreError> {
        BookingStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StoreError::invalid_state(format!("unknown booking status: {}", s)))
    }
}

impl Status for BookingStatus {
    const ALL: &'static [Self] = &[
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::CheckedOut,
        BookingStatus::Cancelled,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(flatten)]
    meta: RecordMeta,
    pub guest_name: String,
    pub guest_email: String,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub status: BookingStatus,
    #[serde(default = "generate_confirmation_code")]
    pub confirmation_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Still relevant on `today`: the stay has not ended yet.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.check_out >= today
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.guest_name.trim().is_empty() {
            return Err(StoreError::invalid_state("booking needs a guest name"));
        }
        if self.check_out <= self.check_in {
            return Err(StoreError::invalid_state(format!(
                "check-out {} must be after check-in {}",
                self.check_out, self.check_in
            )));
        }
        if self.guests == 0 {
            return Err(StoreError::invalid_state("booking needs at least one guest"));
        }
        Ok(())
    }
}

/// Payload for creating a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub guest_name: String,
    pub guest_email: String,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_guests")]
    pub guests: u32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

fn default_guests() -> u32 {
    1
}

impl BookingDraft {
    pub fn new(
        guest_name: impl Into<String>,
        guest_email: impl Into<String>,
        room_type: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Self {
        Self {
            guest_name: guest_name.into(),
            guest_email: guest_email.into(),
            room_type: room_type.into(),
            check_in,
            check_out,
            guests: default_guests(),
            special_requests: None,
        }
    }

    pub fn with_guests(mut self, guests: u32) -> Self {
        self.guests = guests;
        self
    }

    pub fn with_special_requests(mut self, requests: impl Into<String>) -> Self {
        self.special_requests = Some(requests.into());
        self
    }
}

/// Partial update. Status moves only through the lifecycle operations and
/// the confirmation code never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub room_type: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub special_requests: Option<String>,
}

impl Record for Booking {
    const COLLECTION: &'static str = BOOKINGS;

    type Draft = BookingDraft;
    type Patch = BookingPatch;
    type Status = BookingStatus;

    fn from_draft(draft: BookingDraft, meta: RecordMeta) -> Result<Self, StoreError> {
        let booking = Booking {
            meta,
            guest_name: draft.guest_name,
            guest_email: draft.guest_email,
            room_type: draft.room_type,
            check_in: draft.check_in,
            check_out: draft.check_out,
            guests: draft.guests,
            status: BookingStatus::Pending,
            confirmation_code: generate_confirmation_code(),
            special_requests: draft.special_requests,
        };
        booking.validate()?;
        Ok(booking)
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn apply_patch(&mut self, patch: BookingPatch) -> Result<(), StoreError> {
        if let Some(guest_name) = patch.guest_name {
            self.guest_name = guest_name;
        }
        if let Some(guest_email) = patch.guest_email {
            self.guest_email = guest_email;
        }
        if let Some(room_type) = patch.room_type {
            self.room_type = room_type;
        }
        if let Some(check_in) = patch.check_in {
            self.check_in = check_in;
        }
        if let Some(check_out) = patch.check_out {
            self.check_out = check_out;
        }
        if let Some(guests) = patch.guests {
            self.guests = guests;
        }
        if let Some(special_requests) = patch.special_requests {
            self.special_requests = Some(special_requests);
        }
        self.validate()
    }

    /// The confirmation code is fixed and status follows the lifecycle.
    fn check_update(&self, before: &Booking) -> Result<(), StoreError> {
        if self.confirmation_code != before.confirmation_code {
            return Err(StoreError::invalid_state(format!(
                "booking {} confirmation code cannot change",
                self.id()
            )));
        }
        if self.status != before.status && !before.status.can_transition_to(self.status) {
            return Err(StoreError::invalid_state(format!(
                "booking {} cannot move from {} to {}",
                self.id(),
                before.status,
                self.status
            )));
        }
        Ok(())
    }
}
