//! Support requests collection.
//!
//! A request is raised by a guest, optionally against a booking, and comes
//! with resolution options proposed upstream. It moves strictly forward:
//! pending -> resolved -> closed. The outcome is attached exactly once, by
//! the pending -> resolved transition.

mod lifecycle;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::error::StoreError;
use crate::record::{Record, RecordMeta, Status};

pub const SUPPORT_REQUESTS: &str = "support-requests";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    Pending,
    Resolved,
    Closed,
}

impl SupportStatus {
    pub fn can_transition_to(self, next: SupportStatus) -> bool {
        matches!(
            (self, next),
            (SupportStatus::Pending, SupportStatus::Resolved)
                | (SupportStatus::Resolved, SupportStatus::Closed)
        )
    }
}

impl Status for SupportStatus {
    const ALL: &'static [Self] = &[
        SupportStatus::Pending,
        SupportStatus::Resolved,
        SupportStatus::Closed,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SupportStatus::Pending => "pending",
            SupportStatus::Resolved => "resolved",
            SupportStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for SupportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proposed way of resolving a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOption {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl ResolutionOption {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_id: Option<String>,
    pub summary: String,
    pub resolved_at: DateTime<Utc>,
}

/// What the resolver chose. An empty `summary` falls back to the chosen
/// option's title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDraft {
    #[serde(default)]
    pub option_id: Option<String>,
    #[serde(default)]
    pub summary: String,
}

impl OutcomeDraft {
    pub fn option(option_id: impl Into<String>) -> Self {
        Self {
            option_id: Some(option_id.into()),
            summary: String::new(),
        }
    }

    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            option_id: None,
            summary: summary.into(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    #[serde(flatten)]
    meta: RecordMeta,
    pub guest_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<String>,
    pub message: String,
    /// Confirmation code or id the guest quoted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
    /// Copy of the booking as it was when the request was raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
    #[serde(default)]
    pub options: Vec<ResolutionOption>,
    pub status: SupportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl SupportRequest {
    pub fn option(&self, option_id: &str) -> Option<&ResolutionOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    pub fn is_open(&self) -> bool {
        self.status == SupportStatus::Pending
    }

    /// Attach the outcome and move to `resolved`.
    fn resolve(&mut self, draft: OutcomeDraft, now: DateTime<Utc>) -> Result<(), StoreError> {
        if !self.status.can_transition_to(SupportStatus::Resolved) {
            return Err(StoreError::invalid_state(format!(
                "support request {} is already {}",
                self.id(),
                self.status
            )));
        }

        let chosen = match draft.option_id.as_deref() {
            Some(option_id) => Some(self.option(option_id).ok_or_else(|| {
                StoreError::invalid_state(format!(
                    "support request {} has no option {}",
                    self.id(),
                    option_id
                ))
            })?),
            None => None,
        };

        let summary = match (draft.summary.trim(), chosen) {
            ("", Some(option)) => option.title.clone(),
            ("", None) => {
                return Err(StoreError::invalid_state(
                    "an outcome needs an option or a summary",
                ))
            }
            (summary, _) => summary.to_string(),
        };

        self.outcome = Some(Outcome {
            option_id: draft.option_id,
            summary,
            resolved_at: now,
        });
        self.status = SupportStatus::Resolved;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if !self.status.can_transition_to(SupportStatus::Closed) {
            return Err(StoreError::invalid_state(format!(
                "support request {} is {} and cannot be closed",
                self.id(),
                self.status
            )));
        }
        self.status = SupportStatus::Closed;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequestDraft {
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
    pub message: String,
    #[serde(default)]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub booking: Option<Booking>,
    #[serde(default)]
    pub options: Vec<ResolutionOption>,
}

impl SupportRequestDraft {
    pub fn new(guest_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            guest_name: guest_name.into(),
            guest_email: None,
            message: message.into(),
            booking_reference: None,
            booking: None,
            options: Vec::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.guest_email = Some(email.into());
        self
    }

    /// Attach a booking; its confirmation code becomes the reference.
    pub fn for_booking(mut self, booking: Booking) -> Self {
        self.booking_reference = Some(booking.confirmation_code.clone());
        self.booking = Some(booking);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.booking_reference = Some(reference.into());
        self
    }

    pub fn with_options(mut self, options: Vec<ResolutionOption>) -> Self {
        self.options = options;
        self
    }
}

/// Edits allowed while a request is still pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequestPatch {
    pub guest_email: Option<String>,
    pub message: Option<String>,
    pub options: Option<Vec<ResolutionOption>>,
}

impl Record for SupportRequest {
    const COLLECTION: &'static str = SUPPORT_REQUESTS;

    type Draft = SupportRequestDraft;
    type Patch = SupportRequestPatch;
    type Status = SupportStatus;

    fn from_draft(draft: SupportRequestDraft, meta: RecordMeta) -> Result<Self, StoreError> {
        if draft.message.trim().is_empty() {
            return Err(StoreError::invalid_state("support request needs a message"));
        }
        Ok(SupportRequest {
            meta,
            guest_name: draft.guest_name,
            guest_email: draft.guest_email,
            message: draft.message,
            booking_reference: draft.booking_reference,
            booking: draft.booking,
            options: draft.options,
            status: SupportStatus::Pending,
            outcome: None,
        })
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn status(&self) -> SupportStatus {
        self.status
    }

    fn apply_patch(&mut self, patch: SupportRequestPatch) -> Result<(), StoreError> {
        if !self.is_open() {
            return Err(StoreError::invalid_state(format!(
                "support request {} is {} and can no longer be edited",
                self.id(),
                self.status
            )));
        }
        if let Some(guest_email) = patch.guest_email {
            self.guest_email = Some(guest_email);
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
        if let Some(options) = patch.options {
            self.options = options;
        }
        Ok(())
    }

    /// Status only moves forward and the outcome is attached once, by the
    /// pending -> resolved step.
    fn check_update(&self, before: &SupportRequest) -> Result<(), StoreError> {
        if self.status != before.status && !before.status.can_transition_to(self.status) {
            return Err(StoreError::invalid_state(format!(
                "support request {} cannot move from {} to {}",
                self.id(),
                before.status,
                self.status
            )));
        }
        let resolving =
            before.status == SupportStatus::Pending && self.status == SupportStatus::Resolved;
        if self.outcome != before.outcome && !(resolving && before.outcome.is_none()) {
            return Err(StoreError::invalid_state(format!(
                "support request {} outcome is set only when it is resolved",
                self.id()
            )));
        }
        if resolving && self.outcome.is_none() {
            return Err(StoreError::invalid_state(format!(
                "support request {} cannot be resolved without an outcome",
                self.id()
            )));
        }
        Ok(())
    }
}
