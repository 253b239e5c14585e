use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Booking, BookingStatus};

/// Criteria for listing bookings. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<BookingStatus>,
    /// Case-insensitive substring of the guest name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    /// Case-insensitive exact match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_to: Option<NaiveDate>,
    /// Only stays whose check-out is on or after `as_of`.
    #[serde(default)]
    pub upcoming_only: bool,
    /// Reference day for `upcoming_only`; today (UTC) when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: BookingStatus) -> Self {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
        self
    }

    pub fn guest_name(mut self, fragment: impl Into<String>) -> Self {
        self.guest_name = Some(fragment.into());
        self
    }

    pub fn confirmation_code(mut self, code: impl Into<String>) -> Self {
        self.confirmation_code = Some(code.into());
        self
    }

    /// Inclusive check-in window. Either end may be open.
    pub fn check_in_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.check_in_from = from;
        self.check_in_to = to;
        self
    }

    pub fn upcoming_only(mut self) -> Self {
        self.upcoming_only = true;
        self
    }

    pub fn as_of(mut self, day: NaiveDate) -> Self {
        self.as_of = Some(day);
        self
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&booking.status) {
            return false;
        }
        if let Some(fragment) = &self.guest_name {
            let fragment = fragment.to_lowercase();
            if !booking.guest_name.to_lowercase().contains(&fragment) {
                return false;
            }
        }
        if let Some(code) = &self.confirmation_code {
            if !booking.confirmation_code.eq_ignore_ascii_case(code.trim()) {
                return false;
            }
        }
        if self.check_in_from.is_some_and(|from| booking.check_in < from) {
            return false;
        }
        if self.check_in_to.is_some_and(|to| booking.check_in > to) {
            return false;
        }
        if self.upcoming_only {
            let today = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
            if !booking.is_upcoming(today) {
                return false;
            }
        }
        true
    }
}
