//! Booking lifecycle operations on the typed collection accessor.

use tracing::info;

use crate::error::StoreError;
use crate::record::Record;
use crate::snapshot::SnapshotStore;
use crate::store::Records;

use super::{Booking, BookingFilter, BookingStatus};

impl<S: SnapshotStore> Records<'_, S, Booking> {
    pub fn find_by_confirmation_code(&self, code: &str) -> Result<Option<Booking>, StoreError> {
        let code = code.trim();
        self.find_one(|booking| booking.confirmation_code.eq_ignore_ascii_case(code))
    }

    /// Bookings matching `filter`, ordered by check-in date.
    pub fn search(&self, filter: &BookingFilter) -> Result<Vec<Booking>, StoreError> {
        let mut bookings = self.find(|booking| filter.matches(booking))?;
        bookings.sort_by(|a, b| a.check_in.cmp(&b.check_in).then_with(|| a.id().cmp(b.id())));
        Ok(bookings)
    }

    /// Move a booking to `next`, checked against its current status inside
    /// the collection lock.
    pub fn transition(&self, id: &str, next: BookingStatus) -> Result<Booking, StoreError> {
        let (booking, previous) = self.update_with(id, |booking: &mut Booking| {
            let previous = booking.status;
            if !previous.can_transition_to(next) {
                return Err(StoreError::invalid_state(format!(
                    "booking {} cannot move from {} to {}",
                    booking.id(),
                    previous,
                    next
                )));
            }
            booking.status = next;
            Ok(previous)
        })?;

        info!(id, from = %previous, to = %next, "booking status changed");
        Ok(booking)
    }

    pub fn confirm(&self, id: &str) -> Result<Booking, StoreError> {
        self.transition(id, BookingStatus::Confirmed)
    }

    pub fn check_in(&self, id: &str) -> Result<Booking, StoreError> {
        self.transition(id, BookingStatus::CheckedIn)
    }

    pub fn check_out(&self, id: &str) -> Result<Booking, StoreError> {
        self.transition(id, BookingStatus::CheckedOut)
    }

    pub fn cancel(&self, id: &str) -> Result<Booking, StoreError> {
        self.transition(id, BookingStatus::Cancelled)
    }
}
