use chrono::Utc;
use tracing::info;

use crate::error::StoreError;
use crate::record::Record;
use crate::snapshot::SnapshotStore;
use crate::store::Records;

use super::{OutcomeDraft, SupportRequest, SupportRequestDraft, SupportStatus};

impl<S: SnapshotStore> Records<'_, S, SupportRequest> {
    pub fn submit(&self, draft: SupportRequestDraft) -> Result<SupportRequest, StoreError> {
        self.create(draft)
    }

    /// Attach `outcome` and move the request to `resolved`. Fails with
    /// `InvalidState` unless the request is pending; a resolved request
    /// keeps its first outcome.
    pub fn resolve(&self, id: &str, outcome: OutcomeDraft) -> Result<SupportRequest, StoreError> {
        let (request, ()) = self.update_with(id, |request: &mut SupportRequest| {
            request.resolve(outcome, Utc::now())
        })?;

        info!(
            id,
            option_id = request.outcome.as_ref().and_then(|o| o.option_id.as_deref()),
            "support request resolved"
        );
        Ok(request)
    }

    pub fn close(&self, id: &str) -> Result<SupportRequest, StoreError> {
        let (request, ()) = self.update_with(id, SupportRequest::close)?;
        info!(id, "support request closed");
        Ok(request)
    }

    /// Pending requests, oldest first.
    pub fn open_requests(&self) -> Result<Vec<SupportRequest>, StoreError> {
        let mut requests = self.find(|request| request.status == SupportStatus::Pending)?;
        requests.sort_by_key(|request| request.meta().created_at());
        Ok(requests)
    }

    /// Requests raised against a booking, matched by booking id or by the
    /// quoted reference (case-insensitive).
    pub fn for_booking(
        &self,
        booking_id: &str,
        confirmation_code: &str,
    ) -> Result<Vec<SupportRequest>, StoreError> {
        self.find(|request| {
            request
                .booking
                .as_ref()
                .is_some_and(|booking| booking.id() == booking_id)
                || request
                    .booking_reference
                    .as_deref()
                    .is_some_and(|reference| reference.eq_ignore_ascii_case(confirmation_code))
        })
    }
}
