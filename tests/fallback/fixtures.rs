use chrono::NaiveDate;
use record_store::{
    Booking, BookingPatch, BookingStatus, CollectionStats, OutcomeDraft, Record, RecordStore,
    SnapshotStore, SupportRequest, SupportRequestDraft,
};

pub fn booking(name: &str) -> record_store::BookingDraft {
    record_store::BookingDraft::new(
        name,
        "guest@example.com",
        "standard",
        NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 11, 6).unwrap(),
    )
}

/// Observable outcome of `exercise`, free of generated ids and timestamps.
#[derive(Debug, PartialEq)]
pub struct Observed {
    pub bookings: Vec<(String, BookingStatus, u32, u64)>,
    pub booking_stats: CollectionStats<BookingStatus>,
    pub requests: Vec<(String, Option<String>)>,
}

/// Drive every engine operation through `store` and report what is left.
pub fn exercise<S: SnapshotStore>(store: &RecordStore<S>) -> Observed {
    let bookings = store.records::<Booking>();
    let ada = bookings.create(booking("Ada")).unwrap();
    let grace = bookings.create(booking("Grace")).unwrap();
    let alan = bookings.create(booking("Alan")).unwrap();
    let edsger = bookings.create(booking("Edsger")).unwrap();

    bookings.confirm(ada.id()).unwrap();
    bookings.check_in(ada.id()).unwrap();
    bookings.confirm(grace.id()).unwrap();
    bookings.cancel(alan.id()).unwrap();
    bookings
        .update(
            grace.id(),
            BookingPatch {
                guests: Some(3),
                ..BookingPatch::default()
            },
        )
        .unwrap();
    assert!(bookings.delete(edsger.id()).unwrap());
    assert!(!bookings.delete(edsger.id()).unwrap());

    let requests = store.records::<SupportRequest>();
    let first = requests
        .submit(SupportRequestDraft::new("Ada", "Late checkout?").for_booking(ada.clone()))
        .unwrap();
    requests
        .submit(SupportRequestDraft::new("Grace", "Parking?"))
        .unwrap();
    requests
        .resolve(first.id(), OutcomeDraft::summary("Granted until 1pm"))
        .unwrap();

    Observed {
        bookings: bookings
            .list()
            .unwrap()
            .into_iter()
            .map(|b| {
                let version = b.meta().version();
                (b.guest_name, b.status, b.guests, version)
            })
            .collect(),
        booking_stats: bookings.stats().unwrap(),
        requests: requests
            .list()
            .unwrap()
            .into_iter()
            .map(|r| (r.message, r.outcome.map(|o| o.summary)))
            .collect(),
    }
}
