
use fixtures::{date, SEED};
use record_store::{
    Booking, BookingDraft, BookingFilter, BookingPatch, BookingStatus, Record, RecordStore,
};

fn ids(bookings: &[Booking]) -> Vec<&str> {
    bookings.iter().map(|b| b.id()).collect()
}

fn seeded() -> RecordStore<record_store::InMemorySnapshotStore> {
    let store = RecordStore::in_memory();
    store.records::<Booking>().seed_json(SEED).unwrap();
    store
}

#[test]
fn confirmed_and_upcoming_returns_exactly_that_subset() {
    let store = seeded();
    let filter = BookingFilter::new()
        .status(BookingStatus::Confirmed)
        .upcoming_only()
        .as_of(date(2026, 6, 15));

    let found = store.records::<Booking>().search(&filter).unwrap();
    assert_eq!(ids(&found), vec!["bk-ends-today", "bk-future-confirmed"]);
}

#[test]
fn search_orders_by_check_in() {
    let store = seeded();
    let filter = BookingFilter::new().upcoming_only().as_of(date(2026, 6, 15));

    let found = store.records::<Booking>().search(&filter).unwrap();
    assert_eq!(
        ids(&found),
        vec![
            "bk-ends-today",
            "bk-staying",
            "bk-future-cancelled",
            "bk-future-confirmed",
            "bk-future-pending",
        ]
    );
}

#[test]
fn multiple_statuses_are_a_set() {
    let store = seeded();
    let filter = BookingFilter::new()
        .status(BookingStatus::Pending)
        .status(BookingStatus::CheckedIn);

    let found = store.records::<Booking>().search(&filter).unwrap();
    assert_eq!(ids(&found), vec!["bk-staying", "bk-future-pending"]);
}

#[test]
fn name_and_date_range_filters() {
    let store = seeded();
    let bookings = store.records::<Booking>();

    let found = bookings
        .search(&BookingFilter::new().guest_name("HOP"))
        .unwrap();
    assert_eq!(ids(&found), vec!["bk-ends-today"]);

    let june = BookingFilter::new()
        .check_in_between(Some(date(2026, 6, 10)), Some(date(2026, 6, 30)));
    let found = bookings.search(&june).unwrap();
    assert_eq!(
        ids(&found),
        vec!["bk-ends-today", "bk-staying", "bk-future-cancelled"]
    );
}

#[test]
fn filter_deserializes_from_query_shape() {
    let filter: BookingFilter = serde_json::from_str(
        r#"{"statuses": ["confirmed"], "upcomingOnly": true, "asOf": "2026-06-15"}"#,
    )
    .unwrap();
    assert_eq!(
        filter,
        BookingFilter::new()
            .status(BookingStatus::Confirmed)
            .upcoming_only()
            .as_of(date(2026, 6, 15))
    );
}

#[test]
fn confirmation_code_lookup_is_case_insensitive() {
    let store = seeded();
    let bookings = store.records::<Booking>();

    let found = bookings.find_by_confirmation_code("futr01").unwrap().unwrap();
    assert_eq!(found.id(), "bk-future-confirmed");
    assert!(bookings.find_by_confirmation_code("ZZZZZZ").unwrap().is_none());

    let via_filter = bookings
        .search(&BookingFilter::new().confirmation_code("Stay01"))
        .unwrap();
    assert_eq!(ids(&via_filter), vec!["bk-staying"]);
}

#[test]
fn lifecycle_through_the_store() {
    let store = seeded();
    let bookings = store.records::<Booking>();

    let pending = bookings.fetch("bk-future-pending").unwrap();
    let confirmed = bookings.confirm(pending.id()).unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert!(confirmed.meta().updated_at() > pending.meta().updated_at());

    let err = bookings.check_out(pending.id()).unwrap_err();
    assert!(err.is_invalid_state());

    let out = bookings.check_out("bk-staying").unwrap();
    assert_eq!(out.status, BookingStatus::CheckedOut);

    assert!(bookings.cancel("bk-future-cancelled").unwrap_err().is_invalid_state());

    let stats = bookings.stats().unwrap();
    assert_eq!(stats.total, 6);
    assert_eq!(stats.count(BookingStatus::Confirmed), 4);
    assert_eq!(stats.count(BookingStatus::Pending), 0);
    assert_eq!(stats.count(BookingStatus::CheckedIn), 0);
    assert_eq!(stats.count(BookingStatus::CheckedOut), 1);
    assert_eq!(stats.count(BookingStatus::Cancelled), 1);
}

#[test]
fn created_bookings_get_codes_and_start_pending() {
    let store = RecordStore::in_memory();
    let bookings = store.records::<Booking>();

    let draft: BookingDraft = serde_json::from_str(
        r#"{"guestName": "Ada", "guestEmail": "ada@example.com", "roomType": "suite",
            "checkIn": "2026-12-01", "checkOut": "2026-12-03"}"#,
    )
    .unwrap();
    let created = bookings.create(draft).unwrap();

    assert_eq!(created.status, BookingStatus::Pending);
    assert_eq!(created.guests, 1);
    assert_eq!(created.nights(), 2);
    assert_eq!(created.confirmation_code.len(), 6);
    assert!(created
        .confirmation_code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[test]
fn invalid_dates_are_rejected() {
    let store = RecordStore::in_memory();
    let bookings = store.records::<Booking>();

    let err = bookings
        .create(BookingDraft::new(
            "Ada",
            "ada@example.com",
            "suite",
            date(2026, 12, 3),
            date(2026, 12, 1),
        ))
        .unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(bookings.count().unwrap(), 0);

    let created = bookings
        .create(BookingDraft::new(
            "Ada",
            "ada@example.com",
            "suite",
            date(2026, 12, 1),
            date(2026, 12, 3),
        ))
        .unwrap();
    let err = bookings
        .update(
            created.id(),
            BookingPatch {
                check_in: Some(date(2026, 12, 5)),
                ..BookingPatch::default()
            },
        )
        .unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(bookings.fetch(created.id()).unwrap(), created);
}
