
use std::collections::HashSet;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use fixtures::{booking, race};
use record_store::{
    Booking, LockError, Mutation, Record, RecordStore, StoreConfig, StoreError, SupportRequest,
    SupportRequestDraft,
};

#[test]
fn concurrent_creates_lose_nothing() {
    let store = Arc::new(RecordStore::in_memory());

    let shared = Arc::clone(&store);
    let ids = race(10, move |i| {
        shared
            .create::<Booking>(booking(&format!("Guest {}", i)))
            .unwrap()
            .id()
            .to_string()
    });

    let ids: HashSet<String> = ids.into_iter().collect();
    assert_eq!(ids.len(), 10);

    let stored = store.list::<Booking>().unwrap();
    assert_eq!(stored.len(), 10);
    for booking in &stored {
        assert!(ids.contains(booking.id()));
    }
    assert_eq!(store.snapshots().writes(), 10);
}

#[test]
fn hundreds_of_file_backed_creates_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path()).pretty(false);
    let store = Arc::new(RecordStore::open(&config));

    let shared = Arc::clone(&store);
    let per_thread = race(30, move |t| {
        (0..10)
            .map(|i| {
                shared
                    .create::<Booking>(booking(&format!("Guest {}-{}", t, i)))
                    .unwrap()
                    .id()
                    .to_string()
            })
            .collect::<Vec<_>>()
    });

    let ids: HashSet<String> = per_thread.into_iter().flatten().collect();
    assert_eq!(ids.len(), 300);

    // A fresh store over the same directory sees every record.
    let reopened = RecordStore::open(&config);
    let stored = reopened.list::<Booking>().unwrap();
    assert_eq!(stored.len(), 300);
    let stored_ids: HashSet<String> = stored.iter().map(|b| b.id().to_string()).collect();
    assert_eq!(stored_ids, ids);
}

#[test]
fn concurrent_updates_of_one_record_all_apply() {
    let store = Arc::new(RecordStore::in_memory());
    let created = store.create::<Booking>(booking("Ada")).unwrap();
    let id = created.id().to_string();

    let shared = Arc::clone(&store);
    let versions = race(25, move |_| {
        let (updated, ()) = shared
            .update_with::<Booking, _, _>(&id, |booking| {
                booking.guests += 1;
                Ok(())
            })
            .unwrap();
        updated.meta().version()
    });

    let distinct: HashSet<u64> = versions.iter().copied().collect();
    assert_eq!(distinct.len(), 25);

    let stored = store.get::<Booking>(created.id()).unwrap().unwrap();
    assert_eq!(stored.guests, 26);
    assert_eq!(stored.meta().version(), 26);
}

#[test]
fn mixed_mutations_keep_ids_unique() {
    let store = Arc::new(RecordStore::in_memory());
    let seeded: Vec<String> = (0..20)
        .map(|i| {
            store
                .create::<Booking>(booking(&format!("Seed {}", i)))
                .unwrap()
                .id()
                .to_string()
        })
        .collect();
    let seeded = Arc::new(seeded);

    let shared = Arc::clone(&store);
    let to_delete = Arc::clone(&seeded);
    race(20, move |i| {
        if i % 2 == 0 {
            shared.delete::<Booking>(&to_delete[i]).unwrap();
        } else {
            shared
                .create::<Booking>(booking(&format!("New {}", i)))
                .unwrap();
        }
    });

    let stored = store.list::<Booking>().unwrap();
    assert_eq!(stored.len(), 20);
    let unique: HashSet<&str> = stored.iter().map(|b| b.id()).collect();
    assert_eq!(unique.len(), stored.len());
    for (i, id) in seeded.iter().enumerate() {
        assert_eq!(unique.contains(id.as_str()), i % 2 == 1);
    }
}

#[test]
fn collections_do_not_block_each_other() {
    let store = Arc::new(
        RecordStore::in_memory().with_lock_timeout(Some(Duration::from_millis(50))),
    );
    store.create::<Booking>(booking("Ada")).unwrap();

    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let holder = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store
                .with_exclusive_access(|records: Vec<Booking>| {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    Ok(Mutation::<Booking, usize>::Unchanged(records.len()))
                })
                .unwrap()
        })
    };
    entered_rx.recv().unwrap();

    // Other collections mutate freely.
    store
        .records::<SupportRequest>()
        .submit(SupportRequestDraft::new("Grace", "Extra towels please"))
        .unwrap();

    // Reads never wait.
    assert_eq!(store.list::<Booking>().unwrap().len(), 1);

    // Writers on the held collection give up after the timeout.
    let err = store.create::<Booking>(booking("Alan")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Lock {
            ref collection,
            source: LockError::Timeout { .. },
        } if collection == "bookings"
    ));

    release_tx.send(()).unwrap();
    assert_eq!(holder.join().unwrap(), 1);

    // The abandoned create left nothing behind and the lock is free again.
    store.create::<Booking>(booking("Alan")).unwrap();
    assert_eq!(store.count::<Booking>().unwrap(), 2);
}

#[test]
fn readers_observe_only_committed_snapshots() {
    let store = Arc::new(RecordStore::in_memory());
    let writer_store = Arc::clone(&store);

    let writer = thread::spawn(move || {
        for i in 0..50 {
            writer_store
                .create::<Booking>(booking(&format!("Guest {}", i)))
                .unwrap();
        }
    });

    let mut last = 0;
    while !writer.is_finished() {
        let seen = store.list::<Booking>().unwrap().len();
        assert!(seen >= last, "snapshot went backwards: {} < {}", seen, last);
        last = seen;
    }
    writer.join().unwrap();
    assert_eq!(store.count::<Booking>().unwrap(), 50);
}
