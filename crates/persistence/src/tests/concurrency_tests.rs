// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Concurrent reservations against one tier.
//!
//! Every thread gets its own connection to a shared database file, so the
//! guarded update in the ledger is the only thing preventing oversell.

use super::{NOW, insert_test_event};
use crate::{Persistence, PersistenceError};
use marquee_domain::{DomainError, ReservationToken, TierLabel};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A database file removed when the guard is dropped.
struct SharedDatabase {
    path: PathBuf,
}

impl SharedDatabase {
    fn new() -> Self {
        let id = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "marquee_concurrency_{}_{id}.db",
            std::process::id()
        ));
        remove_database_files(&path);
        Self { path }
    }

    fn connect(&self) -> Persistence {
        Persistence::new_with_file(&self.path).expect("file database")
    }
}

impl Drop for SharedDatabase {
    fn drop(&mut self) {
        remove_database_files(&self.path);
    }
}

fn remove_database_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(PathBuf::from(file));
    }
}

/// Runs one reservation per connection, all released at the same moment.
fn race(
    database: &SharedDatabase,
    event_id: i64,
    threads: usize,
    quantity: u32,
) -> Vec<Result<ReservationToken, PersistenceError>> {
    let connections: Vec<Persistence> = (0..threads).map(|_| database.connect()).collect();
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = connections
        .into_iter()
        .map(|mut persistence| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                persistence.reserve(event_id, TierLabel::Regular, quantity, NOW)
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().expect("reservation thread panicked"))
        .collect()
}

fn sold(database: &SharedDatabase, event_id: i64) -> u32 {
    database
        .connect()
        .get_event(event_id)
        .unwrap()
        .unwrap()
        .tier(TierLabel::Regular)
        .unwrap()
        .sold()
}

#[test]
fn test_concurrent_single_ticket_reservations_never_oversell() {
    let database = SharedDatabase::new();
    let event_id = insert_test_event(&mut database.connect(), 5);

    let results = race(&database, event_id, 8, 1);

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 5);
    for failure in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(
                failure,
                PersistenceError::Domain(DomainError::InsufficientInventory { .. })
            ),
            "unexpected failure: {failure}"
        );
    }
    assert_eq!(sold(&database, event_id), 5);
}

#[test]
fn test_concurrent_multi_ticket_reservations_never_oversell() {
    let database = SharedDatabase::new();
    let event_id = insert_test_event(&mut database.connect(), 5);

    let results = race(&database, event_id, 8, 2);

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 2);
    assert_eq!(sold(&database, event_id), 4);
}

#[test]
fn test_concurrent_reservations_with_spare_capacity_all_succeed() {
    let database = SharedDatabase::new();
    let event_id = insert_test_event(&mut database.connect(), 100);

    let results = race(&database, event_id, 6, 3);

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(sold(&database, event_id), 18);
}
