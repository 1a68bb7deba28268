// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_account, create_test_persistence, insert_test_event};
use crate::Persistence;

#[test]
fn test_persistence_initialization() {
    let result = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_key_enforcement_is_active() {
    let mut persistence = create_test_persistence();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = create_test_persistence();
    let mut db2 = create_test_persistence();

    let event_id = insert_test_event(&mut db1, 10);
    create_test_account(&mut db1, "ada@example.com");

    assert!(db1.get_event(event_id).unwrap().is_some());
    assert!(db2.get_event(event_id).unwrap().is_none());
    assert!(db2.get_account_by_login("ada@example.com").unwrap().is_none());
}

#[test]
fn test_file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "marquee_reopen_{}_{}.db",
        std::process::id(),
        line!()
    ));
    let _ = std::fs::remove_file(&path);

    let event_id = {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        insert_test_event(&mut persistence, 10)
    };

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    let event = reopened.get_event(event_id).unwrap();
    assert_eq!(event.map(|e| e.title), Some(String::from("Test Show")));

    drop(reopened);
    let _ = std::fs::remove_file(&path);
}
