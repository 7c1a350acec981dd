// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Every other test module opens its database through `new_in_memory()`,
//! which exercises migrations and the foreign key check as a side effect.

use crate::Persistence;
use crate::tests::create_test_member;

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, crate::error::PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_key_enforcement_is_enabled() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = Persistence::new_in_memory().unwrap();
    let mut db2 = Persistence::new_in_memory().unwrap();

    create_test_member(&mut db1, "Huber", "Anna");

    assert_eq!(db1.list_members().unwrap().len(), 1);
    assert!(db2.list_members().unwrap().is_empty());
}

#[test]
fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eidiv.sqlite");

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        create_test_member(&mut persistence, "Huber", "Anna");
    }

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    let members = reopened.list_members().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].last_name, "Huber");
}
