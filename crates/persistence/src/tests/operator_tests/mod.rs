// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for operator lifecycle and session persistence operations.

use time::{Duration, OffsetDateTime};

use crate::{Persistence, PersistenceError};

#[test]
fn test_create_operator_normalizes_login() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let operator_id = persistence
        .create_operator("  kdt.huber ", "Anna Huber", "geheim123", "Admin")
        .unwrap();

    // Lookup is case-insensitive
    let operator = persistence
        .get_operator_by_login("Kdt.Huber")
        .unwrap()
        .unwrap();
    assert_eq!(operator.operator_id, operator_id);
    assert_eq!(operator.login_name, "KDT.HUBER");
    assert_eq!(operator.display_name, "Anna Huber");
    assert!(!operator.is_disabled);
    assert!(operator.last_login_at.is_none());
    assert_ne!(operator.password_hash, "geheim123");
}

#[test]
fn test_duplicate_login_is_rejected() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence
        .create_operator("schriftfuehrer", "Lena Bauer", "geheim123", "Recorder")
        .unwrap();

    let result = persistence.create_operator("SCHRIFTFUEHRER", "Other", "geheim456", "Admin");

    match result {
        Err(PersistenceError::Duplicate(_)) => {}
        other => panic!("Expected Duplicate error, got: {other:?}"),
    }
}

#[test]
fn test_unknown_operator_is_none() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    assert!(persistence.get_operator_by_login("nobody").unwrap().is_none());
    assert!(persistence.get_operator_by_id(99).unwrap().is_none());
}

#[test]
fn test_verify_password() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence
        .create_operator("kdt", "Kommandant", "richtig", "Admin")
        .unwrap();
    let operator = persistence.get_operator_by_login("kdt").unwrap().unwrap();

    assert!(Persistence::verify_password("richtig", &operator.password_hash).unwrap());
    assert!(!Persistence::verify_password("falsch", &operator.password_hash).unwrap());
}

#[test]
fn test_update_password_replaces_hash() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let operator_id = persistence
        .create_operator("kdt", "Kommandant", "alt", "Admin")
        .unwrap();

    persistence.update_password(operator_id, "neu").unwrap();

    let operator = persistence.get_operator_by_id(operator_id).unwrap().unwrap();
    assert!(Persistence::verify_password("neu", &operator.password_hash).unwrap());
    assert!(!Persistence::verify_password("alt", &operator.password_hash).unwrap());
}

#[test]
fn test_disable_and_enable_operator() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let operator_id = persistence
        .create_operator("testop", "Test Operator", "password", "Recorder")
        .unwrap();

    persistence.disable_operator(operator_id).unwrap();
    assert!(
        persistence
            .get_operator_by_id(operator_id)
            .unwrap()
            .unwrap()
            .is_disabled
    );

    persistence.enable_operator(operator_id).unwrap();
    assert!(
        !persistence
            .get_operator_by_id(operator_id)
            .unwrap()
            .unwrap()
            .is_disabled
    );
}

#[test]
fn test_disable_unknown_operator_is_not_found() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    assert!(matches!(
        persistence.disable_operator(42),
        Err(PersistenceError::NotFound {
            entity: "operator",
            ..
        })
    ));
    assert!(matches!(
        persistence.enable_operator(42),
        Err(PersistenceError::NotFound { .. })
    ));
}

#[test]
fn test_disable_operator_ends_sessions() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let operator_id = persistence
        .create_operator("testop", "Test Operator", "password", "Recorder")
        .unwrap();
    let expires_at = OffsetDateTime::now_utc() + Duration::days(30);
    persistence
        .create_session("token-a", operator_id, expires_at)
        .unwrap();
    persistence
        .create_session("token-b", operator_id, expires_at)
        .unwrap();

    persistence.disable_operator(operator_id).unwrap();

    assert!(persistence.get_session_by_token("token-a").unwrap().is_none());
    assert!(persistence.get_session_by_token("token-b").unwrap().is_none());
}

#[test]
fn test_count_active_admin_operators() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert_eq!(persistence.count_active_admin_operators().unwrap(), 0);

    let first = persistence
        .create_operator("admin1", "Admin One", "password", "Admin")
        .unwrap();
    persistence
        .create_operator("admin2", "Admin Two", "password", "Admin")
        .unwrap();
    persistence
        .create_operator("recorder", "Recorder", "password", "Recorder")
        .unwrap();
    assert_eq!(persistence.count_active_admin_operators().unwrap(), 2);

    persistence.disable_operator(first).unwrap();
    assert_eq!(persistence.count_active_admin_operators().unwrap(), 1);
}

#[test]
fn test_list_operators_orders_by_login() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence
        .create_operator("zeller", "Zeller", "password", "Recorder")
        .unwrap();
    persistence
        .create_operator("aigner", "Aigner", "password", "Admin")
        .unwrap();

    let logins: Vec<String> = persistence
        .list_operators()
        .unwrap()
        .into_iter()
        .map(|operator| operator.login_name)
        .collect();
    assert_eq!(logins, vec!["AIGNER", "ZELLER"]);
}

#[test]
fn test_update_last_login_sets_timestamp() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let operator_id = persistence
        .create_operator("kdt", "Kommandant", "password", "Admin")
        .unwrap();

    persistence.update_last_login(operator_id).unwrap();

    let operator = persistence.get_operator_by_id(operator_id).unwrap().unwrap();
    assert!(operator.last_login_at.is_some());
}

#[test]
fn test_session_lifecycle() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let operator_id = persistence
        .create_operator("kdt", "Kommandant", "password", "Admin")
        .unwrap();
    let expires_at = OffsetDateTime::now_utc() + Duration::days(30);

    let session_id = persistence
        .create_session("abc123", operator_id, expires_at)
        .unwrap();

    let session = persistence.get_session_by_token("abc123").unwrap().unwrap();
    assert_eq!(session.session_id, session_id);
    assert_eq!(session.operator_id, operator_id);
    assert_eq!(session.created_at, session.last_activity_at);
    // Stored without fractional seconds
    assert!(!session.expires_at.contains('.'));

    persistence.update_session_activity(session_id).unwrap();
    persistence.delete_session("abc123").unwrap();
    assert!(persistence.get_session_by_token("abc123").unwrap().is_none());
}

#[test]
fn test_delete_expired_sessions_keeps_valid_ones() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let operator_id = persistence
        .create_operator("kdt", "Kommandant", "password", "Admin")
        .unwrap();
    let now = OffsetDateTime::now_utc();

    persistence
        .create_session("expired", operator_id, now - Duration::hours(1))
        .unwrap();
    persistence
        .create_session("valid", operator_id, now + Duration::days(1))
        .unwrap();

    let deleted = persistence.delete_expired_sessions(now).unwrap();

    assert_eq!(deleted, 1);
    assert!(persistence.get_session_by_token("expired").unwrap().is_none());
    assert!(persistence.get_session_by_token("valid").unwrap().is_some());
}
