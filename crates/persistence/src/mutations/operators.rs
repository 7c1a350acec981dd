// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator and session mutations.
//!
//! Timestamps are written as RFC 3339 UTC strings truncated to whole
//! seconds, so stored values compare correctly as text.

use diesel::SqliteConnection;
use diesel::prelude::*;
use eidiv_domain::to_rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{operators, sessions};
use crate::error::PersistenceError;

/// Formats an instant the way operator and session timestamps are stored.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn stored_timestamp(instant: OffsetDateTime) -> Result<String, PersistenceError> {
    let truncated: OffsetDateTime = instant
        .replace_nanosecond(0)
        .map_err(|e| PersistenceError::Other(e.to_string()))?;
    Ok(to_rfc3339(truncated)?)
}

fn now_timestamp() -> Result<String, PersistenceError> {
    stored_timestamp(OffsetDateTime::now_utc())
}

/// Creates a new operator.
///
/// The `login_name` is normalized to uppercase for case-insensitive uniqueness.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `login_name` - The login name (will be normalized)
/// * `display_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The role (`Admin` or `Recorder`)
///
/// # Errors
///
/// Returns an error if the operator cannot be created or if the login name
/// already exists.
pub fn create_operator(
    conn: &mut SqliteConnection,
    login_name: &str,
    display_name: &str,
    password: &str,
    role: &str,
) -> Result<i64, PersistenceError> {
    let normalized_login: String = login_name.trim().to_uppercase();

    info!(
        "Creating operator with login_name: {}, display_name: {}, role: {}",
        normalized_login, display_name, role
    );

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(operators::table)
        .values((
            operators::login_name.eq(&normalized_login),
            operators::display_name.eq(display_name),
            operators::password_hash.eq(&password_hash),
            operators::role.eq(role),
            operators::created_at.eq(now_timestamp()?),
        ))
        .execute(conn)?;

    let operator_id: i64 = conn.get_last_insert_rowid()?;

    info!(operator_id, "Operator created successfully");
    Ok(operator_id)
}

/// Updates the last login timestamp for an operator.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<(), PersistenceError> {
    debug!("Updating last_login_at for operator ID: {}", operator_id);

    diesel::update(operators::table)
        .filter(operators::operator_id.eq(operator_id))
        .set(operators::last_login_at.eq(Some(now_timestamp()?)))
        .execute(conn)?;

    Ok(())
}

/// Disables an operator and ends all of their sessions.
///
/// # Errors
///
/// Returns `NotFound` if the operator does not exist.
pub fn disable_operator(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<(), PersistenceError> {
    info!("Disabling operator ID: {}", operator_id);

    conn.immediate_transaction(|conn| {
        let rows_affected: usize = diesel::update(operators::table)
            .filter(operators::operator_id.eq(operator_id))
            .set(operators::is_disabled.eq(true))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::not_found("operator", operator_id));
        }

        delete_sessions_for_operator(conn, operator_id)?;
        Ok(())
    })
}

/// Re-enables a disabled operator.
///
/// # Errors
///
/// Returns `NotFound` if the operator does not exist.
pub fn enable_operator(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<(), PersistenceError> {
    info!("Re-enabling operator ID: {}", operator_id);

    let rows_affected: usize = diesel::update(operators::table)
        .filter(operators::operator_id.eq(operator_id))
        .set(operators::is_disabled.eq(false))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::not_found("operator", operator_id));
    }
    Ok(())
}

/// Updates an operator's password.
///
/// # Errors
///
/// Returns an error if the password cannot be hashed or the update fails.
pub fn update_password(
    conn: &mut SqliteConnection,
    operator_id: i64,
    new_password: &str,
) -> Result<(), PersistenceError> {
    info!("Updating password for operator ID: {}", operator_id);

    let password_hash: String = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::update(operators::table)
        .filter(operators::operator_id.eq(operator_id))
        .set(operators::password_hash.eq(&password_hash))
        .execute(conn)?;

    info!("Password updated for operator ID: {}", operator_id);
    Ok(())
}

/// Creates a new session for an operator.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `operator_id` - The operator ID
/// * `expires_at` - The instant after which the session is invalid
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    operator_id: i64,
    expires_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let expires_at: String = stored_timestamp(expires_at)?;
    let now: String = now_timestamp()?;

    debug!(
        "Creating session for operator ID: {} with expiration: {}",
        operator_id, expires_at
    );

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::operator_id.eq(operator_id),
            sessions::created_at.eq(&now),
            sessions::last_activity_at.eq(&now),
            sessions::expires_at.eq(&expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    debug!(session_id, operator_id, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<(), PersistenceError> {
    debug!("Updating last_activity_at for session ID: {}", session_id);

    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(now_timestamp()?))
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token.
///
/// This is used for logout operations.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes all sessions whose expiry lies before `now`.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    debug!("Deleting expired sessions");

    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(stored_timestamp(now)?))
        .execute(conn)?;

    info!("Deleted {} expired sessions", rows_affected);
    Ok(rows_affected)
}

/// Deletes all sessions for a specific operator.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_sessions_for_operator(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<usize, PersistenceError> {
    info!("Deleting all sessions for operator ID: {}", operator_id);

    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::operator_id.eq(operator_id))
        .execute(conn)?;

    info!(
        "Deleted {} sessions for operator ID: {}",
        rows_affected, operator_id
    );
    Ok(rows_affected)
}
