// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Master data mutations.
//!
//! Deletes check for referencing event rows first and fail with
//! `PersistenceError::Referenced` instead of relying on the `RESTRICT`
//! constraint alone, so callers get the entity and id back. The check and
//! the delete run in one immediate transaction.

use diesel::SqliteConnection;
use diesel::prelude::*;
use eidiv_domain::{
    Container, Keyword, KeywordCategory, LookupEntry, LookupKind, MailRecipient, Member, Trailer,
    Vehicle,
};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{
    containers, keywords, lookup_entries, mail_recipients, members, trailers, vehicles,
};
use crate::error::PersistenceError;
use crate::queries::master_data::{
    is_container_referenced, is_keyword_referenced, is_lookup_referenced, is_member_referenced,
    is_trailer_referenced, is_vehicle_referenced,
};

fn expect_affected(
    rows_affected: usize,
    entity: &'static str,
    id: i64,
) -> Result<(), PersistenceError> {
    if rows_affected == 0 {
        return Err(PersistenceError::not_found(entity, id));
    }
    Ok(())
}

/// Runs `is_referenced` and the delete in one transaction.
fn delete_unreferenced<F, D>(
    conn: &mut SqliteConnection,
    entity: &'static str,
    id: i64,
    is_referenced: F,
    delete: D,
) -> Result<(), PersistenceError>
where
    F: FnOnce(&mut SqliteConnection, i64) -> Result<bool, PersistenceError>,
    D: FnOnce(&mut SqliteConnection) -> Result<usize, diesel::result::Error>,
{
    info!("Attempting to delete {} ID: {}", entity, id);

    conn.immediate_transaction(|conn| {
        if is_referenced(conn, id)? {
            return Err(PersistenceError::Referenced { entity, id });
        }
        expect_affected(delete(conn)?, entity, id)
    })?;

    info!("Deleted {} ID: {}", entity, id);
    Ok(())
}

/// Creates a member.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_member(
    conn: &mut SqliteConnection,
    member: &Member,
) -> Result<i64, PersistenceError> {
    info!(
        "Creating member: {}, {}",
        member.last_name, member.first_name
    );

    diesel::insert_into(members::table)
        .values((
            members::last_name.eq(member.last_name.trim()),
            members::first_name.eq(member.first_name.trim()),
            members::agt_qualified.eq(member.agt_qualified),
            members::full_time.eq(member.full_time),
            members::commander.eq(member.commander),
            members::deputy_commander.eq(member.deputy_commander),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Replaces all fields of a member.
///
/// # Errors
///
/// Returns `NotFound` if the member does not exist.
pub fn update_member(
    conn: &mut SqliteConnection,
    member_id: i64,
    member: &Member,
) -> Result<(), PersistenceError> {
    info!("Updating member ID: {}", member_id);

    let rows_affected: usize = diesel::update(members::table.find(member_id))
        .set((
            members::last_name.eq(member.last_name.trim()),
            members::first_name.eq(member.first_name.trim()),
            members::agt_qualified.eq(member.agt_qualified),
            members::full_time.eq(member.full_time),
            members::commander.eq(member.commander),
            members::deputy_commander.eq(member.deputy_commander),
        ))
        .execute(conn)?;

    expect_affected(rows_affected, "member", member_id)
}

/// Deletes a member that is on no attendance roster.
///
/// # Errors
///
/// Returns `Referenced` if the member attended an event, `NotFound` if the
/// member does not exist.
pub fn delete_member(conn: &mut SqliteConnection, member_id: i64) -> Result<(), PersistenceError> {
    delete_unreferenced(conn, "member", member_id, is_member_referenced, |conn| {
        diesel::delete(members::table.find(member_id)).execute(conn)
    })
}

/// Creates a vehicle.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_vehicle(
    conn: &mut SqliteConnection,
    vehicle: &Vehicle,
) -> Result<i64, PersistenceError> {
    info!("Creating vehicle: {}", vehicle.call_sign);

    diesel::insert_into(vehicles::table)
        .values((
            vehicles::vehicle_type.eq(vehicle.vehicle_type.trim()),
            vehicles::call_sign.eq(vehicle.call_sign.trim()),
            vehicles::registration.eq(vehicle.registration.trim()),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Replaces all fields of a vehicle.
///
/// # Errors
///
/// Returns `NotFound` if the vehicle does not exist.
pub fn update_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    vehicle: &Vehicle,
) -> Result<(), PersistenceError> {
    info!("Updating vehicle ID: {}", vehicle_id);

    let rows_affected: usize = diesel::update(vehicles::table.find(vehicle_id))
        .set((
            vehicles::vehicle_type.eq(vehicle.vehicle_type.trim()),
            vehicles::call_sign.eq(vehicle.call_sign.trim()),
            vehicles::registration.eq(vehicle.registration.trim()),
        ))
        .execute(conn)?;

    expect_affected(rows_affected, "vehicle", vehicle_id)
}

/// Deletes a vehicle that no event uses.
///
/// # Errors
///
/// Returns `Referenced` if an incident or duty uses the vehicle, `NotFound`
/// if it does not exist.
pub fn delete_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<(), PersistenceError> {
    delete_unreferenced(conn, "vehicle", vehicle_id, is_vehicle_referenced, |conn| {
        diesel::delete(vehicles::table.find(vehicle_id)).execute(conn)
    })
}

/// Creates a roll-off container.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_container(
    conn: &mut SqliteConnection,
    container: &Container,
) -> Result<i64, PersistenceError> {
    info!("Creating container: {}", container.container_type);

    diesel::insert_into(containers::table)
        .values(containers::container_type.eq(container.container_type.trim()))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// # Errors
///
/// Returns `NotFound` if the container does not exist.
pub fn update_container(
    conn: &mut SqliteConnection,
    container_id: i64,
    container: &Container,
) -> Result<(), PersistenceError> {
    info!("Updating container ID: {}", container_id);

    let rows_affected: usize = diesel::update(containers::table.find(container_id))
        .set(containers::container_type.eq(container.container_type.trim()))
        .execute(conn)?;

    expect_affected(rows_affected, "container", container_id)
}

/// # Errors
///
/// Returns `Referenced` if an event uses the container, `NotFound` if it
/// does not exist.
pub fn delete_container(
    conn: &mut SqliteConnection,
    container_id: i64,
) -> Result<(), PersistenceError> {
    delete_unreferenced(
        conn,
        "container",
        container_id,
        is_container_referenced,
        |conn| diesel::delete(containers::table.find(container_id)).execute(conn),
    )
}

/// Creates a trailer.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_trailer(
    conn: &mut SqliteConnection,
    trailer: &Trailer,
) -> Result<i64, PersistenceError> {
    info!("Creating trailer: {}", trailer.trailer_type);

    diesel::insert_into(trailers::table)
        .values((
            trailers::trailer_type.eq(trailer.trailer_type.trim()),
            trailers::registration.eq(trailer.registration.trim()),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// # Errors
///
/// Returns `NotFound` if the trailer does not exist.
pub fn update_trailer(
    conn: &mut SqliteConnection,
    trailer_id: i64,
    trailer: &Trailer,
) -> Result<(), PersistenceError> {
    info!("Updating trailer ID: {}", trailer_id);

    let rows_affected: usize = diesel::update(trailers::table.find(trailer_id))
        .set((
            trailers::trailer_type.eq(trailer.trailer_type.trim()),
            trailers::registration.eq(trailer.registration.trim()),
        ))
        .execute(conn)?;

    expect_affected(rows_affected, "trailer", trailer_id)
}

/// # Errors
///
/// Returns `Referenced` if an event uses the trailer, `NotFound` if it does
/// not exist.
pub fn delete_trailer(
    conn: &mut SqliteConnection,
    trailer_id: i64,
) -> Result<(), PersistenceError> {
    delete_unreferenced(conn, "trailer", trailer_id, is_trailer_referenced, |conn| {
        diesel::delete(trailers::table.find(trailer_id)).execute(conn)
    })
}

/// Creates a lookup entry of the entry's kind.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_lookup_entry(
    conn: &mut SqliteConnection,
    entry: &LookupEntry,
) -> Result<i64, PersistenceError> {
    info!(
        "Creating {} lookup entry: {}",
        entry.kind.as_str(),
        entry.label
    );

    diesel::insert_into(lookup_entries::table)
        .values((
            lookup_entries::kind.eq(entry.kind.as_str()),
            lookup_entries::label.eq(entry.label.trim()),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Renames a lookup entry. The entry must be of `kind`.
///
/// # Errors
///
/// Returns `NotFound` if no entry of that kind has the id.
pub fn update_lookup_entry(
    conn: &mut SqliteConnection,
    kind: LookupKind,
    entry_id: i64,
    label: &str,
) -> Result<(), PersistenceError> {
    info!("Updating {} lookup entry ID: {}", kind.as_str(), entry_id);

    let rows_affected: usize = diesel::update(
        lookup_entries::table
            .filter(lookup_entries::entry_id.eq(entry_id))
            .filter(lookup_entries::kind.eq(kind.as_str())),
    )
    .set(lookup_entries::label.eq(label.trim()))
    .execute(conn)?;

    expect_affected(rows_affected, "lookup entry", entry_id)
}

/// Deletes a lookup entry of `kind` that no incident join row uses.
///
/// Scalar references on incidents are cleared by the database.
///
/// # Errors
///
/// Returns `Referenced` if the entry is in use, `NotFound` if no entry of
/// that kind has the id.
pub fn delete_lookup_entry(
    conn: &mut SqliteConnection,
    kind: LookupKind,
    entry_id: i64,
) -> Result<(), PersistenceError> {
    delete_unreferenced(
        conn,
        "lookup entry",
        entry_id,
        is_lookup_referenced,
        |conn| {
            diesel::delete(
                lookup_entries::table
                    .filter(lookup_entries::entry_id.eq(entry_id))
                    .filter(lookup_entries::kind.eq(kind.as_str())),
            )
            .execute(conn)
        },
    )
}

/// Creates a keyword.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_keyword(
    conn: &mut SqliteConnection,
    keyword: &Keyword,
) -> Result<i64, PersistenceError> {
    info!("Creating keyword: {}", keyword);

    diesel::insert_into(keywords::table)
        .values((
            keywords::code.eq(keyword.code.trim()),
            keywords::label.eq(keyword.label.trim()),
            keywords::active.eq(keyword.active),
            keywords::category.eq(keyword.category.as_str()),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Replaces all fields of a keyword.
///
/// # Errors
///
/// Returns `NotFound` if the keyword does not exist.
pub fn update_keyword(
    conn: &mut SqliteConnection,
    keyword_id: i64,
    keyword: &Keyword,
) -> Result<(), PersistenceError> {
    info!("Updating keyword ID: {}", keyword_id);

    let rows_affected: usize = diesel::update(keywords::table.find(keyword_id))
        .set((
            keywords::code.eq(keyword.code.trim()),
            keywords::label.eq(keyword.label.trim()),
            keywords::active.eq(keyword.active),
            keywords::category.eq(keyword.category.as_str()),
        ))
        .execute(conn)?;

    expect_affected(rows_affected, "keyword", keyword_id)
}

/// Moves a keyword to another category.
///
/// # Errors
///
/// Returns `NotFound` if the keyword does not exist.
pub fn set_keyword_category(
    conn: &mut SqliteConnection,
    keyword_id: i64,
    category: KeywordCategory,
) -> Result<(), PersistenceError> {
    info!(
        "Setting category of keyword ID {} to {}",
        keyword_id,
        category.as_str()
    );

    let rows_affected: usize = diesel::update(keywords::table.find(keyword_id))
        .set(keywords::category.eq(category.as_str()))
        .execute(conn)?;

    expect_affected(rows_affected, "keyword", keyword_id)
}

/// Deletes a keyword no incident carries.
///
/// # Errors
///
/// Returns `Referenced` if an incident carries the keyword, `NotFound` if it
/// does not exist.
pub fn delete_keyword(
    conn: &mut SqliteConnection,
    keyword_id: i64,
) -> Result<(), PersistenceError> {
    delete_unreferenced(conn, "keyword", keyword_id, is_keyword_referenced, |conn| {
        diesel::delete(keywords::table.find(keyword_id)).execute(conn)
    })
}

/// Adds a mail recipient. Addresses are stored lowercase.
///
/// # Errors
///
/// Returns `Duplicate` if the address is already on the list.
pub fn create_recipient(
    conn: &mut SqliteConnection,
    recipient: &MailRecipient,
) -> Result<i64, PersistenceError> {
    let email: String = recipient.email.trim().to_lowercase();
    info!("Adding mail recipient: {}", email);

    diesel::insert_into(mail_recipients::table)
        .values((
            mail_recipients::email.eq(&email),
            mail_recipients::active.eq(recipient.active),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// # Errors
///
/// Returns `NotFound` if the recipient does not exist, `Duplicate` if the
/// new address is already taken.
pub fn update_recipient(
    conn: &mut SqliteConnection,
    recipient_id: i64,
    recipient: &MailRecipient,
) -> Result<(), PersistenceError> {
    let email: String = recipient.email.trim().to_lowercase();
    info!("Updating mail recipient ID: {}", recipient_id);

    let rows_affected: usize = diesel::update(mail_recipients::table.find(recipient_id))
        .set((
            mail_recipients::email.eq(&email),
            mail_recipients::active.eq(recipient.active),
        ))
        .execute(conn)?;

    expect_affected(rows_affected, "recipient", recipient_id)
}

/// Recipients are never referenced, so deletion only fails for unknown ids.
///
/// # Errors
///
/// Returns `NotFound` if the recipient does not exist.
pub fn delete_recipient(
    conn: &mut SqliteConnection,
    recipient_id: i64,
) -> Result<(), PersistenceError> {
    info!("Deleting mail recipient ID: {}", recipient_id);

    let rows_affected: usize =
        diesel::delete(mail_recipients::table.find(recipient_id)).execute(conn)?;

    expect_affected(rows_affected, "recipient", recipient_id)
}
