// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Master data queries.
//!
//! Lists are returned in their display order. The `is_*_referenced` checks
//! back the deletion protection in `mutations::master_data`.

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use eidiv_domain::{
    Container, Keyword, KeywordCategory, LookupEntry, LookupKind, MailRecipient, MasterData,
    Member, Trailer, Vehicle,
};
use tracing::debug;

use crate::diesel_schema::{
    containers, duty_attendance, duty_containers, duty_trailers, duty_vehicles, incident_agencies,
    incident_attendance, incident_brigades, incident_containers, incident_resources,
    incident_trailers, incident_vehicles, incident_water_supplies, incidents, keywords,
    lookup_entries, mail_recipients, members, trailers, vehicles,
};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = members)]
struct MemberRow {
    member_id: i64,
    last_name: String,
    first_name: String,
    agt_qualified: bool,
    full_time: bool,
    commander: bool,
    deputy_commander: bool,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            member_id: Some(row.member_id),
            last_name: row.last_name,
            first_name: row.first_name,
            agt_qualified: row.agt_qualified,
            full_time: row.full_time,
            commander: row.commander,
            deputy_commander: row.deputy_commander,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = vehicles)]
struct VehicleRow {
    vehicle_id: i64,
    vehicle_type: String,
    call_sign: String,
    registration: String,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            vehicle_id: Some(row.vehicle_id),
            vehicle_type: row.vehicle_type,
            call_sign: row.call_sign,
            registration: row.registration,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = containers)]
struct ContainerRow {
    container_id: i64,
    container_type: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = trailers)]
struct TrailerRow {
    trailer_id: i64,
    trailer_type: String,
    registration: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = lookup_entries)]
struct LookupRow {
    entry_id: i64,
    kind: String,
    label: String,
}

impl TryFrom<LookupRow> for LookupEntry {
    type Error = PersistenceError;

    fn try_from(row: LookupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            entry_id: Some(row.entry_id),
            kind: LookupKind::parse(&row.kind)?,
            label: row.label,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = keywords)]
struct KeywordRow {
    keyword_id: i64,
    code: String,
    label: String,
    active: bool,
    category: String,
}

impl TryFrom<KeywordRow> for Keyword {
    type Error = PersistenceError;

    fn try_from(row: KeywordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            keyword_id: Some(row.keyword_id),
            code: row.code,
            label: row.label,
            active: row.active,
            category: KeywordCategory::parse(&row.category)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = mail_recipients)]
struct RecipientRow {
    recipient_id: i64,
    email: String,
    active: bool,
}

/// Lists all members ordered by last name, then first name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_members(conn: &mut SqliteConnection) -> Result<Vec<Member>, PersistenceError> {
    let rows: Vec<MemberRow> = members::table
        .order((
            members::last_name.asc(),
            members::first_name.asc(),
            members::member_id.asc(),
        ))
        .select(MemberRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(Member::from).collect())
}

/// Retrieves a member by id.
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if the member does not exist.
pub fn get_member(
    conn: &mut SqliteConnection,
    member_id: i64,
) -> Result<Option<Member>, PersistenceError> {
    debug!("Looking up member ID: {}", member_id);

    let row: Option<MemberRow> = members::table
        .find(member_id)
        .select(MemberRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(Member::from))
}

/// Lists all vehicles ordered by call sign.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vehicles(conn: &mut SqliteConnection) -> Result<Vec<Vehicle>, PersistenceError> {
    let rows: Vec<VehicleRow> = vehicles::table
        .order((vehicles::call_sign.asc(), vehicles::vehicle_id.asc()))
        .select(VehicleRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(Vehicle::from).collect())
}

/// Lists all roll-off containers ordered by type.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_containers(conn: &mut SqliteConnection) -> Result<Vec<Container>, PersistenceError> {
    let rows: Vec<ContainerRow> = containers::table
        .order((containers::container_type.asc(), containers::container_id.asc()))
        .select(ContainerRow::as_select())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| Container {
            container_id: Some(row.container_id),
            container_type: row.container_type,
        })
        .collect())
}

/// Lists all trailers ordered by type.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_trailers(conn: &mut SqliteConnection) -> Result<Vec<Trailer>, PersistenceError> {
    let rows: Vec<TrailerRow> = trailers::table
        .order((trailers::trailer_type.asc(), trailers::trailer_id.asc()))
        .select(TrailerRow::as_select())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| Trailer {
            trailer_id: Some(row.trailer_id),
            trailer_type: row.trailer_type,
            registration: row.registration,
        })
        .collect())
}

/// Lists lookup entries, optionally restricted to one kind, ordered by
/// label.
///
/// # Errors
///
/// Returns an error if the query fails or a stored kind is unknown.
pub fn list_lookup_entries(
    conn: &mut SqliteConnection,
    kind: Option<LookupKind>,
) -> Result<Vec<LookupEntry>, PersistenceError> {
    let mut query = lookup_entries::table
        .select(LookupRow::as_select())
        .order((lookup_entries::label.asc(), lookup_entries::entry_id.asc()))
        .into_boxed::<Sqlite>();

    if let Some(kind) = kind {
        query = query.filter(lookup_entries::kind.eq(kind.as_str()));
    }

    let rows: Vec<LookupRow> = query.load(conn)?;
    rows.into_iter().map(LookupEntry::try_from).collect()
}

/// Lists keywords ordered by code.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `category` - Restrict to one category
/// * `active_only` - Skip inactive keywords
///
/// # Errors
///
/// Returns an error if the query fails or a stored category is unknown.
pub fn list_keywords(
    conn: &mut SqliteConnection,
    category: Option<KeywordCategory>,
    active_only: bool,
) -> Result<Vec<Keyword>, PersistenceError> {
    let mut query = keywords::table
        .select(KeywordRow::as_select())
        .order((keywords::code.asc(), keywords::keyword_id.asc()))
        .into_boxed::<Sqlite>();

    if let Some(category) = category {
        query = query.filter(keywords::category.eq(category.as_str()));
    }
    if active_only {
        query = query.filter(keywords::active.eq(true));
    }

    let rows: Vec<KeywordRow> = query.load(conn)?;
    rows.into_iter().map(Keyword::try_from).collect()
}

/// Retrieves a keyword by id.
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if the keyword does not exist.
pub fn get_keyword(
    conn: &mut SqliteConnection,
    keyword_id: i64,
) -> Result<Option<Keyword>, PersistenceError> {
    debug!("Looking up keyword ID: {}", keyword_id);

    let row: Option<KeywordRow> = keywords::table
        .find(keyword_id)
        .select(KeywordRow::as_select())
        .first(conn)
        .optional()?;

    row.map(Keyword::try_from).transpose()
}

/// Lists all mail recipients ordered by address.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_recipients(
    conn: &mut SqliteConnection,
) -> Result<Vec<MailRecipient>, PersistenceError> {
    let rows: Vec<RecipientRow> = mail_recipients::table
        .order(mail_recipients::email.asc())
        .select(RecipientRow::as_select())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| MailRecipient {
            recipient_id: Some(row.recipient_id),
            email: row.email,
            active: row.active,
        })
        .collect())
}

/// Returns the addresses of all active recipients.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn active_recipient_emails(
    conn: &mut SqliteConnection,
) -> Result<Vec<String>, PersistenceError> {
    let emails: Vec<String> = mail_recipients::table
        .filter(mail_recipients::active.eq(true))
        .order(mail_recipients::email.asc())
        .select(mail_recipients::email)
        .load(conn)?;

    debug!(count = emails.len(), "Loaded active recipients");
    Ok(emails)
}

/// Loads every master data table into a snapshot used for validation.
///
/// # Errors
///
/// Returns an error if any query fails.
pub fn load_master_data(conn: &mut SqliteConnection) -> Result<MasterData, PersistenceError> {
    Ok(MasterData {
        members: list_members(conn)?,
        vehicles: list_vehicles(conn)?,
        containers: list_containers(conn)?,
        trailers: list_trailers(conn)?,
        lookups: list_lookup_entries(conn, None)?,
        keywords: list_keywords(conn, None, false)?,
    })
}

/// Checks whether a member appears on any attendance roster.
///
/// Leaders are not counted; deleting a member clears the leader reference.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_member_referenced(
    conn: &mut SqliteConnection,
    member_id: i64,
) -> Result<bool, PersistenceError> {
    let incident_count: i64 = incident_attendance::table
        .filter(incident_attendance::member_id.eq(member_id))
        .select(count_star())
        .get_result(conn)?;
    let duty_count: i64 = duty_attendance::table
        .filter(duty_attendance::member_id.eq(member_id))
        .select(count_star())
        .get_result(conn)?;

    Ok(incident_count + duty_count > 0)
}

/// Checks whether a vehicle is used by any incident or duty.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_vehicle_referenced(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<bool, PersistenceError> {
    let incident_count: i64 = incident_vehicles::table
        .filter(incident_vehicles::vehicle_id.eq(vehicle_id))
        .select(count_star())
        .get_result(conn)?;
    let duty_count: i64 = duty_vehicles::table
        .filter(duty_vehicles::vehicle_id.eq(vehicle_id))
        .select(count_star())
        .get_result(conn)?;

    Ok(incident_count + duty_count > 0)
}

/// Checks whether a container is used by any incident or duty.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_container_referenced(
    conn: &mut SqliteConnection,
    container_id: i64,
) -> Result<bool, PersistenceError> {
    let incident_count: i64 = incident_containers::table
        .filter(incident_containers::container_id.eq(container_id))
        .select(count_star())
        .get_result(conn)?;
    let duty_count: i64 = duty_containers::table
        .filter(duty_containers::container_id.eq(container_id))
        .select(count_star())
        .get_result(conn)?;

    Ok(incident_count + duty_count > 0)
}

/// Checks whether a trailer is used by any incident or duty.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_trailer_referenced(
    conn: &mut SqliteConnection,
    trailer_id: i64,
) -> Result<bool, PersistenceError> {
    let incident_count: i64 = incident_trailers::table
        .filter(incident_trailers::trailer_id.eq(trailer_id))
        .select(count_star())
        .get_result(conn)?;
    let duty_count: i64 = duty_trailers::table
        .filter(duty_trailers::trailer_id.eq(trailer_id))
        .select(count_star())
        .get_result(conn)?;

    Ok(incident_count + duty_count > 0)
}

/// Checks whether a lookup entry is used by an incident join row.
///
/// Scalar lookup fields on the incident itself are not counted; they are
/// cleared when the entry is deleted.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_lookup_referenced(
    conn: &mut SqliteConnection,
    entry_id: i64,
) -> Result<bool, PersistenceError> {
    let water: i64 = incident_water_supplies::table
        .filter(incident_water_supplies::source_id.eq(entry_id))
        .select(count_star())
        .get_result(conn)?;
    let resources: i64 = incident_resources::table
        .filter(incident_resources::resource_id.eq(entry_id))
        .select(count_star())
        .get_result(conn)?;
    let brigades: i64 = incident_brigades::table
        .filter(incident_brigades::brigade_id.eq(entry_id))
        .select(count_star())
        .get_result(conn)?;
    let agencies: i64 = incident_agencies::table
        .filter(incident_agencies::agency_id.eq(entry_id))
        .select(count_star())
        .get_result(conn)?;

    Ok(water + resources + brigades + agencies > 0)
}

/// Checks whether any incident carries this keyword.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_keyword_referenced(
    conn: &mut SqliteConnection,
    keyword_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = incidents::table
        .filter(incidents::keyword_id.eq(keyword_id))
        .select(count_star())
        .get_result(conn)?;

    Ok(count > 0)
}
