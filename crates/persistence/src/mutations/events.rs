// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recording of incidents and duties.
//!
//! Each event is written in one immediate transaction: number allocation,
//! the event row and every join row commit together or not at all.

use diesel::SqliteConnection;
use diesel::prelude::*;
use eidiv_domain::{DutyDraft, EventNumber, IncidentDraft, NumberingPolicy, to_rfc3339};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::backend::PersistenceBackend;
use crate::data_models::RecordedEvent;
use crate::diesel_schema::{
    duties, duty_attendance, duty_containers, duty_trailers, duty_vehicles, incident_agencies,
    incident_attendance, incident_brigades, incident_containers, incident_parties,
    incident_resources, incident_trailers, incident_vehicles, incident_water_supplies, incidents,
};
use crate::error::PersistenceError;
use crate::mutations::sequence::{assign_event_number, to_columns};

#[derive(Insertable)]
#[diesel(table_name = incidents)]
struct NewIncidentRow<'a> {
    year: i32,
    seq: i32,
    keyword_id: i64,
    start_at: String,
    end_at: String,
    leader_member_id: Option<i64>,
    leader_text: &'a str,
    reporting_agency_id: Option<i64>,
    object_name: &'a str,
    street: &'a str,
    postal_city: &'a str,
    municipality: &'a str,
    district: &'a str,
    fire_extent_id: Option<i64>,
    fire_spread_id: Option<i64>,
    fire_material_id: Option<i64>,
    fire_object_id: Option<i64>,
    damage_event_id: Option<i64>,
    rescue_type_id: Option<i64>,
    rescued_count: Option<i32>,
    standby_id: Option<i64>,
    false_alarm_id: Option<i64>,
    other_id: Option<i64>,
    measures: &'a str,
    created_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = duties)]
struct NewDutyRow<'a> {
    year: i32,
    seq: i32,
    title: &'a str,
    start_at: String,
    end_at: String,
    description: &'a str,
    created_at: String,
}

/// Stores an incident and all of its join rows, numbering it first.
///
/// On failure the whole transaction is rolled back and the draft keeps the
/// number it had before the call.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `draft` - The validated incident; receives its number
/// * `policy` - Determines the numbering year
///
/// # Errors
///
/// Returns an error if allocation or any insert fails, including
/// `Duplicate` for a repeated join row.
pub fn record_incident(
    conn: &mut SqliteConnection,
    draft: &mut IncidentDraft,
    policy: &NumberingPolicy,
) -> Result<RecordedEvent, PersistenceError> {
    let previous: Option<EventNumber> = draft.number;

    let result: Result<RecordedEvent, PersistenceError> =
        conn.immediate_transaction(|conn| insert_incident(conn, draft, policy));

    if let Err(e) = &result {
        warn!(error = %e, "Recording incident failed, transaction rolled back");
        draft.number = previous;
    }
    result
}

fn insert_incident(
    conn: &mut SqliteConnection,
    draft: &mut IncidentDraft,
    policy: &NumberingPolicy,
) -> Result<RecordedEvent, PersistenceError> {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let number: EventNumber = assign_event_number(conn, draft, policy, now)?;
    let (year, seq) = to_columns(number)?;

    info!("Recording incident {}", number);

    let row = NewIncidentRow {
        year,
        seq,
        keyword_id: draft.keyword_id,
        start_at: to_rfc3339(draft.start_at)?,
        end_at: to_rfc3339(draft.end_at)?,
        leader_member_id: draft.leader_member_id,
        leader_text: draft.leader_text.trim(),
        reporting_agency_id: draft.reporting_agency_id,
        object_name: draft.location.object_name.trim(),
        street: draft.location.street.trim(),
        postal_city: draft.location.postal_city.trim(),
        municipality: draft.location.municipality.trim(),
        district: draft.location.district.trim(),
        fire_extent_id: draft.fire.extent_id,
        fire_spread_id: draft.fire.spread_id,
        fire_material_id: draft.fire.material_id,
        fire_object_id: draft.fire.object_id,
        damage_event_id: draft.assistance.damage_event_id,
        rescue_type_id: draft.assistance.rescue_type_id,
        rescued_count: draft.assistance.rescued_count,
        standby_id: draft.assistance.standby_id,
        false_alarm_id: draft.assistance.false_alarm_id,
        other_id: draft.assistance.other_id,
        measures: draft.measures.trim(),
        created_at: to_rfc3339(now)?,
    };

    diesel::insert_into(incidents::table)
        .values(&row)
        .execute(conn)?;
    let incident_id: i64 = conn.get_last_insert_rowid()?;

    if let Some(party) = &draft.party {
        diesel::insert_into(incident_parties::table)
            .values((
                incident_parties::incident_id.eq(incident_id),
                incident_parties::party_type.eq(party.party_type.as_str()),
                incident_parties::name.eq(party.name.trim()),
                incident_parties::street.eq(party.street.trim()),
                incident_parties::postal_city.eq(party.postal_city.trim()),
                incident_parties::phone.eq(party.phone.trim()),
                incident_parties::vehicle_plate.eq(party.vehicle_plate.trim()),
                incident_parties::cost_exempt.eq(party.cost_exempt),
                incident_parties::exemption_reason.eq(party.exemption_reason.trim()),
            ))
            .execute(conn)?;
    }

    for supply in &draft.water_supplies {
        diesel::insert_into(incident_water_supplies::table)
            .values((
                incident_water_supplies::incident_id.eq(incident_id),
                incident_water_supplies::source_id.eq(supply.source_id),
                incident_water_supplies::quantity.eq(supply.quantity),
            ))
            .execute(conn)?;
    }

    for usage in &draft.resources {
        diesel::insert_into(incident_resources::table)
            .values((
                incident_resources::incident_id.eq(incident_id),
                incident_resources::resource_id.eq(usage.resource_id),
                incident_resources::quantity.eq(usage.quantity),
            ))
            .execute(conn)?;
    }

    for usage in &draft.vehicles {
        diesel::insert_into(incident_vehicles::table)
            .values((
                incident_vehicles::incident_id.eq(incident_id),
                incident_vehicles::vehicle_id.eq(usage.vehicle_id),
                incident_vehicles::kilometers.eq(usage.kilometers),
                incident_vehicles::hours.eq(usage.hours),
                incident_vehicles::required.eq(usage.required),
            ))
            .execute(conn)?;
    }

    for usage in &draft.containers {
        diesel::insert_into(incident_containers::table)
            .values((
                incident_containers::incident_id.eq(incident_id),
                incident_containers::container_id.eq(usage.container_id),
                incident_containers::required.eq(usage.required),
            ))
            .execute(conn)?;
    }

    for usage in &draft.trailers {
        diesel::insert_into(incident_trailers::table)
            .values((
                incident_trailers::incident_id.eq(incident_id),
                incident_trailers::trailer_id.eq(usage.trailer_id),
                incident_trailers::kilometers.eq(usage.kilometers),
                incident_trailers::hours.eq(usage.hours),
                incident_trailers::required.eq(usage.required),
            ))
            .execute(conn)?;
    }

    for support in &draft.brigades {
        diesel::insert_into(incident_brigades::table)
            .values((
                incident_brigades::incident_id.eq(incident_id),
                incident_brigades::brigade_id.eq(support.brigade_id),
                incident_brigades::required.eq(support.required),
            ))
            .execute(conn)?;
    }

    for agency_id in &draft.agency_ids {
        diesel::insert_into(incident_agencies::table)
            .values((
                incident_agencies::incident_id.eq(incident_id),
                incident_agencies::agency_id.eq(agency_id),
            ))
            .execute(conn)?;
    }

    for entry in &draft.attendance {
        diesel::insert_into(incident_attendance::table)
            .values((
                incident_attendance::incident_id.eq(incident_id),
                incident_attendance::member_id.eq(entry.member_id),
                incident_attendance::vehicle_role.eq(entry.vehicle_role.trim()),
                incident_attendance::agt_minutes.eq(entry.agt_minutes),
            ))
            .execute(conn)?;
    }

    debug!(
        incident_id,
        attendees = draft.attendance.len(),
        vehicles = draft.vehicles.len(),
        "Incident rows written"
    );

    Ok(RecordedEvent {
        id: incident_id,
        number,
    })
}

/// Stores a duty and all of its join rows, numbering it first.
///
/// # Errors
///
/// Returns an error if allocation or any insert fails.
pub fn record_duty(
    conn: &mut SqliteConnection,
    draft: &mut DutyDraft,
    policy: &NumberingPolicy,
) -> Result<RecordedEvent, PersistenceError> {
    let previous: Option<EventNumber> = draft.number;

    let result: Result<RecordedEvent, PersistenceError> =
        conn.immediate_transaction(|conn| insert_duty(conn, draft, policy));

    if let Err(e) = &result {
        warn!(error = %e, "Recording duty failed, transaction rolled back");
        draft.number = previous;
    }
    result
}

fn insert_duty(
    conn: &mut SqliteConnection,
    draft: &mut DutyDraft,
    policy: &NumberingPolicy,
) -> Result<RecordedEvent, PersistenceError> {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let number: EventNumber = assign_event_number(conn, draft, policy, now)?;
    let (year, seq) = to_columns(number)?;

    info!("Recording duty {}", number);

    let row = NewDutyRow {
        year,
        seq,
        title: draft.title.trim(),
        start_at: to_rfc3339(draft.start_at)?,
        end_at: to_rfc3339(draft.end_at)?,
        description: draft.description.trim(),
        created_at: to_rfc3339(now)?,
    };

    diesel::insert_into(duties::table).values(&row).execute(conn)?;
    let duty_id: i64 = conn.get_last_insert_rowid()?;

    for usage in &draft.vehicles {
        diesel::insert_into(duty_vehicles::table)
            .values((
                duty_vehicles::duty_id.eq(duty_id),
                duty_vehicles::vehicle_id.eq(usage.vehicle_id),
                duty_vehicles::kilometers.eq(usage.kilometers),
                duty_vehicles::hours.eq(usage.hours),
            ))
            .execute(conn)?;
    }

    for usage in &draft.containers {
        diesel::insert_into(duty_containers::table)
            .values((
                duty_containers::duty_id.eq(duty_id),
                duty_containers::container_id.eq(usage.container_id),
                duty_containers::required.eq(usage.required),
            ))
            .execute(conn)?;
    }

    for usage in &draft.trailers {
        diesel::insert_into(duty_trailers::table)
            .values((
                duty_trailers::duty_id.eq(duty_id),
                duty_trailers::trailer_id.eq(usage.trailer_id),
                duty_trailers::kilometers.eq(usage.kilometers),
                duty_trailers::hours.eq(usage.hours),
            ))
            .execute(conn)?;
    }

    for entry in &draft.attendance {
        diesel::insert_into(duty_attendance::table)
            .values((
                duty_attendance::duty_id.eq(duty_id),
                duty_attendance::member_id.eq(entry.member_id),
                duty_attendance::vehicle_role.eq(entry.vehicle_role.trim()),
                duty_attendance::agt_minutes.eq(entry.agt_minutes),
            ))
            .execute(conn)?;
    }

    debug!(duty_id, attendees = draft.attendance.len(), "Duty rows written");

    Ok(RecordedEvent {
        id: duty_id,
        number,
    })
}
