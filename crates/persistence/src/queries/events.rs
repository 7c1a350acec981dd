// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side projections of recorded incidents and duties.
//!
//! Reports are built from committed rows only. Collections come back in a
//! fixed order: attendees by last name, first name and member id, vehicles
//! by call sign, everything else by label (or type) and id.

use std::collections::HashMap;

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use eidiv_domain::{
    AssistanceLabels, AttendeeLine, ContainerLine, DutyReport, DutySummary, FireLabels,
    IncidentReport, IncidentSummary, InvolvedParty, KeywordCategory, KeywordLine, Location,
    LookupLine, PartyType, TrailerLine, VehicleLine, duration_minutes,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::data_models::{EventFilter, Page};
use crate::diesel_schema::{
    containers, duties, duty_attendance, duty_containers, duty_trailers, duty_vehicles,
    incident_agencies, incident_attendance, incident_brigades, incident_containers,
    incident_parties, incident_resources, incident_trailers, incident_vehicles,
    incident_water_supplies, incidents, keywords, lookup_entries, members, trailers, vehicles,
};
use crate::error::PersistenceError;
use crate::mutations::sequence::from_columns;

#[derive(Queryable, Selectable)]
#[diesel(table_name = incidents)]
struct IncidentRow {
    incident_id: i64,
    year: i32,
    seq: i32,
    keyword_id: i64,
    start_at: String,
    end_at: String,
    leader_member_id: Option<i64>,
    leader_text: String,
    reporting_agency_id: Option<i64>,
    object_name: String,
    street: String,
    postal_city: String,
    municipality: String,
    district: String,
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
    measures: String,
    created_at: String,
}

impl IncidentRow {
    fn scalar_lookup_ids(&self) -> Vec<i64> {
        [
            self.reporting_agency_id,
            self.fire_extent_id,
            self.fire_spread_id,
            self.fire_material_id,
            self.fire_object_id,
            self.damage_event_id,
            self.rescue_type_id,
            self.standby_id,
            self.false_alarm_id,
            self.other_id,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = incident_parties)]
struct PartyRow {
    party_type: String,
    name: String,
    street: String,
    postal_city: String,
    phone: String,
    vehicle_plate: String,
    cost_exempt: bool,
    exemption_reason: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = duties)]
struct DutyRow {
    duty_id: i64,
    year: i32,
    seq: i32,
    title: String,
    start_at: String,
    end_at: String,
    description: String,
    created_at: String,
}

fn parse_stored(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::InvalidData(format!("timestamp {value}: {e}")))
}

/// Builds a `LIKE` pattern matching `query` anywhere, with wildcards in the
/// query escaped by `\`.
fn contains_pattern(query: &str) -> String {
    let escaped: String = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn lookup_labels(
    conn: &mut SqliteConnection,
    entry_ids: &[i64],
) -> Result<HashMap<i64, String>, PersistenceError> {
    if entry_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, String)> = lookup_entries::table
        .filter(lookup_entries::entry_id.eq_any(entry_ids))
        .select((lookup_entries::entry_id, lookup_entries::label))
        .load(conn)?;

    Ok(rows.into_iter().collect())
}

fn attendee_line(
    (member_id, last_name, first_name, vehicle_role, agt_minutes): (
        i64,
        String,
        String,
        String,
        Option<i32>,
    ),
) -> AttendeeLine {
    AttendeeLine {
        member_id,
        last_name,
        first_name,
        vehicle_role,
        agt_minutes,
    }
}

fn label_line((entry_id, label, required): (i64, String, Option<bool>)) -> LookupLine {
    LookupLine {
        entry_id,
        label,
        required,
        quantity: None,
    }
}

/// Loads the full projection of an incident.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value is malformed.
/// Returns `Ok(None)` if the incident does not exist.
#[allow(clippy::too_many_lines)]
pub fn get_incident_report(
    conn: &mut SqliteConnection,
    incident_id: i64,
) -> Result<Option<IncidentReport>, PersistenceError> {
    debug!("Loading report projection for incident ID: {}", incident_id);

    let Some(row) = incidents::table
        .find(incident_id)
        .select(IncidentRow::as_select())
        .first(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let number = from_columns(row.year, row.seq)?;
    let start_at: OffsetDateTime = parse_stored(&row.start_at)?;
    let end_at: OffsetDateTime = parse_stored(&row.end_at)?;

    let (code, keyword_label, category): (String, String, String) = keywords::table
        .find(row.keyword_id)
        .select((keywords::code, keywords::label, keywords::category))
        .first(conn)?;

    let leader: String = match row.leader_member_id {
        Some(member_id) => {
            let name: Option<(String, String)> = members::table
                .find(member_id)
                .select((members::last_name, members::first_name))
                .first(conn)
                .optional()?;
            name.map_or_else(
                || row.leader_text.clone(),
                |(last, first)| format!("{last}, {first}"),
            )
        }
        None => row.leader_text.clone(),
    };

    let labels: HashMap<i64, String> = lookup_labels(conn, &row.scalar_lookup_ids())?;
    let label = |id: Option<i64>| id.and_then(|id| labels.get(&id).cloned());

    let party: Option<InvolvedParty> = incident_parties::table
        .filter(incident_parties::incident_id.eq(incident_id))
        .select(PartyRow::as_select())
        .first(conn)
        .optional()?
        .map(|party| -> Result<InvolvedParty, PersistenceError> {
            Ok(InvolvedParty {
                party_type: PartyType::parse(&party.party_type)?,
                name: party.name,
                street: party.street,
                postal_city: party.postal_city,
                phone: party.phone,
                vehicle_plate: party.vehicle_plate,
                cost_exempt: party.cost_exempt,
                exemption_reason: party.exemption_reason,
            })
        })
        .transpose()?;

    let water_supplies: Vec<LookupLine> = incident_water_supplies::table
        .inner_join(lookup_entries::table)
        .filter(incident_water_supplies::incident_id.eq(incident_id))
        .order((lookup_entries::label.asc(), lookup_entries::entry_id.asc()))
        .select((
            lookup_entries::entry_id,
            lookup_entries::label,
            incident_water_supplies::quantity,
        ))
        .load::<(i64, String, Option<f64>)>(conn)?
        .into_iter()
        .map(|(entry_id, label, quantity)| LookupLine {
            entry_id,
            label,
            required: None,
            quantity,
        })
        .collect();

    let resources: Vec<LookupLine> = incident_resources::table
        .inner_join(lookup_entries::table)
        .filter(incident_resources::incident_id.eq(incident_id))
        .order((lookup_entries::label.asc(), lookup_entries::entry_id.asc()))
        .select((
            lookup_entries::entry_id,
            lookup_entries::label,
            incident_resources::quantity,
        ))
        .load::<(i64, String, i32)>(conn)?
        .into_iter()
        .map(|(entry_id, label, quantity)| LookupLine {
            entry_id,
            label,
            required: None,
            quantity: Some(f64::from(quantity)),
        })
        .collect();

    let vehicle_lines: Vec<VehicleLine> = incident_vehicles::table
        .inner_join(vehicles::table)
        .filter(incident_vehicles::incident_id.eq(incident_id))
        .order((vehicles::call_sign.asc(), vehicles::vehicle_id.asc()))
        .select((
            vehicles::vehicle_id,
            vehicles::call_sign,
            vehicles::vehicle_type,
            incident_vehicles::kilometers,
            incident_vehicles::hours,
            incident_vehicles::required,
        ))
        .load::<(i64, String, String, Option<i32>, Option<f64>, bool)>(conn)?
        .into_iter()
        .map(
            |(vehicle_id, call_sign, vehicle_type, kilometers, hours, required)| VehicleLine {
                vehicle_id,
                call_sign,
                vehicle_type,
                kilometers,
                hours,
                required: Some(required),
            },
        )
        .collect();

    let container_lines: Vec<ContainerLine> = incident_containers::table
        .inner_join(containers::table)
        .filter(incident_containers::incident_id.eq(incident_id))
        .order((
            containers::container_type.asc(),
            containers::container_id.asc(),
        ))
        .select((
            containers::container_id,
            containers::container_type,
            incident_containers::required,
        ))
        .load::<(i64, String, bool)>(conn)?
        .into_iter()
        .map(|(container_id, container_type, required)| ContainerLine {
            container_id,
            container_type,
            required,
        })
        .collect();

    let trailer_lines: Vec<TrailerLine> = incident_trailers::table
        .inner_join(trailers::table)
        .filter(incident_trailers::incident_id.eq(incident_id))
        .order((trailers::trailer_type.asc(), trailers::trailer_id.asc()))
        .select((
            trailers::trailer_id,
            trailers::trailer_type,
            trailers::registration,
            incident_trailers::kilometers,
            incident_trailers::hours,
            incident_trailers::required,
        ))
        .load::<(i64, String, String, Option<i32>, Option<f64>, bool)>(conn)?
        .into_iter()
        .map(
            |(trailer_id, trailer_type, registration, kilometers, hours, required)| TrailerLine {
                trailer_id,
                trailer_type,
                registration,
                kilometers,
                hours,
                required: Some(required),
            },
        )
        .collect();

    let brigades: Vec<LookupLine> = incident_brigades::table
        .inner_join(lookup_entries::table)
        .filter(incident_brigades::incident_id.eq(incident_id))
        .order((lookup_entries::label.asc(), lookup_entries::entry_id.asc()))
        .select((
            lookup_entries::entry_id,
            lookup_entries::label,
            incident_brigades::required,
        ))
        .load::<(i64, String, bool)>(conn)?
        .into_iter()
        .map(|(entry_id, label, required)| label_line((entry_id, label, Some(required))))
        .collect();

    let agencies: Vec<LookupLine> = incident_agencies::table
        .inner_join(lookup_entries::table)
        .filter(incident_agencies::incident_id.eq(incident_id))
        .order((lookup_entries::label.asc(), lookup_entries::entry_id.asc()))
        .select((lookup_entries::entry_id, lookup_entries::label))
        .load::<(i64, String)>(conn)?
        .into_iter()
        .map(|(entry_id, label)| label_line((entry_id, label, None)))
        .collect();

    let attendance: Vec<AttendeeLine> = incident_attendance::table
        .inner_join(members::table)
        .filter(incident_attendance::incident_id.eq(incident_id))
        .order((
            members::last_name.asc(),
            members::first_name.asc(),
            members::member_id.asc(),
        ))
        .select((
            members::member_id,
            members::last_name,
            members::first_name,
            incident_attendance::vehicle_role,
            incident_attendance::agt_minutes,
        ))
        .load::<(i64, String, String, String, Option<i32>)>(conn)?
        .into_iter()
        .map(attendee_line)
        .collect();

    Ok(Some(IncidentReport {
        incident_id: row.incident_id,
        number,
        reference: number.formatted(),
        keyword: KeywordLine {
            code,
            label: keyword_label,
            category: KeywordCategory::parse(&category)?,
        },
        start_at,
        end_at,
        duration_minutes: duration_minutes(start_at, end_at),
        leader_member_id: row.leader_member_id,
        leader,
        reporting_agency: label(row.reporting_agency_id),
        location: Location {
            object_name: row.object_name,
            street: row.street,
            postal_city: row.postal_city,
            municipality: row.municipality,
            district: row.district,
        },
        fire: FireLabels {
            extent: label(row.fire_extent_id),
            spread: label(row.fire_spread_id),
            material: label(row.fire_material_id),
            object: label(row.fire_object_id),
        },
        assistance: AssistanceLabels {
            damage_event: label(row.damage_event_id),
            rescue_type: label(row.rescue_type_id),
            rescued_count: row.rescued_count,
            standby: label(row.standby_id),
            false_alarm: label(row.false_alarm_id),
            other: label(row.other_id),
        },
        measures: row.measures,
        party,
        water_supplies,
        resources,
        vehicles: vehicle_lines,
        containers: container_lines,
        trailers: trailer_lines,
        brigades,
        agencies,
        attendance,
        created_at: parse_stored(&row.created_at)?,
    }))
}

/// Loads the full projection of a duty.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value is malformed.
/// Returns `Ok(None)` if the duty does not exist.
pub fn get_duty_report(
    conn: &mut SqliteConnection,
    duty_id: i64,
) -> Result<Option<DutyReport>, PersistenceError> {
    debug!("Loading report projection for duty ID: {}", duty_id);

    let Some(row) = duties::table
        .find(duty_id)
        .select(DutyRow::as_select())
        .first(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let number = from_columns(row.year, row.seq)?;
    let start_at: OffsetDateTime = parse_stored(&row.start_at)?;
    let end_at: OffsetDateTime = parse_stored(&row.end_at)?;

    let vehicle_lines: Vec<VehicleLine> = duty_vehicles::table
        .inner_join(vehicles::table)
        .filter(duty_vehicles::duty_id.eq(duty_id))
        .order((vehicles::call_sign.asc(), vehicles::vehicle_id.asc()))
        .select((
            vehicles::vehicle_id,
            vehicles::call_sign,
            vehicles::vehicle_type,
            duty_vehicles::kilometers,
            duty_vehicles::hours,
        ))
        .load::<(i64, String, String, Option<i32>, Option<f64>)>(conn)?
        .into_iter()
        .map(
            |(vehicle_id, call_sign, vehicle_type, kilometers, hours)| VehicleLine {
                vehicle_id,
                call_sign,
                vehicle_type,
                kilometers,
                hours,
                required: None,
            },
        )
        .collect();

    let container_lines: Vec<ContainerLine> = duty_containers::table
        .inner_join(containers::table)
        .filter(duty_containers::duty_id.eq(duty_id))
        .order((
            containers::container_type.asc(),
            containers::container_id.asc(),
        ))
        .select((
            containers::container_id,
            containers::container_type,
            duty_containers::required,
        ))
        .load::<(i64, String, bool)>(conn)?
        .into_iter()
        .map(|(container_id, container_type, required)| ContainerLine {
            container_id,
            container_type,
            required,
        })
        .collect();

    let trailer_lines: Vec<TrailerLine> = duty_trailers::table
        .inner_join(trailers::table)
        .filter(duty_trailers::duty_id.eq(duty_id))
        .order((trailers::trailer_type.asc(), trailers::trailer_id.asc()))
        .select((
            trailers::trailer_id,
            trailers::trailer_type,
            trailers::registration,
            duty_trailers::kilometers,
            duty_trailers::hours,
        ))
        .load::<(i64, String, String, Option<i32>, Option<f64>)>(conn)?
        .into_iter()
        .map(
            |(trailer_id, trailer_type, registration, kilometers, hours)| TrailerLine {
                trailer_id,
                trailer_type,
                registration,
                kilometers,
                hours,
                required: None,
            },
        )
        .collect();

    let attendance: Vec<AttendeeLine> = duty_attendance::table
        .inner_join(members::table)
        .filter(duty_attendance::duty_id.eq(duty_id))
        .order((
            members::last_name.asc(),
            members::first_name.asc(),
            members::member_id.asc(),
        ))
        .select((
            members::member_id,
            members::last_name,
            members::first_name,
            duty_attendance::vehicle_role,
            duty_attendance::agt_minutes,
        ))
        .load::<(i64, String, String, String, Option<i32>)>(conn)?
        .into_iter()
        .map(attendee_line)
        .collect();

    Ok(Some(DutyReport {
        duty_id: row.duty_id,
        number,
        reference: number.formatted(),
        title: row.title,
        start_at,
        end_at,
        duration_minutes: duration_minutes(start_at, end_at),
        description: row.description,
        vehicles: vehicle_lines,
        containers: container_lines,
        trailers: trailer_lines,
        attendance,
        created_at: parse_stored(&row.created_at)?,
    }))
}

fn filtered_incidents(filter: &EventFilter) -> incidents::BoxedQuery<'static, Sqlite> {
    let mut query = incidents::table.into_boxed::<Sqlite>();

    if let Some(year) = filter.year {
        query = query.filter(incidents::year.eq(i32::from(year)));
    }

    if let Some(text) = filter.query() {
        let pattern: String = contains_pattern(text);
        let matching_keywords = keywords::table
            .filter(keywords::label.like(pattern.clone()).escape('\\'))
            .select(keywords::keyword_id);

        query = query.filter(
            incidents::keyword_id
                .eq_any(matching_keywords)
                .or(incidents::object_name.like(pattern.clone()).escape('\\'))
                .or(incidents::municipality.like(pattern.clone()).escape('\\'))
                .or(incidents::street.like(pattern.clone()).escape('\\'))
                .or(incidents::postal_city.like(pattern).escape('\\')),
        );
    }

    query
}

/// Lists one page of incidents, newest number first.
///
/// The search text matches the keyword label, object name, municipality,
/// street and postal code/city.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value is malformed.
pub fn list_incidents(
    conn: &mut SqliteConnection,
    filter: &EventFilter,
) -> Result<Page<IncidentSummary>, PersistenceError> {
    debug!(
        query = ?filter.query(),
        year = ?filter.year,
        page = filter.page(),
        "Listing incidents"
    );

    let total: i64 = filtered_incidents(filter)
        .select(count_star())
        .get_result(conn)?;

    let rows: Vec<(i64, i32, i32, i64, String, String, String)> = filtered_incidents(filter)
        .order((incidents::year.desc(), incidents::seq.desc()))
        .limit(i64::from(EventFilter::PER_PAGE))
        .offset(filter.offset())
        .select((
            incidents::incident_id,
            incidents::year,
            incidents::seq,
            incidents::keyword_id,
            incidents::start_at,
            incidents::object_name,
            incidents::municipality,
        ))
        .load(conn)?;

    let keyword_ids: Vec<i64> = rows.iter().map(|row| row.3).collect();
    let keyword_names: HashMap<i64, String> = keywords::table
        .filter(keywords::keyword_id.eq_any(&keyword_ids))
        .select((keywords::keyword_id, keywords::code, keywords::label))
        .load::<(i64, String, String)>(conn)?
        .into_iter()
        .map(|(id, code, label)| (id, format!("{code} - {label}")))
        .collect();

    let items: Vec<IncidentSummary> = rows
        .into_iter()
        .map(
            |(incident_id, year, seq, keyword_id, start_at, object_name, municipality)| {
                let number = from_columns(year, seq)?;
                Ok(IncidentSummary {
                    incident_id,
                    number,
                    reference: number.formatted(),
                    keyword: keyword_names.get(&keyword_id).cloned().unwrap_or_default(),
                    start_at: parse_stored(&start_at)?,
                    object_name,
                    municipality,
                })
            },
        )
        .collect::<Result<_, PersistenceError>>()?;

    Ok(Page {
        items,
        page: filter.page(),
        per_page: EventFilter::PER_PAGE,
        total,
    })
}

fn filtered_duties(filter: &EventFilter) -> duties::BoxedQuery<'static, Sqlite> {
    let mut query = duties::table.into_boxed::<Sqlite>();

    if let Some(year) = filter.year {
        query = query.filter(duties::year.eq(i32::from(year)));
    }

    if let Some(text) = filter.query() {
        let pattern: String = contains_pattern(text);
        query = query.filter(
            duties::title
                .like(pattern.clone())
                .escape('\\')
                .or(duties::description.like(pattern).escape('\\')),
        );
    }

    query
}

/// Lists one page of duties, newest number first.
///
/// The search text matches title and description.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value is malformed.
pub fn list_duties(
    conn: &mut SqliteConnection,
    filter: &EventFilter,
) -> Result<Page<DutySummary>, PersistenceError> {
    debug!(
        query = ?filter.query(),
        year = ?filter.year,
        page = filter.page(),
        "Listing duties"
    );

    let total: i64 = filtered_duties(filter)
        .select(count_star())
        .get_result(conn)?;

    let rows: Vec<(i64, i32, i32, String, String)> = filtered_duties(filter)
        .order((duties::year.desc(), duties::seq.desc()))
        .limit(i64::from(EventFilter::PER_PAGE))
        .offset(filter.offset())
        .select((
            duties::duty_id,
            duties::year,
            duties::seq,
            duties::title,
            duties::start_at,
        ))
        .load(conn)?;

    let items: Vec<DutySummary> = rows
        .into_iter()
        .map(|(duty_id, year, seq, title, start_at)| {
            let number = from_columns(year, seq)?;
            Ok(DutySummary {
                duty_id,
                number,
                reference: number.formatted(),
                title,
                start_at: parse_stored(&start_at)?,
            })
        })
        .collect::<Result<_, PersistenceError>>()?;

    Ok(Page {
        items,
        page: filter.page(),
        per_page: EventFilter::PER_PAGE,
        total,
    })
}
