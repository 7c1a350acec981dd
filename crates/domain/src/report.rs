// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only projections of stored events.
//!
//! A projection is assembled from committed rows only. Its collections are
//! ordered deterministically so that rendering the same event twice yields
//! the same document:
//!
//! - attendees by last name, first name, then member id
//! - vehicles by call sign, then id
//! - every other collection by label, then id

use serde::Serialize;
use time::OffsetDateTime;

use crate::event::{EventKind, EventNumber};
use crate::incident::{InvolvedParty, Location};
use crate::types::KeywordCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordLine {
    pub code: String,
    pub label: String,
    pub category: KeywordCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendeeLine {
    pub member_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub vehicle_role: String,
    pub agt_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleLine {
    pub vehicle_id: i64,
    pub call_sign: String,
    pub vehicle_type: String,
    pub kilometers: Option<i32>,
    pub hours: Option<f64>,
    /// `None` for duties, which do not track it.
    pub required: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerLine {
    pub container_id: i64,
    pub container_type: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailerLine {
    pub trailer_id: i64,
    pub trailer_type: String,
    pub registration: String,
    pub kilometers: Option<i32>,
    pub hours: Option<f64>,
    pub required: Option<bool>,
}

/// A lookup entry attached to an incident, with optional per-link attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupLine {
    pub entry_id: i64,
    pub label: String,
    pub required: Option<bool>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FireLabels {
    pub extent: Option<String>,
    pub spread: Option<String>,
    pub material: Option<String>,
    pub object: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AssistanceLabels {
    pub damage_event: Option<String>,
    pub rescue_type: Option<String>,
    pub rescued_count: Option<i32>,
    pub standby: Option<String>,
    pub false_alarm: Option<String>,
    pub other: Option<String>,
}

/// Everything recorded about one incident, with references resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentReport {
    pub incident_id: i64,
    pub number: EventNumber,
    pub reference: String,
    pub keyword: KeywordLine,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_at: OffsetDateTime,
    pub duration_minutes: i64,
    pub leader_member_id: Option<i64>,
    /// Member name as `Last, First`, or the free-text leader.
    pub leader: String,
    pub reporting_agency: Option<String>,
    pub location: Location,
    pub fire: FireLabels,
    pub assistance: AssistanceLabels,
    pub measures: String,
    pub party: Option<InvolvedParty>,
    pub water_supplies: Vec<LookupLine>,
    pub resources: Vec<LookupLine>,
    pub vehicles: Vec<VehicleLine>,
    pub containers: Vec<ContainerLine>,
    pub trailers: Vec<TrailerLine>,
    pub brigades: Vec<LookupLine>,
    pub agencies: Vec<LookupLine>,
    pub attendance: Vec<AttendeeLine>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl IncidentReport {
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        duration_hours(self.duration_minutes)
    }

    /// File name of the rendered report, e.g. `Einsatz_001_2025.pdf`.
    #[must_use]
    pub fn filename(&self) -> String {
        report_filename(EventKind::Incident, self.number)
    }
}

/// Everything recorded about one duty session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutyReport {
    pub duty_id: i64,
    pub number: EventNumber,
    pub reference: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_at: OffsetDateTime,
    pub duration_minutes: i64,
    pub description: String,
    pub vehicles: Vec<VehicleLine>,
    pub containers: Vec<ContainerLine>,
    pub trailers: Vec<TrailerLine>,
    pub attendance: Vec<AttendeeLine>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl DutyReport {
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        duration_hours(self.duration_minutes)
    }

    #[must_use]
    pub fn filename(&self) -> String {
        report_filename(EventKind::Duty, self.number)
    }
}

/// One row of the incident list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentSummary {
    pub incident_id: i64,
    pub number: EventNumber,
    pub reference: String,
    pub keyword: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    pub object_name: String,
    pub municipality: String,
}

/// One row of the duty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutySummary {
    pub duty_id: i64,
    pub number: EventNumber,
    pub reference: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
}

/// Returns the whole minutes between `start_at` and `end_at`, never negative.
#[must_use]
pub fn duration_minutes(start_at: OffsetDateTime, end_at: OffsetDateTime) -> i64 {
    (end_at - start_at).whole_minutes().max(0)
}

/// Converts minutes to hours rounded to two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn duration_hours(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

/// Replaces path separators so the result is usable as a file name.
#[must_use]
pub fn safe_filename(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Returns the attachment file name for an event report.
#[must_use]
pub fn report_filename(kind: EventKind, number: EventNumber) -> String {
    safe_filename(&format!("{}_{}.pdf", kind.label(), number.formatted()))
}
