// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operational responses (Einsatz) as submitted for recording.

use serde::Serialize;
use time::OffsetDateTime;

use crate::event::{EventKind, EventNumber, NumberedEvent};
use crate::types::PartyType;

/// Default district recorded when a submission leaves it empty.
pub const DEFAULT_DISTRICT: &str = "Mühldorf am Inn";

/// A member on the roster of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendance {
    pub member_id: i64,
    /// Vehicle and function, free text (e.g. `HLF 1 / Maschinist`).
    pub vehicle_role: String,
    /// Minutes under breathing apparatus; AGT-qualified members only.
    pub agt_minutes: Option<i32>,
}

/// Where the incident happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub object_name: String,
    pub street: String,
    pub postal_city: String,
    pub municipality: String,
    pub district: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            object_name: String::new(),
            street: String::new(),
            postal_city: String::new(),
            municipality: String::new(),
            district: DEFAULT_DISTRICT.to_string(),
        }
    }
}

/// Fire-specific classification, each a lookup entry id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireDetails {
    pub extent_id: Option<i64>,
    pub spread_id: Option<i64>,
    pub material_id: Option<i64>,
    pub object_id: Option<i64>,
}

/// Technical-assistance classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssistanceDetails {
    pub damage_event_id: Option<i64>,
    pub rescue_type_id: Option<i64>,
    pub rescued_count: Option<i32>,
    pub standby_id: Option<i64>,
    pub false_alarm_id: Option<i64>,
    pub other_id: Option<i64>,
}

/// The person recorded as involved party, at most one per incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvolvedParty {
    pub party_type: PartyType,
    pub name: String,
    pub street: String,
    pub postal_city: String,
    pub phone: String,
    pub vehicle_plate: String,
    pub cost_exempt: bool,
    pub exemption_reason: String,
}

/// Water drawn from an extraction point.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterSupply {
    pub source_id: i64,
    /// Cubic metres.
    pub quantity: Option<f64>,
}

/// Count of a resource type (Einsatzmittel) that was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUsage {
    pub resource_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleUsage {
    pub vehicle_id: i64,
    pub kilometers: Option<i32>,
    pub hours: Option<f64>,
    /// Whether the vehicle was required for the incident (cost relevant).
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerUsage {
    pub container_id: i64,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrailerUsage {
    pub trailer_id: i64,
    pub kilometers: Option<i32>,
    pub hours: Option<f64>,
    pub required: bool,
}

/// Support from a neighbouring local brigade (Ortsfeuerwehr).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrigadeSupport {
    pub brigade_id: i64,
    pub required: bool,
}

/// An operational response awaiting storage.
///
/// `number` stays `None` until the sequence allocator assigns it inside
/// the storing transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentDraft {
    pub number: Option<EventNumber>,
    pub keyword_id: i64,
    pub start_at: OffsetDateTime,
    pub end_at: OffsetDateTime,
    pub leader_member_id: Option<i64>,
    pub leader_text: String,
    pub reporting_agency_id: Option<i64>,
    pub location: Location,
    pub fire: FireDetails,
    pub assistance: AssistanceDetails,
    pub measures: String,
    pub party: Option<InvolvedParty>,
    pub water_supplies: Vec<WaterSupply>,
    pub resources: Vec<ResourceUsage>,
    pub vehicles: Vec<VehicleUsage>,
    pub containers: Vec<ContainerUsage>,
    pub trailers: Vec<TrailerUsage>,
    pub brigades: Vec<BrigadeSupport>,
    pub agency_ids: Vec<i64>,
    pub attendance: Vec<Attendance>,
}

impl IncidentDraft {
    /// Creates a draft with only the required fields set.
    #[must_use]
    pub fn new(keyword_id: i64, start_at: OffsetDateTime, end_at: OffsetDateTime) -> Self {
        Self {
            number: None,
            keyword_id,
            start_at,
            end_at,
            leader_member_id: None,
            leader_text: String::new(),
            reporting_agency_id: None,
            location: Location::default(),
            fire: FireDetails::default(),
            assistance: AssistanceDetails::default(),
            measures: String::new(),
            party: None,
            water_supplies: Vec::new(),
            resources: Vec::new(),
            vehicles: Vec::new(),
            containers: Vec::new(),
            trailers: Vec::new(),
            brigades: Vec::new(),
            agency_ids: Vec::new(),
            attendance: Vec::new(),
        }
    }
}

impl NumberedEvent for IncidentDraft {
    const KIND: EventKind = EventKind::Incident;

    fn number(&self) -> Option<EventNumber> {
        self.number
    }

    fn assign_number(&mut self, number: EventNumber) {
        self.number = Some(number);
    }

    fn year_basis(&self) -> Option<OffsetDateTime> {
        Some(self.start_at)
    }
}
