// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use chrono_tz::Tz;
use eidiv_domain::{
    AssistanceDetails, Attendance, BrigadeSupport, Container, ContainerUsage, DomainError,
    DutyDraft, DutyTrailerUsage, DutyVehicleUsage, FireDetails, IncidentDraft, InvolvedParty,
    Keyword, KeywordCategory, Location, LookupEntry, LookupKind, MailRecipient, Member,
    PartyType, ResourceUsage, Trailer, TrailerUsage, ValidationErrors, Vehicle, VehicleUsage,
    WaterSupply, parse_timestamp,
};
use eidiv_persistence::{EventFilter, RecordedEvent};
use time::OffsetDateTime;

const fn yes() -> bool {
    true
}

// ============================================================================
// Authentication & Operators
// ============================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator password.
    pub password: String,
}

/// API response for successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// The session token (opaque).
    pub session_token: String,
    /// The operator's login name.
    pub login_name: String,
    /// The operator's display name.
    pub display_name: String,
    /// The operator's role.
    pub role: String,
    /// Session expiration timestamp (RFC 3339).
    pub expires_at: String,
}

/// API response describing the current operator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhoAmIResponse {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
}

/// API request to create an operator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateOperatorRequest {
    pub login_name: String,
    pub display_name: String,
    pub password: String,
    /// `Admin` or `Recorder`.
    pub role: String,
}

/// Operator information for listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OperatorInfo {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListOperatorsResponse {
    pub operators: Vec<OperatorInfo>,
}

// ============================================================================
// Master Data
// ============================================================================

/// Identifier of a newly created row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// API request to create or replace a member.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemberRequest {
    pub last_name: String,
    pub first_name: String,
    /// Qualified breathing-apparatus wearer.
    #[serde(default)]
    pub agt_qualified: bool,
    #[serde(default)]
    pub full_time: bool,
    #[serde(default)]
    pub commander: bool,
    #[serde(default)]
    pub deputy_commander: bool,
}

impl MemberRequest {
    #[must_use]
    pub fn to_member(&self) -> Member {
        Member {
            member_id: None,
            last_name: self.last_name.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            agt_qualified: self.agt_qualified,
            full_time: self.full_time,
            commander: self.commander,
            deputy_commander: self.deputy_commander,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VehicleRequest {
    pub vehicle_type: String,
    /// Radio call sign (Funkrufname).
    pub call_sign: String,
    #[serde(default)]
    pub registration: String,
}

impl VehicleRequest {
    #[must_use]
    pub fn to_vehicle(&self) -> Vehicle {
        Vehicle {
            vehicle_id: None,
            vehicle_type: self.vehicle_type.trim().to_string(),
            call_sign: self.call_sign.trim().to_string(),
            registration: self.registration.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerRequest {
    pub container_type: String,
}

impl ContainerRequest {
    #[must_use]
    pub fn to_container(&self) -> Container {
        Container {
            container_id: None,
            container_type: self.container_type.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrailerRequest {
    pub trailer_type: String,
    #[serde(default)]
    pub registration: String,
}

impl TrailerRequest {
    #[must_use]
    pub fn to_trailer(&self) -> Trailer {
        Trailer {
            trailer_id: None,
            trailer_type: self.trailer_type.trim().to_string(),
            registration: self.registration.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LookupEntryRequest {
    pub label: String,
}

impl LookupEntryRequest {
    #[must_use]
    pub fn to_entry(&self, kind: LookupKind) -> LookupEntry {
        LookupEntry {
            entry_id: None,
            kind,
            label: self.label.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KeywordRequest {
    pub code: String,
    pub label: String,
    #[serde(default = "yes")]
    pub active: bool,
    #[serde(default)]
    pub category: KeywordCategory,
}

impl KeywordRequest {
    #[must_use]
    pub fn to_keyword(&self) -> Keyword {
        Keyword {
            keyword_id: None,
            code: self.code.trim().to_string(),
            label: self.label.trim().to_string(),
            active: self.active,
            category: self.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecipientRequest {
    pub email: String,
    #[serde(default = "yes")]
    pub active: bool,
}

impl RecipientRequest {
    #[must_use]
    pub fn to_recipient(&self) -> MailRecipient {
        MailRecipient {
            recipient_id: None,
            email: self.email.trim().to_lowercase(),
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MembersResponse {
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VehiclesResponse {
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContainersResponse {
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrailersResponse {
    pub trailers: Vec<Trailer>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LookupEntriesResponse {
    pub kind: LookupKind,
    pub entries: Vec<LookupEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct KeywordsResponse {
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecipientsResponse {
    pub recipients: Vec<MailRecipient>,
}

/// Whether a member may have AGT minutes recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AgtResponse {
    pub agt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KeywordCategoryResponse {
    pub category: KeywordCategory,
}

// ============================================================================
// Events
// ============================================================================

/// One roster line of a submitted event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttendanceRequest {
    pub member_id: i64,
    /// Vehicle or role text, e.g. `HLF 20 / Maschinist`.
    #[serde(default)]
    pub vehicle_role: String,
    #[serde(default)]
    pub agt_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocationRequest {
    pub object_name: String,
    pub street: String,
    pub postal_city: String,
    pub municipality: String,
    /// Falls back to the configured default district.
    pub district: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FireRequest {
    pub extent_id: Option<i64>,
    pub spread_id: Option<i64>,
    pub material_id: Option<i64>,
    pub object_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssistanceRequest {
    pub damage_event_id: Option<i64>,
    pub rescue_type_id: Option<i64>,
    pub rescued_count: Option<i32>,
    pub standby_id: Option<i64>,
    pub false_alarm_id: Option<i64>,
    pub other_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartyRequest {
    pub party_type: PartyType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub postal_city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub vehicle_plate: String,
    #[serde(default)]
    pub cost_exempt: bool,
    #[serde(default)]
    pub exemption_reason: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaterSupplyRequest {
    pub source_id: i64,
    /// Cubic metres.
    #[serde(default)]
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceRequest {
    pub resource_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VehicleUsageRequest {
    pub vehicle_id: i64,
    #[serde(default)]
    pub kilometers: Option<i32>,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerUsageRequest {
    pub container_id: i64,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrailerUsageRequest {
    pub trailer_id: i64,
    #[serde(default)]
    pub kilometers: Option<i32>,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BrigadeRequest {
    pub brigade_id: i64,
    #[serde(default)]
    pub required: bool,
}

/// API request to record an incident (Einsatz).
///
/// Timestamps are RFC 3339, or local wall-clock time in the department
/// time zone when they carry no offset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IncidentRequest {
    pub keyword_id: i64,
    pub start_at: String,
    pub end_at: String,
    #[serde(default)]
    pub leader_member_id: Option<i64>,
    #[serde(default)]
    pub leader_text: String,
    #[serde(default)]
    pub reporting_agency_id: Option<i64>,
    #[serde(default)]
    pub location: LocationRequest,
    #[serde(default)]
    pub fire: FireRequest,
    #[serde(default)]
    pub assistance: AssistanceRequest,
    #[serde(default)]
    pub measures: String,
    #[serde(default)]
    pub party: Option<PartyRequest>,
    #[serde(default)]
    pub water_supplies: Vec<WaterSupplyRequest>,
    #[serde(default)]
    pub resources: Vec<ResourceRequest>,
    #[serde(default)]
    pub vehicles: Vec<VehicleUsageRequest>,
    #[serde(default)]
    pub containers: Vec<ContainerUsageRequest>,
    #[serde(default)]
    pub trailers: Vec<TrailerUsageRequest>,
    #[serde(default)]
    pub brigades: Vec<BrigadeRequest>,
    #[serde(default)]
    pub agency_ids: Vec<i64>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRequest>,
}

impl IncidentRequest {
    /// Converts the request into an unnumbered draft.
    ///
    /// # Errors
    ///
    /// Returns the field errors of timestamps that cannot be parsed.
    pub fn to_draft(
        &self,
        tz: Tz,
        default_district: &str,
    ) -> Result<IncidentDraft, ValidationErrors> {
        let (start_at, end_at) = parse_time_range(&self.start_at, &self.end_at, tz)?;

        let mut draft: IncidentDraft = IncidentDraft::new(self.keyword_id, start_at, end_at);
        draft.leader_member_id = self.leader_member_id;
        draft.leader_text = self.leader_text.trim().to_string();
        draft.reporting_agency_id = self.reporting_agency_id;
        draft.location = Location {
            object_name: self.location.object_name.trim().to_string(),
            street: self.location.street.trim().to_string(),
            postal_city: self.location.postal_city.trim().to_string(),
            municipality: self.location.municipality.trim().to_string(),
            district: self
                .location
                .district
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(default_district)
                .to_string(),
        };
        draft.fire = FireDetails {
            extent_id: self.fire.extent_id,
            spread_id: self.fire.spread_id,
            material_id: self.fire.material_id,
            object_id: self.fire.object_id,
        };
        draft.assistance = AssistanceDetails {
            damage_event_id: self.assistance.damage_event_id,
            rescue_type_id: self.assistance.rescue_type_id,
            rescued_count: self.assistance.rescued_count,
            standby_id: self.assistance.standby_id,
            false_alarm_id: self.assistance.false_alarm_id,
            other_id: self.assistance.other_id,
        };
        draft.measures = self.measures.trim().to_string();
        draft.party = self.party.as_ref().map(|p| InvolvedParty {
            party_type: p.party_type,
            name: p.name.trim().to_string(),
            street: p.street.trim().to_string(),
            postal_city: p.postal_city.trim().to_string(),
            phone: p.phone.trim().to_string(),
            vehicle_plate: p.vehicle_plate.trim().to_string(),
            cost_exempt: p.cost_exempt,
            exemption_reason: p.exemption_reason.trim().to_string(),
        });
        draft.water_supplies = self
            .water_supplies
            .iter()
            .map(|w| WaterSupply {
                source_id: w.source_id,
                quantity: w.quantity,
            })
            .collect();
        draft.resources = self
            .resources
            .iter()
            .map(|r| ResourceUsage {
                resource_id: r.resource_id,
                quantity: r.quantity,
            })
            .collect();
        draft.vehicles = self
            .vehicles
            .iter()
            .map(|v| VehicleUsage {
                vehicle_id: v.vehicle_id,
                kilometers: v.kilometers,
                hours: v.hours,
                required: v.required,
            })
            .collect();
        draft.containers = self.containers.iter().map(to_container_usage).collect();
        draft.trailers = self
            .trailers
            .iter()
            .map(|t| TrailerUsage {
                trailer_id: t.trailer_id,
                kilometers: t.kilometers,
                hours: t.hours,
                required: t.required,
            })
            .collect();
        draft.brigades = self
            .brigades
            .iter()
            .map(|b| BrigadeSupport {
                brigade_id: b.brigade_id,
                required: b.required,
            })
            .collect();
        draft.agency_ids.clone_from(&self.agency_ids);
        draft.attendance = self.attendance.iter().map(to_attendance).collect();
        Ok(draft)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DutyVehicleRequest {
    pub vehicle_id: i64,
    #[serde(default)]
    pub kilometers: Option<i32>,
    #[serde(default)]
    pub hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DutyTrailerRequest {
    pub trailer_id: i64,
    #[serde(default)]
    pub kilometers: Option<i32>,
    #[serde(default)]
    pub hours: Option<f64>,
}

/// API request to record a duty session (Dienst).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DutyRequest {
    pub title: String,
    pub start_at: String,
    pub end_at: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vehicles: Vec<DutyVehicleRequest>,
    #[serde(default)]
    pub containers: Vec<ContainerUsageRequest>,
    #[serde(default)]
    pub trailers: Vec<DutyTrailerRequest>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRequest>,
}

impl DutyRequest {
    /// Converts the request into an unnumbered draft.
    ///
    /// # Errors
    ///
    /// Returns the field errors of timestamps that cannot be parsed.
    pub fn to_draft(&self, tz: Tz) -> Result<DutyDraft, ValidationErrors> {
        let (start_at, end_at) = parse_time_range(&self.start_at, &self.end_at, tz)?;

        let mut draft: DutyDraft = DutyDraft::new(self.title.trim(), start_at, end_at);
        draft.description = self.description.trim().to_string();
        draft.vehicles = self
            .vehicles
            .iter()
            .map(|v| DutyVehicleUsage {
                vehicle_id: v.vehicle_id,
                kilometers: v.kilometers,
                hours: v.hours,
            })
            .collect();
        draft.containers = self.containers.iter().map(to_container_usage).collect();
        draft.trailers = self
            .trailers
            .iter()
            .map(|t| DutyTrailerUsage {
                trailer_id: t.trailer_id,
                kilometers: t.kilometers,
                hours: t.hours,
            })
            .collect();
        draft.attendance = self.attendance.iter().map(to_attendance).collect();
        Ok(draft)
    }
}

fn parse_time_range(
    start_at: &str,
    end_at: &str,
    tz: Tz,
) -> Result<(OffsetDateTime, OffsetDateTime), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();
    let mut parse = |field: &str, input: &str| -> Option<OffsetDateTime> {
        parse_timestamp(input, tz)
            .map_err(|e: DomainError| errors.push(field, e))
            .ok()
    };
    let start: Option<OffsetDateTime> = parse("start_at", start_at);
    let end: Option<OffsetDateTime> = parse("end_at", end_at);

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(errors),
    }
}

fn to_attendance(line: &AttendanceRequest) -> Attendance {
    Attendance {
        member_id: line.member_id,
        vehicle_role: line.vehicle_role.trim().to_string(),
        agt_minutes: line.agt_minutes,
    }
}

const fn to_container_usage(usage: &ContainerUsageRequest) -> ContainerUsage {
    ContainerUsage {
        container_id: usage.container_id,
        required: usage.required,
    }
}

/// Result of a successful submission.
///
/// `warnings` lists report and mail failures; the event is stored
/// regardless.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubmissionResponse {
    pub id: i64,
    /// Formatted reference, e.g. `007/2025`.
    pub reference: String,
    pub year: u16,
    pub seq: u32,
    pub warnings: Vec<String>,
}

impl SubmissionResponse {
    #[must_use]
    pub fn new(recorded: RecordedEvent, warnings: Vec<String>) -> Self {
        Self {
            id: recorded.id,
            reference: recorded.number.formatted(),
            year: recorded.number.year(),
            seq: recorded.number.seq(),
            warnings,
        }
    }
}

/// Query parameters of the incident and duty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EventListQuery {
    /// Free-text search.
    pub q: Option<String>,
    pub year: Option<u16>,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl EventListQuery {
    #[must_use]
    pub fn to_filter(&self) -> EventFilter {
        EventFilter {
            query: self.q.clone(),
            year: self.year,
            page: self.page.unwrap_or(1),
        }
    }
}
