// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod clock;
mod duty;
mod error;
mod event;
mod incident;
mod master_data;
mod report;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use clock::{format_local, local_year, parse_timestamp, parse_timezone, to_rfc3339};
pub use duty::{DutyDraft, DutyTrailerUsage, DutyVehicleUsage};
pub use error::{DomainError, FieldError, ValidationErrors};
pub use event::{EventKind, EventNumber, NumberedEvent, NumberingPolicy, YearBasis};
pub use incident::{
    AssistanceDetails, Attendance, BrigadeSupport, ContainerUsage, DEFAULT_DISTRICT, FireDetails,
    IncidentDraft, InvolvedParty, Location, ResourceUsage, TrailerUsage, VehicleUsage,
    WaterSupply,
};
pub use master_data::MasterData;
pub use report::{
    AssistanceLabels, AttendeeLine, ContainerLine, DutyReport, DutySummary, FireLabels,
    IncidentReport, IncidentSummary, KeywordLine, LookupLine, TrailerLine, VehicleLine,
    duration_hours, duration_minutes, report_filename, safe_filename,
};
pub use types::{
    Container, Keyword, KeywordCategory, LookupEntry, LookupKind, MailRecipient, Member,
    PartyType, Trailer, Vehicle,
};
pub use validation::{
    validate_agt_minutes, validate_container, validate_duty, validate_email, validate_incident,
    validate_keyword, validate_lookup_entry, validate_member, validate_non_negative,
    validate_party, validate_recipient, validate_time_range, validate_trailer, validate_vehicle,
};
