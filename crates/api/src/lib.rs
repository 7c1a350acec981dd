// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary of the EiDiV records service.
//!
//! This crate owns the request and response shapes, operator
//! authentication and role checks, and the translation of domain and
//! persistence errors into [`ApiError`]. It is transport-agnostic; the
//! server crate maps it onto HTTP.

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

mod auth;
mod delivery;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use delivery::ReportDelivery;
pub use error::{
    ApiError, AuthError, FieldMessage, translate_domain_error, translate_persistence_error,
    translate_validation_errors,
};
pub use handlers::{
    RecordedDuty, RecordedIncident, RecordingSettings, create_container, create_keyword,
    create_lookup_entry, create_member, create_operator, create_recipient, create_trailer,
    create_vehicle, delete_container, delete_keyword, delete_lookup_entry, delete_member,
    delete_recipient, delete_trailer, delete_vehicle, disable_operator, enable_operator,
    ensure_admin, get_duty, get_incident, keyword_category, list_containers, list_duties,
    list_incidents, list_keywords, list_lookup_entries, list_members, list_operators,
    list_recipients, list_trailers, list_vehicles, login, logout, member_agt, submit_duty,
    submit_incident, update_container, update_keyword, update_lookup_entry, update_member,
    update_recipient, update_trailer, update_vehicle, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AgtResponse, AssistanceRequest, AttendanceRequest, BrigadeRequest, ContainerRequest,
    ContainerUsageRequest, ContainersResponse, CreateOperatorRequest, CreatedResponse,
    DutyRequest, DutyTrailerRequest, DutyVehicleRequest, EventListQuery, FireRequest,
    IncidentRequest, KeywordCategoryResponse, KeywordRequest, KeywordsResponse,
    ListOperatorsResponse, LocationRequest, LoginRequest, LoginResponse, LookupEntriesResponse,
    LookupEntryRequest, MemberRequest, MembersResponse, OperatorInfo, PartyRequest,
    RecipientRequest, RecipientsResponse, ResourceRequest, SubmissionResponse, TrailerRequest,
    TrailerUsageRequest, TrailersResponse, VehicleRequest, VehicleUsageRequest, VehiclesResponse,
    WaterSupplyRequest, WhoAmIResponse,
};
