// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Handlers are synchronous and take the persistence layer by mutable
//! reference. The HTTP server owns locking and decides what runs on a
//! blocking thread.

use eidiv_domain::{
    DutyDraft, DutyReport, DutySummary, EventNumber, IncidentDraft, IncidentReport,
    IncidentSummary, KeywordCategory, LookupKind, MasterData, NumberingPolicy, validate_container,
    validate_duty, validate_incident, validate_keyword, validate_lookup_entry, validate_member,
    validate_recipient, validate_trailer, validate_vehicle,
};
use eidiv_persistence::{OperatorData, Page, Persistence, PersistenceError, RecordedEvent};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AgtResponse, ContainerRequest, ContainersResponse, CreateOperatorRequest, CreatedResponse,
    DutyRequest, EventListQuery, IncidentRequest, KeywordCategoryResponse, KeywordRequest,
    KeywordsResponse, ListOperatorsResponse, LoginRequest, LoginResponse, LookupEntriesResponse,
    LookupEntryRequest, MemberRequest, MembersResponse, OperatorInfo, RecipientRequest,
    RecipientsResponse, TrailerRequest, TrailersResponse, VehicleRequest, VehiclesResponse,
    WhoAmIResponse,
};

/// How new events are numbered and completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSettings {
    pub policy: NumberingPolicy,
    /// District used when a submission leaves it empty.
    pub default_district: String,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            policy: NumberingPolicy::default(),
            default_district: String::from(eidiv_domain::DEFAULT_DISTRICT),
        }
    }
}

/// A committed incident together with what is needed to deliver it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedIncident {
    pub recorded: RecordedEvent,
    /// `None` if the stored incident could not be read back. Nothing is
    /// delivered then.
    pub report: Option<IncidentReport>,
    /// Active recipients at the time of the commit.
    pub recipients: Vec<String>,
    /// Problems after the commit. The incident is stored regardless.
    pub warnings: Vec<String>,
}

/// A committed duty together with what is needed to deliver it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDuty {
    pub recorded: RecordedEvent,
    pub report: Option<DutyReport>,
    pub recipients: Vec<String>,
    pub warnings: Vec<String>,
}

// ============================================================================
// Authentication
// ============================================================================

/// Authenticates an operator and opens a session.
///
/// # Errors
///
/// Returns an error if the credentials are wrong or the operator is
/// disabled.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let (session_token, actor, operator, expires_at) =
        AuthenticationService::login(persistence, &request.login_name, &request.password, now)?;

    Ok(LoginResponse {
        session_token,
        login_name: operator.login_name,
        display_name: operator.display_name,
        role: actor.role.as_str().to_string(),
        expires_at: eidiv_domain::to_rfc3339(expires_at).map_err(translate_domain_error)?,
    })
}

/// Ends a session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Describes the operator behind the current session.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor, operator: &OperatorData) -> WhoAmIResponse {
    WhoAmIResponse {
        operator_id: operator.operator_id,
        login_name: operator.login_name.clone(),
        display_name: operator.display_name.clone(),
        role: actor.role.as_str().to_string(),
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Creates a new operator.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The role is unknown or a name is empty
/// - The password violates the password policy
/// - The login name is taken
pub fn create_operator(
    persistence: &mut Persistence,
    request: &CreateOperatorRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(actor)?;

    let role: Role = Role::parse(&request.role).map_err(|_| ApiError::InvalidInput {
        field: String::from("role"),
        message: format!("Unknown role '{}', expected Admin or Recorder", request.role),
    })?;
    require_text("login_name", &request.login_name)?;
    require_text("display_name", &request.display_name)?;
    PasswordPolicy::default().validate(&request.password, &request.login_name)?;

    let operator_id: i64 = persistence
        .create_operator(
            &request.login_name,
            request.display_name.trim(),
            &request.password,
            role.as_str(),
        )
        .map_err(|e| match e {
            PersistenceError::Duplicate(_) => ApiError::DomainRuleViolation {
                rule: String::from("unique_login"),
                message: format!(
                    "An operator with login name '{}' already exists",
                    request.login_name.trim().to_uppercase()
                ),
            },
            other => translate_persistence_error(other),
        })?;

    info!(operator_id, created_by = %actor.login_name, "Operator created");
    Ok(CreatedResponse { id: operator_id })
}

/// Lists all operators.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_operators(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListOperatorsResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(actor)?;

    let operators: Vec<OperatorInfo> = persistence
        .list_operators()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|op| OperatorInfo {
            operator_id: op.operator_id,
            login_name: op.login_name,
            display_name: op.display_name,
            role: op.role,
            is_disabled: op.is_disabled,
            created_at: op.created_at,
            last_login_at: op.last_login_at,
        })
        .collect();

    Ok(ListOperatorsResponse { operators })
}

/// Disables an operator and ends their sessions.
///
/// The last active admin cannot be disabled.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the operator does not
/// exist, or the operator is the last active admin.
pub fn disable_operator(
    persistence: &mut Persistence,
    operator_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_operators(actor)?;

    let target: OperatorData = persistence
        .get_operator_by_id(operator_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| operator_not_found(operator_id))?;

    if target.role == Role::Admin.as_str() && !target.is_disabled {
        let active_admins: i64 = persistence
            .count_active_admin_operators()
            .map_err(translate_persistence_error)?;
        if active_admins <= 1 {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("last_active_admin"),
                message: String::from("Cannot disable the last active admin operator"),
            });
        }
    }

    persistence
        .disable_operator(operator_id)
        .map_err(translate_persistence_error)?;
    info!(operator_id, disabled_by = %actor.login_name, "Operator disabled");
    Ok(())
}

/// # Errors
///
/// Returns an error if the actor is not an admin or the operator does not
/// exist.
pub fn enable_operator(
    persistence: &mut Persistence,
    operator_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_operators(actor)?;

    persistence
        .enable_operator(operator_id)
        .map_err(translate_persistence_error)?;
    info!(operator_id, enabled_by = %actor.login_name, "Operator enabled");
    Ok(())
}

/// Creates an admin operator unless the login already exists.
///
/// Returns `true` when an operator was created.
///
/// # Errors
///
/// Returns an error if the password violates the policy or the insert
/// fails.
pub fn ensure_admin(
    persistence: &mut Persistence,
    login_name: &str,
    password: &str,
) -> Result<bool, ApiError> {
    require_text("login_name", login_name)?;

    if persistence
        .get_operator_by_login(login_name)
        .map_err(translate_persistence_error)?
        .is_some()
    {
        debug!(login_name, "Admin operator already exists");
        return Ok(false);
    }

    PasswordPolicy::default().validate(password, login_name)?;
    let display_name: String = login_name.trim().to_string();
    persistence
        .create_operator(login_name, &display_name, password, Role::Admin.as_str())
        .map_err(translate_persistence_error)?;
    info!(login_name, "Admin operator created");
    Ok(true)
}

fn operator_not_found(operator_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Operator"),
        message: format!("The operator {operator_id} does not exist"),
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("{field} must not be empty"),
        });
    }
    Ok(())
}

// ============================================================================
// Members
// ============================================================================

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_members(persistence: &mut Persistence) -> Result<MembersResponse, ApiError> {
    let members = persistence
        .list_members()
        .map_err(translate_persistence_error)?;
    Ok(MembersResponse { members })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the member is invalid,
/// or the insert fails.
pub fn create_member(
    persistence: &mut Persistence,
    request: &MemberRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let member = request.to_member();
    validate_member(&member)?;

    let id: i64 = persistence
        .create_member(&member)
        .map_err(translate_persistence_error)?;
    info!(member_id = id, name = %member.display_name(), "Member created");
    Ok(CreatedResponse { id })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the member is invalid,
/// or it does not exist.
pub fn update_member(
    persistence: &mut Persistence,
    member_id: i64,
    request: &MemberRequest,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let member = request.to_member();
    validate_member(&member)?;

    persistence
        .update_member(member_id, &member)
        .map_err(translate_persistence_error)
}

/// Deletes a member that no roster references.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the member does not
/// exist, or an event roster still lists the member.
pub fn delete_member(
    persistence: &mut Persistence,
    member_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    persistence
        .delete_member(member_id)
        .map_err(translate_persistence_error)?;
    info!(member_id, "Member deleted");
    Ok(())
}

/// Reports whether a member is AGT-qualified.
///
/// Unknown members are reported as not qualified, so a form can drive its
/// AGT minutes input from this without a separate existence check.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn member_agt(persistence: &mut Persistence, member_id: i64) -> Result<AgtResponse, ApiError> {
    let agt: bool = persistence
        .get_member(member_id)
        .map_err(translate_persistence_error)?
        .is_some_and(|m| m.agt_qualified);
    Ok(AgtResponse { agt })
}

// ============================================================================
// Vehicles, Containers & Trailers
// ============================================================================

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vehicles(persistence: &mut Persistence) -> Result<VehiclesResponse, ApiError> {
    let vehicles = persistence
        .list_vehicles()
        .map_err(translate_persistence_error)?;
    Ok(VehiclesResponse { vehicles })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the vehicle is invalid,
/// or the insert fails.
pub fn create_vehicle(
    persistence: &mut Persistence,
    request: &VehicleRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let vehicle = request.to_vehicle();
    validate_vehicle(&vehicle)?;

    let id: i64 = persistence
        .create_vehicle(&vehicle)
        .map_err(translate_persistence_error)?;
    info!(vehicle_id = id, call_sign = %vehicle.call_sign, "Vehicle created");
    Ok(CreatedResponse { id })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the vehicle is invalid,
/// or it does not exist.
pub fn update_vehicle(
    persistence: &mut Persistence,
    vehicle_id: i64,
    request: &VehicleRequest,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let vehicle = request.to_vehicle();
    validate_vehicle(&vehicle)?;

    persistence
        .update_vehicle(vehicle_id, &vehicle)
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the vehicle does not
/// exist, or an event still uses it.
pub fn delete_vehicle(
    persistence: &mut Persistence,
    vehicle_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    persistence
        .delete_vehicle(vehicle_id)
        .map_err(translate_persistence_error)?;
    info!(vehicle_id, "Vehicle deleted");
    Ok(())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_containers(persistence: &mut Persistence) -> Result<ContainersResponse, ApiError> {
    let containers = persistence
        .list_containers()
        .map_err(translate_persistence_error)?;
    Ok(ContainersResponse { containers })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the container is invalid,
/// or the insert fails.
pub fn create_container(
    persistence: &mut Persistence,
    request: &ContainerRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let container = request.to_container();
    validate_container(&container)?;

    let id: i64 = persistence
        .create_container(&container)
        .map_err(translate_persistence_error)?;
    info!(container_id = id, "Container created");
    Ok(CreatedResponse { id })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the container is invalid,
/// or it does not exist.
pub fn update_container(
    persistence: &mut Persistence,
    container_id: i64,
    request: &ContainerRequest,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let container = request.to_container();
    validate_container(&container)?;

    persistence
        .update_container(container_id, &container)
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the container does not
/// exist, or an event still uses it.
pub fn delete_container(
    persistence: &mut Persistence,
    container_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    persistence
        .delete_container(container_id)
        .map_err(translate_persistence_error)?;
    info!(container_id, "Container deleted");
    Ok(())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_trailers(persistence: &mut Persistence) -> Result<TrailersResponse, ApiError> {
    let trailers = persistence
        .list_trailers()
        .map_err(translate_persistence_error)?;
    Ok(TrailersResponse { trailers })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the trailer is invalid,
/// or the insert fails.
pub fn create_trailer(
    persistence: &mut Persistence,
    request: &TrailerRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let trailer = request.to_trailer();
    validate_trailer(&trailer)?;

    let id: i64 = persistence
        .create_trailer(&trailer)
        .map_err(translate_persistence_error)?;
    info!(trailer_id = id, "Trailer created");
    Ok(CreatedResponse { id })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the trailer is invalid,
/// or it does not exist.
pub fn update_trailer(
    persistence: &mut Persistence,
    trailer_id: i64,
    request: &TrailerRequest,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let trailer = request.to_trailer();
    validate_trailer(&trailer)?;

    persistence
        .update_trailer(trailer_id, &trailer)
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the trailer does not
/// exist, or an event still uses it.
pub fn delete_trailer(
    persistence: &mut Persistence,
    trailer_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    persistence
        .delete_trailer(trailer_id)
        .map_err(translate_persistence_error)?;
    info!(trailer_id, "Trailer deleted");
    Ok(())
}

// ============================================================================
// Lookups & Keywords
// ============================================================================

fn parse_lookup_kind(kind: &str) -> Result<LookupKind, ApiError> {
    LookupKind::parse(kind).map_err(translate_domain_error)
}

/// Lists the entries of one lookup kind, e.g. `water_source`.
///
/// # Errors
///
/// Returns an error if the kind is unknown or the query fails.
pub fn list_lookup_entries(
    persistence: &mut Persistence,
    kind: &str,
) -> Result<LookupEntriesResponse, ApiError> {
    let kind: LookupKind = parse_lookup_kind(kind)?;
    let entries = persistence
        .list_lookup_entries(Some(kind))
        .map_err(translate_persistence_error)?;
    Ok(LookupEntriesResponse { kind, entries })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the kind is unknown,
/// the label is empty, or the insert fails.
pub fn create_lookup_entry(
    persistence: &mut Persistence,
    kind: &str,
    request: &LookupEntryRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let entry = request.to_entry(parse_lookup_kind(kind)?);
    validate_lookup_entry(&entry)?;

    let id: i64 = persistence
        .create_lookup_entry(&entry)
        .map_err(translate_persistence_error)?;
    info!(entry_id = id, kind = entry.kind.as_str(), "Lookup entry created");
    Ok(CreatedResponse { id })
}

/// Renames a lookup entry. The entry must belong to `kind`.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the label is empty, or no
/// entry of `kind` has the id.
pub fn update_lookup_entry(
    persistence: &mut Persistence,
    kind: &str,
    entry_id: i64,
    request: &LookupEntryRequest,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let entry = request.to_entry(parse_lookup_kind(kind)?);
    validate_lookup_entry(&entry)?;

    persistence
        .update_lookup_entry(entry.kind, entry_id, &entry.label)
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the entry does not
/// exist, or an incident still uses it.
pub fn delete_lookup_entry(
    persistence: &mut Persistence,
    kind: &str,
    entry_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let kind: LookupKind = parse_lookup_kind(kind)?;
    persistence
        .delete_lookup_entry(kind, entry_id)
        .map_err(translate_persistence_error)?;
    info!(entry_id, kind = kind.as_str(), "Lookup entry deleted");
    Ok(())
}

/// Lists keywords.
///
/// With a category filter only active keywords are returned; this feeds
/// the dependent keyword dropdown of the incident form. Without a filter
/// the full catalogue is listed for maintenance.
///
/// # Errors
///
/// Returns an error if the category is unknown or the query fails.
pub fn list_keywords(
    persistence: &mut Persistence,
    category: Option<&str>,
) -> Result<KeywordsResponse, ApiError> {
    let category: Option<KeywordCategory> = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(KeywordCategory::parse)
        .transpose()
        .map_err(translate_domain_error)?;

    let keywords = persistence
        .list_keywords(category, category.is_some())
        .map_err(translate_persistence_error)?;
    Ok(KeywordsResponse { keywords })
}

/// Returns the category of a keyword, `sonstig` when the keyword is
/// unknown.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn keyword_category(
    persistence: &mut Persistence,
    keyword_id: i64,
) -> Result<KeywordCategoryResponse, ApiError> {
    let category: KeywordCategory = persistence
        .get_keyword(keyword_id)
        .map_err(translate_persistence_error)?
        .map(|k| k.category)
        .unwrap_or_default();
    Ok(KeywordCategoryResponse { category })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the keyword is invalid,
/// or the insert fails.
pub fn create_keyword(
    persistence: &mut Persistence,
    request: &KeywordRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let keyword = request.to_keyword();
    validate_keyword(&keyword)?;

    let id: i64 = persistence
        .create_keyword(&keyword)
        .map_err(translate_persistence_error)?;
    info!(keyword_id = id, keyword = %keyword, "Keyword created");
    Ok(CreatedResponse { id })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the keyword is invalid,
/// or it does not exist.
pub fn update_keyword(
    persistence: &mut Persistence,
    keyword_id: i64,
    request: &KeywordRequest,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    let keyword = request.to_keyword();
    validate_keyword(&keyword)?;

    persistence
        .update_keyword(keyword_id, &keyword)
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the keyword does not
/// exist, or an incident still uses it.
pub fn delete_keyword(
    persistence: &mut Persistence,
    keyword_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_master_data(actor)?;
    persistence
        .delete_keyword(keyword_id)
        .map_err(translate_persistence_error)?;
    info!(keyword_id, "Keyword deleted");
    Ok(())
}

// ============================================================================
// Mail Recipients
// ============================================================================

/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_recipients(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<RecipientsResponse, ApiError> {
    AuthorizationService::authorize_manage_recipients(actor)?;
    let recipients = persistence
        .list_recipients()
        .map_err(translate_persistence_error)?;
    Ok(RecipientsResponse { recipients })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the address is
/// malformed, or it is already on the list.
pub fn create_recipient(
    persistence: &mut Persistence,
    request: &RecipientRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::authorize_manage_recipients(actor)?;
    let recipient = request.to_recipient();
    validate_recipient(&recipient)?;

    let id: i64 = persistence
        .create_recipient(&recipient)
        .map_err(translate_persistence_error)?;
    info!(recipient_id = id, "Mail recipient added");
    Ok(CreatedResponse { id })
}

/// # Errors
///
/// Returns an error if the actor is not an admin, the address is
/// malformed or taken, or the recipient does not exist.
pub fn update_recipient(
    persistence: &mut Persistence,
    recipient_id: i64,
    request: &RecipientRequest,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_recipients(actor)?;
    let recipient = request.to_recipient();
    validate_recipient(&recipient)?;

    persistence
        .update_recipient(recipient_id, &recipient)
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the actor is not an admin or the recipient does not
/// exist.
pub fn delete_recipient(
    persistence: &mut Persistence,
    recipient_id: i64,
    actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_recipients(actor)?;
    persistence
        .delete_recipient(recipient_id)
        .map_err(translate_persistence_error)?;
    info!(recipient_id, "Mail recipient removed");
    Ok(())
}

// ============================================================================
// Events
// ============================================================================

/// Validates, numbers and stores an incident.
///
/// Validation runs against a snapshot of the master data before anything
/// is written. The report projection and the recipient list are read after
/// the commit; rendering and mailing are left to the caller.
///
/// # Errors
///
/// Returns an error if:
/// - The submission fails validation (nothing is stored)
/// - A join row is duplicated or a reference vanished concurrently
/// - The database write fails
pub fn submit_incident(
    persistence: &mut Persistence,
    request: &IncidentRequest,
    actor: &AuthenticatedActor,
    settings: &RecordingSettings,
) -> Result<RecordedIncident, ApiError> {
    AuthorizationService::authorize_record_event(actor)?;

    let mut draft: IncidentDraft =
        request.to_draft(settings.policy.timezone, &settings.default_district)?;
    let master: MasterData = persistence
        .load_master_data()
        .map_err(translate_persistence_error)?;
    validate_incident(&draft, &master)?;

    let recorded: RecordedEvent = persistence
        .record_incident(&mut draft, &settings.policy)
        .map_err(translate_persistence_error)?;
    info!(
        incident_id = recorded.id,
        recorded_by = %actor.login_name,
        "Incident {} recorded",
        recorded.number
    );

    let (report, warnings) =
        committed_report(recorded.number, persistence.get_incident_report(recorded.id));
    let recipients: Vec<String> = if report.is_some() {
        active_recipients(persistence)
    } else {
        Vec::new()
    };

    Ok(RecordedIncident {
        recorded,
        report,
        recipients,
        warnings,
    })
}

/// Validates, numbers and stores a duty.
///
/// # Errors
///
/// Returns an error if the submission fails validation or the write fails.
pub fn submit_duty(
    persistence: &mut Persistence,
    request: &DutyRequest,
    actor: &AuthenticatedActor,
    settings: &RecordingSettings,
) -> Result<RecordedDuty, ApiError> {
    AuthorizationService::authorize_record_event(actor)?;

    let mut draft: DutyDraft = request.to_draft(settings.policy.timezone)?;
    let master: MasterData = persistence
        .load_master_data()
        .map_err(translate_persistence_error)?;
    validate_duty(&draft, &master)?;

    let recorded: RecordedEvent = persistence
        .record_duty(&mut draft, &settings.policy)
        .map_err(translate_persistence_error)?;
    info!(
        duty_id = recorded.id,
        recorded_by = %actor.login_name,
        "Duty {} recorded",
        recorded.number
    );

    let (report, warnings) =
        committed_report(recorded.number, persistence.get_duty_report(recorded.id));
    let recipients: Vec<String> = if report.is_some() {
        active_recipients(persistence)
    } else {
        Vec::new()
    };

    Ok(RecordedDuty {
        recorded,
        report,
        recipients,
        warnings,
    })
}

/// Reads back a committed event for delivery.
///
/// A failed or empty read turns into a warning; the event stays stored and
/// the submission still succeeds.
pub(crate) fn committed_report<R>(
    number: EventNumber,
    read: Result<Option<R>, PersistenceError>,
) -> (Option<R>, Vec<String>) {
    match read {
        Ok(Some(report)) => (Some(report), Vec::new()),
        Ok(None) => {
            warn!("{number} was stored but cannot be found for its report");
            (
                None,
                vec![format!("{number} was saved, but no report was sent: record not found")],
            )
        }
        Err(e) => {
            warn!(error = %e, "Could not read back {number} for its report");
            (
                None,
                vec![format!("{number} was saved, but no report was sent: {e}")],
            )
        }
    }
}

/// The event is already committed here, so a failing lookup only costs the
/// mail.
fn active_recipients(persistence: &mut Persistence) -> Vec<String> {
    persistence.active_recipient_emails().unwrap_or_else(|e| {
        warn!(error = %e, "Could not load mail recipients");
        Vec::new()
    })
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_incidents(
    persistence: &mut Persistence,
    query: &EventListQuery,
) -> Result<Page<IncidentSummary>, ApiError> {
    persistence
        .list_incidents(&query.to_filter())
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the incident does not exist or the query fails.
pub fn get_incident(
    persistence: &mut Persistence,
    incident_id: i64,
) -> Result<IncidentReport, ApiError> {
    persistence
        .get_incident_report(incident_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Incident"),
            message: format!("The incident {incident_id} does not exist"),
        })
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_duties(
    persistence: &mut Persistence,
    query: &EventListQuery,
) -> Result<Page<DutySummary>, ApiError> {
    persistence
        .list_duties(&query.to_filter())
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the duty does not exist or the query fails.
pub fn get_duty(persistence: &mut Persistence, duty_id: i64) -> Result<DutyReport, ApiError> {
    persistence
        .get_duty_report(duty_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Duty"),
            message: format!("The duty {duty_id} does not exist"),
        })
}
