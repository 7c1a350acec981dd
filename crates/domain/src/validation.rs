// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;

use crate::duty::DutyDraft;
use crate::error::{DomainError, ValidationErrors};
use crate::incident::{Attendance, IncidentDraft, InvolvedParty};
use crate::master_data::MasterData;
use crate::types::{
    Container, Keyword, LookupEntry, LookupKind, MailRecipient, Member, Trailer, Vehicle,
};

/// Validates that an event ends strictly after it starts.
///
/// # Errors
///
/// Returns `EndNotAfterStart` if `end_at` is equal to or earlier than `start_at`.
pub fn validate_time_range(
    start_at: OffsetDateTime,
    end_at: OffsetDateTime,
) -> Result<(), DomainError> {
    // Rule: equal instants are rejected as well
    if end_at <= start_at {
        return Err(DomainError::EndNotAfterStart);
    }
    Ok(())
}

/// Validates that an optional count or distance is not negative.
///
/// # Errors
///
/// Returns `NegativeValue` naming `what` if the value is below zero.
pub fn validate_non_negative(what: &'static str, value: Option<i32>) -> Result<(), DomainError> {
    match value {
        Some(v) if v < 0 => Err(DomainError::NegativeValue(what)),
        _ => Ok(()),
    }
}

fn validate_non_negative_hours(value: Option<f64>) -> Result<(), DomainError> {
    match value {
        Some(v) if v < 0.0 || v.is_nan() => Err(DomainError::NegativeValue("Hours")),
        _ => Ok(()),
    }
}

/// Validates AGT minutes recorded for a member.
///
/// # Errors
///
/// Returns an error if the minutes are negative, or if any minutes are
/// recorded for a member without the AGT qualification.
pub fn validate_agt_minutes(member: &Member, agt_minutes: Option<i32>) -> Result<(), DomainError> {
    let Some(minutes) = agt_minutes else {
        return Ok(());
    };
    if minutes < 0 {
        return Err(DomainError::NegativeValue("AGT minutes"));
    }
    // Rule: only AGT-qualified members may have minutes at all, zero included
    if !member.agt_qualified {
        return Err(DomainError::AgtMinutesNotAllowed {
            member_id: member.member_id.unwrap_or_default(),
        });
    }
    Ok(())
}

/// Validates the involved party of an incident.
///
/// # Errors
///
/// Returns `MissingExemptionReason` if costs are exempted without a reason.
pub fn validate_party(party: &InvolvedParty) -> Result<(), DomainError> {
    if party.cost_exempt && party.exemption_reason.trim().is_empty() {
        return Err(DomainError::MissingExemptionReason);
    }
    Ok(())
}

fn validate_required_text(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::EmptyField(field));
    }
    Ok(())
}

fn check_lookup(
    errors: &mut ValidationErrors,
    master: &MasterData,
    field: impl Into<String>,
    entry_id: i64,
    expected: LookupKind,
) {
    let result: Result<(), DomainError> = match master.lookup(entry_id) {
        None => Err(DomainError::UnknownReference {
            entity: expected.as_str(),
            id: entry_id,
        }),
        Some(entry) if entry.kind != expected => Err(DomainError::WrongLookupKind {
            expected,
            actual: entry.kind,
        }),
        Some(_) => Ok(()),
    };
    errors.check(field, result);
}

fn check_optional_lookup(
    errors: &mut ValidationErrors,
    master: &MasterData,
    field: &'static str,
    entry_id: Option<i64>,
    expected: LookupKind,
) {
    if let Some(id) = entry_id {
        check_lookup(errors, master, field, id, expected);
    }
}

fn check_exists(
    errors: &mut ValidationErrors,
    field: String,
    entity: &'static str,
    id: i64,
    exists: bool,
) {
    if !exists {
        errors.push(field, DomainError::UnknownReference { entity, id });
    }
}

fn check_attendance(
    errors: &mut ValidationErrors,
    master: &MasterData,
    attendance: &[Attendance],
) {
    for (index, entry) in attendance.iter().enumerate() {
        match master.member(entry.member_id) {
            None => errors.push(
                format!("attendance[{index}].member_id"),
                DomainError::UnknownReference {
                    entity: "member",
                    id: entry.member_id,
                },
            ),
            Some(member) => errors.check(
                format!("attendance[{index}].agt_minutes"),
                validate_agt_minutes(member, entry.agt_minutes),
            ),
        }
    }
}

/// Validates an incident submission against the current master data.
///
/// All rules are checked; every violation is reported with its field path.
///
/// # Errors
///
/// Returns the collected field errors if any rule is violated.
pub fn validate_incident(
    draft: &IncidentDraft,
    master: &MasterData,
) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();

    errors.check("end_at", validate_time_range(draft.start_at, draft.end_at));

    match master.keyword(draft.keyword_id) {
        None => errors.push(
            "keyword_id",
            DomainError::UnknownReference {
                entity: "keyword",
                id: draft.keyword_id,
            },
        ),
        Some(keyword) if !keyword.active => {
            errors.push("keyword_id", DomainError::InactiveKeyword(draft.keyword_id));
        }
        Some(_) => {}
    }

    // Rule: a leader is either a member or a free-text name
    match draft.leader_member_id {
        Some(member_id) => check_exists(
            &mut errors,
            String::from("leader_member_id"),
            "member",
            member_id,
            master.member(member_id).is_some(),
        ),
        None if draft.leader_text.trim().is_empty() => {
            errors.push("leader_text", DomainError::MissingLeader);
        }
        None => {}
    }

    check_optional_lookup(
        &mut errors,
        master,
        "reporting_agency_id",
        draft.reporting_agency_id,
        LookupKind::ReportingAgency,
    );
    check_optional_lookup(
        &mut errors,
        master,
        "fire.extent_id",
        draft.fire.extent_id,
        LookupKind::FireExtent,
    );
    check_optional_lookup(
        &mut errors,
        master,
        "fire.spread_id",
        draft.fire.spread_id,
        LookupKind::FireSpread,
    );
    check_optional_lookup(
        &mut errors,
        master,
        "fire.material_id",
        draft.fire.material_id,
        LookupKind::FireMaterial,
    );
    check_optional_lookup(
        &mut errors,
        master,
        "fire.object_id",
        draft.fire.object_id,
        LookupKind::FireObject,
    );

    let assistance = &draft.assistance;
    check_optional_lookup(
        &mut errors,
        master,
        "assistance.damage_event_id",
        assistance.damage_event_id,
        LookupKind::DamageEvent,
    );
    check_optional_lookup(
        &mut errors,
        master,
        "assistance.rescue_type_id",
        assistance.rescue_type_id,
        LookupKind::RescueType,
    );
    errors.check(
        "assistance.rescued_count",
        validate_non_negative("Rescued persons", assistance.rescued_count),
    );
    check_optional_lookup(
        &mut errors,
        master,
        "assistance.standby_id",
        assistance.standby_id,
        LookupKind::Standby,
    );
    check_optional_lookup(
        &mut errors,
        master,
        "assistance.false_alarm_id",
        assistance.false_alarm_id,
        LookupKind::FalseAlarm,
    );
    check_optional_lookup(
        &mut errors,
        master,
        "assistance.other_id",
        assistance.other_id,
        LookupKind::Other,
    );

    if let Some(party) = &draft.party {
        errors.check("party.exemption_reason", validate_party(party));
    }

    for (index, supply) in draft.water_supplies.iter().enumerate() {
        check_lookup(
            &mut errors,
            master,
            format!("water_supplies[{index}].source_id"),
            supply.source_id,
            LookupKind::WaterSource,
        );
        if supply.quantity.is_some_and(|q| q < 0.0 || q.is_nan()) {
            errors.push(
                format!("water_supplies[{index}].quantity"),
                DomainError::NegativeValue("Water quantity"),
            );
        }
    }

    for (index, usage) in draft.resources.iter().enumerate() {
        check_lookup(
            &mut errors,
            master,
            format!("resources[{index}].resource_id"),
            usage.resource_id,
            LookupKind::Resource,
        );
        errors.check(
            format!("resources[{index}].quantity"),
            validate_non_negative("Quantity", Some(usage.quantity)),
        );
    }

    for (index, usage) in draft.vehicles.iter().enumerate() {
        check_exists(
            &mut errors,
            format!("vehicles[{index}].vehicle_id"),
            "vehicle",
            usage.vehicle_id,
            master.vehicle(usage.vehicle_id).is_some(),
        );
        errors.check(
            format!("vehicles[{index}].kilometers"),
            validate_non_negative("Kilometers", usage.kilometers),
        );
        errors.check(
            format!("vehicles[{index}].hours"),
            validate_non_negative_hours(usage.hours),
        );
    }

    for (index, usage) in draft.containers.iter().enumerate() {
        check_exists(
            &mut errors,
            format!("containers[{index}].container_id"),
            "container",
            usage.container_id,
            master.container(usage.container_id).is_some(),
        );
    }

    for (index, usage) in draft.trailers.iter().enumerate() {
        check_exists(
            &mut errors,
            format!("trailers[{index}].trailer_id"),
            "trailer",
            usage.trailer_id,
            master.trailer(usage.trailer_id).is_some(),
        );
        errors.check(
            format!("trailers[{index}].kilometers"),
            validate_non_negative("Kilometers", usage.kilometers),
        );
        errors.check(
            format!("trailers[{index}].hours"),
            validate_non_negative_hours(usage.hours),
        );
    }

    for (index, support) in draft.brigades.iter().enumerate() {
        check_lookup(
            &mut errors,
            master,
            format!("brigades[{index}].brigade_id"),
            support.brigade_id,
            LookupKind::LocalBrigade,
        );
    }

    for (index, agency_id) in draft.agency_ids.iter().enumerate() {
        check_lookup(
            &mut errors,
            master,
            format!("agency_ids[{index}]"),
            *agency_id,
            LookupKind::AdditionalAgency,
        );
    }

    check_attendance(&mut errors, master, &draft.attendance);

    errors.into_result()
}

/// Validates a duty submission against the current master data.
///
/// # Errors
///
/// Returns the collected field errors if any rule is violated.
pub fn validate_duty(draft: &DutyDraft, master: &MasterData) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();

    errors.check("title", validate_required_text("Title", &draft.title));
    errors.check("end_at", validate_time_range(draft.start_at, draft.end_at));

    for (index, usage) in draft.vehicles.iter().enumerate() {
        check_exists(
            &mut errors,
            format!("vehicles[{index}].vehicle_id"),
            "vehicle",
            usage.vehicle_id,
            master.vehicle(usage.vehicle_id).is_some(),
        );
        errors.check(
            format!("vehicles[{index}].kilometers"),
            validate_non_negative("Kilometers", usage.kilometers),
        );
        errors.check(
            format!("vehicles[{index}].hours"),
            validate_non_negative_hours(usage.hours),
        );
    }

    for (index, usage) in draft.containers.iter().enumerate() {
        check_exists(
            &mut errors,
            format!("containers[{index}].container_id"),
            "container",
            usage.container_id,
            master.container(usage.container_id).is_some(),
        );
    }

    for (index, usage) in draft.trailers.iter().enumerate() {
        check_exists(
            &mut errors,
            format!("trailers[{index}].trailer_id"),
            "trailer",
            usage.trailer_id,
            master.trailer(usage.trailer_id).is_some(),
        );
        errors.check(
            format!("trailers[{index}].kilometers"),
            validate_non_negative("Kilometers", usage.kilometers),
        );
        errors.check(
            format!("trailers[{index}].hours"),
            validate_non_negative_hours(usage.hours),
        );
    }

    check_attendance(&mut errors, master, &draft.attendance);

    errors.into_result()
}

/// Validates member fields before they are stored.
///
/// # Errors
///
/// Returns the field errors if a name is empty.
pub fn validate_member(member: &Member) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();
    errors.check(
        "last_name",
        validate_required_text("Last name", &member.last_name),
    );
    errors.check(
        "first_name",
        validate_required_text("First name", &member.first_name),
    );
    errors.into_result()
}

/// Validates vehicle fields before they are stored.
///
/// # Errors
///
/// Returns the field errors if the type or call sign is empty.
pub fn validate_vehicle(vehicle: &Vehicle) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();
    errors.check(
        "vehicle_type",
        validate_required_text("Vehicle type", &vehicle.vehicle_type),
    );
    errors.check(
        "call_sign",
        validate_required_text("Call sign", &vehicle.call_sign),
    );
    errors.into_result()
}

/// # Errors
///
/// Returns the field errors if the container type is empty.
pub fn validate_container(container: &Container) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();
    errors.check(
        "container_type",
        validate_required_text("Container type", &container.container_type),
    );
    errors.into_result()
}

/// # Errors
///
/// Returns the field errors if the trailer type is empty.
pub fn validate_trailer(trailer: &Trailer) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();
    errors.check(
        "trailer_type",
        validate_required_text("Trailer type", &trailer.trailer_type),
    );
    errors.into_result()
}

/// # Errors
///
/// Returns the field errors if the label is empty.
pub fn validate_lookup_entry(entry: &LookupEntry) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();
    errors.check("label", validate_required_text("Label", &entry.label));
    errors.into_result()
}

/// # Errors
///
/// Returns the field errors if the code or label is empty.
pub fn validate_keyword(keyword: &Keyword) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();
    errors.check("code", validate_required_text("Code", &keyword.code));
    errors.check("label", validate_required_text("Label", &keyword.label));
    errors.into_result()
}

/// Validates the shape of an email address.
///
/// This is a plausibility check (one `@`, non-empty local part, dotted
/// domain, no whitespace), not an RFC 5322 parser.
///
/// # Errors
///
/// Returns `InvalidEmail` if the address is implausible.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(invalid());
    };
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

/// # Errors
///
/// Returns the field errors if the email address is implausible.
pub fn validate_recipient(recipient: &MailRecipient) -> Result<(), ValidationErrors> {
    let mut errors: ValidationErrors = ValidationErrors::new();
    errors.check("email", validate_email(&recipient.email));
    errors.into_result()
}
