// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use eidiv_domain::{KeywordCategory, LookupKind};

use super::helpers::{incident_request, seed_keyword, seed_lookup, seed_member, seed_vehicle, setup};
use crate::{
    ApiError, KeywordRequest, LookupEntryRequest, MemberRequest, RecipientRequest,
    RecordingSettings, VehicleUsageRequest, create_keyword, create_lookup_entry, create_member,
    create_recipient, delete_keyword, delete_member, delete_vehicle, keyword_category,
    list_keywords, list_lookup_entries, list_members, list_recipients, list_vehicles, member_agt,
    submit_incident, update_lookup_entry, update_member,
};

fn member_request(last: &str, first: &str) -> MemberRequest {
    MemberRequest {
        last_name: last.to_string(),
        first_name: first.to_string(),
        agt_qualified: true,
        full_time: false,
        commander: false,
        deputy_commander: false,
    }
}

fn keyword_request(code: &str, active: bool, category: KeywordCategory) -> KeywordRequest {
    KeywordRequest {
        code: code.to_string(),
        label: String::from("Verkehrsunfall"),
        active,
        category,
    }
}

#[test]
fn test_create_and_list_members() {
    let (mut persistence, admin, _) = setup();

    create_member(&mut persistence, &member_request(" Zeller ", "Anna"), &admin).unwrap();
    create_member(&mut persistence, &member_request("Aigner", "Tobias"), &admin).unwrap();

    let response = list_members(&mut persistence).unwrap();
    let names: Vec<String> = response
        .members
        .iter()
        .map(eidiv_domain::Member::display_name)
        .collect();
    assert_eq!(names, vec!["Aigner, Tobias", "Zeller, Anna"]);
}

#[test]
fn test_create_member_requires_names() {
    let (mut persistence, admin, _) = setup();

    let result = create_member(&mut persistence, &member_request("  ", ""), &admin);

    match result {
        Err(ApiError::ValidationFailed { fields }) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert!(names.contains(&"last_name"));
            assert!(names.contains(&"first_name"));
        }
        other => panic!("Expected ValidationFailed, got: {other:?}"),
    }
}

#[test]
fn test_update_unknown_member() {
    let (mut persistence, admin, _) = setup();

    let result = update_member(&mut persistence, 404, &member_request("Huber", "Max"), &admin);

    match result {
        Err(ApiError::ResourceNotFound { resource_type, .. }) => {
            assert_eq!(resource_type, "Member");
        }
        other => panic!("Expected ResourceNotFound, got: {other:?}"),
    }
}

#[test]
fn test_member_agt_lookup() {
    let (mut persistence, _, _) = setup();
    let qualified: i64 = seed_member(&mut persistence, "Huber", "Max", true);
    let unqualified: i64 = seed_member(&mut persistence, "Bauer", "Lena", false);

    assert!(member_agt(&mut persistence, qualified).unwrap().agt);
    assert!(!member_agt(&mut persistence, unqualified).unwrap().agt);
    assert!(!member_agt(&mut persistence, 9999).unwrap().agt);
}

#[test]
fn test_delete_member_on_roster_is_rejected() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let member_id: i64 = seed_member(&mut persistence, "Huber", "Max", false);
    let mut request = incident_request(keyword_id);
    request.attendance = vec![super::helpers::attendee(member_id, None)];
    submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    )
    .unwrap();

    let result = delete_member(&mut persistence, member_id, &admin);

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "in_use"),
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }
}

#[test]
fn test_delete_vehicle_used_by_incident_is_rejected() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let vehicle_id: i64 = seed_vehicle(&mut persistence, "Florian Muehldorf 40/1");
    let mut request = incident_request(keyword_id);
    request.vehicles = vec![VehicleUsageRequest {
        vehicle_id,
        kilometers: Some(12),
        hours: Some(1.5),
        required: true,
    }];
    submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    )
    .unwrap();

    let result = delete_vehicle(&mut persistence, vehicle_id, &admin);

    match result {
        Err(ApiError::DomainRuleViolation { rule, message }) => {
            assert_eq!(rule, "in_use");
            assert!(message.contains("vehicle"));
        }
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }
    assert_eq!(list_vehicles(&mut persistence).unwrap().vehicles.len(), 1);
}

#[test]
fn test_delete_unused_vehicle() {
    let (mut persistence, admin, _) = setup();
    let vehicle_id: i64 = seed_vehicle(&mut persistence, "Florian Muehldorf 11/1");

    delete_vehicle(&mut persistence, vehicle_id, &admin).unwrap();

    assert!(list_vehicles(&mut persistence).unwrap().vehicles.is_empty());
}

#[test]
fn test_lookup_entries_by_kind() {
    let (mut persistence, admin, _) = setup();
    seed_lookup(&mut persistence, LookupKind::Resource, "Ölbindemittel");

    create_lookup_entry(
        &mut persistence,
        "water_source",
        &LookupEntryRequest {
            label: String::from("Hydrant"),
        },
        &admin,
    )
    .unwrap();

    let response = list_lookup_entries(&mut persistence, "water_source").unwrap();
    assert_eq!(response.kind, LookupKind::WaterSource);
    assert_eq!(response.entries.len(), 1);
    assert_eq!(response.entries[0].label, "Hydrant");
}

#[test]
fn test_unknown_lookup_kind() {
    let (mut persistence, _, _) = setup();

    match list_lookup_entries(&mut persistence, "ladders") {
        Err(ApiError::ResourceNotFound { resource_type, .. }) => {
            assert_eq!(resource_type, "Lookup kind");
        }
        other => panic!("Expected ResourceNotFound, got: {other:?}"),
    }
}

#[test]
fn test_update_lookup_entry_of_other_kind_is_not_found() {
    let (mut persistence, admin, _) = setup();
    let entry_id: i64 = seed_lookup(&mut persistence, LookupKind::WaterSource, "Zisterne");

    let result = update_lookup_entry(
        &mut persistence,
        "resource",
        entry_id,
        &LookupEntryRequest {
            label: String::from("Schaummittel"),
        },
        &admin,
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_keyword_list_filters_active_by_category() {
    let (mut persistence, admin, _) = setup();
    create_keyword(
        &mut persistence,
        &keyword_request("THL1", true, KeywordCategory::Thl),
        &admin,
    )
    .unwrap();
    create_keyword(
        &mut persistence,
        &keyword_request("THL2", false, KeywordCategory::Thl),
        &admin,
    )
    .unwrap();
    create_keyword(
        &mut persistence,
        &keyword_request("B2", true, KeywordCategory::Brand),
        &admin,
    )
    .unwrap();

    let thl = list_keywords(&mut persistence, Some("thl")).unwrap();
    let codes: Vec<&str> = thl.keywords.iter().map(|k| k.code.as_str()).collect();
    assert_eq!(codes, vec!["THL1"]);

    let all = list_keywords(&mut persistence, None).unwrap();
    assert_eq!(all.keywords.len(), 3);

    // An empty filter means no filter
    let unfiltered = list_keywords(&mut persistence, Some("")).unwrap();
    assert_eq!(unfiltered.keywords.len(), 3);
}

#[test]
fn test_keyword_list_rejects_unknown_category() {
    let (mut persistence, _, _) = setup();

    match list_keywords(&mut persistence, Some("flood")) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "category"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }
}

#[test]
fn test_keyword_category_falls_back_to_sonstig() {
    let (mut persistence, admin, _) = setup();
    let created = create_keyword(
        &mut persistence,
        &keyword_request("THL1", true, KeywordCategory::Thl),
        &admin,
    )
    .unwrap();

    assert_eq!(
        keyword_category(&mut persistence, created.id).unwrap().category,
        KeywordCategory::Thl
    );
    assert_eq!(
        keyword_category(&mut persistence, 4711).unwrap().category,
        KeywordCategory::Sonstig
    );
}

#[test]
fn test_delete_keyword_in_use_is_rejected() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    submit_incident(
        &mut persistence,
        &incident_request(keyword_id),
        &admin,
        &RecordingSettings::default(),
    )
    .unwrap();

    let result = delete_keyword(&mut persistence, keyword_id, &admin);

    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_recipient_is_stored_lowercase_and_unique() {
    let (mut persistence, admin, _) = setup();

    create_recipient(
        &mut persistence,
        &RecipientRequest {
            email: String::from(" Kommandant@FF-Muehldorf.de "),
            active: true,
        },
        &admin,
    )
    .unwrap();
    let duplicate = create_recipient(
        &mut persistence,
        &RecipientRequest {
            email: String::from("kommandant@ff-muehldorf.de"),
            active: false,
        },
        &admin,
    );

    match duplicate {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "unique"),
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }
    let recipients = list_recipients(&mut persistence, &admin).unwrap().recipients;
    assert_eq!(recipients.len(), 1);
    assert_eq!(recipients[0].email, "kommandant@ff-muehldorf.de");
}

#[test]
fn test_recipient_with_malformed_address_is_rejected() {
    let (mut persistence, admin, _) = setup();

    let result = create_recipient(
        &mut persistence,
        &RecipientRequest {
            email: String::from("kommandant.at.ff"),
            active: true,
        },
        &admin,
    );

    match result {
        Err(ApiError::ValidationFailed { fields }) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "email");
        }
        other => panic!("Expected ValidationFailed, got: {other:?}"),
    }
}
