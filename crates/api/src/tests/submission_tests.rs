// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono_tz::Europe::Berlin;
use eidiv_domain::{EventNumber, IncidentReport, NumberingPolicy, YearBasis};
use eidiv_persistence::PersistenceError;
use time::macros::datetime;

use super::helpers::{attendee, duty_request, incident_request, seed_keyword, seed_member, setup};
use crate::handlers::committed_report;
use crate::{
    ApiError, EventListQuery, LocationRequest, RecordingSettings, get_duty, get_incident,
    list_incidents, submit_duty, submit_incident,
};

#[test]
fn test_three_incidents_are_numbered_in_order() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let settings = RecordingSettings::default();

    let references: Vec<String> = (0..3)
        .map(|_| {
            submit_incident(
                &mut persistence,
                &incident_request(keyword_id),
                &admin,
                &settings,
            )
            .unwrap()
            .report
            .unwrap()
            .reference
        })
        .collect();

    assert_eq!(references, vec!["001/2025", "002/2025", "003/2025"]);
}

#[test]
fn test_incident_and_duty_numbers_are_independent() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let settings = RecordingSettings::default();

    submit_incident(&mut persistence, &incident_request(keyword_id), &admin, &settings).unwrap();
    submit_incident(&mut persistence, &incident_request(keyword_id), &admin, &settings).unwrap();
    let duty = submit_duty(&mut persistence, &duty_request("Funkuebung"), &admin, &settings)
        .unwrap();

    assert_eq!(duty.recorded.number.formatted(), "001/2025");
}

#[test]
fn test_local_timestamps_use_department_time_zone() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);

    let recorded = submit_incident(
        &mut persistence,
        &incident_request(keyword_id),
        &admin,
        &RecordingSettings::default(),
    )
    .unwrap();

    let report = recorded.report.as_ref().unwrap();
    assert_eq!(report.start_at, datetime!(2025-03-14 17:05 UTC));
    assert_eq!(report.duration_minutes, 90);
}

#[test]
fn test_new_year_eve_incident_counts_for_local_year() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let mut request = incident_request(keyword_id);
    // 00:30 in Berlin is still 2024 in UTC
    request.start_at = String::from("2025-01-01T00:30");
    request.end_at = String::from("2025-01-01T01:30");

    let recorded = submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    )
    .unwrap();

    assert_eq!(recorded.report.as_ref().unwrap().reference, "001/2025");
}

#[test]
fn test_submission_year_basis_uses_wall_clock() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let settings = RecordingSettings {
        policy: NumberingPolicy::new(Berlin, YearBasis::Submission),
        ..RecordingSettings::default()
    };

    let recorded =
        submit_incident(&mut persistence, &incident_request(keyword_id), &admin, &settings)
            .unwrap();

    let this_year: u16 = eidiv_domain::local_year(time::OffsetDateTime::now_utc(), Berlin).unwrap();
    assert_eq!(recorded.recorded.number.year(), this_year);
}

#[test]
fn test_equal_start_and_end_is_rejected_and_nothing_is_stored() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let mut request = incident_request(keyword_id);
    request.end_at = request.start_at.clone();

    let result = submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    );

    match result {
        Err(ApiError::ValidationFailed { fields }) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "end_at");
        }
        other => panic!("Expected ValidationFailed, got: {other:?}"),
    }
    let page = list_incidents(&mut persistence, &EventListQuery::default()).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn test_agt_minutes_for_unqualified_member_are_rejected() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let wearer: i64 = seed_member(&mut persistence, "Huber", "Max", true);
    let driver: i64 = seed_member(&mut persistence, "Bauer", "Lena", false);
    let mut request = incident_request(keyword_id);
    request.attendance = vec![attendee(wearer, Some(25)), attendee(driver, Some(10))];

    let result = submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    );

    match result {
        Err(ApiError::ValidationFailed { fields }) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(names, vec!["attendance[1].agt_minutes"]);
        }
        other => panic!("Expected ValidationFailed, got: {other:?}"),
    }
}

#[test]
fn test_all_field_errors_are_reported_together() {
    let (mut persistence, admin, _) = setup();
    let inactive: i64 = seed_keyword(&mut persistence, "B9", false);
    let mut request = incident_request(inactive);
    request.leader_text = String::new();
    request.attendance = vec![attendee(777, None)];

    let result = submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    );

    match result {
        Err(ApiError::ValidationFailed { fields }) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert!(names.contains(&"keyword_id"));
            assert!(names.contains(&"leader_text"));
            assert!(names.contains(&"attendance[0].member_id"));
        }
        other => panic!("Expected ValidationFailed, got: {other:?}"),
    }
}

#[test]
fn test_unparseable_timestamps_are_field_errors() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let mut request = incident_request(keyword_id);
    request.start_at = String::from("gestern abend");
    request.end_at = String::from("14.03.2025 19:35:00 Uhr");

    let result = submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    );

    match result {
        Err(ApiError::ValidationFailed { fields }) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(names, vec!["start_at", "end_at"]);
        }
        other => panic!("Expected ValidationFailed, got: {other:?}"),
    }
}

#[test]
fn test_duplicate_attendance_is_an_integrity_error() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let member_id: i64 = seed_member(&mut persistence, "Huber", "Max", false);
    let mut request = incident_request(keyword_id);
    request.attendance = vec![attendee(member_id, None), attendee(member_id, None)];

    let result = submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    );

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "unique"),
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }
    let page = list_incidents(&mut persistence, &EventListQuery::default()).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn test_default_district_is_applied() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let settings = RecordingSettings {
        default_district: String::from("Altoetting"),
        ..RecordingSettings::default()
    };

    let defaulted =
        submit_incident(&mut persistence, &incident_request(keyword_id), &admin, &settings)
            .unwrap();
    let mut request = incident_request(keyword_id);
    request.location = LocationRequest {
        district: Some(String::from("Rosenheim")),
        ..LocationRequest::default()
    };
    let explicit = submit_incident(&mut persistence, &request, &admin, &settings).unwrap();

    assert_eq!(defaulted.report.as_ref().unwrap().location.district, "Altoetting");
    assert_eq!(explicit.report.as_ref().unwrap().location.district, "Rosenheim");
}

#[test]
fn test_submission_returns_projection_and_active_recipients() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let member_id: i64 = seed_member(&mut persistence, "Huber", "Max", true);
    super::helpers::seed_recipient(&mut persistence, "wehr@ff-muehldorf.de");
    let mut request = incident_request(keyword_id);
    request.leader_member_id = Some(member_id);
    request.attendance = vec![attendee(member_id, Some(30))];

    let recorded = submit_incident(
        &mut persistence,
        &request,
        &admin,
        &RecordingSettings::default(),
    )
    .unwrap();

    let report = recorded.report.as_ref().unwrap();
    assert_eq!(report.leader, "Huber, Max");
    assert_eq!(report.attendance.len(), 1);
    assert_eq!(recorded.recipients, vec!["wehr@ff-muehldorf.de"]);
    assert!(recorded.warnings.is_empty());
    assert_eq!(&get_incident(&mut persistence, recorded.recorded.id).unwrap(), report);
}

#[test]
fn test_duty_requires_title() {
    let (mut persistence, admin, _) = setup();

    let result = submit_duty(
        &mut persistence,
        &duty_request("   "),
        &admin,
        &RecordingSettings::default(),
    );

    match result {
        Err(ApiError::ValidationFailed { fields }) => assert_eq!(fields[0].field, "title"),
        other => panic!("Expected ValidationFailed, got: {other:?}"),
    }
}

#[test]
fn test_get_unknown_events() {
    let (mut persistence, _, _) = setup();

    assert!(matches!(
        get_incident(&mut persistence, 42),
        Err(ApiError::ResourceNotFound { .. })
    ));
    match get_duty(&mut persistence, 42) {
        Err(ApiError::ResourceNotFound { resource_type, .. }) => assert_eq!(resource_type, "Duty"),
        other => panic!("Expected ResourceNotFound, got: {other:?}"),
    }
}

#[test]
fn test_list_incidents_searches_object_name() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);
    let settings = RecordingSettings::default();
    submit_incident(&mut persistence, &incident_request(keyword_id), &admin, &settings).unwrap();
    let mut other = incident_request(keyword_id);
    other.location.object_name = String::from("Sagewerk Lindner");
    submit_incident(&mut persistence, &other, &admin, &settings).unwrap();

    let page = list_incidents(
        &mut persistence,
        &EventListQuery {
            q: Some(String::from("sagewerk")),
            year: None,
            page: None,
        },
    )
    .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].object_name, "Sagewerk Lindner");
}

#[test]
fn test_failed_read_back_after_commit_is_a_warning() {
    let number = EventNumber::new(2025, 4).unwrap();

    let (report, warnings) = committed_report::<IncidentReport>(
        number,
        Err(PersistenceError::DatabaseError(String::from("disk I/O error"))),
    );

    assert!(report.is_none());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("004/2025 was saved"));
    assert!(warnings[0].contains("disk I/O error"));
}

#[test]
fn test_missing_read_back_after_commit_is_a_warning() {
    let number = EventNumber::new(2025, 1).unwrap();

    let (report, warnings) = committed_report::<IncidentReport>(number, Ok(None));

    assert!(report.is_none());
    assert_eq!(
        warnings,
        vec![String::from(
            "001/2025 was saved, but no report was sent: record not found"
        )]
    );
}

#[test]
fn test_readable_report_has_no_warnings() {
    let (mut persistence, admin, _) = setup();
    let keyword_id: i64 = seed_keyword(&mut persistence, "B1", true);

    let recorded = submit_incident(
        &mut persistence,
        &incident_request(keyword_id),
        &admin,
        &RecordingSettings::default(),
    )
    .unwrap();

    assert!(recorded.report.is_some());
    assert!(recorded.warnings.is_empty());
}
