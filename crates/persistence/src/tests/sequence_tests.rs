// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for per-year event number allocation.

use chrono_tz::Europe::Berlin;
use eidiv_domain::{
    Attendance, EventKind, EventNumber, IncidentDraft, NumberingPolicy, YearBasis, local_year,
};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::tests::{
    berlin_policy, create_test_keyword, create_test_member, duty_starting, incident_starting,
};
use crate::{Persistence, PersistenceError};

#[test]
fn test_three_incidents_in_empty_year_are_numbered_consecutively() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B3", "Wohnhausbrand");
    let policy = berlin_policy();

    let starts = [
        datetime!(2025-02-01 10:00 UTC),
        datetime!(2025-03-15 18:30 UTC),
        datetime!(2025-07-04 06:45 UTC),
    ];

    let references: Vec<String> = starts
        .into_iter()
        .map(|start| {
            let mut draft = incident_starting(keyword_id, start);
            persistence
                .record_incident(&mut draft, &policy)
                .unwrap()
                .number
                .formatted()
        })
        .collect();

    assert_eq!(references, vec!["001/2025", "002/2025", "003/2025"]);
    assert_eq!(
        persistence
            .current_max_seq(EventKind::Incident, 2025)
            .unwrap(),
        Some(3)
    );
}

#[test]
fn test_recorded_number_is_written_back_to_draft() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "THL1", "Ölspur");

    let mut draft = incident_starting(keyword_id, datetime!(2025-05-01 12:00 UTC));
    let recorded = persistence
        .record_incident(&mut draft, &berlin_policy())
        .unwrap();

    assert_eq!(draft.number, Some(recorded.number));
    assert_eq!(recorded.number, EventNumber::new(2025, 1).unwrap());
}

#[test]
fn test_incidents_and_duties_have_separate_sequences() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B1", "Kleinbrand");
    let policy = berlin_policy();

    let mut first_incident = incident_starting(keyword_id, datetime!(2025-01-10 08:00 UTC));
    let mut second_incident = incident_starting(keyword_id, datetime!(2025-01-11 08:00 UTC));
    let mut duty = duty_starting("Übung Atemschutz", datetime!(2025-01-12 17:00 UTC));

    persistence
        .record_incident(&mut first_incident, &policy)
        .unwrap();
    persistence
        .record_incident(&mut second_incident, &policy)
        .unwrap();
    let recorded_duty = persistence.record_duty(&mut duty, &policy).unwrap();

    assert_eq!(recorded_duty.number.formatted(), "001/2025");
}

#[test]
fn test_sequence_restarts_each_year() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B2", "Zimmerbrand");
    let policy = berlin_policy();

    for day in [1, 2] {
        let start = datetime!(2025-06-01 10:00 UTC).replace_day(day).unwrap();
        let mut draft = incident_starting(keyword_id, start);
        persistence.record_incident(&mut draft, &policy).unwrap();
    }

    let mut earlier_year = incident_starting(keyword_id, datetime!(2024-11-20 10:00 UTC));
    let recorded = persistence
        .record_incident(&mut earlier_year, &policy)
        .unwrap();

    assert_eq!(recorded.number.formatted(), "001/2024");
}

#[test]
fn test_year_follows_department_time_zone() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B1", "Kleinbrand");

    // 23:30 UTC on New Year's Eve is already 00:30 on January 1st in Berlin.
    let mut draft = incident_starting(keyword_id, datetime!(2024-12-31 23:30 UTC));
    let recorded = persistence
        .record_incident(&mut draft, &berlin_policy())
        .unwrap();

    assert_eq!(recorded.number.year(), 2025);
}

#[test]
fn test_submission_basis_ignores_start_time() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B1", "Kleinbrand");
    let policy = NumberingPolicy::new(Berlin, YearBasis::Submission);

    let mut draft = incident_starting(keyword_id, datetime!(2019-03-01 10:00 UTC));
    let recorded = persistence.record_incident(&mut draft, &policy).unwrap();

    let current_year = local_year(OffsetDateTime::now_utc(), Berlin).unwrap();
    assert_eq!(recorded.number.year(), current_year);
}

#[test]
fn test_assign_event_number_is_idempotent() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B1", "Kleinbrand");
    let policy = berlin_policy();

    let mut draft: IncidentDraft = incident_starting(keyword_id, datetime!(2025-04-01 09:00 UTC));
    let first = persistence
        .assign_event_number(&mut draft, &policy)
        .unwrap();

    // A later event in the same year must not change an assigned number.
    let mut other = incident_starting(keyword_id, datetime!(2025-04-02 09:00 UTC));
    persistence.record_incident(&mut other, &policy).unwrap();

    let second = persistence
        .assign_event_number(&mut draft, &policy)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(draft.number, Some(first));
}

#[test]
fn test_prenumbered_incident_keeps_its_number() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B1", "Kleinbrand");

    let mut draft = incident_starting(keyword_id, datetime!(2025-04-01 09:00 UTC));
    draft.number = Some(EventNumber::new(2025, 17).unwrap());

    let recorded = persistence
        .record_incident(&mut draft, &berlin_policy())
        .unwrap();

    assert_eq!(recorded.number.formatted(), "017/2025");
}

#[test]
fn test_failed_recording_rolls_back_allocation() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B1", "Kleinbrand");
    let member_id = create_test_member(&mut persistence, "Maier", "Josef");
    let policy = berlin_policy();

    let mut draft = incident_starting(keyword_id, datetime!(2025-08-01 14:00 UTC));
    for role in ["HLF / Maschinist", "HLF / Gruppenführer"] {
        draft.attendance.push(Attendance {
            member_id,
            vehicle_role: role.to_string(),
            agt_minutes: None,
        });
    }

    let result = persistence.record_incident(&mut draft, &policy);

    assert!(matches!(result, Err(PersistenceError::Duplicate(_))));
    assert_eq!(draft.number, None);
    assert_eq!(
        persistence
            .current_max_seq(EventKind::Incident, 2025)
            .unwrap(),
        None
    );

    // The next successful submission starts at 1 again.
    draft.attendance.truncate(1);
    let recorded = persistence.record_incident(&mut draft, &policy).unwrap();
    assert_eq!(recorded.number.formatted(), "001/2025");
}
