// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod event_tests;
mod initialization_tests;
mod operator_tests;
mod sequence_tests;

use chrono_tz::Europe::Berlin;
use eidiv_domain::{
    DutyDraft, IncidentDraft, Keyword, KeywordCategory, Member, NumberingPolicy, Vehicle,
    YearBasis,
};
use time::{Duration, OffsetDateTime};

use crate::Persistence;

pub fn berlin_policy() -> NumberingPolicy {
    NumberingPolicy::new(Berlin, YearBasis::Start)
}

pub fn create_test_keyword(persistence: &mut Persistence, code: &str, label: &str) -> i64 {
    persistence
        .create_keyword(&Keyword {
            keyword_id: None,
            code: code.to_string(),
            label: label.to_string(),
            active: true,
            category: KeywordCategory::Brand,
        })
        .unwrap()
}

pub fn create_test_member(persistence: &mut Persistence, last: &str, first: &str) -> i64 {
    persistence.create_member(&Member::new(last, first)).unwrap()
}

pub fn create_test_vehicle(persistence: &mut Persistence, call_sign: &str) -> i64 {
    persistence
        .create_vehicle(&Vehicle {
            vehicle_id: None,
            vehicle_type: String::from("HLF 20"),
            call_sign: call_sign.to_string(),
            registration: String::from("MÜ-FW 112"),
        })
        .unwrap()
}

/// An incident lasting two hours with a free-text leader.
pub fn incident_starting(keyword_id: i64, start_at: OffsetDateTime) -> IncidentDraft {
    let mut draft: IncidentDraft =
        IncidentDraft::new(keyword_id, start_at, start_at + Duration::hours(2));
    draft.leader_text = String::from("Kommandant");
    draft
}

pub fn duty_starting(title: &str, start_at: OffsetDateTime) -> DutyDraft {
    DutyDraft::new(title, start_at, start_at + Duration::hours(3))
}
