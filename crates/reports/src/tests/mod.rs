// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]


use std::sync::Mutex;

use eidiv_domain::{
    AssistanceLabels, AttendeeLine, DutyReport, EventNumber, FireLabels, IncidentReport,
    KeywordCategory, KeywordLine, Location, LookupLine, VehicleLine,
};
use time::macros::datetime;

use crate::{MailError, MailTransport, OutgoingMail};

/// Counts non-overlapping occurrences of `needle` in `haystack`.
pub fn occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}

pub fn attendee(member_id: i64, last_name: &str, first_name: &str) -> AttendeeLine {
    AttendeeLine {
        member_id,
        last_name: last_name.to_string(),
        first_name: first_name.to_string(),
        vehicle_role: String::from("HLF / Maschinist"),
        agt_minutes: None,
    }
}

pub fn sample_incident_report() -> IncidentReport {
    IncidentReport {
        incident_id: 1,
        number: EventNumber::new(2025, 7).unwrap(),
        reference: String::from("007/2025"),
        keyword: KeywordLine {
            code: String::from("B1"),
            label: String::from("Kleinbrand"),
            category: KeywordCategory::Brand,
        },
        start_at: datetime!(2025-03-14 17:05 UTC),
        end_at: datetime!(2025-03-14 18:35 UTC),
        duration_minutes: 90,
        leader_member_id: Some(3),
        leader: String::from("Maier, Josef"),
        reporting_agency: Some(String::from("ILS Traunstein")),
        location: Location {
            object_name: String::from("Scheune"),
            street: String::from("Hauptstrasse 12"),
            postal_city: String::from("84453 Muehldorf"),
            municipality: String::from("Muehldorf"),
            district: String::from("Muehldorf am Inn"),
        },
        fire: FireLabels {
            extent: Some(String::from("Kleinbrand a")),
            ..FireLabels::default()
        },
        assistance: AssistanceLabels::default(),
        measures: String::from("Abloeschen mit Kleinloeschgeraet"),
        party: None,
        water_supplies: vec![LookupLine {
            entry_id: 4,
            label: String::from("Hydrant"),
            required: None,
            quantity: Some(1.5),
        }],
        resources: Vec::new(),
        vehicles: vec![VehicleLine {
            vehicle_id: 1,
            call_sign: String::from("Florian Muehldorf 40/1"),
            vehicle_type: String::from("HLF 20"),
            kilometers: Some(12),
            hours: Some(1.5),
            required: Some(true),
        }],
        containers: Vec::new(),
        trailers: Vec::new(),
        brigades: Vec::new(),
        agencies: Vec::new(),
        attendance: vec![attendee(1, "Aigner", "Tobias"), attendee(2, "Huber", "Anna")],
        created_at: datetime!(2025-03-14 19:00 UTC),
    }
}

pub fn sample_duty_report() -> DutyReport {
    DutyReport {
        duty_id: 1,
        number: EventNumber::new(2025, 1).unwrap(),
        reference: String::from("001/2025"),
        title: String::from("Atemschutzuebung"),
        start_at: datetime!(2025-01-10 18:00 UTC),
        end_at: datetime!(2025-01-10 21:00 UTC),
        duration_minutes: 180,
        description: String::from("Uebung im Brandhaus"),
        vehicles: Vec::new(),
        containers: Vec::new(),
        trailers: Vec::new(),
        attendance: vec![attendee(1, "Aigner", "Tobias")],
        created_at: datetime!(2025-01-10 21:30 UTC),
    }
}

/// Records every message it is given.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingMail>>,
}

impl MailTransport for RecordingTransport {
    fn send(&self, mail: &OutgoingMail) -> Result<usize, MailError> {
        mail.check()?;
        self.sent.lock().unwrap().push(mail.clone());
        Ok(1)
    }
}

/// Rejects every message.
pub struct FailingTransport;

impl MailTransport for FailingTransport {
    fn send(&self, _mail: &OutgoingMail) -> Result<usize, MailError> {
        Err(MailError::Transport(String::from("relay unreachable")))
    }
}
