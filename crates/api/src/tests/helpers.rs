// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::{Arc, Mutex};

use eidiv_domain::{
    DutyReport, IncidentReport, Keyword, KeywordCategory, LookupEntry, LookupKind, MailRecipient,
    Member, Vehicle,
};
use eidiv_persistence::Persistence;
use eidiv_reports::{
    MailError, MailSettings, MailTransport, OutgoingMail, PdfReportRenderer, ReportDistributor,
    ReportError, ReportRenderer,
};

use crate::{
    AttendanceRequest, AuthenticatedActor, DutyRequest, IncidentRequest, LocationRequest,
    ReportDelivery, Role,
};

pub const ADMIN_PASSWORD: &str = "Schlauchboot-2025";
pub const RECORDER_PASSWORD: &str = "Atemschutz-Uebung";

pub fn setup() -> (Persistence, AuthenticatedActor, AuthenticatedActor) {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let admin_id: i64 = persistence
        .create_operator("kdt.huber", "Huber, Max", ADMIN_PASSWORD, "Admin")
        .unwrap();
    let recorder_id: i64 = persistence
        .create_operator("schriftfuehrer", "Bauer, Lena", RECORDER_PASSWORD, "Recorder")
        .unwrap();
    (
        persistence,
        AuthenticatedActor::new(admin_id, String::from("KDT.HUBER"), Role::Admin),
        AuthenticatedActor::new(recorder_id, String::from("SCHRIFTFUEHRER"), Role::Recorder),
    )
}

pub fn seed_keyword(persistence: &mut Persistence, code: &str, active: bool) -> i64 {
    persistence
        .create_keyword(&Keyword {
            keyword_id: None,
            code: code.to_string(),
            label: String::from("Kleinbrand"),
            active,
            category: KeywordCategory::Brand,
        })
        .unwrap()
}

pub fn seed_member(persistence: &mut Persistence, last: &str, first: &str, agt: bool) -> i64 {
    let mut member: Member = Member::new(last, first);
    member.agt_qualified = agt;
    persistence.create_member(&member).unwrap()
}

pub fn seed_vehicle(persistence: &mut Persistence, call_sign: &str) -> i64 {
    persistence
        .create_vehicle(&Vehicle {
            vehicle_id: None,
            vehicle_type: String::from("LF 10"),
            call_sign: call_sign.to_string(),
            registration: String::new(),
        })
        .unwrap()
}

pub fn seed_lookup(persistence: &mut Persistence, kind: LookupKind, label: &str) -> i64 {
    persistence
        .create_lookup_entry(&LookupEntry {
            entry_id: None,
            kind,
            label: label.to_string(),
        })
        .unwrap()
}

pub fn seed_recipient(persistence: &mut Persistence, email: &str) {
    persistence
        .create_recipient(&MailRecipient {
            recipient_id: None,
            email: email.to_string(),
            active: true,
        })
        .unwrap();
}

/// A 90 minute incident on 14 March 2025, local Berlin time.
pub fn incident_request(keyword_id: i64) -> IncidentRequest {
    IncidentRequest {
        keyword_id,
        start_at: String::from("2025-03-14T18:05"),
        end_at: String::from("2025-03-14T19:35"),
        leader_member_id: None,
        leader_text: String::from("Maier, Josef"),
        reporting_agency_id: None,
        location: LocationRequest {
            object_name: String::from("Scheune Gruber"),
            street: String::from("Dorfstrasse 4"),
            postal_city: String::from("84453 Muehldorf"),
            municipality: String::from("Muehldorf"),
            district: None,
        },
        fire: crate::FireRequest::default(),
        assistance: crate::AssistanceRequest::default(),
        measures: String::from("Brand abgeloescht"),
        party: None,
        water_supplies: Vec::new(),
        resources: Vec::new(),
        vehicles: Vec::new(),
        containers: Vec::new(),
        trailers: Vec::new(),
        brigades: Vec::new(),
        agency_ids: Vec::new(),
        attendance: Vec::new(),
    }
}

pub fn duty_request(title: &str) -> DutyRequest {
    DutyRequest {
        title: title.to_string(),
        start_at: String::from("2025-01-10T19:00"),
        end_at: String::from("2025-01-10T21:30"),
        description: String::from("Leistungsabzeichen THL"),
        vehicles: Vec::new(),
        containers: Vec::new(),
        trailers: Vec::new(),
        attendance: Vec::new(),
    }
}

pub fn attendee(member_id: i64, agt_minutes: Option<i32>) -> AttendanceRequest {
    AttendanceRequest {
        member_id,
        vehicle_role: String::from("LF 10 / Truppmann"),
        agt_minutes,
    }
}

pub struct FailingRenderer;

impl ReportRenderer for FailingRenderer {
    fn render_incident(&self, _report: &IncidentReport) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::Render(String::from("font table missing")))
    }

    fn render_duty(&self, _report: &DutyReport) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::Render(String::from("font table missing")))
    }
}

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

pub struct FailingTransport;

impl MailTransport for FailingTransport {
    fn send(&self, _mail: &OutgoingMail) -> Result<usize, MailError> {
        Err(MailError::Transport(String::from("relay unreachable")))
    }
}

pub fn pdf_renderer() -> Arc<dyn ReportRenderer> {
    Arc::new(PdfReportRenderer::new(
        "Freiwillige Feuerwehr Muehldorf",
        chrono_tz::Europe::Berlin,
    ))
}

pub fn delivery(
    renderer: Arc<dyn ReportRenderer>,
    transport: Arc<dyn MailTransport>,
) -> ReportDelivery {
    ReportDelivery::new(
        renderer,
        ReportDistributor::new(transport, MailSettings::default()),
    )
}
