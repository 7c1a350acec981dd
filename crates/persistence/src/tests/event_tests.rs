// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for recording events and reading their report projections.

use eidiv_domain::{
    Attendance, BrigadeSupport, Container, ContainerUsage, DutyVehicleUsage, InvolvedParty,
    LookupEntry, LookupKind, PartyType, ResourceUsage, VehicleUsage, WaterSupply,
};
use time::macros::datetime;

use crate::tests::{
    berlin_policy, create_test_keyword, create_test_member, create_test_vehicle, duty_starting,
    incident_starting,
};
use crate::{Persistence, PersistenceError};

fn create_lookup(persistence: &mut Persistence, kind: LookupKind, label: &str) -> i64 {
    persistence
        .create_lookup_entry(&LookupEntry {
            entry_id: None,
            kind,
            label: label.to_string(),
        })
        .unwrap()
}

fn attend(member_id: i64, role: &str) -> Attendance {
    Attendance {
        member_id,
        vehicle_role: role.to_string(),
        agt_minutes: None,
    }
}

#[test]
fn test_incident_report_orders_attendees_by_name() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B3", "Wohnhausbrand");
    let zeller = create_test_member(&mut persistence, "Zeller", "Anna");
    let huber_x = create_test_member(&mut persistence, "Huber", "Xaver");
    let huber_a = create_test_member(&mut persistence, "Huber", "Anna");

    let mut draft = incident_starting(keyword_id, datetime!(2025-02-01 10:00 UTC));
    draft.attendance = vec![
        attend(zeller, "HLF / Angriffstrupp"),
        attend(huber_x, "HLF / Maschinist"),
        attend(huber_a, "DLK / Korb"),
    ];
    let recorded = persistence
        .record_incident(&mut draft, &berlin_policy())
        .unwrap();

    let report = persistence
        .get_incident_report(recorded.id)
        .unwrap()
        .unwrap();

    let names: Vec<(&str, &str)> = report
        .attendance
        .iter()
        .map(|line| (line.last_name.as_str(), line.first_name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![("Huber", "Anna"), ("Huber", "Xaver"), ("Zeller", "Anna")]
    );
    assert_eq!(report.attendance[0].vehicle_role, "DLK / Korb");
}

#[test]
fn test_incident_report_orders_vehicles_by_call_sign() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "THL2", "VU eingeklemmte Person");
    let rw = create_test_vehicle(&mut persistence, "Florian Mühldorf 61/1");
    let hlf = create_test_vehicle(&mut persistence, "Florian Mühldorf 40/1");

    let mut draft = incident_starting(keyword_id, datetime!(2025-02-01 10:00 UTC));
    draft.vehicles = vec![
        VehicleUsage {
            vehicle_id: rw,
            kilometers: Some(12),
            hours: Some(1.5),
            required: true,
        },
        VehicleUsage {
            vehicle_id: hlf,
            kilometers: Some(12),
            hours: Some(2.0),
            required: false,
        },
    ];
    let recorded = persistence
        .record_incident(&mut draft, &berlin_policy())
        .unwrap();

    let report = persistence
        .get_incident_report(recorded.id)
        .unwrap()
        .unwrap();

    let call_signs: Vec<&str> = report
        .vehicles
        .iter()
        .map(|line| line.call_sign.as_str())
        .collect();
    assert_eq!(
        call_signs,
        vec!["Florian Mühldorf 40/1", "Florian Mühldorf 61/1"]
    );
    assert_eq!(report.vehicles[1].required, Some(true));
    assert_eq!(report.vehicles[1].hours, Some(1.5));
}

#[test]
fn test_incident_report_resolves_lookup_labels() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B3", "Wohnhausbrand");
    let agency = create_lookup(&mut persistence, LookupKind::ReportingAgency, "ILS Traunstein");
    let extent = create_lookup(&mut persistence, LookupKind::FireExtent, "Mittelbrand");
    let hydrant = create_lookup(&mut persistence, LookupKind::WaterSource, "Hydrant");
    let creek = create_lookup(&mut persistence, LookupKind::WaterSource, "Bach");
    let foam = create_lookup(&mut persistence, LookupKind::Resource, "Schaummittel");
    let brigade = create_lookup(&mut persistence, LookupKind::LocalBrigade, "FF Altmühldorf");
    let police = create_lookup(&mut persistence, LookupKind::AdditionalAgency, "Polizei");

    let mut draft = incident_starting(keyword_id, datetime!(2025-02-01 10:00 UTC));
    draft.reporting_agency_id = Some(agency);
    draft.fire.extent_id = Some(extent);
    draft.water_supplies = vec![
        WaterSupply {
            source_id: hydrant,
            quantity: Some(12.5),
        },
        WaterSupply {
            source_id: creek,
            quantity: None,
        },
    ];
    draft.resources = vec![ResourceUsage {
        resource_id: foam,
        quantity: 3,
    }];
    draft.brigades = vec![BrigadeSupport {
        brigade_id: brigade,
        required: true,
    }];
    draft.agency_ids = vec![police];

    let recorded = persistence
        .record_incident(&mut draft, &berlin_policy())
        .unwrap();
    let report = persistence
        .get_incident_report(recorded.id)
        .unwrap()
        .unwrap();

    assert_eq!(report.reporting_agency.as_deref(), Some("ILS Traunstein"));
    assert_eq!(report.fire.extent.as_deref(), Some("Mittelbrand"));
    assert_eq!(report.fire.spread, None);
    let sources: Vec<&str> = report
        .water_supplies
        .iter()
        .map(|line| line.label.as_str())
        .collect();
    assert_eq!(sources, vec!["Bach", "Hydrant"]);
    assert_eq!(report.water_supplies[1].quantity, Some(12.5));
    assert_eq!(report.resources[0].quantity, Some(3.0));
    assert_eq!(report.brigades[0].required, Some(true));
    assert_eq!(report.agencies[0].label, "Polizei");
    assert_eq!(report.keyword.code, "B3");
}

#[test]
fn test_incident_report_includes_party_and_leader() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "THL1", "Ölspur");
    let leader = create_test_member(&mut persistence, "Maier", "Josef");

    let mut draft = incident_starting(keyword_id, datetime!(2025-02-01 10:00 UTC));
    draft.leader_member_id = Some(leader);
    draft.party = Some(InvolvedParty {
        party_type: PartyType::Verursacher,
        name: String::from("Spedition Berger"),
        street: String::from("Industriestraße 4"),
        postal_city: String::from("84453 Mühldorf"),
        phone: String::new(),
        vehicle_plate: String::from("MÜ-AB 123"),
        cost_exempt: false,
        exemption_reason: String::new(),
    });

    let recorded = persistence
        .record_incident(&mut draft, &berlin_policy())
        .unwrap();
    let report = persistence
        .get_incident_report(recorded.id)
        .unwrap()
        .unwrap();

    assert_eq!(report.leader, "Maier, Josef");
    assert_eq!(report.duration_minutes, 120);
    let party = report.party.unwrap();
    assert_eq!(party.party_type, PartyType::Verursacher);
    assert_eq!(party.vehicle_plate, "MÜ-AB 123");
}

#[test]
fn test_deleting_scalar_lookup_clears_reference() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B1", "Kleinbrand");
    let agency = create_lookup(&mut persistence, LookupKind::ReportingAgency, "Privat");

    let mut draft = incident_starting(keyword_id, datetime!(2025-02-01 10:00 UTC));
    draft.reporting_agency_id = Some(agency);
    let recorded = persistence
        .record_incident(&mut draft, &berlin_policy())
        .unwrap();

    persistence
        .delete_lookup_entry(LookupKind::ReportingAgency, agency)
        .unwrap();

    let report = persistence
        .get_incident_report(recorded.id)
        .unwrap()
        .unwrap();
    assert_eq!(report.reporting_agency, None);
}

#[test]
fn test_duplicate_vehicle_usage_is_rejected() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "B1", "Kleinbrand");
    let vehicle_id = create_test_vehicle(&mut persistence, "Florian Mühldorf 40/1");

    let usage = VehicleUsage {
        vehicle_id,
        kilometers: None,
        hours: None,
        required: false,
    };
    let mut draft = incident_starting(keyword_id, datetime!(2025-02-01 10:00 UTC));
    draft.vehicles = vec![usage.clone(), usage];

    let result = persistence.record_incident(&mut draft, &berlin_policy());
    assert!(matches!(result, Err(PersistenceError::Duplicate(_))));

    let page = persistence
        .list_incidents(&crate::EventFilter::default())
        .unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn test_unknown_event_has_no_report() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.get_incident_report(42).unwrap().is_none());
    assert!(persistence.get_duty_report(42).unwrap().is_none());
}

#[test]
fn test_duty_report_lists_usage_and_attendance() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let vehicle_id = create_test_vehicle(&mut persistence, "Florian Mühldorf 40/1");
    let container_id = persistence
        .create_container(&Container {
            container_id: None,
            container_type: String::from("AB-Atemschutz"),
        })
        .unwrap();
    let member_b = create_test_member(&mut persistence, "Bauer", "Lena");
    let member_a = create_test_member(&mut persistence, "Aigner", "Tobias");

    let mut duty = duty_starting("Atemschutzübung", datetime!(2025-10-07 17:00 UTC));
    duty.description = String::from("Innenangriff im Übungshaus");
    duty.vehicles = vec![DutyVehicleUsage {
        vehicle_id,
        kilometers: Some(8),
        hours: Some(3.0),
    }];
    duty.containers = vec![ContainerUsage {
        container_id,
        required: true,
    }];
    duty.attendance = vec![
        Attendance {
            member_id: member_b,
            vehicle_role: String::from("HLF / Atemschutz"),
            agt_minutes: Some(25),
        },
        attend(member_a, "HLF / Maschinist"),
    ];

    let recorded = persistence.record_duty(&mut duty, &berlin_policy()).unwrap();
    let report = persistence.get_duty_report(recorded.id).unwrap().unwrap();

    assert_eq!(report.reference, "001/2025");
    assert_eq!(report.title, "Atemschutzübung");
    assert_eq!(report.duration_minutes, 180);
    assert_eq!(report.vehicles[0].required, None);
    assert!(report.containers[0].required);
    assert_eq!(report.attendance[0].last_name, "Aigner");
    assert_eq!(report.attendance[1].agt_minutes, Some(25));
    assert_eq!(report.filename(), "Dienst_001_2025.pdf");
}

#[test]
fn test_report_carries_the_stored_row_id() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let keyword_id = create_test_keyword(&mut persistence, "THL1", "Ölspur");

    let mut first = incident_starting(keyword_id, datetime!(2025-04-01 08:00 UTC));
    persistence
        .record_incident(&mut first, &berlin_policy())
        .unwrap();
    let mut second = incident_starting(keyword_id, datetime!(2025-04-02 08:00 UTC));
    let incident = persistence
        .record_incident(&mut second, &berlin_policy())
        .unwrap();
    let mut duty = duty_starting("Funkübung", datetime!(2025-04-03 17:00 UTC));
    let duty_recorded = persistence
        .record_duty(&mut duty, &berlin_policy())
        .unwrap();

    let incident_report = persistence
        .get_incident_report(incident.id)
        .unwrap()
        .unwrap();
    let duty_report = persistence
        .get_duty_report(duty_recorded.id)
        .unwrap()
        .unwrap();

    assert_eq!(incident_report.incident_id, incident.id);
    assert_eq!(incident_report.reference, "002/2025");
    assert_eq!(duty_report.duty_id, duty_recorded.id);
}
