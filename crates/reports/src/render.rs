// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Report rendering.

use chrono_tz::Tz;
use eidiv_domain::{
    AssistanceLabels, AttendeeLine, ContainerLine, DutyReport, IncidentReport, InvolvedParty,
    LookupLine, TrailerLine, VehicleLine, format_local,
};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::ReportError;
use crate::pdf::{EMPTY_VALUE, PdfDocument};

/// Turns event projections into printable documents.
pub trait ReportRenderer: Send + Sync {
    /// Renders the report of a stored incident.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be produced.
    fn render_incident(&self, report: &IncidentReport) -> Result<Vec<u8>, ReportError>;

    /// Renders the report of a stored duty session.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be produced.
    fn render_duty(&self, report: &DutyReport) -> Result<Vec<u8>, ReportError>;
}

/// Renders A4 PDF reports.
///
/// Times are printed in the department time zone.
#[derive(Debug, Clone)]
pub struct PdfReportRenderer {
    department: String,
    timezone: Tz,
}

impl PdfReportRenderer {
    #[must_use]
    pub fn new(department: &str, timezone: Tz) -> Self {
        Self {
            department: department.to_string(),
            timezone,
        }
    }

    fn local(&self, instant: OffsetDateTime) -> String {
        format_local(instant, self.timezone)
    }

    fn footer(&self, reference: &str, kind: &str) -> String {
        format!("{} - {kind} {reference}", self.department)
    }

    /// A one-page document used to check mail delivery.
    #[must_use]
    pub fn render_test_page(&self, now: OffsetDateTime) -> Vec<u8> {
        let mut document = PdfDocument::new("EiDiV Testdokument", &self.department);
        document.title("EiDiV Testdokument");
        document.line(&self.department);
        document.section("Zustellung");
        document.field("Erstellt", &self.local(now));
        document.paragraph(
            "Dieses Dokument wurde zur Prüfung des Mailversands erzeugt und kann gelöscht werden.",
        );
        document.finish()
    }

    fn vehicle_table(
        document: &mut PdfDocument,
        vehicles: &[VehicleLine],
        with_required: bool,
    ) -> Result<(), ReportError> {
        document.section("Fahrzeuge");
        if with_required {
            let rows: Vec<Vec<String>> = vehicles
                .iter()
                .map(|v| {
                    vec![
                        v.call_sign.clone(),
                        v.vehicle_type.clone(),
                        optional(v.kilometers),
                        hours(v.hours),
                        yes_no(v.required.unwrap_or(false)).to_string(),
                    ]
                })
                .collect();
            document.table(
                "Fahrzeuge",
                &["Funkrufname", "Typ", "km", "Stunden", "erforderlich"],
                &[0.32, 0.2, 0.14, 0.16, 0.18],
                &rows,
            )
        } else {
            let rows: Vec<Vec<String>> = vehicles
                .iter()
                .map(|v| {
                    vec![
                        v.call_sign.clone(),
                        v.vehicle_type.clone(),
                        optional(v.kilometers),
                        hours(v.hours),
                    ]
                })
                .collect();
            document.table(
                "Fahrzeuge",
                &["Funkrufname", "Typ", "km", "Stunden"],
                &[0.4, 0.24, 0.16, 0.2],
                &rows,
            )
        }
    }

    fn container_table(
        document: &mut PdfDocument,
        containers: &[ContainerLine],
    ) -> Result<(), ReportError> {
        document.section("Abrollbehälter");
        let rows: Vec<Vec<String>> = containers
            .iter()
            .map(|c| vec![c.container_type.clone(), yes_no(c.required).to_string()])
            .collect();
        document.table("Abrollbehälter", &["Typ", "erforderlich"], &[0.7, 0.3], &rows)
    }

    fn trailer_table(
        document: &mut PdfDocument,
        trailers: &[TrailerLine],
        with_required: bool,
    ) -> Result<(), ReportError> {
        document.section("Anhänger");
        let rows: Vec<Vec<String>> = trailers
            .iter()
            .map(|t| {
                let mut row = vec![
                    t.trailer_type.clone(),
                    t.registration.clone(),
                    optional(t.kilometers),
                    hours(t.hours),
                ];
                if with_required {
                    row.push(yes_no(t.required.unwrap_or(false)).to_string());
                }
                row
            })
            .collect();

        if with_required {
            document.table(
                "Anhänger",
                &["Typ", "Kennzeichen", "km", "Stunden", "erforderlich"],
                &[0.3, 0.22, 0.14, 0.16, 0.18],
                &rows,
            )
        } else {
            document.table(
                "Anhänger",
                &["Typ", "Kennzeichen", "km", "Stunden"],
                &[0.36, 0.28, 0.16, 0.2],
                &rows,
            )
        }
    }

    fn attendance_table(
        document: &mut PdfDocument,
        attendance: &[AttendeeLine],
    ) -> Result<(), ReportError> {
        document.section(&format!("Teilnehmer ({})", attendance.len()));
        let rows: Vec<Vec<String>> = attendance
            .iter()
            .map(|a| {
                vec![
                    format!("{}, {}", a.last_name, a.first_name),
                    a.vehicle_role.clone(),
                    optional(a.agt_minutes),
                ]
            })
            .collect();
        document.table(
            "Teilnehmer",
            &["Name", "Fahrzeug / Funktion", "AGT (min)"],
            &[0.4, 0.42, 0.18],
            &rows,
        )
    }

    /// Fire and technical-assistance details, printed only when recorded.
    fn classification_sections(document: &mut PdfDocument, report: &IncidentReport) {
        let fire = &report.fire;
        if fire.extent.is_some()
            || fire.spread.is_some()
            || fire.material.is_some()
            || fire.object.is_some()
        {
            document.section("Brand");
            document.field("Brandumfang", fire.extent.as_deref().unwrap_or_default());
            document.field("Ausbreitung", fire.spread.as_deref().unwrap_or_default());
            document.field("Brandgut", fire.material.as_deref().unwrap_or_default());
            document.field("Brandobjekt", fire.object.as_deref().unwrap_or_default());
        }

        let assistance = &report.assistance;
        if assistance != &AssistanceLabels::default() {
            document.section("Technische Hilfeleistung");
            document.field(
                "Schadensereignis",
                assistance.damage_event.as_deref().unwrap_or_default(),
            );
            document.field(
                "Personenrettung",
                assistance.rescue_type.as_deref().unwrap_or_default(),
            );
            document.field("Gerettete Personen", &optional(assistance.rescued_count));
            document.field(
                "Sicherheitswache",
                assistance.standby.as_deref().unwrap_or_default(),
            );
            document.field(
                "Fehlalarm",
                assistance.false_alarm.as_deref().unwrap_or_default(),
            );
            document.field("Sonstiges", assistance.other.as_deref().unwrap_or_default());
        }
    }

    fn party_section(document: &mut PdfDocument, party: &InvolvedParty) {
        document.section("Beteiligte Person");
        document.field("Art", party.party_type.label());
        document.field("Name", &party.name);
        document.field("Straße", &party.street);
        document.field("PLZ / Ort", &party.postal_city);
        document.field("Telefon", &party.phone);
        document.field("Kennzeichen", &party.vehicle_plate);
        let exemption: String = if party.cost_exempt {
            format!("ja: {}", party.exemption_reason)
        } else {
            String::from("nein")
        };
        document.field("Kostenbefreit", &exemption);
    }

    fn label_table(
        document: &mut PdfDocument,
        heading: &str,
        lines: &[LookupLine],
    ) -> Result<(), ReportError> {
        if lines.is_empty() {
            return Ok(());
        }
        document.section(heading);
        let rows: Vec<Vec<String>> = lines.iter().map(|line| vec![line.label.clone()]).collect();
        document.table(heading, &[heading], &[1.0], &rows)
    }

    fn label_value_table(
        document: &mut PdfDocument,
        heading: &str,
        lines: &[LookupLine],
        column: &str,
        value: impl Fn(&LookupLine) -> String,
    ) -> Result<(), ReportError> {
        if lines.is_empty() {
            return Ok(());
        }
        document.section(heading);
        let rows: Vec<Vec<String>> = lines
            .iter()
            .map(|line| vec![line.label.clone(), value(line)])
            .collect();
        document.table(heading, &[heading, column], &[0.7, 0.3], &rows)
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn render_incident(&self, report: &IncidentReport) -> Result<Vec<u8>, ReportError> {
        debug!("Rendering incident report {}", report.reference);

        let title: String = format!("Einsatzliste {}", report.reference);
        let mut document = PdfDocument::new(&title, &self.footer(&report.reference, "Einsatz"));
        document.title(&title);
        document.line(&self.department);

        document.section("Einsatz");
        document.field(
            "Stichwort",
            &format!(
                "{} - {} ({})",
                report.keyword.code,
                report.keyword.label,
                report.keyword.category.label()
            ),
        );
        document.field("Beginn", &self.local(report.start_at));
        document.field("Ende", &self.local(report.end_at));
        document.field(
            "Dauer",
            &format!(
                "{} min ({} h)",
                report.duration_minutes,
                decimal(report.duration_hours())
            ),
        );
        document.field("Einsatzleiter", &report.leader);
        document.field(
            "Meldende Stelle",
            report.reporting_agency.as_deref().unwrap_or_default(),
        );

        document.section("Einsatzort");
        let location = &report.location;
        document.field("Objekt", &location.object_name);
        document.field("Straße / Hausnr.", &location.street);
        document.field("PLZ / Ort", &location.postal_city);
        document.field("Gemeinde", &location.municipality);
        document.field("Landkreis", &location.district);

        Self::classification_sections(&mut document, report);

        document.section("Maßnahmen");
        document.paragraph(&report.measures);

        if let Some(party) = &report.party {
            Self::party_section(&mut document, party);
        }

        Self::vehicle_table(&mut document, &report.vehicles, true)?;
        if !report.containers.is_empty() {
            Self::container_table(&mut document, &report.containers)?;
        }
        if !report.trailers.is_empty() {
            Self::trailer_table(&mut document, &report.trailers, true)?;
        }
        Self::label_value_table(
            &mut document,
            "Löschwasser",
            &report.water_supplies,
            "Menge (m³)",
            water_quantity,
        )?;
        Self::label_value_table(
            &mut document,
            "Einsatzmittel",
            &report.resources,
            "Anzahl",
            resource_count,
        )?;
        Self::label_value_table(
            &mut document,
            "Ortsfeuerwehren",
            &report.brigades,
            "erforderlich",
            brigade_required,
        )?;
        Self::label_table(&mut document, "Zusatzstellen", &report.agencies)?;
        Self::attendance_table(&mut document, &report.attendance)?;

        document.section("Erfassung");
        document.field("Erfasst am", &self.local(report.created_at));

        Ok(document.finish())
    }

    fn render_duty(&self, report: &DutyReport) -> Result<Vec<u8>, ReportError> {
        debug!("Rendering duty report {}", report.reference);

        let title: String = format!("Dienstliste {}", report.reference);
        let mut document = PdfDocument::new(&title, &self.footer(&report.reference, "Dienst"));
        document.title(&title);
        document.line(&self.department);

        document.section("Dienst");
        document.field("Thema", &report.title);
        document.field("Beginn", &self.local(report.start_at));
        document.field("Ende", &self.local(report.end_at));
        document.field(
            "Dauer",
            &format!(
                "{} min ({} h)",
                report.duration_minutes,
                decimal(report.duration_hours())
            ),
        );

        document.section("Beschreibung");
        document.paragraph(&report.description);

        Self::vehicle_table(&mut document, &report.vehicles, false)?;
        if !report.containers.is_empty() {
            Self::container_table(&mut document, &report.containers)?;
        }
        if !report.trailers.is_empty() {
            Self::trailer_table(&mut document, &report.trailers, false)?;
        }
        Self::attendance_table(&mut document, &report.attendance)?;

        document.section("Erfassung");
        document.field("Erfasst am", &self.local(report.created_at));

        Ok(document.finish())
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value { "ja" } else { "nein" }
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| String::from(EMPTY_VALUE), |v| v.to_string())
}

fn hours(value: Option<f64>) -> String {
    value.map_or_else(|| String::from(EMPTY_VALUE), decimal)
}

/// Two decimals with a decimal comma, e.g. `1,50`.
fn decimal(value: f64) -> String {
    format!("{value:.2}").replace('.', ",")
}

fn water_quantity(line: &LookupLine) -> String {
    line.quantity
        .map_or_else(|| String::from(EMPTY_VALUE), decimal)
}

/// Resource counts are whole numbers.
fn resource_count(line: &LookupLine) -> String {
    line.quantity
        .map_or_else(|| String::from(EMPTY_VALUE), |count| format!("{count:.0}"))
}

fn brigade_required(line: &LookupLine) -> String {
    yes_no(line.required.unwrap_or(false)).to_string()
}
