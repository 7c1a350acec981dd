// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rendering and mailing of committed events.
//!
//! Nothing here touches the database. Callers load the report and the
//! recipient list first, release the connection, and then deliver.

use std::sync::Arc;

use eidiv_domain::{DutyReport, EventKind, EventNumber, IncidentReport};
use eidiv_reports::{ReportDistributor, ReportError, ReportRenderer};
use tracing::{info, warn};

use crate::error::ApiError;

/// Renders reports and mails them to the distribution list.
#[derive(Clone)]
pub struct ReportDelivery {
    renderer: Arc<dyn ReportRenderer>,
    distributor: ReportDistributor,
}

impl std::fmt::Debug for ReportDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportDelivery")
            .field("distributor", &self.distributor)
            .finish_non_exhaustive()
    }
}

impl ReportDelivery {
    #[must_use]
    pub fn new(renderer: Arc<dyn ReportRenderer>, distributor: ReportDistributor) -> Self {
        Self {
            renderer,
            distributor,
        }
    }

    #[must_use]
    pub const fn distributor(&self) -> &ReportDistributor {
        &self.distributor
    }

    /// Renders and mails the report of a stored incident.
    ///
    /// Returns one warning per failed step; an empty list means the report
    /// went out (or there was nobody to send it to).
    #[must_use]
    pub fn deliver_incident(&self, report: &IncidentReport, recipients: &[String]) -> Vec<String> {
        self.deliver(
            EventKind::Incident,
            report.number,
            self.renderer.render_incident(report),
            recipients,
        )
    }

    /// Renders and mails the report of a stored duty.
    #[must_use]
    pub fn deliver_duty(&self, report: &DutyReport, recipients: &[String]) -> Vec<String> {
        self.deliver(
            EventKind::Duty,
            report.number,
            self.renderer.render_duty(report),
            recipients,
        )
    }

    /// # Errors
    ///
    /// Returns an internal error if the document cannot be rendered.
    pub fn incident_pdf(&self, report: &IncidentReport) -> Result<Vec<u8>, ApiError> {
        self.renderer
            .render_incident(report)
            .map_err(|e| render_failed(report.number, &e))
    }

    /// # Errors
    ///
    /// Returns an internal error if the document cannot be rendered.
    pub fn duty_pdf(&self, report: &DutyReport) -> Result<Vec<u8>, ApiError> {
        self.renderer
            .render_duty(report)
            .map_err(|e| render_failed(report.number, &e))
    }

    fn deliver(
        &self,
        kind: EventKind,
        number: EventNumber,
        rendered: Result<Vec<u8>, ReportError>,
        recipients: &[String],
    ) -> Vec<String> {
        let pdf: Vec<u8> = match rendered {
            Ok(pdf) => pdf,
            Err(e) => {
                warn!(%number, error = %e, "Report could not be rendered");
                return vec![format!("Report {number} could not be rendered: {e}")];
            }
        };

        match self.distributor.distribute(kind, number, pdf, recipients) {
            Ok(sent) => {
                info!(%number, sent, "Report delivery finished");
                Vec::new()
            }
            Err(e) => {
                warn!(%number, error = %e, "Report could not be mailed");
                vec![format!("Report {number} could not be mailed: {e}")]
            }
        }
    }
}

fn render_failed(number: EventNumber, err: &ReportError) -> ApiError {
    ApiError::Internal {
        message: format!("Report {number} could not be rendered: {err}"),
    }
}
