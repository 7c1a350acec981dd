// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mailing of rendered reports to the distribution list.

use std::sync::Arc;

use eidiv_domain::{EventKind, EventNumber, report_filename};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::info;

use crate::error::MailError;
use crate::mail::{Attachment, MailSettings, MailTransport, OutgoingMail};

/// Composes report mails and hands them to a transport.
#[derive(Clone)]
pub struct ReportDistributor {
    transport: Arc<dyn MailTransport>,
    settings: MailSettings,
}

impl std::fmt::Debug for ReportDistributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportDistributor")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ReportDistributor {
    #[must_use]
    pub fn new(transport: Arc<dyn MailTransport>, settings: MailSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &MailSettings {
        &self.settings
    }

    /// The subject with the configured prefix applied.
    #[must_use]
    pub fn subject(&self, subject: &str) -> String {
        format!("{}{subject}", self.settings.subject_prefix)
            .trim()
            .to_string()
    }

    /// Builds a message to `recipients`, honouring the BCC setting.
    #[must_use]
    pub fn compose(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
        attachments: Vec<Attachment>,
    ) -> OutgoingMail {
        let (to, bcc): (Vec<String>, Vec<String>) = if self.settings.use_bcc {
            (Vec::new(), recipients.to_vec())
        } else {
            (recipients.to_vec(), Vec::new())
        };
        OutgoingMail {
            from: self.settings.from.clone(),
            to,
            bcc,
            subject: self.subject(subject),
            body: body.to_string(),
            attachments,
        }
    }

    /// Mails the report of a newly recorded event.
    ///
    /// Returns the number of messages sent, 0 when no recipient is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub fn distribute(
        &self,
        kind: EventKind,
        number: EventNumber,
        pdf: Vec<u8>,
        recipients: &[String],
    ) -> Result<usize, MailError> {
        if recipients.is_empty() {
            info!("No active recipients, report {} not mailed", number);
            return Ok(0);
        }

        let list: String = format!("{}liste", kind.label());
        let mail: OutgoingMail = self.compose(
            recipients,
            &format!("Neue {list} eingegangen"),
            &format!("Automatische Nachricht: Eine neue {list} wurde erfasst."),
            vec![Attachment::pdf(&report_filename(kind, number), pdf)],
        );

        let sent: usize = self.transport.send(&mail)?;
        info!(
            "Report {} sent to {} recipients",
            number,
            recipients.len()
        );
        Ok(sent)
    }

    /// Sends a test message, optionally with a PDF attachment.
    ///
    /// Returns the number of messages sent, 0 when no recipient is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub fn send_test(
        &self,
        recipients: &[String],
        now: OffsetDateTime,
        pdf: Option<Vec<u8>>,
    ) -> Result<usize, MailError> {
        if recipients.is_empty() {
            return Ok(0);
        }

        let stamp: String = now
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
            .map_err(|e| MailError::Transport(e.to_string()))?;
        let body: String = format!(
            "Dies ist eine Test-E-Mail aus EiDiV ({stamp}). Empfängeranzahl: {}",
            recipients.len()
        );
        let attachments: Vec<Attachment> = pdf
            .map(|data| vec![Attachment::pdf("test.pdf", data)])
            .unwrap_or_default();

        let mail: OutgoingMail = self.compose(recipients, "EiDiV Test-E-Mail", &body, attachments);
        self.transport.send(&mail)
    }
}
