// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outgoing mail and the transports that carry it.
//!
//! SMTP delivery is not done in-process. [`LogTransport`] only records the
//! message in the log; [`SpoolTransport`] writes it to an outbox directory
//! that an external relay picks up.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use eidiv_domain::{safe_filename, to_rfc3339, validate_email};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::MailError;

/// File name of the envelope inside a spooled message directory.
pub const ENVELOPE_FILE: &str = "message.json";

static SPOOL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sender identity and addressing policy for outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailSettings {
    pub from: String,
    /// Prepended to every subject.
    pub subject_prefix: String,
    /// Address recipients via BCC instead of To.
    pub use_bcc: bool,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            from: String::from("eidiv@feuerwehr.local"),
            subject_prefix: String::from("[EiDiV] "),
            use_bcc: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn pdf(filename: &str, data: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: String::from("application/pdf"),
            data,
        }
    }
}

/// A composed message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl OutgoingMail {
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.bcc.len()
    }

    /// Checks that the message can be handed to a transport.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no recipients or an address is malformed.
    pub fn check(&self) -> Result<(), MailError> {
        if self.recipient_count() == 0 {
            return Err(MailError::NoRecipients);
        }
        for address in std::iter::once(&self.from).chain(&self.to).chain(&self.bcc) {
            validate_email(address).map_err(|_| MailError::InvalidAddress(address.clone()))?;
        }
        Ok(())
    }
}

/// Delivers composed messages.
pub trait MailTransport: Send + Sync {
    /// Hands `mail` over for delivery and returns the number of messages
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is rejected or cannot be stored.
    fn send(&self, mail: &OutgoingMail) -> Result<usize, MailError>;
}

/// Logs messages instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn send(&self, mail: &OutgoingMail) -> Result<usize, MailError> {
        mail.check()?;

        let attachments: Vec<&str> = mail
            .attachments
            .iter()
            .map(|a| a.filename.as_str())
            .collect();
        info!(
            subject = %mail.subject,
            recipients = mail.recipient_count(),
            ?attachments,
            "Mail not delivered (log transport)"
        );
        debug!("Mail body: {}", mail.body);
        Ok(1)
    }
}

/// Attachment metadata as written to the spool envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpooledAttachment {
    /// File name inside the message directory.
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

/// The JSON envelope of a spooled message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoolEnvelope {
    pub id: String,
    pub queued_at: String,
    pub from: String,
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<SpooledAttachment>,
}

/// Writes each message into its own directory below an outbox.
///
/// A message directory holds [`ENVELOPE_FILE`] and one file per
/// attachment. It is assembled under a hidden name and renamed into place
/// once complete, so a relay never sees a partial message.
#[derive(Debug, Clone)]
pub struct SpoolTransport {
    dir: PathBuf,
}

impl SpoolTransport {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_id(now: OffsetDateTime) -> String {
        let counter: u64 = SPOOL_COUNTER.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}-{}-{counter:04}",
            now.unix_timestamp_nanos(),
            std::process::id()
        )
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MailError + '_ {
    move |source| MailError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl MailTransport for SpoolTransport {
    fn send(&self, mail: &OutgoingMail) -> Result<usize, MailError> {
        mail.check()?;

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let id: String = Self::next_id(now);
        let staging: PathBuf = self.dir.join(format!(".{id}.tmp"));
        let target: PathBuf = self.dir.join(&id);

        fs::create_dir_all(&staging).map_err(io_error(&staging))?;

        let mut spooled: Vec<SpooledAttachment> = Vec::with_capacity(mail.attachments.len());
        for attachment in &mail.attachments {
            let filename: String = safe_filename(&attachment.filename);
            let path: PathBuf = staging.join(&filename);
            fs::write(&path, &attachment.data).map_err(io_error(&path))?;
            spooled.push(SpooledAttachment {
                filename,
                content_type: attachment.content_type.clone(),
                size: attachment.data.len(),
            });
        }

        let envelope = SpoolEnvelope {
            id: id.clone(),
            queued_at: to_rfc3339(now).map_err(|e| MailError::Transport(e.to_string()))?,
            from: mail.from.clone(),
            to: mail.to.clone(),
            bcc: mail.bcc.clone(),
            subject: mail.subject.clone(),
            body: mail.body.clone(),
            attachments: spooled,
        };
        let envelope_path: PathBuf = staging.join(ENVELOPE_FILE);
        fs::write(&envelope_path, serde_json::to_vec_pretty(&envelope)?)
            .map_err(io_error(&envelope_path))?;

        fs::rename(&staging, &target).map_err(io_error(&target))?;

        info!(
            id = %id,
            recipients = mail.recipient_count(),
            "Spooled mail '{}'",
            mail.subject
        );
        Ok(1)
    }
}

/// Reads the envelope of a spooled message directory.
///
/// # Errors
///
/// Returns an error if the envelope is missing or malformed.
pub fn read_envelope(message_dir: &Path) -> Result<SpoolEnvelope, MailError> {
    let path: PathBuf = message_dir.join(ENVELOPE_FILE);
    let bytes: Vec<u8> = fs::read(&path).map_err(io_error(&path))?;
    Ok(serde_json::from_slice(&bytes)?)
}
