// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Report documents and their distribution by mail.
//!
//! Rendering and mailing happen after an event has been committed. Both
//! are fallible, and callers treat their failures as warnings rather than
//! undoing the stored event.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod distributor;
mod error;
mod mail;
mod pdf;
mod render;

#[cfg(test)]
mod tests;

pub use distributor::ReportDistributor;
pub use error::{MailError, ReportError};
pub use mail::{
    Attachment, ENVELOPE_FILE, LogTransport, MailSettings, MailTransport, OutgoingMail,
    SpoolEnvelope, SpoolTransport, SpooledAttachment, read_envelope,
};
pub use pdf::{PdfDocument, encode_win_ansi, wrap};
pub use render::{PdfReportRenderer, ReportRenderer};
