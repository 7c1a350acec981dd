// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while rendering a report document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A table row does not have one cell per column.
    #[error("Table '{table}' expects {expected} columns, row has {found}")]
    ColumnMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// Column widths do not fit the printable page width.
    #[error("Table '{table}' is wider than the page")]
    TableTooWide { table: String },

    /// The renderer could not produce a document.
    #[error("Report rendering failed: {0}")]
    Render(String),
}

/// Errors raised while handing a message to a mail transport.
#[derive(Debug, Error)]
pub enum MailError {
    /// The message has no recipients at all.
    #[error("Message has no recipients")]
    NoRecipients,

    /// A sender or recipient address is malformed.
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    /// The spool directory could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The message envelope could not be serialized.
    #[error("Failed to serialize message envelope: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The transport refused the message.
    #[error("Mail transport failed: {0}")]
    Transport(String),
}
