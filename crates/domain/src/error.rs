// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::LookupKind;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The end of an event is not after its start.
    EndNotAfterStart,
    /// An incident names neither a leading member nor a free-text leader.
    MissingLeader,
    /// A count, duration or distance is negative.
    NegativeValue(&'static str),
    /// AGT minutes were recorded for a member without the AGT qualification.
    AgtMinutesNotAllowed {
        /// The member the minutes were recorded for.
        member_id: i64,
    },
    /// A cost exemption was granted without a written reason.
    MissingExemptionReason,
    /// A required text field is empty.
    EmptyField(&'static str),
    /// An email address is malformed.
    InvalidEmail(String),
    /// A referenced record does not exist.
    UnknownReference {
        /// The kind of record that was referenced.
        entity: &'static str,
        /// The referenced identifier.
        id: i64,
    },
    /// A lookup entry of the wrong kind was referenced.
    WrongLookupKind {
        /// The kind the field requires.
        expected: LookupKind,
        /// The kind of the referenced entry.
        actual: LookupKind,
    },
    /// A keyword is inactive and cannot be used for new incidents.
    InactiveKeyword(i64),
    /// An event sequence number or year is outside its valid range.
    InvalidEventNumber(String),
    /// A timestamp could not be parsed or converted.
    InvalidTimestamp(String),
    /// A lookup kind identifier is unknown.
    UnknownLookupKind(String),
    /// A keyword category identifier is unknown.
    UnknownKeywordCategory(String),
    /// An involved-party type identifier is unknown.
    UnknownPartyType(String),
    /// A time zone name is unknown.
    UnknownTimezone(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndNotAfterStart => write!(f, "End time must be after the start time"),
            Self::MissingLeader => {
                write!(f, "Either a leading member or a leader name is required")
            }
            Self::NegativeValue(what) => write!(f, "{what} must not be negative"),
            Self::AgtMinutesNotAllowed { member_id } => write!(
                f,
                "AGT minutes are only allowed for AGT-qualified members (member {member_id})"
            ),
            Self::MissingExemptionReason => {
                write!(f, "A reason is required when costs are exempted")
            }
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: {email}"),
            Self::UnknownReference { entity, id } => write!(f, "Unknown {entity}: {id}"),
            Self::WrongLookupKind { expected, actual } => write!(
                f,
                "Expected a {} entry, got a {} entry",
                expected.as_str(),
                actual.as_str()
            ),
            Self::InactiveKeyword(id) => write!(f, "Keyword {id} is not active"),
            Self::InvalidEventNumber(msg) => write!(f, "Invalid event number: {msg}"),
            Self::InvalidTimestamp(msg) => write!(f, "Invalid timestamp: {msg}"),
            Self::UnknownLookupKind(kind) => write!(f, "Unknown lookup kind: {kind}"),
            Self::UnknownKeywordCategory(category) => {
                write!(f, "Unknown keyword category: {category}")
            }
            Self::UnknownPartyType(party) => write!(f, "Unknown party type: {party}"),
            Self::UnknownTimezone(tz) => write!(f, "Unknown time zone: {tz}"),
        }
    }
}

impl std::error::Error for DomainError {}

/// A validation failure attached to the input field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field, e.g. `attendance[2].agt_minutes`.
    pub field: String,
    /// The rule that was violated.
    pub error: DomainError,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, error: DomainError) -> Self {
        Self {
            field: field.into(),
            error,
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

/// All field errors collected while validating one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a failure for `field`.
    pub fn push(&mut self, field: impl Into<String>, error: DomainError) {
        self.0.push(FieldError::new(field, error));
    }

    /// Records the failure of `result`, if any, for `field`.
    pub fn check(&mut self, field: impl Into<String>, result: Result<(), DomainError>) {
        if let Err(error) = result {
            self.push(field, error);
        }
    }

    /// Appends every error of `other`.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one field error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}
