// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use eidiv_domain::{DomainError, ValidationErrors};
use eidiv_persistence::PersistenceError;
use serde::Serialize;

use crate::password_policy::PasswordPolicyError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// One rejected input field of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMessage {
    /// Path of the field, e.g. `attendance[1].agt_minutes`.
    pub field: String,
    pub message: String,
}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A submission was rejected before anything was stored.
    ValidationFailed {
        /// Every rejected field, in input order.
        fields: Vec<FieldMessage>,
    },
    /// A domain or integrity rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::ValidationFailed { fields } => {
                let messages: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{}: {}", f.field, f.message))
                    .collect();
                write!(f, "Validation failed: {}", messages.join("; "))
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        translate_validation_errors(&errors)
    }
}

/// Collects field errors into a single `ValidationFailed`.
#[must_use]
pub fn translate_validation_errors(errors: &ValidationErrors) -> ApiError {
    ApiError::ValidationFailed {
        fields: errors
            .errors()
            .iter()
            .map(|e| FieldMessage {
                field: e.field.clone(),
                message: e.error.to_string(),
            })
            .collect(),
    }
}

/// Translates a domain error into an API error.
///
/// Errors raised by a single value (a path segment, a query parameter) end
/// up here; whole submissions are reported through
/// [`translate_validation_errors`].
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::EndNotAfterStart => ApiError::InvalidInput {
            field: String::from("end_at"),
            message,
        },
        DomainError::MissingLeader => ApiError::InvalidInput {
            field: String::from("leader_text"),
            message,
        },
        DomainError::NegativeValue(what) | DomainError::EmptyField(what) => {
            ApiError::InvalidInput {
                field: what.to_lowercase().replace(' ', "_"),
                message,
            }
        }
        DomainError::AgtMinutesNotAllowed { .. } => ApiError::InvalidInput {
            field: String::from("agt_minutes"),
            message,
        },
        DomainError::MissingExemptionReason => ApiError::InvalidInput {
            field: String::from("party.exemption_reason"),
            message,
        },
        DomainError::InvalidEmail(_) => ApiError::InvalidInput {
            field: String::from("email"),
            message,
        },
        DomainError::InvalidTimestamp(_) => ApiError::InvalidInput {
            field: String::from("timestamp"),
            message,
        },
        DomainError::UnknownKeywordCategory(_) => ApiError::InvalidInput {
            field: String::from("category"),
            message,
        },
        DomainError::UnknownPartyType(_) => ApiError::InvalidInput {
            field: String::from("party.party_type"),
            message,
        },
        DomainError::UnknownReference { entity, .. } => ApiError::ResourceNotFound {
            resource_type: capitalize(entity),
            message,
        },
        DomainError::UnknownLookupKind(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Lookup kind"),
            message,
        },
        DomainError::WrongLookupKind { .. } => ApiError::DomainRuleViolation {
            rule: String::from("lookup_kind"),
            message,
        },
        DomainError::InactiveKeyword(_) => ApiError::DomainRuleViolation {
            rule: String::from("active_keyword"),
            message,
        },
        DomainError::InvalidEventNumber(_) => ApiError::DomainRuleViolation {
            rule: String::from("event_number"),
            message,
        },
        DomainError::UnknownTimezone(_) => ApiError::Internal { message },
    }
}

/// Translates a persistence error into an API error.
///
/// Integrity violations carry a generic message; the database text stays
/// out of responses.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Referenced { entity, id } => ApiError::DomainRuleViolation {
            rule: String::from("in_use"),
            message: format!("The {entity} {id} is still in use and cannot be deleted"),
        },
        PersistenceError::Duplicate(_) => ApiError::DomainRuleViolation {
            rule: String::from("unique"),
            message: String::from("An entry with the same values already exists"),
        },
        PersistenceError::ForeignKeyViolation(_) => ApiError::DomainRuleViolation {
            rule: String::from("foreign_key"),
            message: String::from("The change conflicts with related records"),
        },
        PersistenceError::NotFound { entity, key } => ApiError::ResourceNotFound {
            resource_type: capitalize(entity),
            message: format!("The {entity} {key} does not exist"),
        },
        PersistenceError::SessionNotFound(reason) => ApiError::AuthenticationFailed { reason },
        PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::SerializationError(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled
        | PersistenceError::InvalidData(_)
        | PersistenceError::Other(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

fn capitalize(entity: &str) -> String {
    let mut chars = entity.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect::<String>().replace('_', " ")
    })
}
