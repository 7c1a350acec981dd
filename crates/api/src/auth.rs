// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use eidiv_persistence::{OperatorData, Persistence, PersistenceError, SessionData};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::error::AuthError;

/// Operator roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Maintains master data, the distribution list and operators.
    Admin,
    /// Records incidents and duties.
    Recorder,
}

impl Role {
    /// Parses a role from its stored name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not `Admin` or `Recorder`.
    pub fn parse(role: &str) -> Result<Self, AuthError> {
        match role {
            "Admin" => Ok(Self::Admin),
            "Recorder" => Ok(Self::Recorder),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {role}"),
            }),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Recorder => "Recorder",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated operator with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    pub operator_id: i64,
    /// The normalized (uppercase) login name.
    pub login_name: String,
    pub role: Role,
}

impl AuthenticatedActor {
    #[must_use]
    pub const fn new(operator_id: i64, login_name: String, role: Role) -> Self {
        Self {
            operator_id,
            login_name,
            role,
        }
    }

    fn from_operator(operator: &OperatorData) -> Result<Self, AuthError> {
        Ok(Self::new(
            operator.operator_id,
            operator.login_name.clone(),
            Role::parse(&operator.role)?,
        ))
    }
}

/// Authorization service for enforcing role-based access control.
///
/// Every active operator may read and record events. Master data, the
/// distribution list and operator accounts are restricted to admins.
pub struct AuthorizationService;

impl AuthorizationService {
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_master_data(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_master_data")
    }

    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_recipients(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_recipients")
    }

    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_operators(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_operators")
    }

    /// Both roles may record events.
    ///
    /// # Errors
    ///
    /// Never fails for a validated actor; kept so handlers read uniformly.
    pub const fn authorize_record_event(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Recorder => Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from("Admin"),
            }),
        }
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Sessions stay valid for 30 days.
    pub const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Verifies the credentials of an operator and opens a session.
    ///
    /// Unknown logins and wrong passwords produce the same reason.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `operator_data`,
    /// `expires_at`)
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub fn login(
        persistence: &mut Persistence,
        login_name: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(String, AuthenticatedActor, OperatorData, OffsetDateTime), AuthError> {
        let invalid = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid login name or password"),
        };

        let operator: OperatorData = persistence
            .get_operator_by_login(login_name)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(invalid)?;

        let password_valid: bool =
            Persistence::verify_password(password, &operator.password_hash)
                .map_err(Self::map_persistence_error)?;
        if !password_valid {
            debug!(login_name = %operator.login_name, "Password mismatch");
            return Err(invalid());
        }

        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;
        let session_token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime = now + Self::DEFAULT_SESSION_EXPIRATION;

        persistence
            .create_session(&session_token, operator.operator_id, expires_at)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;
        persistence
            .update_last_login(operator.operator_id)
            .map_err(Self::map_persistence_error)?;

        info!(login_name = %operator.login_name, "Operator logged in");
        Ok((session_token, actor, operator, expires_at))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or if its
    /// operator has been disabled.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<(AuthenticatedActor, OperatorData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(&session.expires_at, &Rfc3339)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })?;
        if now >= expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let operator: OperatorData = persistence
            .get_operator_by_id(session.operator_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Operator not found"),
            })?;

        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        Ok((actor, operator))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })
    }

    /// 256 random bits, hex encoded.
    fn generate_session_token() -> String {
        (0..4)
            .map(|_| format!("{:016x}", rand::random::<u64>()))
            .collect()
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionNotFound(msg) => {
                AuthError::AuthenticationFailed { reason: msg }
            }
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}
