// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for authenticated routes.
//!
//! Every route except `/auth/login` and `/health` takes a
//! [`SessionOperator`], so a request without a valid bearer token never
//! reaches its handler.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use eidiv_api::{AuthenticatedActor, AuthenticationService};
use eidiv_persistence::OperatorData;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::app::{AppState, ErrorResponse};

/// Extractor for authenticated operators.
///
/// ```ignore
/// async fn my_handler(
///     SessionOperator { actor, .. }: SessionOperator,
/// ) -> Result<Json<Response>, HttpError> {
///     ...
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if:
/// - The Authorization header is missing or not `Bearer <token>`
/// - The token is unknown or its session expired
/// - The operator has been disabled
pub struct SessionOperator {
    pub actor: AuthenticatedActor,
    pub operator: OperatorData,
    /// The bearer token, needed to end the session.
    pub token: String,
}

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header does not carry a bearer token");
                SessionError::InvalidAuthorizationHeader
            })?;

        let mut persistence = state.persistence.lock().await;
        let (actor, operator) = AuthenticationService::validate_session(
            &mut persistence,
            token,
            OffsetDateTime::now_utc(),
        )
        .map_err(|e| {
            warn!(error = %e, "Session validation failed");
            SessionError::InvalidSession(e.to_string())
        })?;
        drop(persistence);

        debug!(
            login_name = %operator.login_name,
            role = %actor.role,
            "Session validated"
        );

        Ok(Self {
            actor,
            operator,
            token: token.to_string(),
        })
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    MissingAuthorizationHeader,
    InvalidAuthorizationHeader,
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: true,
                message,
                fields: Vec::new(),
            }),
        )
            .into_response()
    }
}
