// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP surface of the records service.
//!
//! Handlers lock the persistence layer only for the database work. Report
//! rendering and mailing run afterwards on the blocking pool, so a slow
//! mail relay never holds the connection.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use eidiv_api::{
    AgtResponse, ApiError, ContainerRequest, ContainersResponse, CreateOperatorRequest,
    CreatedResponse, DutyRequest, EventListQuery, FieldMessage, IncidentRequest,
    KeywordCategoryResponse, KeywordRequest, KeywordsResponse, ListOperatorsResponse,
    LoginRequest, LoginResponse, LookupEntriesResponse, LookupEntryRequest, MemberRequest,
    MembersResponse, RecipientRequest, RecipientsResponse, RecordedDuty, RecordedIncident,
    RecordingSettings, ReportDelivery, SubmissionResponse, TrailerRequest, TrailersResponse,
    VehicleRequest, VehiclesResponse, WhoAmIResponse,
};
use eidiv_domain::{
    DutyReport, DutySummary, EventKind, EventNumber, IncidentReport, IncidentSummary,
    report_filename,
};
use eidiv_persistence::{Page, Persistence};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::session::SessionOperator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single database connection.
    pub persistence: Arc<Mutex<Persistence>>,
    pub delivery: ReportDelivery,
    pub settings: Arc<RecordingSettings>,
}

impl AppState {
    #[must_use]
    pub fn new(
        persistence: Persistence,
        delivery: ReportDelivery,
        settings: RecordingSettings,
    ) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            delivery,
            settings: Arc::new(settings),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always `true`.
    pub error: bool,
    pub message: String,
    /// Field-level messages of a rejected submission.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldMessage>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    fields: Vec<FieldMessage>,
}

impl HttpError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            fields: Vec::new(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::AuthenticationFailed { .. } => {
                Self::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            ApiError::Unauthorized { .. } => Self::new(StatusCode::FORBIDDEN, err.to_string()),
            ApiError::ValidationFailed { fields } => Self {
                status: StatusCode::BAD_REQUEST,
                message: String::from("Validation failed"),
                fields,
            },
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::DomainRuleViolation { .. } => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            ApiError::ResourceNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordQuery {
    pub category: Option<String>,
}

fn created(response: CreatedResponse) -> (StatusCode, Json<CreatedResponse>) {
    (StatusCode::CREATED, Json(response))
}

fn pdf_response(kind: EventKind, number: EventNumber, data: Vec<u8>) -> Response {
    let filename: String = report_filename(kind, number);
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, String::from("application/pdf")),
            (
                CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
        ],
        data,
    )
        .into_response()
}

/// Runs a report delivery on the blocking pool.
async fn run_delivery<F>(work: F) -> Vec<String>
where
    F: FnOnce() -> Vec<String> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.unwrap_or_else(|e| {
        error!(error = %e, "Report delivery task failed");
        vec![format!("Report delivery did not complete: {e}")]
    })
}

/// Renders a PDF download on the blocking pool.
async fn run_render<F>(number: EventNumber, work: F) -> HttpResult<Vec<u8>>
where
    F: FnOnce() -> Result<Vec<u8>, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "Report rendering task failed");
            Err(ApiError::Internal {
                message: format!("Report {number} could not be rendered: {e}"),
            })
        })
        .map_err(HttpError::from)
}

// ============================================================================
// Health & authentication
// ============================================================================

#[allow(clippy::unused_async)]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> HttpResult<Json<LoginResponse>> {
    info!(login_name = %req.login_name, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse =
        eidiv_api::login(&mut persistence, &req, OffsetDateTime::now_utc())?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::logout(&mut persistence, &session.token)?;
    drop(persistence);

    info!(login_name = %session.actor.login_name, "Operator logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[allow(clippy::unused_async)]
async fn handle_whoami(session: SessionOperator) -> Json<WhoAmIResponse> {
    Json(eidiv_api::whoami(&session.actor, &session.operator))
}

// ============================================================================
// Operators
// ============================================================================

async fn handle_list_operators(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
) -> HttpResult<Json<ListOperatorsResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_operators(
        &mut persistence,
        &session.actor,
    )?))
}

async fn handle_create_operator(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<CreateOperatorRequest>,
) -> HttpResult<(StatusCode, Json<CreatedResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let response = eidiv_api::create_operator(&mut persistence, &req, &session.actor)?;
    drop(persistence);
    Ok(created(response))
}

async fn handle_disable_operator(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(operator_id): Path<i64>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::disable_operator(&mut persistence, operator_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_enable_operator(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(operator_id): Path<i64>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::enable_operator(&mut persistence, operator_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Members
// ============================================================================

async fn handle_list_members(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
) -> HttpResult<Json<MembersResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_members(&mut persistence)?))
}

async fn handle_create_member(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<MemberRequest>,
) -> HttpResult<(StatusCode, Json<CreatedResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let response = eidiv_api::create_member(&mut persistence, &req, &session.actor)?;
    drop(persistence);
    Ok(created(response))
}

async fn handle_update_member(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(member_id): Path<i64>,
    Json(req): Json<MemberRequest>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::update_member(&mut persistence, member_id, &req, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_delete_member(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(member_id): Path<i64>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::delete_member(&mut persistence, member_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

/// Feeds the AGT minutes field of the attendance form.
async fn handle_member_agt(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Path(member_id): Path<i64>,
) -> HttpResult<Json<AgtResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::member_agt(&mut persistence, member_id)?))
}

// ============================================================================
// Vehicles, containers & trailers
// ============================================================================

async fn handle_list_vehicles(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
) -> HttpResult<Json<VehiclesResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_vehicles(&mut persistence)?))
}

async fn handle_create_vehicle(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<VehicleRequest>,
) -> HttpResult<(StatusCode, Json<CreatedResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let response = eidiv_api::create_vehicle(&mut persistence, &req, &session.actor)?;
    drop(persistence);
    Ok(created(response))
}

async fn handle_update_vehicle(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(vehicle_id): Path<i64>,
    Json(req): Json<VehicleRequest>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::update_vehicle(&mut persistence, vehicle_id, &req, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_delete_vehicle(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(vehicle_id): Path<i64>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::delete_vehicle(&mut persistence, vehicle_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_list_containers(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
) -> HttpResult<Json<ContainersResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_containers(&mut persistence)?))
}

async fn handle_create_container(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<ContainerRequest>,
) -> HttpResult<(StatusCode, Json<CreatedResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let response = eidiv_api::create_container(&mut persistence, &req, &session.actor)?;
    drop(persistence);
    Ok(created(response))
}

async fn handle_update_container(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(container_id): Path<i64>,
    Json(req): Json<ContainerRequest>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::update_container(&mut persistence, container_id, &req, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_delete_container(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(container_id): Path<i64>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::delete_container(&mut persistence, container_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_list_trailers(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
) -> HttpResult<Json<TrailersResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_trailers(&mut persistence)?))
}

async fn handle_create_trailer(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<TrailerRequest>,
) -> HttpResult<(StatusCode, Json<CreatedResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let response = eidiv_api::create_trailer(&mut persistence, &req, &session.actor)?;
    drop(persistence);
    Ok(created(response))
}

async fn handle_update_trailer(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(trailer_id): Path<i64>,
    Json(req): Json<TrailerRequest>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::update_trailer(&mut persistence, trailer_id, &req, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_delete_trailer(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(trailer_id): Path<i64>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::delete_trailer(&mut persistence, trailer_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Lookups & keywords
// ============================================================================

async fn handle_list_lookup_entries(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Path(kind): Path<String>,
) -> HttpResult<Json<LookupEntriesResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_lookup_entries(&mut persistence, &kind)?))
}

async fn handle_create_lookup_entry(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(kind): Path<String>,
    Json(req): Json<LookupEntryRequest>,
) -> HttpResult<(StatusCode, Json<CreatedResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let response = eidiv_api::create_lookup_entry(&mut persistence, &kind, &req, &session.actor)?;
    drop(persistence);
    Ok(created(response))
}

async fn handle_update_lookup_entry(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path((kind, entry_id)): Path<(String, i64)>,
    Json(req): Json<LookupEntryRequest>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::update_lookup_entry(&mut persistence, &kind, entry_id, &req, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_delete_lookup_entry(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path((kind, entry_id)): Path<(String, i64)>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::delete_lookup_entry(&mut persistence, &kind, entry_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_list_keywords(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Query(query): Query<KeywordQuery>,
) -> HttpResult<Json<KeywordsResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_keywords(
        &mut persistence,
        query.category.as_deref(),
    )?))
}

async fn handle_keyword_category(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Path(keyword_id): Path<i64>,
) -> HttpResult<Json<KeywordCategoryResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::keyword_category(
        &mut persistence,
        keyword_id,
    )?))
}

async fn handle_create_keyword(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<KeywordRequest>,
) -> HttpResult<(StatusCode, Json<CreatedResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let response = eidiv_api::create_keyword(&mut persistence, &req, &session.actor)?;
    drop(persistence);
    Ok(created(response))
}

async fn handle_update_keyword(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(keyword_id): Path<i64>,
    Json(req): Json<KeywordRequest>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::update_keyword(&mut persistence, keyword_id, &req, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_delete_keyword(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(keyword_id): Path<i64>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::delete_keyword(&mut persistence, keyword_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Mail recipients
// ============================================================================

async fn handle_list_recipients(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
) -> HttpResult<Json<RecipientsResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_recipients(
        &mut persistence,
        &session.actor,
    )?))
}

async fn handle_create_recipient(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<RecipientRequest>,
) -> HttpResult<(StatusCode, Json<CreatedResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let response = eidiv_api::create_recipient(&mut persistence, &req, &session.actor)?;
    drop(persistence);
    Ok(created(response))
}

async fn handle_update_recipient(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(recipient_id): Path<i64>,
    Json(req): Json<RecipientRequest>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::update_recipient(&mut persistence, recipient_id, &req, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_delete_recipient(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(recipient_id): Path<i64>,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    eidiv_api::delete_recipient(&mut persistence, recipient_id, &session.actor)?;
    drop(persistence);
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Incidents
// ============================================================================

/// Handler for POST `/incidents`.
///
/// The incident is committed before delivery starts; delivery failures
/// only show up in `warnings`.
async fn handle_submit_incident(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<IncidentRequest>,
) -> HttpResult<(StatusCode, Json<SubmissionResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let RecordedIncident {
        recorded,
        report,
        recipients,
        mut warnings,
    } = eidiv_api::submit_incident(&mut persistence, &req, &session.actor, &app_state.settings)?;
    drop(persistence);

    if let Some(report) = report {
        let delivery: ReportDelivery = app_state.delivery.clone();
        let delivered: Vec<String> =
            run_delivery(move || delivery.deliver_incident(&report, &recipients)).await;
        warnings.extend(delivered);
    }

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::new(recorded, warnings)),
    ))
}

async fn handle_list_incidents(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Query(query): Query<EventListQuery>,
) -> HttpResult<Json<Page<IncidentSummary>>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_incidents(&mut persistence, &query)?))
}

async fn handle_get_incident(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Path(incident_id): Path<i64>,
) -> HttpResult<Json<IncidentReport>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::get_incident(&mut persistence, incident_id)?))
}

async fn handle_incident_pdf(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Path(incident_id): Path<i64>,
) -> HttpResult<Response> {
    let mut persistence = app_state.persistence.lock().await;
    let report: IncidentReport = eidiv_api::get_incident(&mut persistence, incident_id)?;
    drop(persistence);

    let number: EventNumber = report.number;
    let delivery: ReportDelivery = app_state.delivery.clone();
    let data: Vec<u8> = run_render(number, move || delivery.incident_pdf(&report)).await?;
    Ok(pdf_response(EventKind::Incident, number, data))
}

// ============================================================================
// Duties
// ============================================================================

/// Handler for POST `/duties`.
async fn handle_submit_duty(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Json(req): Json<DutyRequest>,
) -> HttpResult<(StatusCode, Json<SubmissionResponse>)> {
    let mut persistence = app_state.persistence.lock().await;
    let RecordedDuty {
        recorded,
        report,
        recipients,
        mut warnings,
    } = eidiv_api::submit_duty(&mut persistence, &req, &session.actor, &app_state.settings)?;
    drop(persistence);

    if let Some(report) = report {
        let delivery: ReportDelivery = app_state.delivery.clone();
        let delivered: Vec<String> =
            run_delivery(move || delivery.deliver_duty(&report, &recipients)).await;
        warnings.extend(delivered);
    }

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::new(recorded, warnings)),
    ))
}

async fn handle_list_duties(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Query(query): Query<EventListQuery>,
) -> HttpResult<Json<Page<DutySummary>>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::list_duties(&mut persistence, &query)?))
}

async fn handle_get_duty(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Path(duty_id): Path<i64>,
) -> HttpResult<Json<DutyReport>> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(eidiv_api::get_duty(&mut persistence, duty_id)?))
}

async fn handle_duty_pdf(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionOperator,
    Path(duty_id): Path<i64>,
) -> HttpResult<Response> {
    let mut persistence = app_state.persistence.lock().await;
    let report: DutyReport = eidiv_api::get_duty(&mut persistence, duty_id)?;
    drop(persistence);

    let number: EventNumber = report.number;
    let delivery: ReportDelivery = app_state.delivery.clone();
    let data: Vec<u8> = run_render(number, move || delivery.duty_pdf(&report)).await?;
    Ok(pdf_response(EventKind::Duty, number, data))
}

/// Builds the application router.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route(
            "/operators",
            get(handle_list_operators).post(handle_create_operator),
        )
        .route("/operators/{id}/disable", post(handle_disable_operator))
        .route("/operators/{id}/enable", post(handle_enable_operator))
        .route("/members", get(handle_list_members).post(handle_create_member))
        .route(
            "/members/{id}",
            put(handle_update_member).delete(handle_delete_member),
        )
        .route("/members/{id}/agt", get(handle_member_agt))
        .route(
            "/vehicles",
            get(handle_list_vehicles).post(handle_create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            put(handle_update_vehicle).delete(handle_delete_vehicle),
        )
        .route(
            "/containers",
            get(handle_list_containers).post(handle_create_container),
        )
        .route(
            "/containers/{id}",
            put(handle_update_container).delete(handle_delete_container),
        )
        .route(
            "/trailers",
            get(handle_list_trailers).post(handle_create_trailer),
        )
        .route(
            "/trailers/{id}",
            put(handle_update_trailer).delete(handle_delete_trailer),
        )
        .route(
            "/lookups/{kind}",
            get(handle_list_lookup_entries).post(handle_create_lookup_entry),
        )
        .route(
            "/lookups/{kind}/{id}",
            put(handle_update_lookup_entry).delete(handle_delete_lookup_entry),
        )
        .route(
            "/keywords",
            get(handle_list_keywords).post(handle_create_keyword),
        )
        .route(
            "/keywords/{id}",
            put(handle_update_keyword).delete(handle_delete_keyword),
        )
        .route("/keywords/{id}/category", get(handle_keyword_category))
        .route(
            "/recipients",
            get(handle_list_recipients).post(handle_create_recipient),
        )
        .route(
            "/recipients/{id}",
            put(handle_update_recipient).delete(handle_delete_recipient),
        )
        .route(
            "/incidents",
            get(handle_list_incidents).post(handle_submit_incident),
        )
        .route("/incidents/{id}", get(handle_get_incident))
        .route("/incidents/{id}/pdf", get(handle_incident_pdf))
        .route("/duties", get(handle_list_duties).post(handle_submit_duty))
        .route("/duties/{id}", get(handle_get_duty))
        .route("/duties/{id}/pdf", get(handle_duty_pdf))
        .with_state(app_state)
}
