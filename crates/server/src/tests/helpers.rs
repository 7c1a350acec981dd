// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{
        HeaderMap, Method, Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use chrono_tz::Europe::Berlin;
use eidiv_api::{RecordingSettings, ReportDelivery};
use eidiv_domain::{DutyReport, IncidentReport};
use eidiv_persistence::Persistence;
use eidiv_reports::{
    LogTransport, MailSettings, MailTransport, PdfReportRenderer, ReportDistributor, ReportError,
    ReportRenderer, SpoolTransport,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::app::{AppState, build_router};

pub const ADMIN_LOGIN: &str = "kdt.huber";
pub const ADMIN_PASSWORD: &str = "Schlauchboot-2025";
pub const RECORDER_LOGIN: &str = "schriftfuehrer";
pub const RECORDER_PASSWORD: &str = "Atemschutz-Uebung";

pub struct FailingRenderer;

impl ReportRenderer for FailingRenderer {
    fn render_incident(&self, _report: &IncidentReport) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::Render(String::from("font table missing")))
    }

    fn render_duty(&self, _report: &DutyReport) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::Render(String::from("font table missing")))
    }
}

/// Renderer that panics, standing in for a bug inside a PDF library.
pub struct PanickingRenderer;

impl ReportRenderer for PanickingRenderer {
    fn render_incident(&self, _report: &IncidentReport) -> Result<Vec<u8>, ReportError> {
        panic!("indirect reference out of valid range")
    }

    fn render_duty(&self, _report: &DutyReport) -> Result<Vec<u8>, ReportError> {
        panic!("indirect reference out of valid range")
    }
}

fn seeded_persistence() -> Persistence {
    let mut persistence = Persistence::new_in_memory().expect("in-memory database");
    persistence
        .create_operator(ADMIN_LOGIN, "Huber, Max", ADMIN_PASSWORD, "Admin")
        .unwrap();
    persistence
        .create_operator(RECORDER_LOGIN, "Bauer, Lena", RECORDER_PASSWORD, "Recorder")
        .unwrap();
    persistence
}

fn build_app(renderer: Arc<dyn ReportRenderer>, transport: Arc<dyn MailTransport>) -> Router {
    let distributor = ReportDistributor::new(transport, MailSettings::default());
    let state = AppState::new(
        seeded_persistence(),
        ReportDelivery::new(renderer, distributor),
        RecordingSettings::default(),
    );
    build_router(state)
}

/// Router with the PDF renderer and a mail transport that only logs.
pub fn test_app() -> Router {
    build_app(
        Arc::new(PdfReportRenderer::new("FF Muehldorf", Berlin)),
        Arc::new(LogTransport),
    )
}

pub fn failing_render_app() -> Router {
    build_app(Arc::new(FailingRenderer), Arc::new(LogTransport))
}

pub fn panicking_render_app() -> Router {
    build_app(Arc::new(PanickingRenderer), Arc::new(LogTransport))
}

pub fn spooling_app(spool_dir: &Path) -> Router {
    build_app(
        Arc::new(PdfReportRenderer::new("FF Muehldorf", Berlin)),
        Arc::new(SpoolTransport::new(spool_dir)),
    )
}

pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Bytes) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes)
}

/// Sends a request and decodes the JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, token, body).await;
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn login(app: &Router, login_name: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "login_name": login_name, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["session_token"].as_str().unwrap().to_string()
}

pub async fn login_admin(app: &Router) -> String {
    login(app, ADMIN_LOGIN, ADMIN_PASSWORD).await
}

pub async fn login_recorder(app: &Router) -> String {
    login(app, RECORDER_LOGIN, RECORDER_PASSWORD).await
}

/// Creates an active keyword and returns its id.
pub async fn create_keyword(app: &Router, admin: &str, code: &str, category: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/keywords",
        Some(admin),
        Some(json!({ "code": code, "label": "Brand klein", "category": category })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "keyword not created: {body}");
    body["id"].as_i64().unwrap()
}

pub async fn create_member(app: &Router, admin: &str, last: &str, agt: bool) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/members",
        Some(admin),
        Some(json!({ "last_name": last, "first_name": "Max", "agt_qualified": agt })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "member not created: {body}");
    body["id"].as_i64().unwrap()
}

pub fn incident_body(keyword_id: i64) -> Value {
    json!({
        "keyword_id": keyword_id,
        "start_at": "2025-03-14T18:05",
        "end_at": "2025-03-14T19:35",
        "leader_text": "Maier, Josef",
        "location": { "object_name": "Sagewerk Lindner", "street": "Stadtplatz 1" },
    })
}

pub fn duty_body(title: &str) -> Value {
    json!({
        "title": title,
        "start_at": "2025-01-10T19:00",
        "end_at": "2025-01-10T21:30",
    })
}
