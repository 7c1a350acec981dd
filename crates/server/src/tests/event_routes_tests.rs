// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::http::{Method, StatusCode, header::CONTENT_DISPOSITION, header::CONTENT_TYPE};
use eidiv_reports::read_envelope;
use serde_json::json;

use super::helpers::{
    create_keyword, create_member, duty_body, failing_render_app, incident_body, login_admin,
    login_recorder, panicking_render_app, send, send_raw, spooling_app, test_app,
};

#[tokio::test]
async fn test_recorder_submits_numbered_incidents() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let keyword_id = create_keyword(&app, &admin, "B1", "brand").await;
    let recorder = login_recorder(&app).await;

    let (status, first) = send(
        &app,
        Method::POST,
        "/incidents",
        Some(&recorder),
        Some(incident_body(keyword_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["reference"], "001/2025");
    assert_eq!(first["year"], 2025);
    assert_eq!(first["seq"], 1);
    assert_eq!(first["warnings"], json!([]));

    let (_, second) = send(
        &app,
        Method::POST,
        "/incidents",
        Some(&recorder),
        Some(incident_body(keyword_id)),
    )
    .await;
    assert_eq!(second["reference"], "002/2025");
}

#[tokio::test]
async fn test_incident_and_duty_sequences_are_separate() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let keyword_id = create_keyword(&app, &admin, "B1", "brand").await;

    send(&app, Method::POST, "/incidents", Some(&admin), Some(incident_body(keyword_id))).await;
    let (status, duty) = send(
        &app,
        Method::POST,
        "/duties",
        Some(&admin),
        Some(duty_body("Funkuebung")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(duty["reference"], "001/2025");
}

#[tokio::test]
async fn test_submission_without_session_is_rejected() {
    let app = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/duties",
        None,
        Some(duty_body("Funkuebung")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_incident_reports_fields_and_stores_nothing() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let keyword_id = create_keyword(&app, &admin, "B1", "brand").await;
    let member_id = create_member(&app, &admin, "Bauer", false).await;
    let mut incident = incident_body(keyword_id);
    incident["end_at"] = json!("2025-03-14T18:05");
    incident["attendance"] = json!([{ "member_id": member_id, "agt_minutes": 20 }]);

    let (status, body) = send(&app, Method::POST, "/incidents", Some(&admin), Some(incident)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"end_at"));
    assert!(fields.contains(&"attendance[0].agt_minutes"));

    let (_, page) = send(&app, Method::GET, "/incidents", Some(&admin), None).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_duplicate_attendance_is_conflict() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let keyword_id = create_keyword(&app, &admin, "B1", "brand").await;
    let member_id = create_member(&app, &admin, "Huber", true).await;
    let mut incident = incident_body(keyword_id);
    incident["attendance"] = json!([{ "member_id": member_id }, { "member_id": member_id }]);

    let (status, body) = send(&app, Method::POST, "/incidents", Some(&admin), Some(incident)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(!body["message"].as_str().unwrap().contains("UNIQUE"));
}

#[tokio::test]
async fn test_rendering_failure_is_a_warning() {
    let app = failing_render_app();
    let admin = login_admin(&app).await;
    let keyword_id = create_keyword(&app, &admin, "B1", "brand").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/incidents",
        Some(&admin),
        Some(incident_body(keyword_id)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reference"], "001/2025");
    let warning = body["warnings"][0].as_str().unwrap();
    assert!(warning.contains("could not be rendered"));

    let id = body["id"].as_i64().unwrap();
    let (status, stored) = send(
        &app,
        Method::GET,
        &format!("/incidents/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["reference"], "001/2025");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/incidents/{id}/pdf"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_renderer_panic_keeps_the_server_answering() {
    let app = panicking_render_app();
    let admin = login_admin(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/duties",
        Some(&admin),
        Some(duty_body("Leistungspruefung")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reference"], "001/2025");
    let warning = body["warnings"][0].as_str().unwrap();
    assert!(warning.contains("Report delivery did not complete"));

    let id = body["id"].as_i64().unwrap();
    let (status, error) = send(
        &app,
        Method::GET,
        &format!("/duties/{id}/pdf"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["error"], true);
    assert!(error["message"].as_str().unwrap().contains("001/2025"));

    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_submission_spools_report_mail() {
    let spool = tempfile::tempdir().unwrap();
    let app = spooling_app(spool.path());
    let admin = login_admin(&app).await;
    send(
        &app,
        Method::POST,
        "/recipients",
        Some(&admin),
        Some(json!({ "email": "wehr@ff-muehldorf.de" })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/duties",
        Some(&admin),
        Some(duty_body("Atemschutzuebung")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["warnings"], json!([]));

    let messages: Vec<std::path::PathBuf> = std::fs::read_dir(spool.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| !path.file_name().unwrap().to_string_lossy().starts_with('.'))
        .collect();
    assert_eq!(messages.len(), 1);
    let envelope = read_envelope(&messages[0]).unwrap();
    assert_eq!(envelope.bcc, vec!["wehr@ff-muehldorf.de"]);
    assert_eq!(envelope.attachments[0].filename, "Dienst_001_2025.pdf");
}

#[tokio::test]
async fn test_incident_pdf_download() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let keyword_id = create_keyword(&app, &admin, "B1", "brand").await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/incidents",
        Some(&admin),
        Some(incident_body(keyword_id)),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, headers, bytes) =
        send_raw(&app, Method::GET, &format!("/incidents/{id}/pdf"), Some(&admin), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "application/pdf");
    assert!(headers[CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("Einsatz_001_2025.pdf"));
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_unknown_events_are_not_found() {
    let app = test_app();
    let admin = login_admin(&app).await;

    let (status, _) = send(&app, Method::GET, "/incidents/42", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/duties/42/pdf", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_lists_filter_and_page() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let keyword_id = create_keyword(&app, &admin, "B1", "brand").await;
    send(&app, Method::POST, "/incidents", Some(&admin), Some(incident_body(keyword_id))).await;
    let mut other = incident_body(keyword_id);
    other["location"]["object_name"] = json!("Gymnasium");
    send(&app, Method::POST, "/incidents", Some(&admin), Some(other)).await;
    send(
        &app,
        Method::POST,
        "/duties",
        Some(&admin),
        Some(duty_body("Maschinistenausbildung")),
    )
    .await;

    let (_, incidents) = send(
        &app,
        Method::GET,
        "/incidents?q=sagewerk&year=2025",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(incidents["total"], 1);
    assert_eq!(incidents["items"][0]["object_name"], "Sagewerk Lindner");
    assert_eq!(incidents["per_page"], 20);

    let (_, empty_year) = send(&app, Method::GET, "/incidents?year=2024", Some(&admin), None).await;
    assert_eq!(empty_year["total"], 0);

    let (_, duties) = send(&app, Method::GET, "/duties?q=maschinist", Some(&admin), None).await;
    assert_eq!(duties["items"][0]["title"], "Maschinistenausbildung");
}
