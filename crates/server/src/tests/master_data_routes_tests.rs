// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::helpers::{
    create_keyword, create_member, incident_body, login_admin, login_recorder, send, test_app,
};

#[tokio::test]
async fn test_recorder_cannot_create_member() {
    let app = test_app();
    let recorder = login_recorder(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/members",
        Some(&recorder),
        Some(json!({ "last_name": "Zeller", "first_name": "Anna" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("Admin"));
}

#[tokio::test]
async fn test_member_crud() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let member_id = create_member(&app, &admin, "Zeller", false).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/members/{member_id}"),
        Some(&admin),
        Some(json!({ "last_name": "Zeller", "first_name": "Anna", "agt_qualified": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let recorder = login_recorder(&app).await;
    let (status, body) = send(&app, Method::GET, "/members", Some(&recorder), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"][0]["first_name"], "Anna");

    let (_, agt) = send(
        &app,
        Method::GET,
        &format!("/members/{member_id}/agt"),
        Some(&recorder),
        None,
    )
    .await;
    assert_eq!(agt, json!({ "agt": true }));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/members/{member_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_member_agt_is_false() {
    let app = test_app();
    let token = login_recorder(&app).await;

    let (status, body) = send(&app, Method::GET, "/members/9999/agt", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "agt": false }));
}

#[tokio::test]
async fn test_invalid_member_lists_field_errors() {
    let app = test_app();
    let admin = login_admin(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/members",
        Some(&admin),
        Some(json!({ "last_name": " ", "first_name": "Anna" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "last_name");
}

#[tokio::test]
async fn test_delete_vehicle_in_use_is_conflict() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let keyword_id = create_keyword(&app, &admin, "B1", "brand").await;
    let (_, vehicle) = send(
        &app,
        Method::POST,
        "/vehicles",
        Some(&admin),
        Some(json!({ "vehicle_type": "HLF 20", "call_sign": "Florian Muehldorf 40/1" })),
    )
    .await;
    let vehicle_id = vehicle["id"].as_i64().unwrap();
    let mut incident = incident_body(keyword_id);
    incident["vehicles"] = json!([{ "vehicle_id": vehicle_id, "kilometers": 12 }]);
    let (status, _) = send(&app, Method::POST, "/incidents", Some(&admin), Some(incident)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/vehicles/{vehicle_id}"),
        Some(&admin),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(!body["message"].as_str().unwrap().contains("FOREIGN KEY"));
}

#[tokio::test]
async fn test_lookup_routes() {
    let app = test_app();
    let admin = login_admin(&app).await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/lookups/water_source",
        Some(&admin),
        Some(json!({ "label": "Hydrant" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let entry_id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/lookups/water_source/{entry_id}"),
        Some(&admin),
        Some(json!({ "label": "Unterflurhydrant" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, Method::GET, "/lookups/water_source", Some(&admin), None).await;
    assert_eq!(listed["kind"], "water_source");
    assert_eq!(listed["entries"][0]["label"], "Unterflurhydrant");

    let (status, _) = send(&app, Method::GET, "/lookups/ladders", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_keyword_dropdown_and_category() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let thl = create_keyword(&app, &admin, "THL1", "thl").await;
    create_keyword(&app, &admin, "B2", "brand").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/keywords?category=thl",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keywords"].as_array().unwrap().len(), 1);
    assert_eq!(body["keywords"][0]["code"], "THL1");

    let (_, category) = send(
        &app,
        Method::GET,
        &format!("/keywords/{thl}/category"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(category, json!({ "category": "thl" }));

    let (_, unknown) = send(&app, Method::GET, "/keywords/4711/category", Some(&admin), None).await;
    assert_eq!(unknown, json!({ "category": "sonstig" }));

    let (status, _) = send(&app, Method::GET, "/keywords?category=flood", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recipients_are_admin_only() {
    let app = test_app();
    let admin = login_admin(&app).await;
    let recorder = login_recorder(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/recipients",
        Some(&admin),
        Some(json!({ "email": "Wehr@FF-Muehldorf.de" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::GET, "/recipients", Some(&recorder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, Method::GET, "/recipients", Some(&admin), None).await;
    assert_eq!(body["recipients"][0]["email"], "wehr@ff-muehldorf.de");
}
