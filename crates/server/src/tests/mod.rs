// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tower::ServiceExt;

use super::{AppState, build_router};
use crate::identity::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use mi3ad_persistence::Persistence;

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState::new(persistence)
}

/// Sends one request as the given actor and returns status and JSON body.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
    body: Option<Value>,
) -> (HttpStatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((actor_id, role)) = actor {
        builder = builder
            .header(ACTOR_ID_HEADER, actor_id)
            .header(ACTOR_ROLE_HEADER, role);
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

const ADMIN: Option<(&str, &str)> = Some(("admin1", "admin"));
const GATE: Option<(&str, &str)> = Some(("gate-1", "gatekeeper"));

async fn register(app: &Router, booking_id: &str, scan_code: &str, tickets: u32, price: u64) {
    let (status, _) = send(
        app,
        "POST",
        "/bookings",
        ADMIN,
        Some(json!({
            "cause_id": "seed",
            "cause_description": "Seed booking",
            "booking_id": booking_id,
            "event_id": "evt-1",
            "scan_code": scan_code,
            "ticket_count": tickets,
            "total_price_minor": price,
        })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
}

async fn seeded_app() -> (AppState, Router) {
    let app_state: AppState = create_test_app_state();
    let app: Router = build_router(app_state.clone());
    register(&app, "b1", "QR-001", 2, 0).await;
    register(&app, "b2", "QR-002", 1, 25_000).await;
    (app_state, app)
}

fn scan_body(payload: &str) -> Option<Value> {
    Some(json!({ "payload": payload }))
}

fn confirm_body(booking_id: &str) -> Option<Value> {
    Some(json!({
        "cause_id": "gate-req",
        "cause_description": "Operator confirmed entry",
        "booking_id": booking_id,
    }))
}

#[tokio::test]
async fn test_register_booking_generates_scan_code_when_omitted() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send(
        &app,
        "POST",
        "/bookings",
        ADMIN,
        Some(json!({
            "cause_id": "c1",
            "cause_description": "Imported",
            "booking_id": "b9",
            "event_id": "evt-9",
            "ticket_count": 1,
            "total_price_minor": 0,
        })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::OK);
    assert!(body["ticket"]["scan_code"].as_str().unwrap().starts_with("QR-"));
    assert!(body["event_id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_register_booking_with_oversized_price_is_bad_request() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send(
        &app,
        "POST",
        "/bookings",
        ADMIN,
        Some(json!({
            "cause_id": "c1",
            "cause_description": "Imported",
            "booking_id": "b9",
            "event_id": "evt-9",
            "scan_code": "QR-009",
            "ticket_count": 1,
            "total_price_minor": u64::MAX,
        })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("total_price_minor"));

    let (status, _) = send(&app, "GET", "/bookings/b9", ADMIN, None).await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_booking_as_gatekeeper_is_forbidden() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send(
        &app,
        "POST",
        "/bookings",
        GATE,
        Some(json!({
            "cause_id": "c1",
            "cause_description": "Imported",
            "booking_id": "b9",
            "event_id": "evt-9",
            "ticket_count": 1,
            "total_price_minor": 0,
        })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let (_, app) = seeded_app().await;

    let (status, _) = send(&app, "GET", "/bookings", None, None).await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_role_is_bad_request() {
    let (_, app) = seeded_app().await;

    let (status, _) = send(&app, "GET", "/bookings", Some(("x", "bouncer")), None).await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_scan_code_is_conflict() {
    let (_, app) = seeded_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/bookings",
        ADMIN,
        Some(json!({
            "cause_id": "c1",
            "cause_description": "Imported",
            "booking_id": "b3",
            "event_id": "evt-1",
            "scan_code": "QR-001",
            "ticket_count": 1,
            "total_price_minor": 0,
        })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_ticket_and_list() {
    let (_, app) = seeded_app().await;

    let (status, ticket) = send(&app, "GET", "/bookings/b2", GATE, None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(ticket["status_label"], json!("Confirmed"));
    assert_eq!(ticket["price_label"], json!("25 LYD"));
    let booked_at: &str = ticket["booked_at"].as_str().unwrap();
    assert!(OffsetDateTime::parse(booked_at, &Rfc3339).is_ok());

    let (status, list) = send(&app, "GET", "/bookings?event_id=evt-1", GATE, None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(list["tickets"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "GET", "/bookings/nope", GATE, None).await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scan_confirm_rescan_flow() {
    let (_, app) = seeded_app().await;

    let (status, scanned) = send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-001")).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(scanned["outcome"], json!("admissible"));
    assert_eq!(scanned["admission"]["ticket_count"], json!(2));

    let (_, state) = send(&app, "GET", "/scanners/north", GATE, None).await;
    assert_eq!(state["state"], json!("awaiting_confirmation"));
    assert_eq!(state["pending_booking_id"], json!("b1"));

    let (status, confirmed) =
        send(&app, "POST", "/scanners/north/confirm", GATE, confirm_body("b1")).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(confirmed["outcome"], json!("admitted"));
    assert_eq!(confirmed["message"]["title"], json!("Entry confirmed"));

    let (_, rescanned) = send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-001")).await;
    assert_eq!(rescanned["outcome"], json!("already_used"));

    let (_, ticket) = send(&app, "GET", "/bookings/b1", GATE, None).await;
    assert_eq!(ticket["status"], json!("used"));
}

#[tokio::test]
async fn test_business_outcomes_are_ok() {
    let (_, app) = seeded_app().await;

    let (status, body) = send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-999")).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["outcome"], json!("invalid"));
    assert_eq!(body["message"]["title"], json!("Invalid ticket"));
}

#[tokio::test]
async fn test_scan_while_pending_is_conflict() {
    let (_, app) = seeded_app().await;

    send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-001")).await;
    let (status, _) = send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-002")).await;

    assert_eq!(status, HttpStatusCode::CONFLICT);
}

#[tokio::test]
async fn test_devices_are_independent() {
    let (_, app) = seeded_app().await;

    send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-001")).await;
    let (status, body) = send(&app, "POST", "/scanners/south/scan", GATE, scan_body("QR-002")).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["outcome"], json!("admissible"));
}

#[tokio::test]
async fn test_second_device_cannot_admit_twice() {
    let (_, app) = seeded_app().await;

    send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-001")).await;
    send(&app, "POST", "/scanners/south/scan", GATE, scan_body("QR-001")).await;

    let (_, first) = send(&app, "POST", "/scanners/north/confirm", GATE, confirm_body("b1")).await;
    let (_, second) = send(&app, "POST", "/scanners/south/confirm", GATE, confirm_body("b1")).await;

    assert_eq!(first["outcome"], json!("admitted"));
    assert_eq!(second["outcome"], json!("already_used"));
}

#[tokio::test]
async fn test_busy_scanner_is_conflict() {
    let (app_state, app) = seeded_app().await;

    send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-999")).await;
    let engine = app_state.scanners.get("north").await.unwrap();
    let _held = engine.lock().await;

    let (status, body) = send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-001")).await;

    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("busy"));
}

#[tokio::test]
async fn test_discard_then_confirm_is_conflict() {
    let (_, app) = seeded_app().await;

    send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-001")).await;
    let (status, discarded) = send(&app, "POST", "/scanners/north/discard", GATE, None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(discarded["discarded_booking_id"], json!("b1"));

    let (status, _) = send(&app, "POST", "/scanners/north/confirm", GATE, confirm_body("b1")).await;
    assert_eq!(status, HttpStatusCode::CONFLICT);

    let (_, ticket) = send(&app, "GET", "/bookings/b1", GATE, None).await;
    assert_eq!(ticket["status"], json!("confirmed"));
}

#[tokio::test]
async fn test_confirm_on_unknown_scanner_is_conflict() {
    let (_, app) = seeded_app().await;

    let (status, _) = send(&app, "POST", "/scanners/ghost/confirm", GATE, confirm_body("b1")).await;

    assert_eq!(status, HttpStatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_scanner_state_is_not_found() {
    let (_, app) = seeded_app().await;

    let (status, _) = send(&app, "GET", "/scanners/ghost", GATE, None).await;

    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_then_scan_and_cancel_again() {
    let (_, app) = seeded_app().await;
    let cancel = json!({
        "cause_id": "refund-1",
        "cause_description": "Refund request",
        "reason": "Refunded",
    });

    let (status, _) = send(&app, "POST", "/bookings/b2/cancel", ADMIN, Some(cancel.clone())).await;
    assert_eq!(status, HttpStatusCode::OK);

    let (_, scanned) = send(&app, "POST", "/scanners/north/scan", GATE, scan_body("QR-002")).await;
    assert_eq!(scanned["outcome"], json!("cancelled"));

    let (status, _) = send(&app, "POST", "/bookings/b2/cancel", ADMIN, Some(cancel)).await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_audit_timeline_requires_admin() {
    let (_, app) = seeded_app().await;

    let (status, _) = send(&app, "GET", "/bookings/b1/audit", GATE, None).await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/bookings/b1/audit", ADMIN, None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["events"][0]["action"], json!("RegisterBooking"));
}

#[tokio::test]
async fn test_admission_after_device_handover_credits_confirming_gatekeeper() {
    let (_, app) = seeded_app().await;
    let relief: Option<(&str, &str)> = Some(("gate-2", "gatekeeper"));

    let (status, _) = send(&app, "POST", "/scanners/d1/scan", GATE, scan_body("QR-999")).await;
    assert_eq!(status, HttpStatusCode::OK);

    let (_, scanned) = send(&app, "POST", "/scanners/d1/scan", relief, scan_body("QR-001")).await;
    assert_eq!(scanned["outcome"], json!("admissible"));
    let (_, confirmed) = send(&app, "POST", "/scanners/d1/confirm", relief, confirm_body("b1")).await;
    assert_eq!(confirmed["outcome"], json!("admitted"));

    let (_, timeline) = send(&app, "GET", "/bookings/b1/audit", ADMIN, None).await;
    let events = timeline["events"].as_array().unwrap();
    let admit = events.last().unwrap();
    assert_eq!(admit["action"], json!("Admit"));
    assert_eq!(admit["actor_id"], json!("gate-2"));
}
