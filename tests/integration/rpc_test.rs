//! RPC surface: envelopes, error kinds and status codes.

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::{Value, json};

use crate::helpers::{TestApp, TestResponse};

async fn create_session(app: &TestApp, user_id: &str) -> Value {
    let response = app
        .rpc(
            "CreateBookingSession",
            json!({
                "user_id": user_id,
                "event_id": "ev-1",
                "currency": "USD",
                "ip_address": "10.0.0.7",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    response.data().clone()
}

async fn add_seat(app: &TestApp, session_id: &Value, seat_id: &str, price: i64) -> TestResponse {
    app.rpc(
        "AddSeatToSession",
        json!({
            "session_id": session_id,
            "seat_id": seat_id,
            "zone_id": "Z1",
            "pricing_category": "standard",
            "base_price": price,
            "final_price": price,
            "currency": "USD",
        }),
    )
    .await
}

#[tokio::test]
async fn test_health_reports_memory_store() {
    let app = TestApp::new();

    let response = app.raw("GET", "/health", String::new()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "memory");
}

#[tokio::test]
async fn test_session_round_trip_over_rpc() {
    let app = TestApp::new();
    let session = create_session(&app, "user-1").await;
    assert_eq!(session["status"], "active");
    assert_eq!(session["seat_count"], 0);
    assert_eq!(session["ip_address"], "10.0.0.7");
    assert_eq!(session["created_by"], "anonymous");
    let token = session["session_token"].as_str().unwrap();
    assert!(token.starts_with("bks_"));

    let by_token = app
        .rpc("GetBookingSessionByToken", json!({"session_token": token}))
        .await;
    assert_eq!(by_token.data()["id"], session["id"]);

    let added = add_seat(&app, &session["id"], "A1", 4200).await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.data()["status"], "reserved");
    assert_eq!(added.data()["final_price"], 4200);

    let fetched = app
        .rpc("GetBookingSession", json!({"session_id": session["id"]}))
        .await;
    assert_eq!(fetched.data()["seat_count"], 1);
    assert_eq!(fetched.data()["total_amount"], 4200);

    let availability = app
        .rpc("CheckSeatAvailability", json!({"seat_id": "A1"}))
        .await;
    assert_eq!(availability.data()["available"], false);

    let completed = app
        .rpc(
            "CompleteBookingSession",
            json!({"session_id": session["id"], "payment_method": "card", "actor": "user-1"}),
        )
        .await;
    assert_eq!(completed.status, StatusCode::OK);
    assert_eq!(completed.data()["seat_count"], 1);
    assert!(completed.data()["payment_id"].is_string());

    let stats = app
        .rpc("GetReservationStats", json!({"event_id": "ev-1"}))
        .await;
    assert_eq!(stats.data()["stats"]["confirmed"], 1);

    let listed = app
        .rpc("ListUserSessions", json!({"user_id": "user-1", "page": 1, "limit": 5}))
        .await;
    assert_eq!(listed.data()["total"], 1);
    assert_eq!(listed.data()["items"][0]["status"], "completed");
}

#[tokio::test]
async fn test_second_claim_maps_to_conflict() {
    let app = TestApp::new();
    let first = create_session(&app, "user-1").await;
    let second = create_session(&app, "user-2").await;

    assert_eq!(add_seat(&app, &first["id"], "A1", 1000).await.status, StatusCode::OK);

    let response = add_seat(&app, &second["id"], "A1", 1000).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_kind(), "SEAT_ALREADY_RESERVED");
}

#[tokio::test]
async fn test_error_kinds_and_statuses() {
    let app = TestApp::new();
    let session = create_session(&app, "user-1").await;

    let missing = app
        .rpc(
            "GetReservation",
            json!({"reservation_id": "0195f2a4-7c1e-7000-8000-000000000000"}),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error_kind(), "NOT_FOUND");

    let not_held = app
        .rpc(
            "RemoveSeatFromSession",
            json!({"session_id": session["id"], "seat_id": "Z9"}),
        )
        .await;
    assert_eq!(not_held.status, StatusCode::CONFLICT);
    assert_eq!(not_held.error_kind(), "SEAT_NOT_IN_SESSION");

    let negative = add_seat(&app, &session["id"], "A2", -5).await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert_eq!(negative.error_kind(), "VALIDATION_ERROR");

    app.availability.set_seat_status("A3", "blocked").await;
    let blocked = add_seat(&app, &session["id"], "A3", 1000).await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);
    assert_eq!(blocked.error_kind(), "SEAT_UNAVAILABLE");

    assert_eq!(add_seat(&app, &session["id"], "A4", 1000).await.status, StatusCode::OK);
    app.payments.set_decline(true).await;
    let declined = app
        .rpc(
            "CompleteBookingSession",
            json!({"session_id": session["id"], "payment_method": "card"}),
        )
        .await;
    assert_eq!(declined.status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(declined.error_kind(), "PAYMENT_FAILED");

    app.availability.set_unreachable(true).await;
    let outage = add_seat(&app, &session["id"], "A5", 1000).await;
    assert_eq!(outage.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(outage.error_kind(), "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = TestApp::new();

    let response = app
        .raw("POST", "/rpc/CreateBookingSession", "{not json".to_string())
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_kind(), "VALIDATION_ERROR");

    let response = app.rpc("GetBookingSession", json!({"session_id": 42})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_kind(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_operation_is_not_found() {
    let app = TestApp::new();

    let response = app.rpc("TransferSeat", json!({})).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_kind(), "NOT_FOUND");
}

#[tokio::test]
async fn test_cleanup_over_rpc_uses_service_clock() {
    let app = TestApp::new();
    let session = create_session(&app, "user-1").await;

    let created = app
        .rpc(
            "CreateReservation",
            json!({
                "booking_session_id": session["id"],
                "event_id": "ev-1",
                "seat_id": "H1",
                "zone_id": "Z1",
                "pricing_category": "standard",
                "base_price": 900,
                "final_price": 900,
                "currency": "USD",
                "ttl_seconds": 1,
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let reservation_id = created.data()["id"].clone();

    let cleaned = app.rpc("CleanupExpiredReservations", json!({})).await;
    assert_eq!(cleaned.data()["count"], 0);

    app.clock.advance(Duration::seconds(2));
    let cleaned = app.rpc("CleanupExpiredReservations", json!({})).await;
    assert_eq!(cleaned.data()["count"], 1);

    let fetched = app
        .rpc("GetReservation", json!({"reservation_id": reservation_id}))
        .await;
    assert_eq!(fetched.data()["status"], "released");
    assert_eq!(fetched.data()["released_reason"], "expired");
}

#[tokio::test]
async fn test_oversized_ttl_is_validation_error() {
    let app = TestApp::new();

    for ttl in [9_000_000_000_000_000i64, i64::MAX, 2 * 24 * 60 * 60] {
        let response = app
            .rpc(
                "CreateBookingSession",
                json!({
                    "user_id": "user-1",
                    "event_id": "ev-1",
                    "currency": "USD",
                    "ttl_seconds": ttl,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "ttl {ttl}");
        assert_eq!(response.error_kind(), "VALIDATION_ERROR");
    }

    let session = create_session(&app, "user-1").await;
    let response = app
        .rpc(
            "CreateReservation",
            json!({
                "booking_session_id": session["id"],
                "event_id": "ev-1",
                "seat_id": "T1",
                "zone_id": "Z1",
                "pricing_category": "standard",
                "base_price": 900,
                "final_price": 900,
                "currency": "USD",
                "ttl_seconds": 9_000_000_000_000_000i64,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_kind(), "VALIDATION_ERROR");
    assert!(app.reservations.check_seat_availability("T1").await.unwrap());

    let listed = app
        .rpc("ListUserSessions", json!({"user_id": "user-1"}))
        .await;
    assert_eq!(listed.data()["total"], 1);
}
