//! Reservation lifecycle: confirm, release, extend and lookups.

use chrono::Duration;

use booking_core::error::ErrorKind;
use booking_core::types::{BookingSessionId, PageRequest};
use booking_entity::{ReservationStatus, SeatPricing};
use booking_service::CreateReservationRequest;

use crate::helpers::{TestApp, seat};

fn standalone(session_id: BookingSessionId, seat_id: &str) -> CreateReservationRequest {
    CreateReservationRequest {
        booking_session_id: session_id,
        event_id: "ev-1".to_string(),
        seat_id: seat_id.to_string(),
        zone_id: "Z2".to_string(),
        pricing: SeatPricing {
            pricing_category: "vip".to_string(),
            base_price: 9000,
            final_price: 8100,
        },
        currency: "USD".to_string(),
        ttl: Some(Duration::minutes(5)),
        metadata: Some(serde_json::json!({"source": "box-office"})),
    }
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let app = TestApp::new();
    let session = app.open_session("user-1").await;
    let held = app
        .sessions
        .add_seat_to_session(session.id, seat("A1", 4000), "user-1")
        .await
        .unwrap();

    let first = app
        .reservations
        .release_reservation(held.id, "user_released", "user-1")
        .await
        .unwrap();
    assert_eq!(first.status, ReservationStatus::Released);
    let released_at = first.released_at.expect("released_at set");

    app.clock.advance(Duration::minutes(1));
    let second = app
        .reservations
        .release_reservation(held.id, "other_reason", "user-1")
        .await
        .unwrap();
    assert_eq!(second.status, ReservationStatus::Released);
    assert_eq!(second.released_at, Some(released_at));
    assert_eq!(second.released_reason.as_deref(), Some("user_released"));

    // Only the first release reaches the upstream service.
    assert_eq!(app.availability.release_calls().await.len(), 1);

    let current = app.sessions.get_booking_session(session.id).await.unwrap();
    assert_eq!(current.seat_count, 0);
    assert_eq!(current.total_amount, 0);
}

#[tokio::test]
async fn test_confirm_is_idempotent_and_final_for_released() {
    let app = TestApp::new();
    let session = app.open_session("user-1").await;
    let kept = app
        .sessions
        .add_seat_to_session(session.id, seat("A1", 4000), "user-1")
        .await
        .unwrap();
    let dropped = app
        .sessions
        .add_seat_to_session(session.id, seat("A2", 4000), "user-1")
        .await
        .unwrap();

    let first = app
        .reservations
        .confirm_reservation(kept.id, "user-1")
        .await
        .unwrap();
    assert_eq!(first.status, ReservationStatus::Confirmed);
    let second = app
        .reservations
        .confirm_reservation(kept.id, "user-1")
        .await
        .unwrap();
    assert_eq!(second.status, ReservationStatus::Confirmed);
    assert_eq!(second.updated_at, first.updated_at);

    app.reservations
        .release_reservation(dropped.id, "user_released", "user-1")
        .await
        .unwrap();
    let err = app
        .reservations
        .confirm_reservation(dropped.id, "user-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_extend_moves_deadline_and_reblocks() {
    let app = TestApp::new();
    let session = app.open_session("user-1").await;
    let held = app
        .reservations
        .create_reservation(standalone(session.id, "V1"), "user-1")
        .await
        .unwrap();
    assert_eq!(held.expires_at, app.now() + Duration::minutes(5));
    assert_eq!(held.final_price, 8100);

    app.clock.advance(Duration::minutes(2));
    let extended = app
        .reservations
        .extend_reservation(held.id, 10, "user-1")
        .await
        .unwrap();
    assert_eq!(extended.expires_at, app.now() + Duration::minutes(10));

    let blocks = app.availability.block_calls().await;
    let last = blocks.last().expect("remote block issued");
    assert_eq!(last.seat_ids, vec!["V1".to_string()]);
    assert_eq!(last.blocked_until, extended.expires_at);

    let err = app
        .reservations
        .extend_reservation(held.id, 31, "user-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    app.reservations
        .confirm_reservation(held.id, "user-1")
        .await
        .unwrap();
    let err = app
        .reservations
        .extend_reservation(held.id, 5, "user-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_standalone_reservation_counts_towards_session() {
    let app = TestApp::new();
    let session = app.open_session("user-1").await;

    let held = app
        .reservations
        .create_reservation(standalone(session.id, "V2"), "clerk")
        .await
        .unwrap();
    assert!(held.reservation_token.starts_with("rsv_"));
    assert_eq!(held.created_by.as_deref(), Some("clerk"));

    let by_token = app
        .reservations
        .get_reservation_by_token(&held.reservation_token)
        .await
        .unwrap();
    assert_eq!(by_token.id, held.id);

    let current = app.sessions.get_booking_session(session.id).await.unwrap();
    assert_eq!(current.seat_count, 1);
    assert_eq!(current.total_amount, 8100);

    let active = app.reservations.get_active_reservations("ev-1").await.unwrap();
    assert_eq!(active.len(), 1);

    let mut wrong_currency = standalone(session.id, "V3");
    wrong_currency.currency = "EUR".to_string();
    let err = app
        .reservations
        .create_reservation(wrong_currency, "clerk")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_reservation_requires_live_session() {
    let app = TestApp::new();

    let err = app
        .reservations
        .create_reservation(
            standalone(BookingSessionId::new(), "V4"),
            "clerk",
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let session = app.open_session("user-1").await;
    app.sessions
        .cancel_booking_session(session.id, "user_cancelled", "user-1")
        .await
        .unwrap();
    let err = app
        .reservations
        .create_reservation(standalone(session.id, "V4"), "clerk")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_upstream_outage_blocks_new_holds_only() {
    let app = TestApp::new();
    let session = app.open_session("user-1").await;
    let held = app
        .sessions
        .add_seat_to_session(session.id, seat("U1", 1000), "user-1")
        .await
        .unwrap();

    app.availability.set_unreachable(true).await;
    let err = app
        .sessions
        .add_seat_to_session(session.id, seat("U2", 1000), "user-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UpstreamUnavailable);

    // Local release still succeeds while the remote release fails.
    let released = app
        .reservations
        .release_reservation(held.id, "user_released", "user-1")
        .await
        .unwrap();
    assert_eq!(released.status, ReservationStatus::Released);
}

#[tokio::test]
async fn test_release_by_session_batches_remote_release() {
    let app = TestApp::new();
    let session = app.open_session("user-1").await;
    for id in ["K1", "K2", "K3"] {
        app.sessions
            .add_seat_to_session(session.id, seat(id, 700), "user-1")
            .await
            .unwrap();
    }

    let released = app
        .reservations
        .release_reservations_by_session(session.id, "user_released", "clerk")
        .await
        .unwrap();
    assert_eq!(released.len(), 3);

    let calls = app.availability.release_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "ev-1");
    assert_eq!(calls[0].1.len(), 3);

    let again = app
        .reservations
        .release_reservations_by_session(session.id, "user_released", "clerk")
        .await
        .unwrap();
    assert!(again.is_empty());

    let page = app
        .reservations
        .get_reservations_by_event("ev-1", PageRequest::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|r| r.status == ReservationStatus::Released));
}
