//! Expiry sweep over lapsed holds and sessions.

use chrono::Duration;

use booking_entity::{ReservationStatus, SeatPricing, SessionStatus};
use booking_service::CreateReservationRequest;
use booking_worker::SweepReport;

use crate::helpers::{TestApp, seat};

#[tokio::test]
async fn test_sweep_releases_lapsed_holds_only() {
    let app = TestApp::new();
    let session = app.open_session("user-1").await;

    let paid = app
        .sessions
        .add_seat_to_session(session.id, seat("F1", 2000), "user-1")
        .await
        .unwrap();
    app.reservations
        .confirm_reservation(paid.id, "user-1")
        .await
        .unwrap();

    let short = app
        .reservations
        .create_reservation(
            CreateReservationRequest {
                booking_session_id: session.id,
                event_id: "ev-1".to_string(),
                seat_id: "F2".to_string(),
                zone_id: "Z1".to_string(),
                pricing: SeatPricing {
                    pricing_category: "standard".to_string(),
                    base_price: 1500,
                    final_price: 1500,
                },
                currency: "USD".to_string(),
                ttl: Some(Duration::seconds(1)),
                metadata: None,
            },
            "user-1",
        )
        .await
        .unwrap();

    app.clock.advance(Duration::seconds(2));
    let report = app.sweeper.sweep(app.now()).await;
    assert_eq!(
        report,
        SweepReport {
            sessions_cancelled: 0,
            reservations_released: 1,
        }
    );

    let short = app.reservations.get_reservation(short.id).await.unwrap();
    assert_eq!(short.status, ReservationStatus::Released);
    assert_eq!(short.released_reason.as_deref(), Some("expired"));
    assert_eq!(short.updated_by.as_deref(), Some("system"));

    let paid = app.reservations.get_reservation(paid.id).await.unwrap();
    assert_eq!(paid.status, ReservationStatus::Confirmed);

    let current = app.sessions.get_booking_session(session.id).await.unwrap();
    assert_eq!(current.status, SessionStatus::Active);
    assert_eq!(current.seat_count, 1);
    assert_eq!(current.total_amount, 2000);
    assert!(app.reservations.check_seat_availability("F2").await.unwrap());
}

#[tokio::test]
async fn test_sweep_cancels_lapsed_sessions_and_frees_their_seats() {
    let app = TestApp::new();
    let session = app.open_session("user-1").await;
    app.sessions
        .add_seat_to_session(session.id, seat("G1", 2500), "user-1")
        .await
        .unwrap();

    app.clock.advance(Duration::minutes(16));

    let err = app
        .sessions
        .add_seat_to_session(session.id, seat("G2", 2500), "user-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, booking_core::error::ErrorKind::InvalidState);

    let report = app.sweeper.sweep(app.now()).await;
    assert_eq!(report.sessions_cancelled, 1);

    let current = app.sessions.get_booking_session(session.id).await.unwrap();
    assert_eq!(current.status, SessionStatus::Cancelled);
    assert_eq!(current.cancelled_reason.as_deref(), Some("expired"));

    let seats = app
        .sessions
        .get_session_reservations(session.id)
        .await
        .unwrap();
    assert!(seats.iter().all(|r| r.status == ReservationStatus::Released));
    assert!(app.reservations.check_seat_availability("G1").await.unwrap());

    assert_eq!(app.sweeper.sweep(app.now()).await, SweepReport::default());
}
