//! PostgreSQL repositories against a live database.
//!
//! Each test returns early unless `DATABASE_URL` points at a PostgreSQL
//! server. Ids, seats and events are unique per test so runs can share
//! one database.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use booking_core::config::DatabaseConfig;
use booking_core::error::ErrorKind;
use booking_core::types::{BookingSessionId, ReservationId};
use booking_database::migration::run_migrations;
use booking_database::{
    BookingSessionRepository, DatabasePool, ReservationStore, SeatReservationRepository,
    SessionStore,
};
use booking_entity::{
    BookingSession, ClientMeta, CreateBookingSession, CreateSeatReservation, ReservationStatus,
    SeatPricing, SessionStatus,
};

struct PgStores {
    sessions: BookingSessionRepository,
    reservations: SeatReservationRepository,
    /// Event id unique to the calling test.
    event_id: String,
}

async fn connect() -> Option<PgStores> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
        return None;
    };
    let pool = DatabasePool::connect(&DatabaseConfig {
        url,
        max_connections: 10,
        min_connections: 1,
        ..DatabaseConfig::default()
    })
    .await
    .expect("Failed to connect to PostgreSQL");
    run_migrations(pool.pool()).await.expect("Failed to run migrations");

    Some(PgStores {
        sessions: BookingSessionRepository::new(pool.pool().clone()),
        reservations: SeatReservationRepository::new(pool.pool().clone()),
        event_id: format!("ev-{}", BookingSessionId::new()),
    })
}

impl PgStores {
    async fn open_session(&self, now: DateTime<Utc>) -> BookingSession {
        let id = BookingSessionId::new();
        self.sessions
            .insert(CreateBookingSession {
                id,
                user_id: "user-1".to_string(),
                event_id: self.event_id.clone(),
                session_token: format!("bks_{id}"),
                currency: "USD".to_string(),
                created_at: now,
                expires_at: now + Duration::minutes(15),
                client: ClientMeta::default(),
                created_by: Some("user-1".to_string()),
            })
            .await
            .expect("Failed to insert session")
    }

    /// A seat id no other test run uses.
    fn seat(&self, label: &str) -> String {
        format!("{label}-{}", &self.event_id[3..])
    }

    fn claim(
        &self,
        session_id: BookingSessionId,
        seat_id: &str,
        price: i64,
        now: DateTime<Utc>,
    ) -> CreateSeatReservation {
        let id = ReservationId::new();
        CreateSeatReservation {
            id,
            booking_session_id: session_id,
            event_id: self.event_id.clone(),
            seat_id: seat_id.to_string(),
            zone_id: "Z1".to_string(),
            reservation_token: format!("rsv_{id}"),
            pricing: SeatPricing {
                pricing_category: "standard".to_string(),
                base_price: price,
                final_price: price,
            },
            currency: "USD".to_string(),
            reserved_at: now,
            expires_at: now + Duration::minutes(15),
            metadata: serde_json::json!({}),
            created_by: Some("user-1".to_string()),
        }
    }

    async fn totals(&self, id: BookingSessionId) -> (i32, i64) {
        let session = SessionStore::find_by_id(&self.sessions, id)
            .await
            .unwrap()
            .expect("session exists");
        (session.seat_count, session.total_amount)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pg_concurrent_claims_have_one_winner() {
    let Some(stores) = connect().await else {
        return;
    };
    let stores = Arc::new(stores);
    let now = Utc::now();
    let seat_id = stores.seat("A1");

    let mut sessions = Vec::new();
    for _ in 0..8 {
        sessions.push(stores.open_session(now).await);
    }

    let mut handles = Vec::new();
    for session in &sessions {
        let stores = Arc::clone(&stores);
        let claim = stores.claim(session.id, &seat_id, 5000, now);
        handles.push(tokio::spawn(async move {
            stores.reservations.claim(claim).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e.kind, ErrorKind::SeatAlreadyReserved, "{e}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(stores.reservations.count_holding_seat(&seat_id).await.unwrap(), 1);

    // Losers' total increments were rolled back with their inserts.
    let mut counted = Vec::new();
    for session in &sessions {
        counted.push(stores.totals(session.id).await);
    }
    assert_eq!(counted.iter().filter(|t| **t == (1, 5000)).count(), 1);
    assert_eq!(counted.iter().filter(|t| **t == (0, 0)).count(), 7);
}

#[tokio::test]
async fn test_pg_duplicate_seat_maps_to_already_reserved() {
    let Some(stores) = connect().await else {
        return;
    };
    let now = Utc::now();
    let first = stores.open_session(now).await;
    let second = stores.open_session(now).await;
    let seat_id = stores.seat("B1");

    stores
        .reservations
        .claim(stores.claim(first.id, &seat_id, 1200, now))
        .await
        .unwrap();
    let err = stores
        .reservations
        .claim(stores.claim(second.id, &seat_id, 1200, now))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::SeatAlreadyReserved);
    assert_eq!(stores.totals(second.id).await, (0, 0));

    // A reused reservation token is a database error, not a seat conflict.
    let mut reused = stores.claim(second.id, &stores.seat("B2"), 100, now);
    let held = stores
        .reservations
        .claim(stores.claim(second.id, &stores.seat("B3"), 100, now))
        .await
        .unwrap();
    reused.reservation_token = held.reservation_token;
    let err = stores.reservations.claim(reused).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(stores.totals(second.id).await, (1, 100));
}

#[tokio::test]
async fn test_pg_claim_requires_active_session() {
    let Some(stores) = connect().await else {
        return;
    };
    let now = Utc::now();

    let err = stores
        .reservations
        .claim(stores.claim(BookingSessionId::new(), &stores.seat("C1"), 100, now))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let session = stores.open_session(now).await;
    let cancelled = stores
        .sessions
        .mark_cancelled(session.id, "user_cancelled", "user-1", now)
        .await
        .unwrap()
        .expect("active session cancels");
    assert_eq!(cancelled.status, SessionStatus::Cancelled);
    assert!(stores
        .sessions
        .mark_cancelled(session.id, "other", "user-1", now)
        .await
        .unwrap()
        .is_none());

    let err = stores
        .reservations
        .claim(stores.claim(session.id, &stores.seat("C1"), 100, now))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_pg_release_keeps_totals_consistent() {
    let Some(stores) = connect().await else {
        return;
    };
    let now = Utc::now();
    let session = stores.open_session(now).await;

    let mut held = Vec::new();
    for (label, price) in [("D1", 500), ("D2", 300), ("D3", 200)] {
        held.push(
            stores
                .reservations
                .claim(stores.claim(session.id, &stores.seat(label), price, now))
                .await
                .unwrap(),
        );
    }
    assert_eq!(stores.totals(session.id).await, (3, 1000));

    let released = stores
        .reservations
        .release(held[0].id, "user_released", "user-1", now)
        .await
        .unwrap()
        .expect("held seat releases");
    assert_eq!(released.status, ReservationStatus::Released);
    assert_eq!(released.released_reason.as_deref(), Some("user_released"));
    assert_eq!(stores.totals(session.id).await, (2, 500));

    // Second release is a no-op and leaves the totals alone.
    assert!(stores
        .reservations
        .release(held[0].id, "user_released", "user-1", now)
        .await
        .unwrap()
        .is_none());
    assert_eq!(stores.totals(session.id).await, (2, 500));

    // Confirmed rows are released by a session-wide release too.
    stores.reservations.confirm(held[1].id, "user-1", now).await.unwrap();
    let batch = stores
        .reservations
        .release_by_session(session.id, "user_cancelled", "user-1", now)
        .await
        .unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(stores.totals(session.id).await, (0, 0));
    assert!(stores
        .reservations
        .release_by_session(session.id, "user_cancelled", "user-1", now)
        .await
        .unwrap()
        .is_empty());

    // The seat is free to claim again.
    stores
        .reservations
        .claim(stores.claim(session.id, &stores.seat("D1"), 500, now))
        .await
        .unwrap();
    assert_eq!(stores.totals(session.id).await, (1, 500));
}

#[tokio::test]
async fn test_pg_transitions_are_conditional() {
    let Some(stores) = connect().await else {
        return;
    };
    let now = Utc::now();
    let session = stores.open_session(now).await;
    let held = stores
        .reservations
        .claim(stores.claim(session.id, &stores.seat("E1"), 700, now))
        .await
        .unwrap();

    let later = now + Duration::minutes(20);
    let extended = stores
        .reservations
        .extend(held.id, later, "user-1", now)
        .await
        .unwrap()
        .expect("reserved row extends");
    assert_eq!(extended.status, ReservationStatus::Reserved);

    assert!(stores.reservations.confirm(held.id, "user-1", now).await.unwrap().is_some());
    assert!(stores.reservations.confirm(held.id, "user-1", now).await.unwrap().is_none());
    assert!(stores
        .reservations
        .extend(held.id, later, "user-1", now)
        .await
        .unwrap()
        .is_none());

    stores
        .reservations
        .release(held.id, "user_released", "user-1", now)
        .await
        .unwrap();
    assert!(stores.reservations.confirm(held.id, "user-1", now).await.unwrap().is_none());

    let stats = stores.reservations.stats_by_event(&stores.event_id).await.unwrap();
    assert_eq!(stats.get("released"), Some(&1));
}

#[tokio::test]
async fn test_pg_completion_releases_unpaid_reservations() {
    let Some(stores) = connect().await else {
        return;
    };
    let now = Utc::now();
    let session = stores.open_session(now).await;
    let paid = stores
        .reservations
        .claim(stores.claim(session.id, &stores.seat("F1"), 5000, now))
        .await
        .unwrap();
    let late_seat = stores.seat("F2");
    let late = stores
        .reservations
        .claim(stores.claim(session.id, &late_seat, 9999, now))
        .await
        .unwrap();

    let completed = stores
        .sessions
        .mark_completed(session.id, &[paid.id], "added_during_completion", "user-1", now)
        .await
        .unwrap()
        .expect("active session completes");
    assert_eq!(completed.session.status, SessionStatus::Completed);
    assert_eq!(completed.session.seat_count, 1);
    assert_eq!(completed.session.total_amount, 5000);
    assert_eq!(completed.released.len(), 1);
    assert_eq!(completed.released[0].id, late.id);
    assert_eq!(stores.reservations.count_holding_seat(&late_seat).await.unwrap(), 0);

    assert!(stores
        .sessions
        .mark_completed(session.id, &[paid.id], "added_during_completion", "user-1", now)
        .await
        .unwrap()
        .is_none());
    let err = stores
        .reservations
        .claim(stores.claim(session.id, &stores.seat("F3"), 100, now))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}
