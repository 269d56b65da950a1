//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use booking_core::config::{AppConfig, MEMORY_DATABASE_URL};
use booking_core::traits::{Clock, ManualClock};
use booking_database::MemoryBookingStore;
use booking_entity::{BookingSession, ClientMeta, SeatPricing};
use booking_gateway::{MockAvailabilityGateway, MockPaymentGateway, PaymentGateway};
use booking_service::{
    AddSeatRequest, BookingSessionManager, CreateSessionRequest, ReservationManager,
};
use booking_worker::ExpirySweeper;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Availability service double
    pub availability: MockAvailabilityGateway,
    /// Payment service double
    pub payments: MockPaymentGateway,
    /// Time source shared by managers and the RPC sweep
    pub clock: Arc<ManualClock>,
    pub sessions: Arc<BookingSessionManager>,
    pub reservations: Arc<ReservationManager>,
    pub sweeper: ExpirySweeper,
}

impl TestApp {
    /// Create a new test application over the in-memory store
    pub fn new() -> Self {
        Self::with_payment_gateway(|_, payments| Arc::new(payments))
    }

    /// Like [`TestApp::new`], with the payment gateway built by `payment`
    /// from the reservation manager and the payment double.
    pub fn with_payment_gateway(
        payment: impl FnOnce(Arc<ReservationManager>, MockPaymentGateway) -> Arc<dyn PaymentGateway>,
    ) -> Self {
        let mut config = AppConfig::default();
        config.database.url = MEMORY_DATABASE_URL.to_string();

        let store = Arc::new(MemoryBookingStore::new());
        let availability = MockAvailabilityGateway::new();
        let payments = MockPaymentGateway::new();
        let clock = Arc::new(ManualClock::new(start_time()));

        let reservations = Arc::new(ReservationManager::new(
            store.clone(),
            store.clone(),
            Arc::new(availability.clone()),
            clock.clone(),
            config.booking.clone(),
        ));
        let sessions = Arc::new(BookingSessionManager::new(
            store,
            reservations.clone(),
            payment(reservations.clone(), payments.clone()),
            clock.clone(),
            config.booking.clone(),
        ));
        let sweeper = ExpirySweeper::new(sessions.clone(), reservations.clone());

        let app_state = booking_api::AppState {
            config: Arc::new(config),
            clock: clock.clone(),
            database: None,
            sessions: sessions.clone(),
            reservations: reservations.clone(),
        };
        let router = booking_api::build_router(app_state);

        Self {
            router,
            availability,
            payments,
            clock,
            sessions,
            reservations,
            sweeper,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Open an active USD session for `user_id` on `ev-1`
    pub async fn open_session(&self, user_id: &str) -> BookingSession {
        self.sessions
            .create_booking_session(
                CreateSessionRequest {
                    user_id: user_id.to_string(),
                    event_id: "ev-1".to_string(),
                    currency: "USD".to_string(),
                    ttl: None,
                    client: ClientMeta::default(),
                },
                user_id,
            )
            .await
            .expect("Failed to open session")
    }

    /// Invoke an RPC operation with a JSON body
    pub async fn rpc(&self, operation: &str, body: Value) -> TestResponse {
        let body_str = serde_json::to_string(&body).expect("Failed to serialize body");
        self.raw("POST", &format!("/rpc/{operation}"), body_str).await
    }

    /// Send a request with an arbitrary body
    pub async fn raw(&self, method: &str, path: &str, body: String) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a successful envelope
    pub fn data(&self) -> &Value {
        assert_eq!(
            self.body["success"],
            Value::Bool(true),
            "Expected success, got {}: {}",
            self.status,
            self.body
        );
        &self.body["data"]
    }

    /// The error kind of a failed envelope
    pub fn error_kind(&self) -> &str {
        assert_eq!(self.body["success"], Value::Bool(false), "{}", self.body);
        self.body["error"]["kind"].as_str().unwrap_or_default()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
}

pub fn seat(seat_id: &str, price: i64) -> AddSeatRequest {
    AddSeatRequest {
        seat_id: seat_id.to_string(),
        zone_id: "Z1".to_string(),
        pricing: SeatPricing {
            pricing_category: "standard".to_string(),
            base_price: price,
            final_price: price,
        },
        currency: "USD".to_string(),
        metadata: None,
    }
}
