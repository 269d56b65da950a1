//! Manager wiring over the in-memory store and mock gateways.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use booking_core::config::BookingConfig;
use booking_core::traits::{Clock, ManualClock};
use booking_database::MemoryBookingStore;
use booking_entity::{BookingSession, ClientMeta, SeatPricing};
use booking_gateway::{MockAvailabilityGateway, MockPaymentGateway};

use crate::reservation::{CreateReservationRequest, ReservationManager};
use crate::session::{AddSeatRequest, BookingSessionManager, CreateSessionRequest};

pub(crate) struct Harness {
    pub availability: MockAvailabilityGateway,
    pub payments: MockPaymentGateway,
    pub clock: Arc<ManualClock>,
    pub reservations: Arc<ReservationManager>,
    pub sessions: BookingSessionManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(BookingConfig::default())
    }

    pub fn with_max_seats(max: i32) -> Self {
        Self::with_config(BookingConfig {
            max_seats_per_session: max,
            ..BookingConfig::default()
        })
    }

    fn with_config(config: BookingConfig) -> Self {
        let store = Arc::new(MemoryBookingStore::new());
        let availability = MockAvailabilityGateway::new();
        let payments = MockPaymentGateway::new();
        let start: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));

        let reservations = Arc::new(ReservationManager::new(
            store.clone(),
            store.clone(),
            Arc::new(availability.clone()),
            clock.clone(),
            config.clone(),
        ));
        let sessions = BookingSessionManager::new(
            store,
            reservations.clone(),
            Arc::new(payments.clone()),
            clock.clone(),
            config,
        );

        Self {
            availability,
            payments,
            clock,
            reservations,
            sessions,
        }
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn open_session(&self) -> BookingSession {
        self.sessions
            .create_booking_session(
                CreateSessionRequest {
                    user_id: "user-1".into(),
                    event_id: "ev-1".into(),
                    currency: "USD".into(),
                    ttl: None,
                    client: ClientMeta::default(),
                },
                "user-1",
            )
            .await
            .unwrap()
    }

    pub fn seat_request(
        &self,
        session: &BookingSession,
        seat_id: &str,
        price: i64,
    ) -> CreateReservationRequest {
        CreateReservationRequest {
            booking_session_id: session.id,
            event_id: session.event_id.clone(),
            seat_id: seat_id.into(),
            zone_id: "Z1".into(),
            pricing: pricing(price),
            currency: "USD".into(),
            ttl: None,
            metadata: None,
        }
    }

    pub fn add_seat(&self, seat_id: &str, price: i64) -> AddSeatRequest {
        AddSeatRequest {
            seat_id: seat_id.into(),
            zone_id: "Z1".into(),
            pricing: pricing(price),
            currency: "USD".into(),
            metadata: None,
        }
    }
}

fn pricing(price: i64) -> SeatPricing {
    SeatPricing {
        pricing_category: "standard".into(),
        base_price: price,
        final_price: price,
    }
}
