//! Reservation manager: the seat reservation state machine.
//!
//! ```text
//! reserved ──► confirmed ──► released
//!     └──────────────────────┘
//! ```
//!
//! Local storage is authoritative for seat exclusivity. The Availability
//! Service is told about blocks and releases after the local write has
//! committed; failures there are logged and never undo the local state.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use booking_core::config::BookingConfig;
use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_core::traits::Clock;
use booking_core::types::{BookingSessionId, PageRequest, PageResponse, ReservationId};
use booking_database::{ReservationStore, SessionStore, StatusCounts};
use booking_entity::{BookingSession, CreateSeatReservation, ReservationStatus, SeatReservation};
use booking_gateway::{AvailabilityGateway, BlockSeatsRequest};

use super::request::CreateReservationRequest;
use crate::token::TokenGenerator;
use crate::{EXPIRED_REASON, SYSTEM_ACTOR, validate};

/// Creates, confirms, releases, extends and expires seat reservations.
pub struct ReservationManager {
    reservations: Arc<dyn ReservationStore>,
    sessions: Arc<dyn SessionStore>,
    availability: Arc<dyn AvailabilityGateway>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
    tokens: TokenGenerator,
}

impl fmt::Debug for ReservationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReservationManager {
    /// Creates a new reservation manager.
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        sessions: Arc<dyn SessionStore>,
        availability: Arc<dyn AvailabilityGateway>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
    ) -> Self {
        Self {
            reservations,
            sessions,
            availability,
            clock,
            config,
            tokens: TokenGenerator::new(),
        }
    }

    /// Reserves a seat for `ttl` (or the configured default) from now.
    ///
    /// Fails with `SeatUnavailable` when the Availability Service reports
    /// the seat as taken, and with `SeatAlreadyReserved` when another
    /// reservation holds it locally.
    pub async fn create_reservation(
        &self,
        req: CreateReservationRequest,
        actor: &str,
    ) -> AppResult<SeatReservation> {
        req.validate()?;

        let session = self
            .sessions
            .find_by_id(req.booking_session_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Booking session {} not found",
                    req.booking_session_id
                ))
            })?;

        let ttl = req
            .ttl
            .unwrap_or_else(|| self.config.default_reservation_ttl());
        let expires_at = validate::deadline(self.clock.now(), ttl, self.config.max_ttl())?;

        self.reserve_seat(&session, req, expires_at, actor).await
    }

    /// Claims a seat for `session` until `expires_at` and blocks it remotely.
    pub(crate) async fn reserve_seat(
        &self,
        session: &BookingSession,
        req: CreateReservationRequest,
        expires_at: DateTime<Utc>,
        actor: &str,
    ) -> AppResult<SeatReservation> {
        if req.currency != session.currency {
            return Err(AppError::validation(format!(
                "Currency {} does not match session currency {}",
                req.currency, session.currency
            )));
        }

        let availability = self
            .availability
            .get_seat_availability(&req.event_id, &req.seat_id)
            .await?;
        if !availability.is_available() {
            return Err(AppError::seat_unavailable(format!(
                "Seat {} is not available, status: {}",
                req.seat_id, availability.status
            )));
        }

        let reservation = self
            .reservations
            .claim(CreateSeatReservation {
                id: ReservationId::new(),
                booking_session_id: session.id,
                event_id: req.event_id,
                seat_id: req.seat_id,
                zone_id: req.zone_id,
                reservation_token: self.tokens.reservation_token(),
                pricing: req.pricing,
                currency: req.currency,
                reserved_at: self.clock.now(),
                expires_at,
                metadata: req.metadata.unwrap_or_else(|| serde_json::json!({})),
                created_by: Some(actor.to_string()),
            })
            .await?;

        info!(
            reservation_id = %reservation.id,
            session_id = %session.id,
            seat_id = %reservation.seat_id,
            expires_at = %reservation.expires_at,
            "Seat reserved"
        );

        let reason = format!(
            "Reserved for session {} by user {}",
            session.id, session.user_id
        );
        self.block_remote(&reservation, reason).await;

        Ok(reservation)
    }

    /// Moves a `reserved` reservation to `confirmed`.
    ///
    /// Confirming an already confirmed reservation succeeds without change.
    pub async fn confirm_reservation(
        &self,
        id: ReservationId,
        actor: &str,
    ) -> AppResult<SeatReservation> {
        if let Some(confirmed) = self
            .reservations
            .confirm(id, actor, self.clock.now())
            .await?
        {
            info!(reservation_id = %id, actor = %actor, "Seat reservation confirmed");
            return Ok(confirmed);
        }

        let current = self.get_reservation(id).await?;
        match current.status {
            ReservationStatus::Confirmed => Ok(current),
            status => Err(AppError::invalid_state(format!(
                "Reservation {id} cannot be confirmed, current status: {status}"
            ))),
        }
    }

    /// Releases one reservation and its seat.
    ///
    /// Releasing a reservation that is already terminal succeeds and
    /// returns the row unchanged.
    pub async fn release_reservation(
        &self,
        id: ReservationId,
        reason: &str,
        actor: &str,
    ) -> AppResult<SeatReservation> {
        let released = self
            .reservations
            .release(id, reason, actor, self.clock.now())
            .await?;

        match released {
            Some(reservation) => {
                info!(
                    reservation_id = %id,
                    seat_id = %reservation.seat_id,
                    reason = %reason,
                    actor = %actor,
                    "Seat reservation released"
                );
                self.release_remote(std::slice::from_ref(&reservation)).await;
                Ok(reservation)
            }
            None => self.get_reservation(id).await,
        }
    }

    /// Releases every held reservation of a session.
    ///
    /// Returns the reservations that were released by this call.
    pub async fn release_reservations_by_session(
        &self,
        session_id: BookingSessionId,
        reason: &str,
        actor: &str,
    ) -> AppResult<Vec<SeatReservation>> {
        self.release_session_seats(session_id, reason, actor, self.clock.now())
            .await
    }

    pub(crate) async fn release_session_seats(
        &self,
        session_id: BookingSessionId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<SeatReservation>> {
        let released = self
            .reservations
            .release_by_session(session_id, reason, actor, now)
            .await?;

        if !released.is_empty() {
            info!(
                session_id = %session_id,
                released = released.len(),
                reason = %reason,
                "Session reservations released"
            );
            self.release_remote(&released).await;
        }
        Ok(released)
    }

    /// Pushes the deadline of a `reserved` reservation to now plus
    /// `extra_minutes` and re-issues the remote block.
    pub async fn extend_reservation(
        &self,
        id: ReservationId,
        extra_minutes: i64,
        actor: &str,
    ) -> AppResult<SeatReservation> {
        if extra_minutes <= 0 {
            return Err(AppError::validation("extension_minutes must be positive"));
        }
        if extra_minutes > self.config.max_extension_minutes {
            return Err(AppError::validation(format!(
                "extension_minutes must not exceed {}",
                self.config.max_extension_minutes
            )));
        }

        let now = self.clock.now();
        let expires_at = Duration::try_minutes(extra_minutes)
            .and_then(|extra| now.checked_add_signed(extra))
            .ok_or_else(|| AppError::validation("extension_minutes is out of range"))?;

        let Some(extended) = self.reservations.extend(id, expires_at, actor, now).await? else {
            let current = self.get_reservation(id).await?;
            return Err(AppError::invalid_state(format!(
                "Reservation {id} cannot be extended, current status: {}",
                current.status
            )));
        };

        info!(
            reservation_id = %id,
            extension_minutes = extra_minutes,
            expires_at = %extended.expires_at,
            actor = %actor,
            "Seat reservation extended"
        );

        let reason = format!(
            "Extended reservation for session {}",
            extended.booking_session_id
        );
        self.block_remote(&extended, reason).await;

        Ok(extended)
    }

    /// Releases every `reserved` reservation whose deadline is before `now`.
    ///
    /// Rows confirmed or released concurrently are skipped. Returns the
    /// number of reservations released by this sweep.
    pub async fn cleanup_expired_reservations(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let expired = self.reservations.find_expired(now).await?;
        let candidates = expired.len();

        let mut released = Vec::new();
        for reservation in expired {
            match self
                .reservations
                .release(reservation.id, EXPIRED_REASON, SYSTEM_ACTOR, now)
                .await
            {
                Ok(Some(row)) => released.push(row),
                Ok(None) => {
                    debug!(reservation_id = %reservation.id, "Reservation left reserved state before sweep");
                }
                Err(e) => {
                    error!(
                        reservation_id = %reservation.id,
                        error = %e,
                        "Failed to release expired reservation"
                    );
                }
            }
        }

        self.release_remote(&released).await;

        if candidates > 0 {
            info!(
                candidates,
                released = released.len(),
                "Expired reservation cleanup completed"
            );
        }
        Ok(released.len())
    }

    /// Fetch a reservation by id.
    pub async fn get_reservation(&self, id: ReservationId) -> AppResult<SeatReservation> {
        self.reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))
    }

    /// Fetch a reservation by its lookup token.
    pub async fn get_reservation_by_token(&self, token: &str) -> AppResult<SeatReservation> {
        self.reservations
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Reservation not found"))
    }

    /// Whether no live reservation holds the seat.
    pub async fn check_seat_availability(&self, seat_id: &str) -> AppResult<bool> {
        validate::require("seat_id", seat_id)?;
        Ok(self.reservations.count_holding_seat(seat_id).await? == 0)
    }

    /// Reservation counts per status for an event.
    pub async fn get_reservation_stats(&self, event_id: &str) -> AppResult<StatusCounts> {
        validate::require("event_id", event_id)?;
        self.reservations.stats_by_event(event_id).await
    }

    /// All reservations of a session, terminal ones included.
    pub async fn get_reservations_by_session(
        &self,
        session_id: BookingSessionId,
    ) -> AppResult<Vec<SeatReservation>> {
        self.reservations.find_by_session(session_id).await
    }

    pub async fn get_reservations_by_event(
        &self,
        event_id: &str,
        page: PageRequest,
    ) -> AppResult<PageResponse<SeatReservation>> {
        validate::require("event_id", event_id)?;
        self.reservations
            .find_by_event(event_id, &page.normalized())
            .await
    }

    pub async fn get_reservations_by_seat(&self, seat_id: &str) -> AppResult<Vec<SeatReservation>> {
        validate::require("seat_id", seat_id)?;
        self.reservations.find_by_seat(seat_id).await
    }

    /// `reserved` reservations of an event that have not lapsed yet.
    pub async fn get_active_reservations(&self, event_id: &str) -> AppResult<Vec<SeatReservation>> {
        validate::require("event_id", event_id)?;
        self.reservations
            .find_active_by_event(event_id, self.clock.now())
            .await
    }

    /// The reservation of `session_id` currently holding `seat_id`.
    pub(crate) async fn find_held_seat(
        &self,
        session_id: BookingSessionId,
        seat_id: &str,
    ) -> AppResult<Option<SeatReservation>> {
        self.reservations
            .find_held_in_session(session_id, seat_id)
            .await
    }

    async fn block_remote(&self, reservation: &SeatReservation, reason: String) {
        let request = BlockSeatsRequest {
            event_id: reservation.event_id.clone(),
            seat_ids: vec![reservation.seat_id.clone()],
            reason,
            blocked_until: reservation.expires_at,
        };

        match self.availability.block_seats(request).await {
            Ok(result) if result.failed_seat_ids.is_empty() => {}
            Ok(result) => {
                warn!(
                    reservation_id = %reservation.id,
                    failed_seat_ids = ?result.failed_seat_ids,
                    "Availability service refused seat block; local reservation stands"
                );
            }
            Err(e) => {
                warn!(
                    reservation_id = %reservation.id,
                    seat_id = %reservation.seat_id,
                    error = %e,
                    "Failed to block seat remotely; local reservation stands"
                );
            }
        }
    }

    pub(crate) async fn release_remote(&self, released: &[SeatReservation]) {
        let mut by_event: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for reservation in released {
            by_event
                .entry(reservation.event_id.as_str())
                .or_default()
                .push(reservation.seat_id.clone());
        }

        for (event_id, seat_ids) in by_event {
            match self.availability.release_seats(event_id, &seat_ids).await {
                Ok(result) if result.failed_seat_ids.is_empty() => {}
                Ok(result) => {
                    warn!(
                        event_id = %event_id,
                        failed_seat_ids = ?result.failed_seat_ids,
                        "Availability service could not release some seats"
                    );
                }
                Err(e) => {
                    warn!(
                        event_id = %event_id,
                        seats = seat_ids.len(),
                        error = %e,
                        "Failed to release seats remotely; local release stands"
                    );
                }
            }
        }
    }
}
