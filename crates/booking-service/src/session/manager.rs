//! Booking session manager: the session state machine.
//!
//! ```text
//! active ──► completed
//!   │ ▲
//!   │ └── add / remove seat
//!   └──► cancelled
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use booking_core::config::BookingConfig;
use booking_core::error::{AppError, ErrorKind};
use booking_core::result::AppResult;
use booking_core::traits::Clock;
use booking_core::types::{BookingSessionId, PageRequest, PageResponse, ReservationId};
use booking_database::{CompletedSession, SessionStore, StatusCounts};
use booking_entity::{BookingSession, CreateBookingSession, ReservationStatus, SeatReservation};
use booking_gateway::{CapturePaymentRequest, PaymentGateway};

use super::request::{AddSeatRequest, CompletionResult, CreateSessionRequest};
use crate::reservation::{CreateReservationRequest, ReservationManager};
use crate::token::TokenGenerator;
use crate::{EXPIRED_REASON, LATE_SEAT_REASON, SYSTEM_ACTOR, validate};

/// Opens, fills, pays for and cancels booking sessions.
pub struct BookingSessionManager {
    sessions: Arc<dyn SessionStore>,
    reservations: Arc<ReservationManager>,
    payments: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
    tokens: TokenGenerator,
}

impl fmt::Debug for BookingSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingSessionManager")
            .field("reservations", &self.reservations)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BookingSessionManager {
    /// Creates a new booking session manager.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        reservations: Arc<ReservationManager>,
        payments: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
    ) -> Self {
        Self {
            sessions,
            reservations,
            payments,
            clock,
            config,
            tokens: TokenGenerator::new(),
        }
    }

    /// Opens an empty `active` session.
    pub async fn create_booking_session(
        &self,
        req: CreateSessionRequest,
        actor: &str,
    ) -> AppResult<BookingSession> {
        req.validate()?;

        let now = self.clock.now();
        let ttl = req.ttl.unwrap_or_else(|| self.config.default_session_ttl());
        let expires_at = validate::deadline(now, ttl, self.config.max_ttl())?;

        let session = self
            .sessions
            .insert(CreateBookingSession {
                id: BookingSessionId::new(),
                user_id: req.user_id,
                event_id: req.event_id,
                session_token: self.tokens.session_token(),
                currency: req.currency,
                created_at: now,
                expires_at,
                client: req.client,
                created_by: Some(actor.to_string()),
            })
            .await?;

        info!(
            session_id = %session.id,
            user_id = %session.user_id,
            event_id = %session.event_id,
            expires_at = %session.expires_at,
            "Booking session created"
        );
        Ok(session)
    }

    /// Fetch a session by id.
    pub async fn get_booking_session(&self, id: BookingSessionId) -> AppResult<BookingSession> {
        self.sessions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking session {id} not found")))
    }

    /// Fetch a session by its lookup token.
    pub async fn get_booking_session_by_token(&self, token: &str) -> AppResult<BookingSession> {
        self.sessions
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Booking session not found"))
    }

    /// Reserves a seat for the session until the session's own deadline.
    pub async fn add_seat_to_session(
        &self,
        session_id: BookingSessionId,
        req: AddSeatRequest,
        actor: &str,
    ) -> AppResult<SeatReservation> {
        let session = self.get_booking_session(session_id).await?;
        self.ensure_open(&session)?;

        if session.seat_count >= self.config.max_seats_per_session {
            return Err(AppError::validation(format!(
                "A session may hold at most {} seats",
                self.config.max_seats_per_session
            )));
        }

        let request = CreateReservationRequest {
            booking_session_id: session.id,
            event_id: session.event_id.clone(),
            seat_id: req.seat_id,
            zone_id: req.zone_id,
            pricing: req.pricing,
            currency: req.currency,
            ttl: None,
            metadata: req.metadata,
        };
        request.validate()?;

        let reservation = self
            .reservations
            .reserve_seat(&session, request, session.expires_at, actor)
            .await?;

        info!(
            session_id = %session.id,
            seat_id = %reservation.seat_id,
            final_price = reservation.final_price,
            "Seat added to booking session"
        );
        Ok(reservation)
    }

    /// Releases a seat the session currently holds.
    pub async fn remove_seat_from_session(
        &self,
        session_id: BookingSessionId,
        seat_id: &str,
        reason: &str,
        actor: &str,
    ) -> AppResult<SeatReservation> {
        validate::require("seat_id", seat_id)?;

        let session = self.get_booking_session(session_id).await?;
        if !session.is_active() {
            return Err(AppError::invalid_state(format!(
                "Booking session {session_id} is not active, status: {}",
                session.status
            )));
        }

        let held = self
            .reservations
            .find_held_seat(session_id, seat_id)
            .await?
            .ok_or_else(|| {
                AppError::seat_not_in_session(format!(
                    "Seat {seat_id} is not held by booking session {session_id}"
                ))
            })?;

        let released = self
            .reservations
            .release_reservation(held.id, reason, actor)
            .await?;

        info!(
            session_id = %session_id,
            seat_id = %seat_id,
            reason = %reason,
            "Seat removed from booking session"
        );
        Ok(released)
    }

    /// Captures payment for the session and confirms its seats.
    ///
    /// The charge covers the seats `reserved` when completion starts. A
    /// failed capture leaves the session `active` with every seat still
    /// `reserved`. Seats added while the capture is in flight are released
    /// by the completing write, so the session never completes with a seat
    /// nobody paid for. Individual confirm failures after a successful
    /// capture are logged and do not block completion.
    pub async fn complete_booking_session(
        &self,
        session_id: BookingSessionId,
        payment_method: &str,
        actor: &str,
    ) -> AppResult<CompletionResult> {
        validate::require("payment_method", payment_method)?;

        let session = self.get_booking_session(session_id).await?;
        self.ensure_open(&session)?;

        let reserved: Vec<SeatReservation> = self
            .reservations
            .get_reservations_by_session(session_id)
            .await?
            .into_iter()
            .filter(|r| r.status == ReservationStatus::Reserved)
            .collect();
        if reserved.is_empty() {
            return Err(AppError::invalid_state(format!(
                "Booking session {session_id} has no reserved seats"
            )));
        }

        let amount = reserved
            .iter()
            .try_fold(0i64, |sum, r| sum.checked_add(r.final_price))
            .ok_or_else(|| AppError::validation("Session amount exceeds the supported range"))?;
        let paid: Vec<ReservationId> = reserved.iter().map(|r| r.id).collect();

        let payment_id = if amount > 0 {
            let receipt = self
                .payments
                .capture_payment(CapturePaymentRequest {
                    session_id: session.id.to_string(),
                    amount,
                    currency: session.currency.clone(),
                    payment_method: payment_method.to_string(),
                    user_id: session.user_id.clone(),
                    event_id: session.event_id.clone(),
                })
                .await
                .map_err(|e| {
                    warn!(session_id = %session_id, error = %e, "Payment capture failed");
                    if e.is(ErrorKind::PaymentFailed) {
                        e
                    } else {
                        AppError::payment_failed(format!("Payment capture failed: {}", e.message))
                    }
                })?;
            Some(receipt.payment_id)
        } else {
            None
        };

        let mut confirmed = 0usize;
        for reservation in &reserved {
            match self
                .reservations
                .confirm_reservation(reservation.id, actor)
                .await
            {
                Ok(_) => confirmed += 1,
                Err(e) => {
                    warn!(
                        session_id = %session_id,
                        reservation_id = %reservation.id,
                        error = %e,
                        "Failed to confirm reservation during completion"
                    );
                }
            }
        }

        let completed = self
            .sessions
            .mark_completed(session_id, &paid, LATE_SEAT_REASON, actor, self.clock.now())
            .await?;
        let Some(CompletedSession { session: completed, released }) = completed else {
            let current = self.get_booking_session(session_id).await?;
            error!(
                session_id = %session_id,
                status = %current.status,
                payment_id = ?payment_id,
                "Booking session left active state during completion"
            );
            return Err(AppError::invalid_state(format!(
                "Booking session {session_id} is no longer active, status: {}",
                current.status
            )));
        };

        if !released.is_empty() {
            warn!(
                session_id = %session_id,
                released = released.len(),
                "Seats added during payment capture were released"
            );
            self.reservations.release_remote(&released).await;
        }

        info!(
            session_id = %session_id,
            payment_id = ?payment_id,
            seats = completed.seat_count,
            confirmed,
            amount_captured = amount,
            total_amount = completed.total_amount,
            "Booking session completed"
        );

        Ok(CompletionResult {
            session_id,
            payment_id,
            seat_count: completed.seat_count,
            total_amount: completed.total_amount,
            amount_captured: amount,
            currency: completed.currency,
        })
    }

    /// Cancels the session and releases every seat it holds.
    ///
    /// Cancelling a session that is already cancelled or expired succeeds.
    pub async fn cancel_booking_session(
        &self,
        session_id: BookingSessionId,
        reason: &str,
        actor: &str,
    ) -> AppResult<BookingSession> {
        let session = self.get_booking_session(session_id).await?;
        if session.is_completed() {
            return Err(AppError::invalid_state(format!(
                "Booking session {session_id} is already completed"
            )));
        }

        let (session, _) = self
            .cancel(session_id, reason, actor, self.clock.now())
            .await?;
        Ok(session)
    }

    /// Cancels every `active` session whose deadline is before `now`.
    ///
    /// Returns the number of sessions cancelled by this sweep.
    pub async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let expired = self.sessions.find_expired(now).await?;
        let candidates = expired.len();

        let mut cancelled = 0usize;
        for session in expired {
            match self.cancel(session.id, EXPIRED_REASON, SYSTEM_ACTOR, now).await {
                Ok((_, true)) => cancelled += 1,
                Ok((_, false)) => {}
                Err(e) => {
                    error!(
                        session_id = %session.id,
                        error = %e,
                        "Failed to cancel expired booking session"
                    );
                }
            }
        }

        if candidates > 0 {
            info!(candidates, cancelled, "Expired session cleanup completed");
        }
        Ok(cancelled)
    }

    /// All reservations of the session, terminal ones included.
    pub async fn get_session_reservations(
        &self,
        session_id: BookingSessionId,
    ) -> AppResult<Vec<SeatReservation>> {
        self.get_booking_session(session_id).await?;
        self.reservations
            .get_reservations_by_session(session_id)
            .await
    }

    /// Sessions of a user, newest first.
    pub async fn list_user_sessions(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> AppResult<PageResponse<BookingSession>> {
        validate::require("user_id", user_id)?;
        self.sessions
            .find_by_user(user_id, &page.normalized())
            .await
    }

    /// Session counts per status for an event.
    pub async fn get_session_stats(&self, event_id: &str) -> AppResult<StatusCounts> {
        validate::require("event_id", event_id)?;
        self.sessions.stats_by_event(event_id).await
    }

    /// Marks the session cancelled, then releases its seats. The flag
    /// reports whether this call moved the session out of `active`.
    ///
    /// The session leaves `active` first so no claim can land between the
    /// release and the status change. Seats are released on every call,
    /// which also finishes a cancel whose release step failed earlier.
    async fn cancel(
        &self,
        session_id: BookingSessionId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<(BookingSession, bool)> {
        let transitioned = self
            .sessions
            .mark_cancelled(session_id, reason, actor, now)
            .await?;

        if transitioned.is_none() {
            let current = self.get_booking_session(session_id).await?;
            if current.is_completed() {
                return Err(AppError::invalid_state(format!(
                    "Booking session {session_id} is already completed"
                )));
            }
        }

        let released = self
            .reservations
            .release_session_seats(session_id, reason, actor, now)
            .await?;

        let session = self.get_booking_session(session_id).await?;
        if transitioned.is_some() {
            info!(
                session_id = %session_id,
                released = released.len(),
                reason = %reason,
                actor = %actor,
                "Booking session cancelled"
            );
        }
        Ok((session, transitioned.is_some()))
    }

    fn ensure_open(&self, session: &BookingSession) -> AppResult<()> {
        if !session.is_active() {
            return Err(AppError::invalid_state(format!(
                "Booking session {} is not active, status: {}",
                session.id, session.status
            )));
        }
        if session.expires_at <= self.clock.now() {
            return Err(AppError::invalid_state(format!(
                "Booking session {} has expired",
                session.id
            )));
        }
        Ok(())
    }
}
