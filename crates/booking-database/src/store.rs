//! Store traits for reservations and booking sessions.
//!
//! Every state-changing method is a conditional write: it only moves a
//! row out of the state it expects and returns `None` when the row was
//! not in that state (or does not exist). Callers reload the row to tell
//! "already done" apart from "illegal".
//!
//! Seat claims and releases also adjust the owning session's
//! `seat_count` / `total_amount` within the same write, so session
//! aggregates can never drift from the reservation rows.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use booking_core::result::AppResult;
use booking_core::types::{BookingSessionId, PageRequest, PageResponse, ReservationId};
use booking_entity::{BookingSession, CreateBookingSession, CreateSeatReservation, SeatReservation};

/// Row counts keyed by lowercase status name.
pub type StatusCounts = BTreeMap<String, i64>;

/// Outcome of a successful completion.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    /// The session after the transition.
    pub session: BookingSession,
    /// Unpaid reservations released by the completion.
    pub released: Vec<SeatReservation>,
}

/// Persistence for seat reservations.
#[async_trait]
pub trait ReservationStore: Send + Sync + 'static {
    /// Atomically claim a seat for an active session.
    ///
    /// Fails with `SeatAlreadyReserved` when another `reserved` or
    /// `confirmed` reservation holds the seat, `NotFound` when the session
    /// does not exist, and `InvalidState` when it is no longer active.
    async fn claim(&self, new: CreateSeatReservation) -> AppResult<SeatReservation>;

    /// Find a reservation by id.
    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<SeatReservation>>;

    /// Find a reservation by its lookup token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<SeatReservation>>;

    /// All reservations of a session, oldest first, terminal ones included.
    async fn find_by_session(&self, session_id: BookingSessionId)
    -> AppResult<Vec<SeatReservation>>;

    /// Reservations of an event, newest first.
    async fn find_by_event(
        &self,
        event_id: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SeatReservation>>;

    /// Reservation history of a seat, newest first.
    async fn find_by_seat(&self, seat_id: &str) -> AppResult<Vec<SeatReservation>>;

    /// `reserved` reservations of an event whose deadline is after `now`.
    async fn find_active_by_event(
        &self,
        event_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<SeatReservation>>;

    /// The reservation of `session_id` currently holding `seat_id`.
    async fn find_held_in_session(
        &self,
        session_id: BookingSessionId,
        seat_id: &str,
    ) -> AppResult<Option<SeatReservation>>;

    /// `reserved` reservations whose deadline is before `now`.
    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<SeatReservation>>;

    /// Number of reservations currently holding a seat (0 or 1).
    async fn count_holding_seat(&self, seat_id: &str) -> AppResult<i64>;

    /// `reserved -> confirmed`.
    async fn confirm(
        &self,
        id: ReservationId,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>>;

    /// `reserved | confirmed -> released`, decrementing the session totals.
    async fn release(
        &self,
        id: ReservationId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>>;

    /// Release every held reservation of a session in one write.
    ///
    /// Returns only the rows that actually transitioned.
    async fn release_by_session(
        &self,
        session_id: BookingSessionId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<SeatReservation>>;

    /// Move the deadline of a `reserved` reservation.
    async fn extend(
        &self,
        id: ReservationId,
        expires_at: DateTime<Utc>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>>;

    /// Reservation counts per status for an event.
    async fn stats_by_event(&self, event_id: &str) -> AppResult<StatusCounts>;
}

/// Persistence for booking sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Insert a new `active` session.
    async fn insert(&self, new: CreateBookingSession) -> AppResult<BookingSession>;

    /// Find a session by id.
    async fn find_by_id(&self, id: BookingSessionId) -> AppResult<Option<BookingSession>>;

    /// Find a session by its lookup token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<BookingSession>>;

    /// Sessions of a user, newest first.
    async fn find_by_user(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<BookingSession>>;

    /// `active` sessions whose deadline is before `now`.
    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<BookingSession>>;

    /// `active -> completed`, keeping only the `paid` reservations.
    ///
    /// In the same write, every `reserved` reservation of the session that
    /// is not listed in `paid` is released with `release_reason` and the
    /// totals shrink to match. Claims that race with the completion either
    /// land before it (and are released here) or fail because the session
    /// is no longer active.
    async fn mark_completed(
        &self,
        id: BookingSessionId,
        paid: &[ReservationId],
        release_reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CompletedSession>>;

    /// `active -> cancelled`.
    async fn mark_cancelled(
        &self,
        id: BookingSessionId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<BookingSession>>;

    /// Session counts per status for an event.
    async fn stats_by_event(&self, event_id: &str) -> AppResult<StatusCounts>;
}
