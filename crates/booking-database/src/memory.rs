//! In-memory booking store for tests and single-node development runs.
//!
//! Both tables live behind a single Tokio mutex, so every claim or
//! release and its session-total adjustment happen in one critical
//! section. The seat index plays the role of the partial unique index
//! used by the PostgreSQL schema.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_core::types::{BookingSessionId, PageRequest, PageResponse, ReservationId};
use booking_entity::reservation::{CreateSeatReservation, ReservationStatus, SeatReservation};
use booking_entity::session::{BookingSession, CreateBookingSession, SessionStatus};

use crate::store::{CompletedSession, ReservationStore, SessionStore, StatusCounts};

#[derive(Debug, Default)]
struct InnerState {
    sessions: HashMap<BookingSessionId, BookingSession>,
    /// Sessions in insertion order.
    session_order: Vec<BookingSessionId>,
    reservations: HashMap<ReservationId, SeatReservation>,
    /// Reservations in insertion order.
    reservation_order: Vec<ReservationId>,
    /// Seat id -> reservation currently holding it.
    held_seats: HashMap<String, ReservationId>,
}

impl InnerState {
    fn reservations_in_order(&self) -> impl DoubleEndedIterator<Item = &SeatReservation> {
        self.reservation_order
            .iter()
            .filter_map(|id| self.reservations.get(id))
    }

    fn adjust_totals(
        &mut self,
        session_id: BookingSessionId,
        seats: i32,
        amount: i64,
        actor: &str,
        now: DateTime<Utc>,
    ) {
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.seat_count += seats;
            session.total_amount += amount;
            session.updated_at = now;
            session.updated_by = Some(actor.to_string());
        }
    }

    fn release_one(
        &mut self,
        id: ReservationId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Option<SeatReservation> {
        let reservation = self.reservations.get_mut(&id)?;
        if !reservation.status.is_held() {
            return None;
        }

        reservation.status = ReservationStatus::Released;
        reservation.released_at = Some(now);
        reservation.released_reason = Some(reason.to_string());
        reservation.updated_at = now;
        reservation.updated_by = Some(actor.to_string());
        let released = reservation.clone();

        if self.held_seats.get(&released.seat_id) == Some(&id) {
            self.held_seats.remove(&released.seat_id);
        }
        self.adjust_totals(
            released.booking_session_id,
            -1,
            -released.final_price,
            actor,
            now,
        );
        Some(released)
    }
}

/// In-memory implementation of both store traits.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookingStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryBookingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: &PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let offset = page.offset().max(0) as usize;
    let limit = page.limit().max(0) as usize;
    let slice = items.into_iter().skip(offset).take(limit).collect();
    PageResponse::new(slice, page, total)
}

fn count_by_status<'a, S: 'a>(
    statuses: impl Iterator<Item = &'a S>,
    as_str: impl Fn(&S) -> &'static str,
) -> StatusCounts {
    let mut counts = StatusCounts::new();
    for status in statuses {
        *counts.entry(as_str(status).to_string()).or_insert(0) += 1;
    }
    counts
}

#[async_trait]
impl ReservationStore for MemoryBookingStore {
    async fn claim(&self, new: CreateSeatReservation) -> AppResult<SeatReservation> {
        let mut state = self.state.lock().await;

        match state.sessions.get(&new.booking_session_id) {
            None => {
                return Err(AppError::not_found(format!(
                    "Booking session {} not found",
                    new.booking_session_id
                )));
            }
            Some(session) if !session.is_active() => {
                return Err(AppError::invalid_state(format!(
                    "Booking session {} is not active, status: {}",
                    session.id, session.status
                )));
            }
            Some(_) => {}
        }

        if state.held_seats.contains_key(&new.seat_id) {
            return Err(AppError::seat_already_reserved(format!(
                "Seat {} is already reserved",
                new.seat_id
            )));
        }
        if state
            .reservations
            .values()
            .any(|r| r.reservation_token == new.reservation_token)
        {
            return Err(AppError::database("Duplicate reservation token"));
        }

        let actor = new.created_by.clone().unwrap_or_default();
        let reservation = new.into_reservation();
        state
            .held_seats
            .insert(reservation.seat_id.clone(), reservation.id);
        state.reservation_order.push(reservation.id);
        state
            .reservations
            .insert(reservation.id, reservation.clone());
        state.adjust_totals(
            reservation.booking_session_id,
            1,
            reservation.final_price,
            &actor,
            reservation.reserved_at,
        );

        debug!(
            reservation_id = %reservation.id,
            seat_id = %reservation.seat_id,
            "Seat claimed"
        );
        Ok(reservation)
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<SeatReservation>> {
        Ok(self.state.lock().await.reservations.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<SeatReservation>> {
        let state = self.state.lock().await;
        Ok(state
            .reservations
            .values()
            .find(|r| r.reservation_token == token)
            .cloned())
    }

    async fn find_by_session(
        &self,
        session_id: BookingSessionId,
    ) -> AppResult<Vec<SeatReservation>> {
        let state = self.state.lock().await;
        Ok(state
            .reservations_in_order()
            .filter(|r| r.booking_session_id == session_id)
            .cloned()
            .collect())
    }

    async fn find_by_event(
        &self,
        event_id: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SeatReservation>> {
        let state = self.state.lock().await;
        let matching: Vec<SeatReservation> = state
            .reservations_in_order()
            .rev()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }

    async fn find_by_seat(&self, seat_id: &str) -> AppResult<Vec<SeatReservation>> {
        let state = self.state.lock().await;
        Ok(state
            .reservations_in_order()
            .rev()
            .filter(|r| r.seat_id == seat_id)
            .cloned()
            .collect())
    }

    async fn find_active_by_event(
        &self,
        event_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<SeatReservation>> {
        let state = self.state.lock().await;
        let mut active: Vec<SeatReservation> = state
            .reservations_in_order()
            .filter(|r| {
                r.event_id == event_id
                    && r.status == ReservationStatus::Reserved
                    && r.expires_at > now
            })
            .cloned()
            .collect();
        active.sort_by_key(|r| r.reserved_at);
        Ok(active)
    }

    async fn find_held_in_session(
        &self,
        session_id: BookingSessionId,
        seat_id: &str,
    ) -> AppResult<Option<SeatReservation>> {
        let state = self.state.lock().await;
        Ok(state
            .held_seats
            .get(seat_id)
            .and_then(|id| state.reservations.get(id))
            .filter(|r| r.booking_session_id == session_id)
            .cloned())
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<SeatReservation>> {
        let state = self.state.lock().await;
        let mut expired: Vec<SeatReservation> = state
            .reservations_in_order()
            .filter(|r| r.is_expired_at(now))
            .cloned()
            .collect();
        expired.sort_by_key(|r| r.expires_at);
        Ok(expired)
    }

    async fn count_holding_seat(&self, seat_id: &str) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(i64::from(state.held_seats.contains_key(seat_id)))
    }

    async fn confirm(
        &self,
        id: ReservationId,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>> {
        let mut state = self.state.lock().await;
        let Some(reservation) = state.reservations.get_mut(&id) else {
            return Ok(None);
        };
        if reservation.status != ReservationStatus::Reserved {
            return Ok(None);
        }

        reservation.status = ReservationStatus::Confirmed;
        reservation.updated_at = now;
        reservation.updated_by = Some(actor.to_string());
        Ok(Some(reservation.clone()))
    }

    async fn release(
        &self,
        id: ReservationId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>> {
        let mut state = self.state.lock().await;
        Ok(state.release_one(id, reason, actor, now))
    }

    async fn release_by_session(
        &self,
        session_id: BookingSessionId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<SeatReservation>> {
        let mut state = self.state.lock().await;
        let held: Vec<ReservationId> = state
            .reservations_in_order()
            .filter(|r| r.booking_session_id == session_id && r.is_held())
            .map(|r| r.id)
            .collect();

        Ok(held
            .into_iter()
            .filter_map(|id| state.release_one(id, reason, actor, now))
            .collect())
    }

    async fn extend(
        &self,
        id: ReservationId,
        expires_at: DateTime<Utc>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>> {
        let mut state = self.state.lock().await;
        let Some(reservation) = state.reservations.get_mut(&id) else {
            return Ok(None);
        };
        if reservation.status != ReservationStatus::Reserved {
            return Ok(None);
        }

        reservation.expires_at = expires_at;
        reservation.updated_at = now;
        reservation.updated_by = Some(actor.to_string());
        Ok(Some(reservation.clone()))
    }

    async fn stats_by_event(&self, event_id: &str) -> AppResult<StatusCounts> {
        let state = self.state.lock().await;
        Ok(count_by_status(
            state
                .reservations
                .values()
                .filter(|r| r.event_id == event_id)
                .map(|r| &r.status),
            ReservationStatus::as_str,
        ))
    }
}

#[async_trait]
impl SessionStore for MemoryBookingStore {
    async fn insert(&self, new: CreateBookingSession) -> AppResult<BookingSession> {
        let mut state = self.state.lock().await;
        if state
            .sessions
            .values()
            .any(|s| s.session_token == new.session_token)
        {
            return Err(AppError::database("Duplicate session token"));
        }

        let session = new.into_session();
        state.session_order.push(session.id);
        state.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: BookingSessionId) -> AppResult<Option<BookingSession>> {
        Ok(self.state.lock().await.sessions.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<BookingSession>> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .values()
            .find(|s| s.session_token == token)
            .cloned())
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<BookingSession>> {
        let state = self.state.lock().await;
        let matching: Vec<BookingSession> = state
            .session_order
            .iter()
            .rev()
            .filter_map(|id| state.sessions.get(id))
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<BookingSession>> {
        let state = self.state.lock().await;
        let mut expired: Vec<BookingSession> = state
            .sessions
            .values()
            .filter(|s| s.is_expired_at(now))
            .cloned()
            .collect();
        expired.sort_by_key(|s| s.expires_at);
        Ok(expired)
    }

    async fn mark_completed(
        &self,
        id: BookingSessionId,
        paid: &[ReservationId],
        release_reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CompletedSession>> {
        let mut state = self.state.lock().await;
        if !state.sessions.get(&id).is_some_and(|s| s.is_active()) {
            return Ok(None);
        }

        let unpaid: Vec<ReservationId> = state
            .reservations_in_order()
            .filter(|r| {
                r.booking_session_id == id
                    && r.status == ReservationStatus::Reserved
                    && !paid.contains(&r.id)
            })
            .map(|r| r.id)
            .collect();
        let released: Vec<SeatReservation> = unpaid
            .into_iter()
            .filter_map(|rid| state.release_one(rid, release_reason, actor, now))
            .collect();

        let Some(session) = state.sessions.get_mut(&id) else {
            return Ok(None);
        };
        session.status = SessionStatus::Completed;
        session.completed_at = Some(now);
        session.updated_at = now;
        session.updated_by = Some(actor.to_string());

        Ok(Some(CompletedSession {
            session: session.clone(),
            released,
        }))
    }

    async fn mark_cancelled(
        &self,
        id: BookingSessionId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<BookingSession>> {
        let mut state = self.state.lock().await;
        let Some(session) = state.sessions.get_mut(&id) else {
            return Ok(None);
        };
        if !session.is_active() {
            return Ok(None);
        }

        session.status = SessionStatus::Cancelled;
        session.cancelled_at = Some(now);
        session.cancelled_reason = Some(reason.to_string());
        session.updated_at = now;
        session.updated_by = Some(actor.to_string());
        Ok(Some(session.clone()))
    }

    async fn stats_by_event(&self, event_id: &str) -> AppResult<StatusCounts> {
        let state = self.state.lock().await;
        Ok(count_by_status(
            state
                .sessions
                .values()
                .filter(|s| s.event_id == event_id)
                .map(|s| &s.status),
            SessionStatus::as_str,
        ))
    }
}
