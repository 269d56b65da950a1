//! Seat reservation repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};

use booking_core::error::{AppError, ErrorKind};
use booking_core::result::AppResult;
use booking_core::types::{BookingSessionId, PageRequest, PageResponse, ReservationId};
use booking_entity::reservation::{CreateSeatReservation, ReservationStatus, SeatReservation};
use booking_entity::session::SessionStatus;

use crate::store::{ReservationStore, StatusCounts};

/// Name of the partial unique index that enforces one live reservation per seat.
const ACTIVE_SEAT_INDEX: &str = "uq_seat_reservations_active_seat";

/// PostgreSQL-backed reservation store.
#[derive(Debug, Clone)]
pub struct SeatReservationRepository {
    pool: PgPool,
}

impl SeatReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

fn map_claim_error(e: sqlx::Error, seat_id: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(ACTIVE_SEAT_INDEX) {
            return AppError::seat_already_reserved(format!(
                "Seat {seat_id} is already reserved"
            ));
        }
    }
    AppError::with_source(ErrorKind::Database, "Failed to insert seat reservation", e)
}

#[async_trait]
impl ReservationStore for SeatReservationRepository {
    async fn claim(&self, new: CreateSeatReservation) -> AppResult<SeatReservation> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Locks the session row; concurrent claims on the same session queue here.
        let updated = sqlx::query(
            "UPDATE booking_sessions \
             SET seat_count = seat_count + 1, total_amount = total_amount + $2, \
                 updated_at = $3, updated_by = $4 \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(new.booking_session_id)
        .bind(new.pricing.final_price)
        .bind(new.reserved_at)
        .bind(&new.created_by)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update session totals"))?;

        if updated.rows_affected() == 0 {
            let status: Option<SessionStatus> =
                sqlx::query_scalar("SELECT status FROM booking_sessions WHERE id = $1")
                    .bind(new.booking_session_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_error("Failed to load booking session"))?;

            return Err(match status {
                None => AppError::not_found(format!(
                    "Booking session {} not found",
                    new.booking_session_id
                )),
                Some(status) => AppError::invalid_state(format!(
                    "Booking session {} is not active, status: {status}",
                    new.booking_session_id
                )),
            });
        }

        let seat_id = new.seat_id.clone();
        let reservation = sqlx::query_as::<_, SeatReservation>(
            "INSERT INTO seat_reservations ( \
                 id, booking_session_id, event_id, seat_id, zone_id, reservation_token, \
                 status, reserved_at, expires_at, pricing_category, base_price, final_price, \
                 currency, metadata, created_at, updated_at, created_by, updated_by \
             ) VALUES ($1, $2, $3, $4, $5, $6, 'reserved', $7, $8, $9, $10, $11, $12, $13, $7, $7, $14, $14) \
             RETURNING *",
        )
        .bind(new.id)
        .bind(new.booking_session_id)
        .bind(&new.event_id)
        .bind(&new.seat_id)
        .bind(&new.zone_id)
        .bind(&new.reservation_token)
        .bind(new.reserved_at)
        .bind(new.expires_at)
        .bind(&new.pricing.pricing_category)
        .bind(new.pricing.base_price)
        .bind(new.pricing.final_price)
        .bind(&new.currency)
        .bind(&new.metadata)
        .bind(&new.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_claim_error(e, &seat_id))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit seat claim"))?;

        debug!(
            reservation_id = %reservation.id,
            seat_id = %reservation.seat_id,
            "Seat claimed"
        );
        Ok(reservation)
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>("SELECT * FROM seat_reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find seat reservation"))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations WHERE reservation_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find seat reservation by token"))
    }

    async fn find_by_session(
        &self,
        session_id: BookingSessionId,
    ) -> AppResult<Vec<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations WHERE booking_session_id = $1 ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list session reservations"))
    }

    async fn find_by_event(
        &self,
        event_id: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SeatReservation>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM seat_reservations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count event reservations"))?;

        let items = sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations WHERE event_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(event_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list event reservations"))?;

        Ok(PageResponse::new(items, page, total.max(0) as u64))
    }

    async fn find_by_seat(&self, seat_id: &str) -> AppResult<Vec<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations WHERE seat_id = $1 ORDER BY created_at DESC",
        )
        .bind(seat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list seat reservations"))
    }

    async fn find_active_by_event(
        &self,
        event_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations \
             WHERE event_id = $1 AND status = 'reserved' AND expires_at > $2 \
             ORDER BY reserved_at ASC",
        )
        .bind(event_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list active reservations"))
    }

    async fn find_held_in_session(
        &self,
        session_id: BookingSessionId,
        seat_id: &str,
    ) -> AppResult<Option<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations \
             WHERE booking_session_id = $1 AND seat_id = $2 \
               AND status IN ('reserved', 'confirmed')",
        )
        .bind(session_id)
        .bind(seat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find held seat"))
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>(
            "SELECT * FROM seat_reservations \
             WHERE status = 'reserved' AND expires_at < $1 ORDER BY expires_at ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list expired reservations"))
    }

    async fn count_holding_seat(&self, seat_id: &str) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM seat_reservations \
             WHERE seat_id = $1 AND status IN ('reserved', 'confirmed')",
        )
        .bind(seat_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count seat holders"))
    }

    async fn confirm(
        &self,
        id: ReservationId,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>(
            "UPDATE seat_reservations \
             SET status = 'confirmed', updated_at = $2, updated_by = $3 \
             WHERE id = $1 AND status = 'reserved' \
             RETURNING *",
        )
        .bind(id)
        .bind(now)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to confirm seat reservation"))
    }

    async fn release(
        &self,
        id: ReservationId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let released = sqlx::query_as::<_, SeatReservation>(
            "UPDATE seat_reservations \
             SET status = 'released', released_at = $3, released_reason = $2, \
                 updated_at = $3, updated_by = $4 \
             WHERE id = $1 AND status IN ('reserved', 'confirmed') \
             RETURNING *",
        )
        .bind(id)
        .bind(reason)
        .bind(now)
        .bind(actor)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to release seat reservation"))?;

        let Some(released) = released else {
            return Ok(None);
        };

        subtract_from_session(&mut tx, released.booking_session_id, 1, released.final_price, actor, now)
            .await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit seat release"))?;

        Ok(Some(released))
    }

    async fn release_by_session(
        &self,
        session_id: BookingSessionId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<SeatReservation>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let released = sqlx::query_as::<_, SeatReservation>(
            "UPDATE seat_reservations \
             SET status = 'released', released_at = $3, released_reason = $2, \
                 updated_at = $3, updated_by = $4 \
             WHERE booking_session_id = $1 AND status IN ('reserved', 'confirmed') \
             RETURNING *",
        )
        .bind(session_id)
        .bind(reason)
        .bind(now)
        .bind(actor)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to release session reservations"))?;

        if !released.is_empty() {
            let amount: i64 = released.iter().map(|r| r.final_price).sum();
            subtract_from_session(&mut tx, session_id, released.len() as i32, amount, actor, now)
                .await?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit session release"))?;

        info!(
            session_id = %session_id,
            released = released.len(),
            "Session reservations released"
        );
        Ok(released)
    }

    async fn extend(
        &self,
        id: ReservationId,
        expires_at: DateTime<Utc>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatReservation>> {
        sqlx::query_as::<_, SeatReservation>(
            "UPDATE seat_reservations \
             SET expires_at = $2, updated_at = $3, updated_by = $4 \
             WHERE id = $1 AND status = 'reserved' \
             RETURNING *",
        )
        .bind(id)
        .bind(expires_at)
        .bind(now)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to extend seat reservation"))
    }

    async fn stats_by_event(&self, event_id: &str) -> AppResult<StatusCounts> {
        let rows: Vec<(ReservationStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM seat_reservations WHERE event_id = $1 GROUP BY status",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load reservation stats"))?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| (status.as_str().to_string(), count))
            .collect())
    }
}

async fn subtract_from_session(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    session_id: BookingSessionId,
    seats: i32,
    amount: i64,
    actor: &str,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE booking_sessions \
         SET seat_count = seat_count - $2, total_amount = total_amount - $3, \
             updated_at = $4, updated_by = $5 \
         WHERE id = $1",
    )
    .bind(session_id)
    .bind(seats)
    .bind(amount)
    .bind(now)
    .bind(actor)
    .execute(&mut **tx)
    .await
    .map_err(db_error("Failed to update session totals"))?;
    Ok(())
}
