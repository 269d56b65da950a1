//! Booking session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use booking_core::error::{AppError, ErrorKind};
use booking_core::result::AppResult;
use booking_core::types::{BookingSessionId, PageRequest, PageResponse, ReservationId};
use booking_entity::reservation::SeatReservation;
use booking_entity::session::{BookingSession, CreateBookingSession, SessionStatus};

use crate::store::{CompletedSession, SessionStore, StatusCounts};

/// PostgreSQL-backed session store.
#[derive(Debug, Clone)]
pub struct BookingSessionRepository {
    pool: PgPool,
}

impl BookingSessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for BookingSessionRepository {
    async fn insert(&self, new: CreateBookingSession) -> AppResult<BookingSession> {
        let metadata = new
            .client
            .metadata
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));

        sqlx::query_as::<_, BookingSession>(
            "INSERT INTO booking_sessions ( \
                 id, user_id, event_id, session_token, status, seat_count, total_amount, \
                 currency, expires_at, ip_address, user_agent, metadata, \
                 created_at, updated_at, created_by, updated_by \
             ) VALUES ($1, $2, $3, $4, 'active', 0, 0, $5, $6, $7, $8, $9, $10, $10, $11, $11) \
             RETURNING *",
        )
        .bind(new.id)
        .bind(&new.user_id)
        .bind(&new.event_id)
        .bind(&new.session_token)
        .bind(&new.currency)
        .bind(new.expires_at)
        .bind(&new.client.ip_address)
        .bind(&new.client.user_agent)
        .bind(&metadata)
        .bind(new.created_at)
        .bind(&new.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create booking session", e))
    }

    async fn find_by_id(&self, id: BookingSessionId) -> AppResult<Option<BookingSession>> {
        sqlx::query_as::<_, BookingSession>("SELECT * FROM booking_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find booking session", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<BookingSession>> {
        sqlx::query_as::<_, BookingSession>(
            "SELECT * FROM booking_sessions WHERE session_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find booking session by token",
                e,
            )
        })
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> AppResult<PageResponse<BookingSession>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM booking_sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count user sessions", e)
                })?;

        let items = sqlx::query_as::<_, BookingSession>(
            "SELECT * FROM booking_sessions WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list user sessions", e))?;

        Ok(PageResponse::new(items, page, total.max(0) as u64))
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<BookingSession>> {
        sqlx::query_as::<_, BookingSession>(
            "SELECT * FROM booking_sessions \
             WHERE status = 'active' AND expires_at < $1 ORDER BY expires_at ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list expired sessions", e))
    }

    async fn mark_completed(
        &self,
        id: BookingSessionId,
        paid: &[ReservationId],
        release_reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CompletedSession>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Claims take the same row lock, so no seat can join the session
        // between this point and the commit.
        let status: Option<SessionStatus> = sqlx::query_scalar(
            "SELECT status FROM booking_sessions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock booking session", e))?;

        if status != Some(SessionStatus::Active) {
            return Ok(None);
        }

        let released = sqlx::query_as::<_, SeatReservation>(
            "UPDATE seat_reservations \
             SET status = 'released', released_at = $3, released_reason = $2, \
                 updated_at = $3, updated_by = $4 \
             WHERE booking_session_id = $1 AND status = 'reserved' AND NOT (id = ANY($5)) \
             RETURNING *",
        )
        .bind(id)
        .bind(release_reason)
        .bind(now)
        .bind(actor)
        .bind(paid)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release unpaid reservations", e)
        })?;

        let seats = released.len() as i32;
        let amount: i64 = released.iter().map(|r| r.final_price).sum();

        let session = sqlx::query_as::<_, BookingSession>(
            "UPDATE booking_sessions \
             SET status = 'completed', completed_at = $2, \
                 seat_count = seat_count - $4, total_amount = total_amount - $5, \
                 updated_at = $2, updated_by = $3 \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(now)
        .bind(actor)
        .bind(seats)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete booking session", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit session completion", e)
        })?;

        Ok(Some(CompletedSession { session, released }))
    }

    async fn mark_cancelled(
        &self,
        id: BookingSessionId,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<BookingSession>> {
        sqlx::query_as::<_, BookingSession>(
            "UPDATE booking_sessions \
             SET status = 'cancelled', cancelled_at = $3, cancelled_reason = $2, \
                 updated_at = $3, updated_by = $4 \
             WHERE id = $1 AND status = 'active' \
             RETURNING *",
        )
        .bind(id)
        .bind(reason)
        .bind(now)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel booking session", e))
    }

    async fn stats_by_event(&self, event_id: &str) -> AppResult<StatusCounts> {
        let rows: Vec<(SessionStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM booking_sessions WHERE event_id = $1 GROUP BY status",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load session stats", e))?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| (status.as_str().to_string(), count))
            .collect())
    }
}
