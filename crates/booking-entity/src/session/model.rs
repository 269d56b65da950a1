//! Booking session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use booking_core::types::BookingSessionId;

use super::status::SessionStatus;

/// A user's in-progress cart of seat reservations for one event.
///
/// `seat_count` and `total_amount` always mirror the reservations of this
/// session that are `reserved` or `confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingSession {
    /// Unique session identifier.
    pub id: BookingSessionId,
    /// User that owns the session.
    pub user_id: String,
    /// Event being booked.
    pub event_id: String,
    /// Caller-facing lookup token.
    pub session_token: String,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// Number of held seats.
    pub seat_count: i32,
    /// Sum of held seats' final prices in minor currency units.
    pub total_amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// When the session and all of its seats lapse.
    pub expires_at: DateTime<Utc>,
    /// When the session was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the session was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Why the session was cancelled.
    pub cancelled_reason: Option<String>,

    // -- Client metadata --
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client User-Agent.
    pub user_agent: Option<String>,
    /// Free-form metadata.
    pub metadata: serde_json::Value,

    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Actor that created the session.
    pub created_by: Option<String>,
    /// Actor of the last transition.
    pub updated_by: Option<String>,
}

impl BookingSession {
    /// Whether seats may still be added, removed, or paid for.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whether the session completed successfully.
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Whether the session is still active but past its deadline.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.expires_at < now
    }
}

/// Client details captured when a session is opened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMeta {
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client User-Agent.
    pub user_agent: Option<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Data required to open a booking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingSession {
    /// Pre-generated identifier.
    pub id: BookingSessionId,
    /// Owning user.
    pub user_id: String,
    /// Event being booked.
    pub event_id: String,
    /// Pre-generated lookup token.
    pub session_token: String,
    /// ISO currency code.
    pub currency: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Session deadline.
    pub expires_at: DateTime<Utc>,
    /// Client details.
    pub client: ClientMeta,
    /// Actor opening the session.
    pub created_by: Option<String>,
}

impl CreateBookingSession {
    /// Materialize the row as it looks right after creation.
    pub fn into_session(self) -> BookingSession {
        BookingSession {
            id: self.id,
            user_id: self.user_id,
            event_id: self.event_id,
            session_token: self.session_token,
            status: SessionStatus::Active,
            seat_count: 0,
            total_amount: 0,
            currency: self.currency,
            expires_at: self.expires_at,
            completed_at: None,
            cancelled_at: None,
            cancelled_reason: None,
            ip_address: self.client.ip_address,
            user_agent: self.client.user_agent,
            metadata: self
                .client
                .metadata
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            created_at: self.created_at,
            updated_at: self.created_at,
            updated_by: self.created_by.clone(),
            created_by: self.created_by,
        }
    }
}
