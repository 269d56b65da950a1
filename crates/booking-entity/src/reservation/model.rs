//! Seat reservation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use booking_core::types::{BookingSessionId, ReservationId};

use super::status::ReservationStatus;

/// A time-bounded exclusive hold on one seat.
///
/// Pricing is a snapshot copied at creation and never rewritten. Rows are
/// never deleted; terminal reservations stay for audit and statistics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatReservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// The booking session that owns this reservation.
    pub booking_session_id: BookingSessionId,
    /// Event the seat belongs to.
    pub event_id: String,
    /// The reserved seat.
    pub seat_id: String,
    /// Zone the seat sits in.
    pub zone_id: String,
    /// Caller-facing lookup token.
    pub reservation_token: String,
    /// Current lifecycle state.
    pub status: ReservationStatus,
    /// When the seat was claimed.
    pub reserved_at: DateTime<Utc>,
    /// When the hold lapses.
    pub expires_at: DateTime<Utc>,
    /// When the seat was released.
    pub released_at: Option<DateTime<Utc>>,
    /// Why the seat was released.
    pub released_reason: Option<String>,

    // -- Pricing snapshot --
    /// Pricing category label.
    pub pricing_category: String,
    /// List price in minor currency units.
    pub base_price: i64,
    /// Price charged in minor currency units.
    pub final_price: i64,
    /// ISO currency code.
    pub currency: String,

    /// Free-form metadata.
    pub metadata: serde_json::Value,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Actor that created the reservation.
    pub created_by: Option<String>,
    /// Actor of the last transition.
    pub updated_by: Option<String>,
}

impl SeatReservation {
    /// Whether the reservation currently holds its seat.
    pub fn is_held(&self) -> bool {
        self.status.is_held()
    }

    /// Whether the reservation is still `reserved` but past its deadline.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Reserved && self.expires_at < now
    }
}

/// Pre-computed pricing for a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPricing {
    /// Pricing category label.
    pub pricing_category: String,
    /// List price in minor currency units.
    pub base_price: i64,
    /// Price charged in minor currency units.
    pub final_price: i64,
}

/// Data required to claim a seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSeatReservation {
    /// Pre-generated identifier.
    pub id: ReservationId,
    /// Owning booking session.
    pub booking_session_id: BookingSessionId,
    /// Event the seat belongs to.
    pub event_id: String,
    /// Seat to claim.
    pub seat_id: String,
    /// Zone the seat sits in.
    pub zone_id: String,
    /// Pre-generated lookup token.
    pub reservation_token: String,
    /// Pricing snapshot.
    pub pricing: SeatPricing,
    /// ISO currency code.
    pub currency: String,
    /// Claim time.
    pub reserved_at: DateTime<Utc>,
    /// Deadline of the hold.
    pub expires_at: DateTime<Utc>,
    /// Free-form metadata.
    pub metadata: serde_json::Value,
    /// Actor performing the claim.
    pub created_by: Option<String>,
}

impl CreateSeatReservation {
    /// Materialize the row as it looks right after the claim.
    pub fn into_reservation(self) -> SeatReservation {
        SeatReservation {
            id: self.id,
            booking_session_id: self.booking_session_id,
            event_id: self.event_id,
            seat_id: self.seat_id,
            zone_id: self.zone_id,
            reservation_token: self.reservation_token,
            status: ReservationStatus::Reserved,
            reserved_at: self.reserved_at,
            expires_at: self.expires_at,
            released_at: None,
            released_reason: None,
            pricing_category: self.pricing.pricing_category,
            base_price: self.pricing.base_price,
            final_price: self.pricing.final_price,
            currency: self.currency,
            metadata: self.metadata,
            created_at: self.reserved_at,
            updated_at: self.reserved_at,
            updated_by: self.created_by.clone(),
            created_by: self.created_by,
        }
    }
}
