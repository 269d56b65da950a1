//! Reservation manager inputs.

use chrono::Duration;

use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_core::types::BookingSessionId;
use booking_entity::SeatPricing;

use crate::validate;

/// Request to reserve one seat for a session.
#[derive(Debug, Clone)]
pub struct CreateReservationRequest {
    /// Owning booking session.
    pub booking_session_id: BookingSessionId,
    pub event_id: String,
    pub seat_id: String,
    pub zone_id: String,
    /// Pre-computed pricing snapshot.
    pub pricing: SeatPricing,
    pub currency: String,
    /// Hold lifetime. Falls back to the configured reservation TTL.
    pub ttl: Option<Duration>,
    /// Free-form metadata stored with the row.
    pub metadata: Option<serde_json::Value>,
}

impl CreateReservationRequest {
    /// Check identifiers, prices and the TTL.
    pub fn validate(&self) -> AppResult<()> {
        validate::require("event_id", &self.event_id)?;
        validate::require("seat_id", &self.seat_id)?;
        validate::require("zone_id", &self.zone_id)?;
        validate::require("currency", &self.currency)?;
        validate::pricing(&self.pricing)?;
        if self.ttl.is_some_and(|ttl| ttl <= Duration::zero()) {
            return Err(AppError::validation("ttl must be positive"));
        }
        Ok(())
    }
}
