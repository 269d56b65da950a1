//! Booking session manager inputs and outputs.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_core::types::BookingSessionId;
use booking_entity::{ClientMeta, SeatPricing};

use crate::validate;

/// Request to open a booking session.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub user_id: String,
    pub event_id: String,
    pub currency: String,
    /// Session lifetime. Falls back to the configured session TTL.
    pub ttl: Option<Duration>,
    /// Client details captured for audit.
    pub client: ClientMeta,
}

impl CreateSessionRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate::require("user_id", &self.user_id)?;
        validate::require("event_id", &self.event_id)?;
        validate::require("currency", &self.currency)?;
        if self.ttl.is_some_and(|ttl| ttl <= Duration::zero()) {
            return Err(AppError::validation("ttl must be positive"));
        }
        Ok(())
    }
}

/// Request to add one seat to a session.
#[derive(Debug, Clone)]
pub struct AddSeatRequest {
    pub seat_id: String,
    pub zone_id: String,
    /// Pre-computed pricing snapshot.
    pub pricing: SeatPricing,
    /// Must match the session currency.
    pub currency: String,
    pub metadata: Option<serde_json::Value>,
}

/// Outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub session_id: BookingSessionId,
    /// Absent when the session total was zero and no capture was made.
    pub payment_id: Option<String>,
    pub seat_count: i32,
    pub total_amount: i64,
    /// Sum charged by this completion. Seats confirmed earlier on their
    /// own are part of `total_amount` but are not charged again.
    pub amount_captured: i64,
    pub currency: String,
}
