//! Booking session lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a booking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Seats may be added or removed.
    Active,
    /// Paid and all seats confirmed.
    Completed,
    /// Cancelled by the user or by expiry.
    Cancelled,
    /// Lapsed without an explicit cancel.
    Expired,
}

impl SessionStatus {
    /// Whether the session is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
