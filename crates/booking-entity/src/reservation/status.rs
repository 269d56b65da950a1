//! Reservation lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a seat reservation.
///
/// `reserved` may move to `confirmed` or `released`; `confirmed` may only
/// move to `released`. Nothing leaves `released` or `expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seat_reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Seat is held and awaiting confirmation.
    Reserved,
    /// Seat was paid for.
    Confirmed,
    /// Seat was given back (by the user, a cancel, or the sweeper).
    Released,
    /// Seat lapsed without an explicit release.
    Expired,
}

impl ReservationStatus {
    /// Whether the reservation currently holds its seat.
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Reserved | Self::Confirmed)
    }

    /// Whether the reservation is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Expired)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Confirmed => "confirmed",
            Self::Released => "released",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
