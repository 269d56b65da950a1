//! Reservation and session policy configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Booking policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Session lifetime used when a caller does not supply one.
    #[serde(default = "default_session_ttl")]
    pub default_session_ttl_minutes: i64,
    /// Reservation lifetime used when a caller does not supply one.
    #[serde(default = "default_reservation_ttl")]
    pub default_reservation_ttl_minutes: i64,
    /// Upper bound for a single reservation extension.
    #[serde(default = "default_max_extension")]
    pub max_extension_minutes: i64,
    /// Maximum number of seats a single session may hold.
    #[serde(default = "default_max_seats")]
    pub max_seats_per_session: i32,
    /// Longest lifetime a caller may request for a session or reservation.
    #[serde(default = "default_max_ttl")]
    pub max_ttl_minutes: i64,
}

impl BookingConfig {
    /// Default session lifetime as a duration.
    pub fn default_session_ttl(&self) -> Duration {
        minutes(self.default_session_ttl_minutes)
    }

    /// Default reservation lifetime as a duration.
    pub fn default_reservation_ttl(&self) -> Duration {
        minutes(self.default_reservation_ttl_minutes)
    }

    /// Upper bound for caller-supplied lifetimes.
    pub fn max_ttl(&self) -> Duration {
        minutes(self.max_ttl_minutes)
    }
}

/// Out-of-range settings saturate instead of panicking.
fn minutes(value: i64) -> Duration {
    Duration::try_minutes(value).unwrap_or(Duration::MAX)
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_session_ttl_minutes: default_session_ttl(),
            default_reservation_ttl_minutes: default_reservation_ttl(),
            max_extension_minutes: default_max_extension(),
            max_seats_per_session: default_max_seats(),
            max_ttl_minutes: default_max_ttl(),
        }
    }
}

fn default_session_ttl() -> i64 {
    15
}

fn default_reservation_ttl() -> i64 {
    15
}

fn default_max_extension() -> i64 {
    30
}

fn default_max_seats() -> i32 {
    10
}

fn default_max_ttl() -> i64 {
    24 * 60
}
