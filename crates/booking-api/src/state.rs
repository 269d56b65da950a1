//! Application state shared across all handlers.

use std::fmt;
use std::sync::Arc;

use booking_core::config::AppConfig;
use booking_core::traits::Clock;
use booking_database::DatabasePool;
use booking_service::{BookingSessionManager, ReservationManager};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Time source for sweeps triggered over RPC
    pub clock: Arc<dyn Clock>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool; `None` when running on the in-memory store
    pub database: Option<DatabasePool>,

    // ── Managers ─────────────────────────────────────────────
    /// Booking session manager
    pub sessions: Arc<BookingSessionManager>,
    /// Reservation manager
    pub reservations: Arc<ReservationManager>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("database", &self.database)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}
