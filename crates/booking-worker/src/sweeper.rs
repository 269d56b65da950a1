//! Expiry sweep over sessions and reservations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing;

use booking_service::{BookingSessionManager, ReservationManager};

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Active sessions cancelled because their deadline passed.
    pub sessions_cancelled: usize,
    /// Reserved seats released because their deadline passed.
    pub reservations_released: usize,
}

/// Cancels lapsed sessions, then releases lapsed reservations.
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    /// Session manager
    sessions: Arc<BookingSessionManager>,
    /// Reservation manager
    reservations: Arc<ReservationManager>,
}

impl ExpirySweeper {
    /// Create a new sweeper
    pub fn new(sessions: Arc<BookingSessionManager>, reservations: Arc<ReservationManager>) -> Self {
        Self {
            sessions,
            reservations,
        }
    }

    /// Run one sweep as of `now`.
    ///
    /// A failing phase is logged and the other phase still runs; its
    /// count is reported as zero.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let sessions_cancelled = match self.sessions.cleanup_expired_sessions(now).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Expired session sweep failed");
                0
            }
        };

        let reservations_released = match self.reservations.cleanup_expired_reservations(now).await
        {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Expired reservation sweep failed");
                0
            }
        };

        let report = SweepReport {
            sessions_cancelled,
            reservations_released,
        };
        if report != SweepReport::default() {
            tracing::info!(
                sessions_cancelled,
                reservations_released,
                "Expiry sweep completed"
            );
        } else {
            tracing::debug!("Expiry sweep found nothing to do");
        }
        report
    }
}
