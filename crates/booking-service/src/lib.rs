//! # booking-service
//!
//! Business logic for seat leasing. [`ReservationManager`] owns the
//! reservation state machine and keeps the Availability Service in step
//! on a best-effort basis; [`BookingSessionManager`] groups reservations
//! into a session and resolves it by payment or cancellation.
//!
//! Managers follow constructor injection: stores, gateways and the clock
//! are provided as `Arc` trait objects at construction time.

pub mod reservation;
pub mod session;
pub mod token;

mod validate;

#[cfg(test)]
mod test_support;

pub use reservation::{CreateReservationRequest, ReservationManager};
pub use session::{
    AddSeatRequest, BookingSessionManager, CompletionResult, CreateSessionRequest,
};
pub use token::TokenGenerator;

/// Actor recorded for sweeper-initiated transitions.
pub const SYSTEM_ACTOR: &str = "system";

/// Release and cancellation reason used by the expiry sweep.
pub const EXPIRED_REASON: &str = "expired";

/// Release reason for seats that joined a session while its payment was
/// being captured.
pub const LATE_SEAT_REASON: &str = "added_during_completion";
