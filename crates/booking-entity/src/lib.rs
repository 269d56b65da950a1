//! # booking-entity
//!
//! Domain models for the booking service. Both entities map one-to-one
//! onto database rows and derive `sqlx::FromRow`; the status enums map
//! onto PostgreSQL enum types.

pub mod reservation;
pub mod session;

pub use reservation::{CreateSeatReservation, ReservationStatus, SeatPricing, SeatReservation};
pub use session::{BookingSession, ClientMeta, CreateBookingSession, SessionStatus};
