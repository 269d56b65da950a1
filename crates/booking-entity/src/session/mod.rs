//! Booking session entities.

pub mod model;
pub mod status;

pub use model::{BookingSession, ClientMeta, CreateBookingSession};
pub use status::SessionStatus;
