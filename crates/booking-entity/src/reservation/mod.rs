//! Seat reservation (lease) entities.

pub mod model;
pub mod status;

pub use model::{CreateSeatReservation, SeatPricing, SeatReservation};
pub use status::ReservationStatus;
