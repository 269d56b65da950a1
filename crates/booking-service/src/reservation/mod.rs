//! Seat reservation lifecycle.

pub mod manager;
pub mod request;

pub use manager::ReservationManager;
pub use request::CreateReservationRequest;
