//! PostgreSQL repository implementations of the store traits.

pub mod reservation;
pub mod session;

pub use reservation::SeatReservationRepository;
pub use session::BookingSessionRepository;
