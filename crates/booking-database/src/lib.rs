//! # booking-database
//!
//! Persistence for seat reservations and booking sessions. The store
//! traits in [`store`] are implemented twice: by PostgreSQL repositories
//! that rely on a partial unique index and transactions, and by an
//! in-memory store that holds both tables under one lock.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryBookingStore;
pub use repositories::{BookingSessionRepository, SeatReservationRepository};
pub use store::{CompletedSession, ReservationStore, SessionStore, StatusCounts};
