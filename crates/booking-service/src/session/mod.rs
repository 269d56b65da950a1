//! Booking session lifecycle.

pub mod manager;
pub mod request;

pub use manager::BookingSessionManager;
pub use request::{AddSeatRequest, CompletionResult, CreateSessionRequest};
