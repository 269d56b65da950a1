//! # booking-gateway
//!
//! Client abstractions over the two services the booking core calls
//! out to: the Availability Service, which owns the remote seat status,
//! and the Payment Service, which captures payment for a session.
//!
//! Each service is a trait with an HTTP implementation built on
//! `reqwest`, plus an in-process mock that records calls and can be
//! scripted to fail.

pub mod availability;
pub mod mock;
pub mod payment;

pub use availability::{
    AvailabilityGateway, BlockSeatsRequest, BlockSeatsResult, HttpAvailabilityGateway,
    ReleaseSeatsResult, SeatAvailability,
};
pub use mock::{MockAvailabilityGateway, MockPaymentGateway};
pub use payment::{CapturePaymentRequest, HttpPaymentGateway, PaymentGateway, PaymentReceipt};
