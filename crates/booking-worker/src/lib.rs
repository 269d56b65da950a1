//! Background expiry handling for the booking service.
//!
//! This crate provides:
//! - An expiry sweeper that cancels lapsed sessions and releases lapsed
//!   reservations through the same paths user actions take
//! - A cron scheduler that runs the sweeper periodically

pub mod scheduler;
pub mod sweeper;

pub use scheduler::CronScheduler;
pub use sweeper::{ExpirySweeper, SweepReport};
