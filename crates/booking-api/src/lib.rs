//! # booking-api
//!
//! JSON RPC surface for the booking service built on Axum.
//!
//! Every operation is exposed as `POST /rpc/{OperationName}` with a JSON
//! body, and every response, including failures, carries the
//! [`dto::response::RpcResponse`] envelope.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
