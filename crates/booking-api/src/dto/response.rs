//! Response DTOs.

use serde::{Deserialize, Serialize};

use booking_core::error::AppError;
use booking_database::StatusCounts;

/// Envelope carried by every RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Operation result, present on success.
    pub data: Option<T>,
    /// Failure detail, present on error.
    pub error: Option<RpcError>,
}

/// Error detail of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Stable machine-readable kind string.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl<T> RpcResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl RpcResponse<()> {
    /// Creates a failed response.
    pub fn from_error(err: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(RpcError {
                kind: err.kind.as_str().to_string(),
                message: err.message.clone(),
            }),
        }
    }
}

/// `CheckSeatAvailability` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAvailabilityResponse {
    pub seat_id: String,
    pub available: bool,
}

/// Per-status counts for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub event_id: String,
    pub stats: StatusCounts,
}

/// Number of rows a bulk operation changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// `connected`, `unreachable` or `memory`.
    pub database: String,
    pub version: String,
}
