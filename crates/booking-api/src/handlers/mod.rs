//! RPC handlers grouped by entity.

pub mod health;
pub mod reservation;
pub mod session;

use crate::dto::response::RpcResponse;
use crate::error::ApiError;
use booking_core::error::AppError;

/// Fallback for unknown operations.
pub async fn unknown_operation() -> ApiError {
    ApiError(AppError::not_found("Unknown RPC operation"))
}

/// Wraps a successful result in the RPC envelope.
pub(crate) fn ok<T>(data: T) -> axum::Json<RpcResponse<T>> {
    axum::Json(RpcResponse::ok(data))
}
