//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use booking_core::error::{AppError, ErrorKind};

use crate::dto::response::RpcResponse;

/// Handler error: an [`AppError`] rendered as an RPC envelope.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Result type of every RPC handler.
pub type ApiResult<T> = Result<Json<RpcResponse<T>>, ApiError>;

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::SeatUnavailable
        | ErrorKind::SeatAlreadyReserved
        | ErrorKind::SeatNotInSession
        | ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::PaymentFailed => StatusCode::PAYMENT_REQUIRED,
        ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Database
        | ErrorKind::Serialization
        | ErrorKind::Configuration
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);
        if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = ?err, "RPC failed");
        }

        (status, Json(RpcResponse::from_error(&err))).into_response()
    }
}
