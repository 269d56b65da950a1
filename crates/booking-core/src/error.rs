//! Unified application error types for the booking service.
//!
//! Every crate maps its failures into [`AppError`] so that errors travel
//! through `?` unchanged until the RPC boundary, where the stable kind
//! string and the message are reported to the caller.

use std::fmt;
use thiserror::Error;

/// Error categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input validation failed. Never retried.
    Validation,
    /// The availability service reports the seat as not available.
    SeatUnavailable,
    /// Another live reservation already holds the seat.
    SeatAlreadyReserved,
    /// The seat is not held by the given booking session.
    SeatNotInSession,
    /// The requested transition is illegal from the current state.
    InvalidState,
    /// The requested entity does not exist.
    NotFound,
    /// Payment capture failed; the session stays active.
    PaymentFailed,
    /// An upstream gateway could not be reached.
    UpstreamUnavailable,
    /// A storage error occurred.
    Database,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Stable, machine-readable kind string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::SeatUnavailable => "SEAT_UNAVAILABLE",
            Self::SeatAlreadyReserved => "SEAT_ALREADY_RESERVED",
            Self::SeatNotInSession => "SEAT_NOT_IN_SESSION",
            Self::InvalidState => "INVALID_STATE",
            Self::NotFound => "NOT_FOUND",
            Self::PaymentFailed => "PAYMENT_FAILED",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::Database => "DATABASE",
            Self::Serialization => "SERIALIZATION",
            Self::Configuration => "CONFIGURATION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a seat-unavailable error.
    pub fn seat_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SeatUnavailable, message)
    }

    /// Create a seat-already-reserved error.
    pub fn seat_already_reserved(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SeatAlreadyReserved, message)
    }

    /// Create a seat-not-in-session error.
    pub fn seat_not_in_session(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SeatNotInSession, message)
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a payment-failed error.
    pub fn payment_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PaymentFailed, message)
    }

    /// Create an upstream-unavailable error.
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
