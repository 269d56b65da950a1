//! Request DTOs, one per RPC operation.
//!
//! Every mutating request may carry an `actor`; it defaults to
//! `"anonymous"`.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_core::types::{BookingSessionId, PageRequest, ReservationId};
use booking_entity::{ClientMeta, SeatPricing};
use booking_service::{AddSeatRequest, CreateReservationRequest, CreateSessionRequest};

/// Actor recorded when a request does not name one.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

fn default_actor() -> String {
    ANONYMOUS_ACTOR.to_string()
}

fn default_remove_reason() -> String {
    "user_removed".to_string()
}

fn default_cancel_reason() -> String {
    "user_cancelled".to_string()
}

fn default_release_reason() -> String {
    "user_released".to_string()
}

fn ttl_from_seconds(seconds: Option<i64>) -> AppResult<Option<Duration>> {
    seconds
        .map(|s| {
            Duration::try_seconds(s)
                .ok_or_else(|| AppError::validation("ttl_seconds is out of range"))
        })
        .transpose()
}

/// Optional page/limit pair.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn to_request(self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

// ── Sessions ─────────────────────────────────────────────────────

/// `CreateBookingSession`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingSessionRequest {
    pub user_id: String,
    pub event_id: String,
    pub currency: String,
    /// Session lifetime; the configured default applies when absent.
    pub ttl_seconds: Option<i64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[serde(default = "default_actor")]
    pub actor: String,
}

impl CreateBookingSessionRequest {
    pub fn into_parts(self) -> AppResult<(CreateSessionRequest, String)> {
        let request = CreateSessionRequest {
            user_id: self.user_id,
            event_id: self.event_id,
            currency: self.currency,
            ttl: ttl_from_seconds(self.ttl_seconds)?,
            client: ClientMeta {
                ip_address: self.ip_address,
                user_agent: self.user_agent,
                metadata: self.metadata,
            },
        };
        Ok((request, self.actor))
    }
}

/// Any request addressing one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionIdRequest {
    pub session_id: BookingSessionId,
}

/// `GetBookingSessionByToken`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokenRequest {
    pub session_token: String,
}

/// `AddSeatToSession`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSeatToSessionRequest {
    pub session_id: BookingSessionId,
    pub seat_id: String,
    pub zone_id: String,
    #[serde(flatten)]
    pub pricing: SeatPricing,
    pub currency: String,
    pub metadata: Option<serde_json::Value>,
    #[serde(default = "default_actor")]
    pub actor: String,
}

impl AddSeatToSessionRequest {
    pub fn into_parts(self) -> (BookingSessionId, AddSeatRequest, String) {
        let request = AddSeatRequest {
            seat_id: self.seat_id,
            zone_id: self.zone_id,
            pricing: self.pricing,
            currency: self.currency,
            metadata: self.metadata,
        };
        (self.session_id, request, self.actor)
    }
}

/// `RemoveSeatFromSession`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSeatFromSessionRequest {
    pub session_id: BookingSessionId,
    pub seat_id: String,
    #[serde(default = "default_remove_reason")]
    pub reason: String,
    #[serde(default = "default_actor")]
    pub actor: String,
}

/// `CompleteBookingSession`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteBookingSessionRequest {
    pub session_id: BookingSessionId,
    pub payment_method: String,
    #[serde(default = "default_actor")]
    pub actor: String,
}

/// `CancelBookingSession`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingSessionRequest {
    pub session_id: BookingSessionId,
    #[serde(default = "default_cancel_reason")]
    pub reason: String,
    #[serde(default = "default_actor")]
    pub actor: String,
}

/// `ListUserSessions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUserSessionsRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub page: PageParams,
}

/// `GetSessionStats`, `GetReservationStats`, `GetActiveReservations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventIdRequest {
    pub event_id: String,
}

// ── Reservations ─────────────────────────────────────────────────

/// `CreateReservation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationRpcRequest {
    pub booking_session_id: BookingSessionId,
    pub event_id: String,
    pub seat_id: String,
    pub zone_id: String,
    #[serde(flatten)]
    pub pricing: SeatPricing,
    pub currency: String,
    /// Hold lifetime; the configured default applies when absent.
    pub ttl_seconds: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    #[serde(default = "default_actor")]
    pub actor: String,
}

impl CreateReservationRpcRequest {
    pub fn into_parts(self) -> AppResult<(CreateReservationRequest, String)> {
        let request = CreateReservationRequest {
            booking_session_id: self.booking_session_id,
            event_id: self.event_id,
            seat_id: self.seat_id,
            zone_id: self.zone_id,
            pricing: self.pricing,
            currency: self.currency,
            ttl: ttl_from_seconds(self.ttl_seconds)?,
            metadata: self.metadata,
        };
        Ok((request, self.actor))
    }
}

/// Any read addressing one reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationIdRequest {
    pub reservation_id: ReservationId,
}

/// `GetReservationByToken`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationTokenRequest {
    pub reservation_token: String,
}

/// `ConfirmReservation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmReservationRequest {
    pub reservation_id: ReservationId,
    #[serde(default = "default_actor")]
    pub actor: String,
}

/// `ReleaseReservation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseReservationRequest {
    pub reservation_id: ReservationId,
    #[serde(default = "default_release_reason")]
    pub reason: String,
    #[serde(default = "default_actor")]
    pub actor: String,
}

/// `ReleaseReservationsBySession`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseReservationsBySessionRequest {
    pub session_id: BookingSessionId,
    #[serde(default = "default_release_reason")]
    pub reason: String,
    #[serde(default = "default_actor")]
    pub actor: String,
}

/// `ExtendReservation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendReservationRequest {
    pub reservation_id: ReservationId,
    pub extension_minutes: i64,
    #[serde(default = "default_actor")]
    pub actor: String,
}

/// `CheckSeatAvailability`, `GetReservationsBySeat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatIdRequest {
    pub seat_id: String,
}

/// `GetReservationsByEvent`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationsByEventRequest {
    pub event_id: String,
    #[serde(flatten)]
    pub page: PageParams,
}
