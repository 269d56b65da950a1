//! Booking session operations.

use axum::extract::State;

use booking_core::types::PageResponse;
use booking_entity::{BookingSession, SeatReservation};
use booking_service::CompletionResult;

use super::ok;
use crate::dto::request::{
    AddSeatToSessionRequest, CancelBookingSessionRequest, CompleteBookingSessionRequest,
    CreateBookingSessionRequest, EventIdRequest, ListUserSessionsRequest,
    RemoveSeatFromSessionRequest, SessionIdRequest, SessionTokenRequest,
};
use crate::dto::response::StatsResponse;
use crate::error::ApiResult;
use crate::extractors::RpcJson;
use crate::state::AppState;

/// POST /rpc/CreateBookingSession
pub async fn create_booking_session(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<CreateBookingSessionRequest>,
) -> ApiResult<BookingSession> {
    let (request, actor) = req.into_parts()?;
    let session = state
        .sessions
        .create_booking_session(request, &actor)
        .await?;
    Ok(ok(session))
}

/// POST /rpc/GetBookingSession
pub async fn get_booking_session(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<SessionIdRequest>,
) -> ApiResult<BookingSession> {
    Ok(ok(state.sessions.get_booking_session(req.session_id).await?))
}

/// POST /rpc/GetBookingSessionByToken
pub async fn get_booking_session_by_token(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<SessionTokenRequest>,
) -> ApiResult<BookingSession> {
    Ok(ok(state
        .sessions
        .get_booking_session_by_token(&req.session_token)
        .await?))
}

/// POST /rpc/AddSeatToSession
pub async fn add_seat_to_session(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<AddSeatToSessionRequest>,
) -> ApiResult<SeatReservation> {
    let (session_id, request, actor) = req.into_parts();
    let reservation = state
        .sessions
        .add_seat_to_session(session_id, request, &actor)
        .await?;
    Ok(ok(reservation))
}

/// POST /rpc/RemoveSeatFromSession
pub async fn remove_seat_from_session(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<RemoveSeatFromSessionRequest>,
) -> ApiResult<SeatReservation> {
    let reservation = state
        .sessions
        .remove_seat_from_session(req.session_id, &req.seat_id, &req.reason, &req.actor)
        .await?;
    Ok(ok(reservation))
}

/// POST /rpc/CompleteBookingSession
pub async fn complete_booking_session(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<CompleteBookingSessionRequest>,
) -> ApiResult<CompletionResult> {
    let result = state
        .sessions
        .complete_booking_session(req.session_id, &req.payment_method, &req.actor)
        .await?;
    Ok(ok(result))
}

/// POST /rpc/CancelBookingSession
pub async fn cancel_booking_session(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<CancelBookingSessionRequest>,
) -> ApiResult<BookingSession> {
    let session = state
        .sessions
        .cancel_booking_session(req.session_id, &req.reason, &req.actor)
        .await?;
    Ok(ok(session))
}

/// POST /rpc/GetSessionReservations
pub async fn get_session_reservations(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<SessionIdRequest>,
) -> ApiResult<Vec<SeatReservation>> {
    Ok(ok(state
        .sessions
        .get_session_reservations(req.session_id)
        .await?))
}

/// POST /rpc/ListUserSessions
pub async fn list_user_sessions(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ListUserSessionsRequest>,
) -> ApiResult<PageResponse<BookingSession>> {
    Ok(ok(state
        .sessions
        .list_user_sessions(&req.user_id, req.page.to_request())
        .await?))
}

/// POST /rpc/GetSessionStats
pub async fn get_session_stats(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<EventIdRequest>,
) -> ApiResult<StatsResponse> {
    let stats = state.sessions.get_session_stats(&req.event_id).await?;
    Ok(ok(StatsResponse {
        event_id: req.event_id,
        stats,
    }))
}
