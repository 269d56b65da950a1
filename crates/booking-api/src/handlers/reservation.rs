//! Seat reservation operations.

use axum::extract::State;

use booking_core::types::PageResponse;
use booking_entity::SeatReservation;

use super::ok;
use crate::dto::request::{
    ConfirmReservationRequest, CreateReservationRpcRequest, EventIdRequest,
    ExtendReservationRequest, ReleaseReservationRequest, ReleaseReservationsBySessionRequest,
    ReservationIdRequest, ReservationTokenRequest, ReservationsByEventRequest, SeatIdRequest,
};
use crate::dto::response::{CountResponse, SeatAvailabilityResponse, StatsResponse};
use crate::error::ApiResult;
use crate::extractors::RpcJson;
use crate::state::AppState;

/// POST /rpc/CreateReservation
pub async fn create_reservation(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<CreateReservationRpcRequest>,
) -> ApiResult<SeatReservation> {
    let (request, actor) = req.into_parts()?;
    let reservation = state
        .reservations
        .create_reservation(request, &actor)
        .await?;
    Ok(ok(reservation))
}

/// POST /rpc/GetReservation
pub async fn get_reservation(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ReservationIdRequest>,
) -> ApiResult<SeatReservation> {
    Ok(ok(state.reservations.get_reservation(req.reservation_id).await?))
}

/// POST /rpc/GetReservationByToken
pub async fn get_reservation_by_token(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ReservationTokenRequest>,
) -> ApiResult<SeatReservation> {
    Ok(ok(state
        .reservations
        .get_reservation_by_token(&req.reservation_token)
        .await?))
}

/// POST /rpc/ConfirmReservation
pub async fn confirm_reservation(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ConfirmReservationRequest>,
) -> ApiResult<SeatReservation> {
    Ok(ok(state
        .reservations
        .confirm_reservation(req.reservation_id, &req.actor)
        .await?))
}

/// POST /rpc/ReleaseReservation
pub async fn release_reservation(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ReleaseReservationRequest>,
) -> ApiResult<SeatReservation> {
    Ok(ok(state
        .reservations
        .release_reservation(req.reservation_id, &req.reason, &req.actor)
        .await?))
}

/// POST /rpc/ReleaseReservationsBySession
pub async fn release_reservations_by_session(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ReleaseReservationsBySessionRequest>,
) -> ApiResult<Vec<SeatReservation>> {
    Ok(ok(state
        .reservations
        .release_reservations_by_session(req.session_id, &req.reason, &req.actor)
        .await?))
}

/// POST /rpc/ExtendReservation
pub async fn extend_reservation(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ExtendReservationRequest>,
) -> ApiResult<SeatReservation> {
    Ok(ok(state
        .reservations
        .extend_reservation(req.reservation_id, req.extension_minutes, &req.actor)
        .await?))
}

/// POST /rpc/CheckSeatAvailability
pub async fn check_seat_availability(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<SeatIdRequest>,
) -> ApiResult<SeatAvailabilityResponse> {
    let available = state
        .reservations
        .check_seat_availability(&req.seat_id)
        .await?;
    Ok(ok(SeatAvailabilityResponse {
        seat_id: req.seat_id,
        available,
    }))
}

/// POST /rpc/GetReservationStats
pub async fn get_reservation_stats(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<EventIdRequest>,
) -> ApiResult<StatsResponse> {
    let stats = state
        .reservations
        .get_reservation_stats(&req.event_id)
        .await?;
    Ok(ok(StatsResponse {
        event_id: req.event_id,
        stats,
    }))
}

/// POST /rpc/CleanupExpiredReservations
pub async fn cleanup_expired_reservations(State(state): State<AppState>) -> ApiResult<CountResponse> {
    let count = state
        .reservations
        .cleanup_expired_reservations(state.clock.now())
        .await?;
    Ok(ok(CountResponse { count }))
}

/// POST /rpc/GetReservationsByEvent
pub async fn get_reservations_by_event(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ReservationsByEventRequest>,
) -> ApiResult<PageResponse<SeatReservation>> {
    Ok(ok(state
        .reservations
        .get_reservations_by_event(&req.event_id, req.page.to_request())
        .await?))
}

/// POST /rpc/GetReservationsBySeat
pub async fn get_reservations_by_seat(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<SeatIdRequest>,
) -> ApiResult<Vec<SeatReservation>> {
    Ok(ok(state
        .reservations
        .get_reservations_by_seat(&req.seat_id)
        .await?))
}

/// POST /rpc/GetActiveReservations
pub async fn get_active_reservations(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<EventIdRequest>,
) -> ApiResult<Vec<SeatReservation>> {
    Ok(ok(state
        .reservations
        .get_active_reservations(&req.event_id)
        .await?))
}
