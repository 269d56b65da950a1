//! Route definitions for the booking RPC surface.
//!
//! Operations are mounted under `/rpc/{OperationName}`; the health check
//! lives at `/health`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, reservation, session};
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let rpc_routes = Router::new()
        .merge(session_routes())
        .merge(reservation_routes());

    Router::new()
        .nest("/rpc", rpc_routes)
        .route("/health", get(handlers::health::health))
        .fallback(handlers::unknown_operation)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/CreateBookingSession", post(session::create_booking_session))
        .route("/GetBookingSession", post(session::get_booking_session))
        .route(
            "/GetBookingSessionByToken",
            post(session::get_booking_session_by_token),
        )
        .route("/AddSeatToSession", post(session::add_seat_to_session))
        .route(
            "/RemoveSeatFromSession",
            post(session::remove_seat_from_session),
        )
        .route(
            "/CompleteBookingSession",
            post(session::complete_booking_session),
        )
        .route("/CancelBookingSession", post(session::cancel_booking_session))
        .route(
            "/GetSessionReservations",
            post(session::get_session_reservations),
        )
        .route("/ListUserSessions", post(session::list_user_sessions))
        .route("/GetSessionStats", post(session::get_session_stats))
}

fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route("/CreateReservation", post(reservation::create_reservation))
        .route("/GetReservation", post(reservation::get_reservation))
        .route(
            "/GetReservationByToken",
            post(reservation::get_reservation_by_token),
        )
        .route("/ConfirmReservation", post(reservation::confirm_reservation))
        .route("/ReleaseReservation", post(reservation::release_reservation))
        .route(
            "/ReleaseReservationsBySession",
            post(reservation::release_reservations_by_session),
        )
        .route("/ExtendReservation", post(reservation::extend_reservation))
        .route(
            "/CheckSeatAvailability",
            post(reservation::check_seat_availability),
        )
        .route(
            "/GetReservationStats",
            post(reservation::get_reservation_stats),
        )
        .route(
            "/CleanupExpiredReservations",
            post(reservation::cleanup_expired_reservations),
        )
        .route(
            "/GetReservationsByEvent",
            post(reservation::get_reservations_by_event),
        )
        .route(
            "/GetReservationsBySeat",
            post(reservation::get_reservations_by_seat),
        )
        .route(
            "/GetActiveReservations",
            post(reservation::get_active_reservations),
        )
}
