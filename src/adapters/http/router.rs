//! API router.

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use http::HeaderName;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::auth::auth_middleware;
use super::bookings;
use super::circles;
use super::state::AppState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Builds the full router: `/api/...` behind bearer authentication, plus an
/// unauthenticated `/health`. Every response carries `x-request-id`, taken
/// from the request when the caller sent one.
pub fn api_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Bookings
        .route(
            "/bookings",
            post(bookings::request_booking).get(bookings::list_bookings),
        )
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/accept", post(bookings::accept_booking))
        .route("/bookings/:id/decline", post(bookings::decline_booking))
        .route("/bookings/:id/complete", post(bookings::complete_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        // Payments
        .route(
            "/bookings/:id/payment",
            post(bookings::capture_payment).get(bookings::get_payment),
        )
        // Circles
        .route("/circles", post(circles::create_circle))
        .route("/circles/:id", get(circles::get_circle))
        .route("/circles/:id/status", post(circles::set_circle_status))
        .route("/circles/:id/lead", post(circles::change_circle_lead))
        .route("/circles/:id/join", post(circles::request_join))
        // Join requests
        .route("/circle-requests", get(circles::list_pending_requests))
        .route(
            "/circle-requests/:id/decision",
            post(circles::decide_join_request),
        )
        .route(
            "/circle-requests/:id/cancel",
            post(circles::cancel_join_request),
        )
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    REQUEST_ID_HEADER,
                    MakeRequestUuid,
                ))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
