//! HTTP handlers for booking and payment endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::application::handlers::booking::{
    AcceptBookingCommand, CancelBookingCommand, CompleteBookingCommand, DeclineBookingCommand,
    GetBookingQuery, ListAllBookingsQuery, ListConsultantBookingsQuery, ListPendingBookingsQuery,
    ListUserBookingsQuery, RequestBookingCommand,
};
use crate::application::handlers::payment::{CapturePaymentCommand, GetPaymentQuery};
use crate::domain::foundation::{Actor, BookingId};

use super::auth::RequireAuth;
use super::dto::{
    BookingView, CancelBookingResponse, CapturePaymentRequest, ListBookingsParams,
    RequestBookingRequest,
};
use super::error::ApiError;
use super::parse_id;
use super::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// POST /api/bookings
pub async fn request_booking(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(req): Json<RequestBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .bookings
        .request
        .handle(RequestBookingCommand {
            actor,
            preferred_date: req.preferred_date,
            preferred_time: req.preferred_time,
            preferred_consultant: req.consultant_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(result.booking)))
}

/// GET /api/bookings - own bookings for users, open or assigned requests for
/// consultants, everything for admins
pub async fn list_bookings(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Query(params): Query<ListBookingsParams>,
) -> ApiResult<impl IntoResponse> {
    let status = params.status;
    let bookings = match actor {
        Actor::Admin(_) => {
            state
                .bookings
                .list_all
                .handle(ListAllBookingsQuery { actor, status })
                .await?
        }
        Actor::Consultant(_) if params.view == BookingView::Assigned => {
            state
                .bookings
                .list_assigned
                .handle(ListConsultantBookingsQuery { actor, status })
                .await?
        }
        Actor::Consultant(_) => {
            state
                .bookings
                .list_pending
                .handle(ListPendingBookingsQuery { actor })
                .await?
        }
        _ => {
            state
                .bookings
                .list_own
                .handle(ListUserBookingsQuery { actor })
                .await?
        }
    };
    Ok(Json(bookings))
}

/// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let booking_id: BookingId = parse_id(&id, "booking")?;
    let booking = state
        .bookings
        .get
        .handle(GetBookingQuery { booking_id, actor })
        .await?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/accept
pub async fn accept_booking(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let booking_id = parse_id(&id, "booking")?;
    let result = state
        .bookings
        .accept
        .handle(AcceptBookingCommand { booking_id, actor })
        .await?;
    Ok(Json(result.booking))
}

/// POST /api/bookings/:id/decline
pub async fn decline_booking(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let booking_id = parse_id(&id, "booking")?;
    let result = state
        .bookings
        .decline
        .handle(DeclineBookingCommand { booking_id, actor })
        .await?;
    Ok(Json(result.booking))
}

/// POST /api/bookings/:id/complete
pub async fn complete_booking(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let booking_id = parse_id(&id, "booking")?;
    let result = state
        .bookings
        .complete
        .handle(CompleteBookingCommand { booking_id, actor })
        .await?;
    Ok(Json(result.booking))
}

/// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let booking_id = parse_id(&id, "booking")?;
    let result = state
        .bookings
        .cancel
        .handle(CancelBookingCommand { booking_id, actor })
        .await?;
    Ok(Json(CancelBookingResponse {
        booking: result.booking,
        cancelled_by: result.cancelled_by,
        refund: result.refund,
    }))
}

/// POST /api/bookings/:id/payment
pub async fn capture_payment(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<CapturePaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let booking_id = parse_id(&id, "booking")?;
    let result = state
        .bookings
        .capture_payment
        .handle(CapturePaymentCommand {
            booking_id,
            actor,
            tier: req.tier,
            instrument: req.instrument,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(result.payment)))
}

/// GET /api/bookings/:id/payment
pub async fn get_payment(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let booking_id = parse_id(&id, "booking")?;
    let payment = state
        .bookings
        .get_payment
        .handle(GetPaymentQuery { booking_id, actor })
        .await?;
    Ok(Json(payment))
}
