//! HTTP handlers for circle and join-request endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::application::handlers::circle::{
    CancelJoinRequestCommand, ChangeCircleLeadCommand, CreateCircleCommand,
    DecideJoinRequestCommand, GetCircleRosterQuery, ListPendingRequestsQuery, RequestJoinCommand,
    SetCircleStatusCommand,
};
use crate::domain::circle::CircleDraft;
use crate::domain::foundation::CircleId;

use super::auth::RequireAuth;
use super::dto::{ChangeCircleLeadRequest, JoinDecisionRequest, SetCircleStatusRequest};
use super::error::ApiError;
use super::parse_id;
use super::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// POST /api/circles
pub async fn create_circle(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(draft): Json<CircleDraft>,
) -> ApiResult<impl IntoResponse> {
    let circle = state
        .circles
        .create
        .handle(CreateCircleCommand { actor, draft })
        .await?;
    Ok((StatusCode::CREATED, Json(circle)))
}

/// GET /api/circles/:id - circle with its live member count
pub async fn get_circle(
    State(state): State<AppState>,
    RequireAuth(_actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let circle_id: CircleId = parse_id(&id, "circle")?;
    let roster = state
        .circles
        .roster
        .handle(GetCircleRosterQuery { circle_id })
        .await?;
    Ok(Json(roster))
}

/// POST /api/circles/:id/status
pub async fn set_circle_status(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<SetCircleStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let circle_id = parse_id(&id, "circle")?;
    let circle = state
        .circles
        .set_status
        .handle(SetCircleStatusCommand {
            actor,
            circle_id,
            status: req.status,
        })
        .await?;
    Ok(Json(circle))
}

/// POST /api/circles/:id/lead
pub async fn change_circle_lead(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<ChangeCircleLeadRequest>,
) -> ApiResult<impl IntoResponse> {
    let circle_id = parse_id(&id, "circle")?;
    let circle = state
        .circles
        .change_lead
        .handle(ChangeCircleLeadCommand {
            actor,
            circle_id,
            lead_consultant_id: req.lead_consultant_id,
        })
        .await?;
    Ok(Json(circle))
}

/// POST /api/circles/:id/join
pub async fn request_join(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let circle_id = parse_id(&id, "circle")?;
    let request = state
        .circles
        .request_join
        .handle(RequestJoinCommand { circle_id, actor })
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/circle-requests
pub async fn list_pending_requests(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> ApiResult<impl IntoResponse> {
    let pending = state
        .circles
        .list_pending
        .handle(ListPendingRequestsQuery { actor })
        .await?;
    Ok(Json(pending))
}

/// POST /api/circle-requests/:id/decision
pub async fn decide_join_request(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<JoinDecisionRequest>,
) -> ApiResult<impl IntoResponse> {
    let request_id = parse_id(&id, "join request")?;
    let request = state
        .circles
        .decide
        .handle(DecideJoinRequestCommand {
            request_id,
            decision: req.decision,
            actor,
        })
        .await?;
    Ok(Json(request))
}

/// POST /api/circle-requests/:id/cancel
pub async fn cancel_join_request(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let request_id = parse_id(&id, "join request")?;
    let request = state
        .circles
        .cancel_request
        .handle(CancelJoinRequestCommand { request_id, actor })
        .await?;
    Ok(Json(request))
}
