//! Lifecycle errors as HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::booking::BookingError;
use crate::domain::circle::CircleError;
use crate::domain::foundation::ErrorCode;
use crate::domain::payment::PaymentError;

use super::dto::ErrorResponse;

/// A failed request: status plus the body sent to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::bad_request(message),
        }
    }

    /// Maps a lifecycle error by its code. Infrastructure details are logged
    /// and replaced with a generic message.
    fn from_code(code: ErrorCode, message: String) -> Self {
        let status = status_for(code);
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = %code, error = %message, "Request failed");
            "Internal server error".to_string()
        } else {
            message
        };
        Self {
            status,
            body: ErrorResponse::new(code.to_string(), message),
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::BookingNotFound
        | ErrorCode::PaymentNotFound
        | ErrorCode::CircleNotFound
        | ErrorCode::JoinRequestNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidStateTransition
        | ErrorCode::AlreadyTaken
        | ErrorCode::CircleFull
        | ErrorCode::DuplicateRequest => StatusCode::CONFLICT,
        ErrorCode::Unauthorized => StatusCode::FORBIDDEN,
        ErrorCode::InvalidPaymentDetails => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyField
        | ErrorCode::OutOfRange
        | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
        ErrorCode::DatabaseError | ErrorCode::NotificationError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

impl From<CircleError> for ApiError {
    fn from(err: CircleError) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
