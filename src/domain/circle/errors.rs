//! Circle membership error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | CircleNotFound / RequestNotFound | 404 |
//! | CircleInactive / InvalidTransition | 409 |
//! | CircleFull | 409 |
//! | DuplicateRequest | 409 |
//! | Unauthorized | 403 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{
    CircleId, DomainError, ErrorCode, JoinRequestId, UserId, ValidationError,
};
use thiserror::Error;

use super::JoinRequestStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircleError {
    #[error("Circle not found: {0}")]
    CircleNotFound(CircleId),

    #[error("Join request not found: {0}")]
    RequestNotFound(JoinRequestId),

    #[error("Circle {0} is not accepting members")]
    CircleInactive(CircleId),

    /// Approved membership already equals capacity.
    #[error("Circle {0} is full")]
    CircleFull(CircleId),

    #[error("User {user_id} already has a pending or approved request for circle {circle_id}")]
    DuplicateRequest { circle_id: CircleId, user_id: UserId },

    #[error("Cannot {attempted} join request {request_id} in status {current}")]
    InvalidTransition {
        request_id: JoinRequestId,
        current: JoinRequestStatus,
        attempted: &'static str,
    },

    #[error("{actor} may not {action}")]
    Unauthorized { action: &'static str, actor: String },

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Circle storage error: {0}")]
    Infrastructure(#[from] DomainError),
}

impl CircleError {
    pub fn unauthorized(action: &'static str, actor: impl ToString) -> Self {
        CircleError::Unauthorized {
            action,
            actor: actor.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CircleError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CircleError::CircleNotFound(_) => ErrorCode::CircleNotFound,
            CircleError::RequestNotFound(_) => ErrorCode::JoinRequestNotFound,
            CircleError::CircleInactive(_) | CircleError::InvalidTransition { .. } => {
                ErrorCode::InvalidStateTransition
            }
            CircleError::CircleFull(_) => ErrorCode::CircleFull,
            CircleError::DuplicateRequest { .. } => ErrorCode::DuplicateRequest,
            CircleError::Unauthorized { .. } => ErrorCode::Unauthorized,
            CircleError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CircleError::Infrastructure(err) => err.code,
        }
    }

    pub fn is_contention(&self) -> bool {
        self.code().is_contention()
    }
}

impl From<ValidationError> for CircleError {
    fn from(err: ValidationError) -> Self {
        CircleError::validation(err.field().to_string(), err.to_string())
    }
}
