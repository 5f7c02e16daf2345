//! Booking-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | InvalidTransition | 409 |
//! | Unauthorized | 403 |
//! | AlreadyTaken | 409 |
//! | ValidationFailed | 400 |
//! | Refund | from the payment error |
//! | Infrastructure | 500 |

use crate::domain::foundation::{BookingId, DomainError, ErrorCode, ValidationError};
use crate::domain::payment::PaymentError;
use thiserror::Error;

use super::BookingStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// The requested edge does not leave the booking's current status.
    #[error("Cannot {attempted} booking {booking_id} in status {current}")]
    InvalidTransition {
        booking_id: BookingId,
        current: BookingStatus,
        attempted: &'static str,
    },

    #[error("{actor} may not {action} {}", target(.booking_id))]
    Unauthorized {
        booking_id: Option<BookingId>,
        action: &'static str,
        actor: String,
    },

    /// Another consultant decided the booking first.
    #[error("Booking {0} was already taken by another consultant")]
    AlreadyTaken(BookingId),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// The refund step of a cancellation failed; nothing was committed.
    #[error("Refund failed during cancellation: {0}")]
    Refund(#[from] PaymentError),

    #[error("Booking storage error: {0}")]
    Infrastructure(#[from] DomainError),
}

impl BookingError {
    pub fn invalid_transition(
        booking_id: BookingId,
        current: BookingStatus,
        attempted: &'static str,
    ) -> Self {
        BookingError::InvalidTransition {
            booking_id,
            current,
            attempted,
        }
    }

    pub fn unauthorized(
        booking_id: Option<BookingId>,
        action: &'static str,
        actor: impl ToString,
    ) -> Self {
        BookingError::Unauthorized {
            booking_id,
            action,
            actor: actor.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::NotFound(_) => ErrorCode::BookingNotFound,
            BookingError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            BookingError::Unauthorized { .. } => ErrorCode::Unauthorized,
            BookingError::AlreadyTaken(_) => ErrorCode::AlreadyTaken,
            BookingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BookingError::Refund(err) => err.code(),
            BookingError::Infrastructure(err) => err.code,
        }
    }

    /// True when a concurrent writer won; the caller may re-query and move on.
    pub fn is_contention(&self) -> bool {
        self.code().is_contention()
    }
}

/// `booking <id>` for a single booking, `bookings` for list-wide actions.
fn target(booking_id: &Option<BookingId>) -> String {
    match booking_id {
        Some(id) => format!("booking {}", id),
        None => "bookings".to_string(),
    }
}

impl From<ValidationError> for BookingError {
    fn from(err: ValidationError) -> Self {
        BookingError::validation(err.field().to_string(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_taken_is_contention() {
        let err = BookingError::AlreadyTaken(BookingId::new());
        assert_eq!(err.code(), ErrorCode::AlreadyTaken);
        assert!(err.is_contention());
    }

    #[test]
    fn invalid_transition_is_not_contention() {
        let err =
            BookingError::invalid_transition(BookingId::new(), BookingStatus::Declined, "accept");
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert!(!err.is_contention());
        assert!(err.to_string().contains("declined"));
    }

    #[test]
    fn infrastructure_keeps_underlying_code() {
        let err: BookingError = DomainError::database("pool timed out").into();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }

    #[test]
    fn refund_failure_reports_payment_code() {
        let err: BookingError = PaymentError::Infrastructure(DomainError::database("x")).into();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }

    #[test]
    fn unauthorized_names_the_booking_when_there_is_one() {
        let id = BookingId::new();
        let err = BookingError::unauthorized(Some(id), "cancel", "user:u-2");
        assert_eq!(err.to_string(), format!("user:u-2 may not cancel booking {}", id));
    }

    #[test]
    fn unauthorized_without_booking_reads_as_list_wide() {
        let err = BookingError::unauthorized(None, "list", "admin:a-1");
        assert_eq!(err.to_string(), "admin:a-1 may not list bookings");
        assert!(!err.to_string().contains("Some"));
    }

    #[test]
    fn validation_error_converts() {
        let err: BookingError = ValidationError::empty_field("preferred_time").into();
        assert!(matches!(err, BookingError::ValidationFailed { ref field, .. } if field == "preferred_time"));
    }
}
