//! Payment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | BookingNotFound / NotFound | 404 |
//! | BookingNotPayable | 409 |
//! | Unauthorized | 403 |
//! | AlreadyCaptured | 409 |
//! | InvalidPaymentDetails | 422 |
//! | Infrastructure | 500 |

use crate::domain::booking::BookingStatus;
use crate::domain::foundation::{BookingId, DomainError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// No payment has been captured for the booking.
    #[error("No payment recorded for booking {0}")]
    NotFound(BookingId),

    /// Capture needs an accepted booking; re-processing a refund needs a
    /// booking cancelled by the stated party.
    #[error("Booking {booking_id} is {status}, cannot {attempted}")]
    BookingNotPayable {
        booking_id: BookingId,
        status: BookingStatus,
        attempted: &'static str,
    },

    #[error("{actor} may not {action} for booking {booking_id}")]
    Unauthorized {
        booking_id: BookingId,
        action: &'static str,
        actor: String,
    },

    #[error("A payment was already captured for booking {0}")]
    AlreadyCaptured(BookingId),

    #[error("Invalid payment details for '{field}': {message}")]
    InvalidPaymentDetails { field: String, message: String },

    #[error("Payment storage error: {0}")]
    Infrastructure(#[from] DomainError),
}

impl PaymentError {
    pub fn invalid_details(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::InvalidPaymentDetails {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(booking_id: BookingId, action: &'static str, actor: impl ToString) -> Self {
        PaymentError::Unauthorized {
            booking_id,
            action,
            actor: actor.to_string(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::BookingNotFound(_) => ErrorCode::BookingNotFound,
            PaymentError::NotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::BookingNotPayable { .. } => ErrorCode::InvalidStateTransition,
            PaymentError::Unauthorized { .. } => ErrorCode::Unauthorized,
            PaymentError::AlreadyCaptured(_) => ErrorCode::DuplicateRequest,
            PaymentError::InvalidPaymentDetails { .. } => ErrorCode::InvalidPaymentDetails,
            PaymentError::Infrastructure(err) => err.code,
        }
    }

    pub fn is_contention(&self) -> bool {
        self.code().is_contention()
    }
}
