//! Payment handlers.
//!
//! ## Commands
//! - Capturing a payment for an accepted booking
//! - Re-applying a cancellation refund
//!
//! ## Queries
//! - Payment for a booking

mod apply_cancellation_refund;
mod capture_payment;
mod get_payment;

pub(crate) use apply_cancellation_refund::refund_within;

// Commands
pub use apply_cancellation_refund::{
    ApplyCancellationRefundCommand, ApplyCancellationRefundHandler, ApplyCancellationRefundResult,
};
pub use capture_payment::{CapturePaymentCommand, CapturePaymentHandler, CapturePaymentResult};

// Queries
pub use get_payment::{GetPaymentHandler, GetPaymentQuery};
