//! HTTP DTOs.
//!
//! Aggregates serialize directly as response bodies; only request bodies and
//! composite responses get their own types here.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, BookingStatus, CancellationParty};
use crate::domain::circle::{CircleStatus, Decision};
use crate::domain::foundation::ConsultantId;
use crate::domain::payment::{Payment, PaymentInstrument, PriceTier};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBookingRequest {
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    #[serde(default)]
    pub consultant_id: Option<ConsultantId>,
}

/// Capture body: the instrument fields sit beside `method`, e.g.
/// `{"tier":"reduced","method":"bkash","bkash_number":"01712345678","pin":"1234"}`.
#[derive(Debug, Deserialize)]
pub struct CapturePaymentRequest {
    #[serde(default)]
    pub tier: PriceTier,
    #[serde(flatten)]
    pub instrument: PaymentInstrument,
}

/// Which consultant list GET /api/bookings returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingView {
    /// Pending requests the consultant may still decide.
    #[default]
    Open,
    /// Bookings already assigned to the consultant.
    Assigned,
}

/// Query string for GET /api/bookings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBookingsParams {
    #[serde(default)]
    pub view: BookingView,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetCircleStatusRequest {
    pub status: CircleStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeCircleLeadRequest {
    pub lead_consultant_id: ConsultantId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinDecisionRequest {
    pub decision: Decision,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct CancelBookingResponse {
    pub booking: Booking,
    pub cancelled_by: CancellationParty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund: Option<Payment>,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentMethod;

    #[test]
    fn capture_request_reads_flattened_instrument() {
        let req: CapturePaymentRequest = serde_json::from_str(
            r#"{"tier":"reduced","method":"bkash","bkash_number":"01712345678","pin":"1234"}"#,
        )
        .unwrap();
        assert_eq!(req.tier, PriceTier::Reduced);
        assert_eq!(req.instrument.method(), PaymentMethod::Bkash);
    }

    #[test]
    fn capture_tier_defaults_to_standard() {
        let req: CapturePaymentRequest = serde_json::from_str(r#"{"method":"paypal"}"#).unwrap();
        assert_eq!(req.tier, PriceTier::Standard);
    }

    #[test]
    fn booking_request_consultant_is_optional() {
        let req: RequestBookingRequest = serde_json::from_str(
            r#"{"preferred_date":"2030-01-15","preferred_time":"10:00:00"}"#,
        )
        .unwrap();
        assert!(req.consultant_id.is_none());
    }
}
