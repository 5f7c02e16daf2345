//! Payment aggregate.
//!
//! # Invariants
//!
//! - At most one payment per booking (unique `booking_id` in storage)
//! - `refunded_amount <= amount`
//! - A refund is applied at most once; later attempts are no-ops

use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, BookingStatus, CancellationParty};
use crate::domain::foundation::{
    BookingId, ConsultantId, Money, PaymentId, StateMachine, Timestamp, UserId,
};

use super::{
    PaymentDetails, PaymentError, PaymentMethod, PaymentStatus, RefundPlan, ValidatedInstrument,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub consultant_id: ConsultantId,
    /// Amount captured.
    pub amount: Money,
    pub refunded_amount: Money,
    pub method: PaymentMethod,
    pub transaction_reference: String,
    pub status: PaymentStatus,
    pub details: PaymentDetails,
    pub captured_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    /// Records a completed payment for an accepted booking owned by `payer`.
    pub fn capture(
        booking: &Booking,
        payer: &UserId,
        amount: Money,
        instrument: ValidatedInstrument,
    ) -> Result<Self, PaymentError> {
        if !booking.is_owned_by(payer) {
            return Err(PaymentError::unauthorized(
                booking.id,
                "capture payment",
                format!("user:{}", payer),
            ));
        }
        let consultant_id = match (&booking.status, &booking.consultant_id) {
            (BookingStatus::Accepted, Some(consultant)) => consultant.clone(),
            _ => {
                return Err(PaymentError::BookingNotPayable {
                    booking_id: booking.id,
                    status: booking.status,
                    attempted: "capture payment",
                })
            }
        };

        let now = Timestamp::now();
        Ok(Self {
            id: PaymentId::new(),
            booking_id: booking.id,
            user_id: payer.clone(),
            consultant_id,
            amount,
            refunded_amount: Money::ZERO,
            method: instrument.method,
            transaction_reference: instrument.transaction_reference,
            status: PaymentStatus::Completed,
            details: instrument.details,
            captured_at: now,
            updated_at: now,
        })
    }

    /// Refund owed for a cancellation by `party`, or `None` when a refund
    /// was already applied.
    pub fn refund_plan(&self, party: CancellationParty) -> Option<RefundPlan> {
        if self.status != PaymentStatus::Completed {
            return None;
        }
        Some(RefundPlan::for_cancellation(self.amount, party))
    }

    /// Applies a refund for a cancellation by `party`.
    ///
    /// Returns the plan that was applied, or `None` if the payment had
    /// already been refunded.
    pub fn apply_refund(&mut self, party: CancellationParty) -> Option<RefundPlan> {
        let plan = self.refund_plan(party)?;
        self.status = self.status.transition_to(plan.status).ok()?;
        self.refunded_amount = plan.amount;
        self.details.refund_status = Some(plan.marker);
        self.updated_at = Timestamp::now();
        Some(plan)
    }
}
