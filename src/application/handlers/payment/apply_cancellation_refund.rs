//! Cancellation refunds.
//!
//! `refund_within` is the refund step that booking cancellation runs inside
//! its own unit of work. `ApplyCancellationRefundHandler` re-processes a
//! refund for a booking that is already cancelled, in a fresh transaction.
//! Both are no-ops when there is no payment or it was already refunded.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::booking::CancellationParty;
use crate::domain::foundation::BookingId;
use crate::domain::payment::{Payment, PaymentError, PaymentEvent};
use crate::ports::{EntityStore, StoreTransaction};

/// Applies the refund owed for a cancellation by `party` inside `tx`.
///
/// Returns the refunded payment, or `None` when nothing was refunded.
pub(crate) async fn refund_within(
    tx: &mut dyn StoreTransaction,
    booking_id: BookingId,
    party: CancellationParty,
) -> Result<Option<Payment>, PaymentError> {
    let Some(mut payment) = tx.find_payment_for_booking(booking_id).await? else {
        return Ok(None);
    };
    let Some(plan) = payment.apply_refund(party) else {
        tracing::debug!(
            booking_id = %booking_id,
            status = %payment.status,
            "Payment already refunded"
        );
        return Ok(None);
    };

    if !tx.record_refund(&payment).await? {
        return Ok(None);
    }

    tracing::info!(
        operation = "apply_cancellation_refund",
        booking_id = %booking_id,
        payment_id = %payment.id,
        share = %plan.share,
        refunded = %plan.amount,
        status = %payment.status,
        "Refund applied"
    );
    Ok(Some(payment))
}

/// Intra-system command to (re)apply a cancellation refund.
#[derive(Debug, Clone)]
pub struct ApplyCancellationRefundCommand {
    pub booking_id: BookingId,
    pub cancelled_by: CancellationParty,
}

#[derive(Debug, Clone)]
pub struct ApplyCancellationRefundResult {
    /// The refunded payment; `None` when there was nothing to refund.
    pub payment: Option<Payment>,
}

pub struct ApplyCancellationRefundHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl ApplyCancellationRefundHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(
        &self,
        cmd: ApplyCancellationRefundCommand,
    ) -> Result<ApplyCancellationRefundResult, PaymentError> {
        let booking_id = cmd.booking_id;
        let mut tx = self.store.begin().await?;

        let booking = tx
            .lock_booking(booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound(booking_id))?;
        if booking.status.cancellation_party() != Some(cmd.cancelled_by) {
            return Err(PaymentError::BookingNotPayable {
                booking_id,
                status: booking.status,
                attempted: "refund cancellation",
            });
        }

        let payment = refund_within(&mut *tx, booking_id, cmd.cancelled_by).await?;
        tx.commit().await?;

        if let Some(payment) = &payment {
            let event = PaymentEvent::refunded(payment, cmd.cancelled_by);
            self.notifier.dispatch(Some(event.recipient()), &event, None);
        }

        Ok(ApplyCancellationRefundResult { payment })
    }
}
