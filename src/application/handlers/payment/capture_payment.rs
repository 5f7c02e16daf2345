//! CapturePaymentHandler - Command handler for paying for an accepted booking.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::foundation::{Actor, BookingId};
use crate::domain::payment::{
    Payment, PaymentError, PaymentEvent, PaymentInstrument, PriceSchedule, PriceTier,
};
use crate::ports::{EntityStore, InsertOutcome};

#[derive(Debug)]
pub struct CapturePaymentCommand {
    pub booking_id: BookingId,
    pub actor: Actor,
    pub tier: PriceTier,
    pub instrument: PaymentInstrument,
}

#[derive(Debug, Clone)]
pub struct CapturePaymentResult {
    pub payment: Payment,
    pub event: PaymentEvent,
}

/// Handler for capturing payments.
///
/// The instrument is validated before anything is written. The booking row
/// stays locked until commit so capture and cancellation serialize.
pub struct CapturePaymentHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
    prices: PriceSchedule,
}

impl CapturePaymentHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier, prices: PriceSchedule) -> Self {
        Self {
            store,
            notifier,
            prices,
        }
    }

    pub async fn handle(
        &self,
        cmd: CapturePaymentCommand,
    ) -> Result<CapturePaymentResult, PaymentError> {
        let booking_id = cmd.booking_id;
        let payer = cmd
            .actor
            .as_user()
            .ok_or_else(|| PaymentError::unauthorized(booking_id, "capture payment", &cmd.actor))?;

        let instrument = cmd.instrument.validate().map_err(|err| {
            tracing::warn!(
                operation = "capture_payment",
                booking_id = %booking_id,
                actor = %cmd.actor,
                method = %cmd.instrument.method(),
                error = %err,
                "Payment details rejected"
            );
            err
        })?;

        let mut tx = self.store.begin().await?;
        let booking = tx
            .lock_booking(booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound(booking_id))?;
        let payment = Payment::capture(&booking, payer, self.prices.price_for(cmd.tier), instrument)?;

        if tx.insert_payment(&payment).await? == InsertOutcome::Duplicate {
            tracing::warn!(
                operation = "capture_payment",
                booking_id = %booking_id,
                actor = %cmd.actor,
                "Payment already captured"
            );
            return Err(PaymentError::AlreadyCaptured(booking_id));
        }
        tx.commit().await?;

        tracing::info!(
            operation = "capture_payment",
            booking_id = %booking_id,
            payment_id = %payment.id,
            actor = %cmd.actor,
            amount = %payment.amount,
            method = %payment.method,
            "Payment captured"
        );

        let event = PaymentEvent::captured(&payment);
        self.notifier
            .dispatch(Some(event.recipient()), &event, Some(&cmd.actor));

        Ok(CapturePaymentResult { payment, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::payment::{PaymentMethod, PaymentStatus};
    use secrecy::Secret;

    fn handler(fx: &Fixture) -> CapturePaymentHandler {
        CapturePaymentHandler::new(fx.store(), fx.notifier.clone(), PriceSchedule::default())
    }

    fn card(number: &str) -> PaymentInstrument {
        PaymentInstrument::Card {
            card_number: Secret::new(number.to_string()),
            expiry: "12/29".to_string(),
            cvv: Secret::new("123".to_string()),
            cardholder_name: "Rahim Uddin".to_string(),
        }
    }

    fn cmd(booking_id: BookingId, actor: Actor, instrument: PaymentInstrument) -> CapturePaymentCommand {
        CapturePaymentCommand {
            booking_id,
            actor,
            tier: PriceTier::Standard,
            instrument,
        }
    }

    #[tokio::test]
    async fn card_capture_keeps_last_four_only() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;

        let result = handler(&fx)
            .handle(cmd(booking.id, user("u-1"), card("4111 1111 1111 1234")))
            .await
            .unwrap();

        let payment = result.payment;
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.amount, money("137.50"));
        assert_eq!(payment.method, PaymentMethod::Card);
        assert_eq!(payment.details.card_last4.as_deref(), Some("1234"));
        assert!(payment.transaction_reference.starts_with("CARD_"));
        assert_eq!(fx.sink.settle(1).await[0].recipient, "c-1");
    }

    #[tokio::test]
    async fn reduced_tier_charges_half_rate() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;
        let mut command = cmd(booking.id, user("u-1"), PaymentInstrument::Paypal);
        command.tier = PriceTier::Reduced;

        let result = handler(&fx).handle(command).await.unwrap();

        assert_eq!(result.payment.amount, money("68.75"));
    }

    #[tokio::test]
    async fn second_capture_is_rejected() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;
        handler(&fx)
            .handle(cmd(booking.id, user("u-1"), PaymentInstrument::Paypal))
            .await
            .unwrap();

        let err = handler(&fx)
            .handle(cmd(booking.id, user("u-1"), PaymentInstrument::Paypal))
            .await
            .unwrap_err();

        assert_eq!(err, PaymentError::AlreadyCaptured(booking.id));
        assert_eq!(fx.store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn invalid_card_writes_nothing() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;

        let err = handler(&fx)
            .handle(cmd(booking.id, user("u-1"), card("4111")))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::InvalidPaymentDetails { ref field, .. } if field == "card_number"));
        assert_eq!(fx.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn pending_booking_is_not_payable() {
        let fx = Fixture::new();
        let booking = fx.pending_booking("u-1").await;

        let err = handler(&fx)
            .handle(cmd(booking.id, user("u-1"), PaymentInstrument::Paypal))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::BookingNotPayable { .. }));
    }

    #[tokio::test]
    async fn only_owner_may_pay() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;

        let err = handler(&fx)
            .handle(cmd(booking.id, user("u-2"), PaymentInstrument::Paypal))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let fx = Fixture::new();
        let id = BookingId::new();
        let err = handler(&fx)
            .handle(cmd(id, user("u-1"), PaymentInstrument::Paypal))
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::BookingNotFound(id));
    }
}
