//! GetPaymentHandler - Query handler for a booking's payment.

use std::sync::Arc;

use crate::domain::foundation::{Actor, BookingId};
use crate::domain::payment::{Payment, PaymentError};
use crate::ports::EntityStore;

#[derive(Debug, Clone)]
pub struct GetPaymentQuery {
    pub booking_id: BookingId,
    pub actor: Actor,
}

/// Returns the payment for a booking to anyone who may see the booking.
pub struct GetPaymentHandler {
    store: Arc<dyn EntityStore>,
}

impl GetPaymentHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetPaymentQuery) -> Result<Payment, PaymentError> {
        let booking = self
            .store
            .find_booking(query.booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound(query.booking_id))?;
        if !booking.is_visible_to(&query.actor) {
            return Err(PaymentError::unauthorized(
                booking.id,
                "view payment",
                &query.actor,
            ));
        }

        self.store
            .find_payment_for_booking(booking.id)
            .await?
            .ok_or(PaymentError::NotFound(booking.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;

    #[tokio::test]
    async fn owner_and_consultant_see_payment() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;
        let payment = fx.paid(&booking, "137.50").await;
        let handler = GetPaymentHandler::new(fx.store());

        for actor in [user("u-1"), consultant("c-1"), admin("a-1")] {
            let found = handler
                .handle(GetPaymentQuery {
                    booking_id: booking.id,
                    actor,
                })
                .await
                .unwrap();
            assert_eq!(found.id, payment.id);
        }
    }

    #[tokio::test]
    async fn stranger_is_unauthorized() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;
        fx.paid(&booking, "137.50").await;

        let err = GetPaymentHandler::new(fx.store())
            .handle(GetPaymentQuery {
                booking_id: booking.id,
                actor: user("u-2"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn unpaid_booking_has_no_payment() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;

        let err = GetPaymentHandler::new(fx.store())
            .handle(GetPaymentQuery {
                booking_id: booking.id,
                actor: user("u-1"),
            })
            .await
            .unwrap_err();

        assert_eq!(err, PaymentError::NotFound(booking.id));
    }
}
