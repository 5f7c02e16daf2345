//! Payment domain events.

use serde::{Deserialize, Serialize};

use crate::domain::booking::CancellationParty;
use crate::domain::foundation::{
    BookingId, ConsultantId, LifecycleEvent, Money, PaymentId, UserId,
};

use super::{Payment, PaymentMethod, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentEvent {
    Captured {
        payment_id: PaymentId,
        booking_id: BookingId,
        user_id: UserId,
        consultant_id: ConsultantId,
        amount: Money,
        method: PaymentMethod,
    },

    /// State transition: Completed → Refunded | PartiallyRefunded
    Refunded {
        payment_id: PaymentId,
        booking_id: BookingId,
        user_id: UserId,
        refunded_amount: Money,
        status: PaymentStatus,
        cancelled_by: CancellationParty,
    },
}

impl PaymentEvent {
    pub fn captured(payment: &Payment) -> Self {
        PaymentEvent::Captured {
            payment_id: payment.id,
            booking_id: payment.booking_id,
            user_id: payment.user_id.clone(),
            consultant_id: payment.consultant_id.clone(),
            amount: payment.amount,
            method: payment.method,
        }
    }

    pub fn refunded(payment: &Payment, cancelled_by: CancellationParty) -> Self {
        PaymentEvent::Refunded {
            payment_id: payment.id,
            booking_id: payment.booking_id,
            user_id: payment.user_id.clone(),
            refunded_amount: payment.refunded_amount,
            status: payment.status,
            cancelled_by,
        }
    }

    /// Consultants hear about captures; users hear about refunds.
    pub fn recipient(&self) -> String {
        match self {
            PaymentEvent::Captured { consultant_id, .. } => consultant_id.to_string(),
            PaymentEvent::Refunded { user_id, .. } => user_id.to_string(),
        }
    }
}

impl LifecycleEvent for PaymentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::Captured { .. } => "payment.captured.v1",
            PaymentEvent::Refunded { .. } => "payment.refunded.v1",
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            PaymentEvent::Captured { payment_id, .. } | PaymentEvent::Refunded { payment_id, .. } => {
                payment_id.to_string()
            }
        }
    }

    fn aggregate_type(&self) -> &'static str {
        "Payment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_event_goes_to_user_with_decimal_amount() {
        let event = PaymentEvent::Refunded {
            payment_id: PaymentId::new(),
            booking_id: BookingId::new(),
            user_id: UserId::new("user-1").unwrap(),
            refunded_amount: "34.375".parse().unwrap(),
            status: PaymentStatus::PartiallyRefunded,
            cancelled_by: CancellationParty::User,
        };
        assert_eq!(event.recipient(), "user-1");

        let envelope = event.to_envelope().unwrap();
        assert_eq!(envelope.event_type, "payment.refunded.v1");
        assert_eq!(envelope.payload["refunded_amount"], "34.375");
        assert_eq!(envelope.payload["status"], "partially_refunded");
    }
}
