//! Pricing and refund tiering.

use serde::{Deserialize, Serialize};

use crate::domain::booking::CancellationParty;
use crate::domain::foundation::{Money, Percentage};

use super::{PaymentStatus, RefundMarker};

/// Share of the captured amount returned when `party` cancels: everything
/// when the consultant cancels, half when the user does.
pub fn refund_policy(party: CancellationParty) -> Percentage {
    match party {
        CancellationParty::Consultant => Percentage::HUNDRED,
        CancellationParty::User => Percentage::HALF,
    }
}

/// Refund to apply to a captured payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundPlan {
    pub share: Percentage,
    pub amount: Money,
    pub status: PaymentStatus,
    pub marker: RefundMarker,
}

impl RefundPlan {
    pub fn for_cancellation(captured: Money, party: CancellationParty) -> Self {
        let share = refund_policy(party);
        let (status, marker) = if share.is_full() {
            (PaymentStatus::Refunded, RefundMarker::FullRefunded)
        } else {
            (PaymentStatus::PartiallyRefunded, RefundMarker::PartialRefunded)
        };
        Self {
            share,
            amount: captured.percent_of(share),
            status,
            marker,
        }
    }
}

/// Session price tier chosen at capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    #[default]
    Standard,
    /// Half-rate sessions.
    Reduced,
}

/// Configured session fees by tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSchedule {
    pub standard: Money,
    pub reduced: Money,
}

impl PriceSchedule {
    pub fn price_for(&self, tier: PriceTier) -> Money {
        match tier {
            PriceTier::Standard => self.standard,
            PriceTier::Reduced => self.reduced,
        }
    }
}

impl Default for PriceSchedule {
    fn default() -> Self {
        Self {
            standard: Money::from_cents(13_750),
            reduced: Money::from_cents(6_875),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn consultant_cancellation_refunds_everything() {
        assert_eq!(refund_policy(CancellationParty::Consultant), Percentage::HUNDRED);
        let plan = RefundPlan::for_cancellation(money("137.50"), CancellationParty::Consultant);
        assert_eq!(plan.amount, money("137.50"));
        assert_eq!(plan.status, PaymentStatus::Refunded);
        assert_eq!(plan.marker, RefundMarker::FullRefunded);
    }

    #[test]
    fn user_cancellation_refunds_half() {
        assert_eq!(refund_policy(CancellationParty::User), Percentage::HALF);
        let plan = RefundPlan::for_cancellation(money("68.75"), CancellationParty::User);
        assert_eq!(plan.amount, money("34.375"));
        assert_eq!(plan.status, PaymentStatus::PartiallyRefunded);
        assert_eq!(plan.marker, RefundMarker::PartialRefunded);
    }

    #[test]
    fn default_schedule_matches_session_fees() {
        let schedule = PriceSchedule::default();
        assert_eq!(schedule.price_for(PriceTier::Standard), money("137.50"));
        assert_eq!(schedule.price_for(PriceTier::Reduced), money("68.75"));
    }

    #[test]
    fn tier_deserializes_snake_case() {
        let tier: PriceTier = serde_json::from_str(r#""reduced""#).unwrap();
        assert_eq!(tier, PriceTier::Reduced);
    }

    fn party() -> impl Strategy<Value = CancellationParty> {
        prop_oneof![
            Just(CancellationParty::User),
            Just(CancellationParty::Consultant)
        ]
    }

    proptest! {
        #[test]
        fn refund_never_exceeds_captured(minor in 0i64..1_000_000_000_000, who in party()) {
            let captured = Money::from_minor(minor).unwrap();
            let plan = RefundPlan::for_cancellation(captured, who);
            prop_assert!(plan.amount <= captured);
        }

        #[test]
        fn consultant_refund_is_exactly_captured(minor in 0i64..1_000_000_000_000) {
            let captured = Money::from_minor(minor).unwrap();
            let plan = RefundPlan::for_cancellation(captured, CancellationParty::Consultant);
            prop_assert_eq!(plan.amount, captured);
        }

        #[test]
        fn user_refund_never_exceeds_consultant_refund(minor in 0i64..1_000_000_000_000) {
            let captured = Money::from_minor(minor).unwrap();
            let by_user = RefundPlan::for_cancellation(captured, CancellationParty::User);
            let by_consultant = RefundPlan::for_cancellation(captured, CancellationParty::Consultant);
            prop_assert!(by_user.amount <= by_consultant.amount);
        }
    }
}
