//! Integration tests for the booking and payment lifecycles.
//!
//! Drives the public handlers against the in-memory store:
//! 1. Full request → accept → pay → cancel flows with refund tiering
//! 2. Concurrent accepts on one booking (exactly one winner)
//! 3. Refund idempotence and cancellation rollback

use chrono::NaiveTime;
use secrecy::Secret;
use std::sync::Arc;

use companionx::adapters::notifications::InMemoryNotificationSink;
use companionx::adapters::InMemoryEntityStore;
use companionx::application::handlers::booking::{
    AcceptBookingCommand, AcceptBookingHandler, CancelBookingCommand, CancelBookingHandler,
    CompleteBookingCommand, CompleteBookingHandler, RequestBookingCommand, RequestBookingHandler,
};
use companionx::application::handlers::payment::{
    ApplyCancellationRefundCommand, ApplyCancellationRefundHandler, CapturePaymentCommand,
    CapturePaymentHandler,
};
use companionx::application::Notifier;
use companionx::domain::booking::{Booking, BookingError, BookingStatus, CancellationParty};
use companionx::domain::foundation::{today, Actor, ConsultantId, Money, UserId};
use companionx::domain::payment::{PaymentInstrument, PaymentStatus, PriceSchedule, PriceTier};
use companionx::ports::EntityStore;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct World {
    store: Arc<InMemoryEntityStore>,
    sink: Arc<InMemoryNotificationSink>,
    notifier: Notifier,
}

impl World {
    fn new() -> Self {
        let store = Arc::new(InMemoryEntityStore::new());
        let sink = Arc::new(InMemoryNotificationSink::new());
        let notifier = Notifier::new(sink.clone());
        Self {
            store,
            sink,
            notifier,
        }
    }

    fn store(&self) -> Arc<dyn EntityStore> {
        self.store.clone()
    }

    async fn request(&self, user: &str) -> Booking {
        RequestBookingHandler::new(self.store(), self.notifier.clone())
            .handle(RequestBookingCommand {
                actor: user_actor(user),
                preferred_date: today(),
                preferred_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                preferred_consultant: None,
            })
            .await
            .unwrap()
            .booking
    }

    async fn accept(&self, booking: &Booking, consultant: &str) -> Result<Booking, BookingError> {
        AcceptBookingHandler::new(self.store(), self.notifier.clone())
            .handle(AcceptBookingCommand {
                booking_id: booking.id,
                actor: consultant_actor(consultant),
            })
            .await
            .map(|r| r.booking)
    }

    async fn pay(&self, booking: &Booking, user: &str, tier: PriceTier) {
        CapturePaymentHandler::new(self.store(), self.notifier.clone(), PriceSchedule::default())
            .handle(CapturePaymentCommand {
                booking_id: booking.id,
                actor: user_actor(user),
                tier,
                instrument: PaymentInstrument::Card {
                    card_number: Secret::new("4111111111111234".to_string()),
                    expiry: "08/30".to_string(),
                    cvv: Secret::new("321".to_string()),
                    cardholder_name: "Nusrat Jahan".to_string(),
                },
            })
            .await
            .unwrap();
    }

    fn cancel_handler(&self) -> CancelBookingHandler {
        CancelBookingHandler::new(self.store(), self.notifier.clone())
    }
}

fn user_actor(id: &str) -> Actor {
    Actor::User(UserId::new(id).unwrap())
}

fn consultant_actor(id: &str) -> Actor {
    Actor::Consultant(ConsultantId::new(id).unwrap())
}

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn consultant_cancellation_refunds_full_standard_fee() {
    let world = World::new();
    let booking = world.request("u-1").await;
    world.accept(&booking, "c-1").await.unwrap();
    world.pay(&booking, "u-1", PriceTier::Standard).await;

    let result = world
        .cancel_handler()
        .handle(CancelBookingCommand {
            booking_id: booking.id,
            actor: consultant_actor("c-1"),
        })
        .await
        .unwrap();

    assert_eq!(result.booking.status, BookingStatus::CancelledByConsultant);
    let payment = world
        .store
        .find_payment_for_booking(booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.amount, money("137.50"));
    assert_eq!(payment.refunded_amount, money("137.50"));
    assert_eq!(payment.status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn user_cancellation_refunds_half_of_reduced_fee() {
    let world = World::new();
    let booking = world.request("u-1").await;
    world.accept(&booking, "c-1").await.unwrap();
    world.pay(&booking, "u-1", PriceTier::Reduced).await;

    world
        .cancel_handler()
        .handle(CancelBookingCommand {
            booking_id: booking.id,
            actor: user_actor("u-1"),
        })
        .await
        .unwrap();

    let payment = world
        .store
        .find_payment_for_booking(booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.amount, money("68.75"));
    assert_eq!(payment.refunded_amount, money("34.375"));
    assert_eq!(payment.refunded_amount.to_string(), "34.375");
    assert_eq!(payment.status, PaymentStatus::PartiallyRefunded);
}

#[tokio::test]
async fn session_runs_to_completion() {
    let world = World::new();
    let booking = world.request("u-1").await;
    world.accept(&booking, "c-1").await.unwrap();

    let completed = CompleteBookingHandler::new(world.store(), world.notifier.clone())
        .handle(CompleteBookingCommand {
            booking_id: booking.id,
            actor: consultant_actor("c-1"),
        })
        .await
        .unwrap()
        .booking;

    assert_eq!(completed.status, BookingStatus::Completed);
    let err = world
        .cancel_handler()
        .handle(CancelBookingCommand {
            booking_id: booking.id,
            actor: user_actor("u-1"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ten_consultants_race_for_one_booking() {
    let world = Arc::new(World::new());
    let booking = world.request("u-1").await;

    let mut tasks = Vec::new();
    for i in 0..10 {
        let world = world.clone();
        let booking = booking.clone();
        tasks.push(tokio::spawn(async move {
            world.accept(&booking, &format!("c-{}", i)).await
        }));
    }

    let mut winners = Vec::new();
    let mut taken = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(booking) => winners.push(booking),
            Err(BookingError::AlreadyTaken(_)) => taken += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(taken, 9);
    let stored = world.store.find_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Accepted);
    assert_eq!(stored.consultant_id, winners[0].consultant_id);
}

#[tokio::test]
async fn refund_is_applied_once() {
    let world = World::new();
    let booking = world.request("u-1").await;
    world.accept(&booking, "c-1").await.unwrap();
    world.pay(&booking, "u-1", PriceTier::Standard).await;
    world
        .cancel_handler()
        .handle(CancelBookingCommand {
            booking_id: booking.id,
            actor: user_actor("u-1"),
        })
        .await
        .unwrap();

    let replay = ApplyCancellationRefundHandler::new(world.store(), world.notifier.clone())
        .handle(ApplyCancellationRefundCommand {
            booking_id: booking.id,
            cancelled_by: CancellationParty::User,
        })
        .await
        .unwrap();

    assert!(replay.payment.is_none());
    let payment = world
        .store
        .find_payment_for_booking(booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.refunded_amount, money("68.75"));
}

#[tokio::test]
async fn failed_refund_leaves_booking_accepted() {
    let world = World::new();
    let booking = world.request("u-1").await;
    world.accept(&booking, "c-1").await.unwrap();
    world.pay(&booking, "u-1", PriceTier::Standard).await;
    world.store.fail_refunds(true);

    let err = world
        .cancel_handler()
        .handle(CancelBookingCommand {
            booking_id: booking.id,
            actor: consultant_actor("c-1"),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::Refund(_)));
    let stored = world.store.find_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Accepted);

    world.store.fail_refunds(false);
    world
        .cancel_handler()
        .handle(CancelBookingCommand {
            booking_id: booking.id,
            actor: consultant_actor("c-1"),
        })
        .await
        .unwrap();
    let payment = world
        .store
        .find_payment_for_booking(booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn notification_failure_does_not_change_outcome() {
    let world = World::new();
    world.sink.fail_deliveries(true);
    let booking = world.request("u-1").await;

    let accepted = world.accept(&booking, "c-1").await.unwrap();

    assert_eq!(accepted.status, BookingStatus::Accepted);
    let sent = world.sink.settle(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "u-1");
}
