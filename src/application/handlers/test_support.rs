//! Shared fixtures for handler tests.

use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

use crate::adapters::memory::InMemoryEntityStore;
use crate::adapters::notifications::InMemoryNotificationSink;
use crate::application::Notifier;
use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::circle::{Circle, CircleDraft, Decision, JoinRequest};
use crate::domain::foundation::{today, Actor, AdminId, ConsultantId, Money, UserId};
use crate::domain::payment::{Payment, PaymentInstrument};
use crate::ports::{EntityStore, InsertOutcome};

pub fn user_id(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn consultant_id(id: &str) -> ConsultantId {
    ConsultantId::new(id).unwrap()
}

pub fn admin_id(id: &str) -> AdminId {
    AdminId::new(id).unwrap()
}

pub fn user(id: &str) -> Actor {
    Actor::User(user_id(id))
}

pub fn consultant(id: &str) -> Actor {
    Actor::Consultant(consultant_id(id))
}

pub fn admin(id: &str) -> Actor {
    Actor::Admin(admin_id(id))
}

pub fn money(s: &str) -> Money {
    s.parse().unwrap()
}

pub fn ten_am() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap()
}

pub fn draft(max_members: u32) -> CircleDraft {
    CircleDraft {
        title: "Stress Less".to_string(),
        description: "Weekly check-in".to_string(),
        category: "stress".to_string(),
        lead_consultant_id: consultant_id("lead-1"),
        meeting_day: "wednesday".to_string(),
        meeting_time: "18:30".to_string(),
        max_members,
    }
}

/// In-memory store, recording sink and a notifier wired to it.
pub struct Fixture {
    pub store: Arc<InMemoryEntityStore>,
    pub sink: Arc<InMemoryNotificationSink>,
    pub notifier: Notifier,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryEntityStore::new());
        let sink = Arc::new(InMemoryNotificationSink::new());
        let notifier = Notifier::new(sink.clone());
        Self {
            store,
            sink,
            notifier,
        }
    }

    pub fn store(&self) -> Arc<dyn EntityStore> {
        self.store.clone()
    }

    /// Stores a pending booking for `user` dated `date`.
    pub async fn pending_booking_on(&self, user: &str, date: NaiveDate) -> Booking {
        let booking = Booking::request(user_id(user), date, ten_am(), None, date).unwrap();
        self.store.insert_booking(&booking).await.unwrap();
        booking
    }

    /// Stores a pending booking for `user` dated today.
    pub async fn pending_booking(&self, user: &str) -> Booking {
        self.pending_booking_on(user, today()).await
    }

    /// Stores a booking for `user` already accepted by `consultant`.
    pub async fn accepted_booking(&self, user: &str, consultant: &str) -> Booking {
        let booking = self.pending_booking(user).await;
        self.store
            .decide_booking(booking.id, &consultant_id(consultant), BookingStatus::Accepted)
            .await
            .unwrap()
            .unwrap()
    }

    /// Stores a PayPal payment of `amount` for an accepted booking.
    pub async fn paid(&self, booking: &Booking, amount: &str) -> Payment {
        let payment = Payment::capture(
            booking,
            &booking.user_id,
            money(amount),
            PaymentInstrument::Paypal.validate().unwrap(),
        )
        .unwrap();
        let mut tx = self.store.begin().await.unwrap();
        assert_eq!(tx.insert_payment(&payment).await.unwrap(), InsertOutcome::Inserted);
        tx.commit().await.unwrap();
        payment
    }

    pub async fn circle(&self, max_members: u32) -> Circle {
        let circle = Circle::create(draft(max_members)).unwrap();
        self.store.insert_circle(&circle).await.unwrap();
        circle
    }

    /// Stores a pending join request for `user`.
    pub async fn join_request(&self, circle: &Circle, user: &str) -> JoinRequest {
        let mut tx = self.store.begin().await.unwrap();
        let approved = tx.count_approved_members(circle.id).await.unwrap();
        let request = JoinRequest::open(circle, user_id(user), approved).unwrap();
        assert_eq!(
            tx.insert_join_request(&request).await.unwrap(),
            InsertOutcome::Inserted
        );
        tx.commit().await.unwrap();
        request
    }

    /// Fills `count` seats of `circle` with approved members.
    pub async fn approve_members(&self, circle: &Circle, count: u32) {
        for n in 0..count {
            let mut request = self.join_request(circle, &format!("member-{}", n)).await;
            let mut tx = self.store.begin().await.unwrap();
            let approved = tx.count_approved_members(circle.id).await.unwrap();
            request
                .decide(Decision::Approve, &admin_id("admin-1"), circle, approved)
                .unwrap();
            assert!(tx.record_decision(&request).await.unwrap());
            tx.commit().await.unwrap();
        }
    }
}
