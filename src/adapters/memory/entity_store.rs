//! In-memory EntityStore for tests and local runs.
//!
//! All tables live behind one tokio mutex. A transaction holds that mutex
//! from `begin` until it is committed or dropped and works on a staged copy
//! of the tables, so units of work are fully serialized and a dropped
//! transaction leaves no trace.
//!
//! Do not call `EntityStore` methods while holding a transaction from the
//! same store: they wait for the same mutex.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::circle::{Circle, CircleStatus, JoinRequest, JoinRequestStatus};
use crate::domain::foundation::{
    BookingId, CircleId, ConsultantId, DomainError, JoinRequestId, Timestamp, UserId,
};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{EntityStore, InsertOutcome, StoreTransaction};

#[derive(Debug, Clone, Default)]
struct Tables {
    bookings: HashMap<BookingId, Booking>,
    /// Keyed by booking: one payment per booking.
    payments: HashMap<BookingId, Payment>,
    circles: HashMap<CircleId, Circle>,
    join_requests: HashMap<JoinRequestId, JoinRequest>,
}

impl Tables {
    fn approved_members(&self, circle_id: CircleId) -> u32 {
        self.join_requests
            .values()
            .filter(|r| r.circle_id == circle_id && r.status == JoinRequestStatus::Approved)
            .count() as u32
    }

    fn has_live_request(&self, circle_id: CircleId, user: &UserId) -> bool {
        self.join_requests
            .values()
            .any(|r| r.circle_id == circle_id && &r.user_id == user && r.status.is_live())
    }
}

/// In-memory entity store.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    tables: Arc<Mutex<Tables>>,
    fail_refunds: Arc<AtomicBool>,
}

impl InMemoryEntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Makes `record_refund` fail with a database error until reset, to
    /// exercise rollback of cancellations.
    pub fn fail_refunds(&self, fail: bool) {
        self.fail_refunds.store(fail, Ordering::SeqCst);
    }

    /// Number of payments stored.
    pub async fn payment_count(&self) -> usize {
        self.tables.lock().await.payments.len()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            staged,
            fail_refunds: self.fail_refunds.load(Ordering::SeqCst),
        }))
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), DomainError> {
        self.tables
            .lock()
            .await
            .bookings
            .insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.tables.lock().await.bookings.get(&id).cloned())
    }

    async fn list_bookings_for_user(&self, user: &UserId) -> Result<Vec<Booking>, DomainError> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.is_owned_by(user))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn list_open_bookings_for(
        &self,
        consultant: &ConsultantId,
    ) -> Result<Vec<Booking>, DomainError> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.is_open_to(consultant))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.preferred_date, b.preferred_time));
        Ok(bookings)
    }

    async fn list_bookings_for_consultant(
        &self,
        consultant: &ConsultantId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, DomainError> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.consultant_id.as_ref() == Some(consultant))
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.preferred_date, b.preferred_time));
        Ok(bookings)
    }

    async fn list_all_bookings(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, DomainError> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn decide_booking(
        &self,
        id: BookingId,
        consultant: &ConsultantId,
        target: BookingStatus,
    ) -> Result<Option<Booking>, DomainError> {
        let mut tables = self.tables.lock().await;
        let Some(booking) = tables.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.decide(consultant, target).is_err() {
            return Ok(None);
        }
        Ok(Some(booking.clone()))
    }

    async fn complete_booking(
        &self,
        id: BookingId,
        consultant: &ConsultantId,
    ) -> Result<Option<Booking>, DomainError> {
        let mut tables = self.tables.lock().await;
        let Some(booking) = tables.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != BookingStatus::Accepted || !booking.is_assigned_to(consultant) {
            return Ok(None);
        }
        booking.status = BookingStatus::Completed;
        booking.updated_at = Timestamp::now();
        Ok(Some(booking.clone()))
    }

    async fn find_payment_for_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self.tables.lock().await.payments.get(&booking_id).cloned())
    }

    async fn insert_circle(&self, circle: &Circle) -> Result<(), DomainError> {
        self.tables
            .lock()
            .await
            .circles
            .insert(circle.id, circle.clone());
        Ok(())
    }

    async fn find_circle(&self, id: CircleId) -> Result<Option<Circle>, DomainError> {
        Ok(self.tables.lock().await.circles.get(&id).cloned())
    }

    async fn update_circle_status(
        &self,
        id: CircleId,
        status: CircleStatus,
    ) -> Result<Option<Circle>, DomainError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.circles.get_mut(&id).map(|circle| {
            circle.status = status;
            circle.clone()
        }))
    }

    async fn update_circle_lead(
        &self,
        id: CircleId,
        lead: &ConsultantId,
    ) -> Result<Option<Circle>, DomainError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.circles.get_mut(&id).map(|circle| {
            circle.lead_consultant_id = lead.clone();
            circle.clone()
        }))
    }

    async fn count_approved_members(&self, circle_id: CircleId) -> Result<u32, DomainError> {
        Ok(self.tables.lock().await.approved_members(circle_id))
    }

    async fn find_join_request(
        &self,
        id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, DomainError> {
        Ok(self.tables.lock().await.join_requests.get(&id).cloned())
    }

    async fn list_pending_join_requests(&self) -> Result<Vec<JoinRequest>, DomainError> {
        let tables = self.tables.lock().await;
        let mut pending: Vec<JoinRequest> = tables
            .join_requests
            .values()
            .filter(|r| r.status == JoinRequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(pending)
    }

    async fn cancel_join_request(
        &self,
        id: JoinRequestId,
        user: &UserId,
    ) -> Result<Option<JoinRequest>, DomainError> {
        let mut tables = self.tables.lock().await;
        let Some(request) = tables.join_requests.get_mut(&id) else {
            return Ok(None);
        };
        if request.cancel_by(user).is_err() {
            return Ok(None);
        }
        Ok(Some(request.clone()))
    }
}

/// Serialized unit of work over `InMemoryEntityStore`.
struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    fail_refunds: bool,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn lock_booking(&mut self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.staged.bookings.get(&id).cloned())
    }

    async fn transition_booking(
        &mut self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, DomainError> {
        match self.staged.bookings.get_mut(&id) {
            Some(booking) if booking.status == from => {
                booking.status = to;
                booking.updated_at = Timestamp::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_payment_for_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self.staged.payments.get(&booking_id).cloned())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<InsertOutcome, DomainError> {
        if self.staged.payments.contains_key(&payment.booking_id) {
            return Ok(InsertOutcome::Duplicate);
        }
        self.staged
            .payments
            .insert(payment.booking_id, payment.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn record_refund(&mut self, payment: &Payment) -> Result<bool, DomainError> {
        if self.fail_refunds {
            return Err(DomainError::database("refund write failed (injected)"));
        }
        match self.staged.payments.get_mut(&payment.booking_id) {
            Some(stored) if stored.status == PaymentStatus::Completed => {
                *stored = payment.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn lock_circle(&mut self, id: CircleId) -> Result<Option<Circle>, DomainError> {
        Ok(self.staged.circles.get(&id).cloned())
    }

    async fn count_approved_members(&mut self, circle_id: CircleId) -> Result<u32, DomainError> {
        Ok(self.staged.approved_members(circle_id))
    }

    async fn insert_join_request(
        &mut self,
        request: &JoinRequest,
    ) -> Result<InsertOutcome, DomainError> {
        if self
            .staged
            .has_live_request(request.circle_id, &request.user_id)
        {
            return Ok(InsertOutcome::Duplicate);
        }
        self.staged
            .join_requests
            .insert(request.id, request.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn lock_join_request(
        &mut self,
        id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, DomainError> {
        Ok(self.staged.join_requests.get(&id).cloned())
    }

    async fn record_decision(&mut self, request: &JoinRequest) -> Result<bool, DomainError> {
        match self.staged.join_requests.get_mut(&request.id) {
            Some(stored) if stored.status == JoinRequestStatus::Pending => {
                *stored = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryTransaction {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::circle::CircleDraft;
    use chrono::{NaiveDate, NaiveTime};

    fn booking() -> Booking {
        let date = NaiveDate::from_ymd_opt(2031, 2, 3).unwrap();
        Booking::request(
            UserId::new("user-1").unwrap(),
            date,
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            None,
            date,
        )
        .unwrap()
    }

    fn consultant(id: &str) -> ConsultantId {
        ConsultantId::new(id).unwrap()
    }

    fn circle() -> Circle {
        Circle::create(CircleDraft {
            title: "Addiction Recovery".to_string(),
            description: String::new(),
            category: "addiction".to_string(),
            lead_consultant_id: consultant("c-1"),
            meeting_day: "friday".to_string(),
            meeting_time: "17:00".to_string(),
            max_members: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn decide_booking_applies_once() {
        let store = InMemoryEntityStore::new();
        let b = booking();
        store.insert_booking(&b).await.unwrap();

        let first = store
            .decide_booking(b.id, &consultant("c-1"), BookingStatus::Accepted)
            .await
            .unwrap();
        let second = store
            .decide_booking(b.id, &consultant("c-2"), BookingStatus::Accepted)
            .await
            .unwrap();

        assert_eq!(first.unwrap().consultant_id, Some(consultant("c-1")));
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryEntityStore::new();
        let b = booking();
        store.insert_booking(&b).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            assert!(tx
                .transition_booking(b.id, BookingStatus::Pending, BookingStatus::Declined)
                .await
                .unwrap());
        }

        let stored = store.find_booking(b.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = InMemoryEntityStore::new();
        let b = booking();
        store.insert_booking(&b).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.transition_booking(b.id, BookingStatus::Pending, BookingStatus::Declined)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let stored = store.find_booking(b.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Declined);
    }

    #[tokio::test]
    async fn transition_requires_expected_status() {
        let store = InMemoryEntityStore::new();
        let b = booking();
        store.insert_booking(&b).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let moved = tx
            .transition_booking(b.id, BookingStatus::Accepted, BookingStatus::CancelledByUser)
            .await
            .unwrap();
        assert!(!moved);
    }

    #[tokio::test]
    async fn live_join_request_blocks_duplicate() {
        let store = InMemoryEntityStore::new();
        let c = circle();
        store.insert_circle(&c).await.unwrap();
        let user = UserId::new("u-1").unwrap();

        let mut tx = store.begin().await.unwrap();
        let first = JoinRequest::open(&c, user.clone(), 0).unwrap();
        let second = JoinRequest::open(&c, user, 0).unwrap();
        assert_eq!(tx.insert_join_request(&first).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(tx.insert_join_request(&second).await.unwrap(), InsertOutcome::Duplicate);
    }

    #[tokio::test]
    async fn cancelled_request_frees_the_slot() {
        let store = InMemoryEntityStore::new();
        let c = circle();
        store.insert_circle(&c).await.unwrap();
        let user = UserId::new("u-1").unwrap();

        let first = JoinRequest::open(&c, user.clone(), 0).unwrap();
        let mut tx = store.begin().await.unwrap();
        tx.insert_join_request(&first).await.unwrap();
        tx.commit().await.unwrap();

        assert!(store.cancel_join_request(first.id, &user).await.unwrap().is_some());

        let again = JoinRequest::open(&c, user, 0).unwrap();
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.insert_join_request(&again).await.unwrap(), InsertOutcome::Inserted);
    }

    #[tokio::test]
    async fn injected_refund_failure_surfaces_as_database_error() {
        let store = InMemoryEntityStore::new();
        store.fail_refunds(true);
        let mut tx = store.begin().await.unwrap();

        let mut b = booking();
        b.decide(&consultant("c-1"), BookingStatus::Accepted).unwrap();
        let payment = Payment::capture(
            &b,
            &b.user_id.clone(),
            "137.50".parse().unwrap(),
            crate::domain::payment::PaymentInstrument::Paypal.validate().unwrap(),
        )
        .unwrap();

        let err = tx.record_refund(&payment).await.unwrap_err();
        assert_eq!(err.code, crate::domain::foundation::ErrorCode::DatabaseError);
    }
}
