//! EntityStore port - Durable storage for bookings, payments and circles.
//!
//! Two kinds of access are offered:
//!
//! - Single-statement operations on `EntityStore`. State-changing ones are
//!   conditional writes: they apply only while the row still satisfies the
//!   precondition, and report whether a row was changed.
//! - A `StoreTransaction` unit of work for operations that must read, decide
//!   and write several rows atomically (cancellation with refund, capture,
//!   approval under capacity). Reads made through a transaction lock the row
//!   until commit; dropping a transaction without `commit` rolls it back.

use async_trait::async_trait;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::circle::{Circle, CircleStatus, JoinRequest};
use crate::domain::foundation::{
    BookingId, CircleId, ConsultantId, DomainError, JoinRequestId, UserId,
};
use crate::domain::payment::Payment;

/// Result of an insert guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A conflicting row already exists; nothing was written.
    Duplicate,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Starts a unit of work.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError>;

    // ─── Bookings ───────────────────────────────────────────────────────────

    async fn insert_booking(&self, booking: &Booking) -> Result<(), DomainError>;

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, DomainError>;

    /// Bookings requested by `user`, newest first.
    async fn list_bookings_for_user(&self, user: &UserId) -> Result<Vec<Booking>, DomainError>;

    /// Pending bookings `consultant` may decide: unassigned or offered to them.
    async fn list_open_bookings_for(
        &self,
        consultant: &ConsultantId,
    ) -> Result<Vec<Booking>, DomainError>;

    /// Bookings assigned to `consultant`, optionally narrowed to one status,
    /// soonest session first.
    async fn list_bookings_for_consultant(
        &self,
        consultant: &ConsultantId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, DomainError>;

    /// Every booking, optionally narrowed to one status, newest first.
    async fn list_all_bookings(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, DomainError>;

    /// Records a consultant decision.
    ///
    /// Applies only while the booking is `pending` and unassigned or assigned
    /// to `consultant`; sets the status to `target` and the consultant to
    /// `consultant`. Returns the updated booking, or `None` when no row
    /// matched.
    async fn decide_booking(
        &self,
        id: BookingId,
        consultant: &ConsultantId,
        target: BookingStatus,
    ) -> Result<Option<Booking>, DomainError>;

    /// Marks an `accepted` booking assigned to `consultant` as completed.
    /// Returns `None` when no row matched.
    async fn complete_booking(
        &self,
        id: BookingId,
        consultant: &ConsultantId,
    ) -> Result<Option<Booking>, DomainError>;

    // ─── Payments ───────────────────────────────────────────────────────────

    async fn find_payment_for_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<Option<Payment>, DomainError>;

    // ─── Circles ────────────────────────────────────────────────────────────

    async fn insert_circle(&self, circle: &Circle) -> Result<(), DomainError>;

    async fn find_circle(&self, id: CircleId) -> Result<Option<Circle>, DomainError>;

    /// Returns the updated circle, or `None` if it does not exist.
    async fn update_circle_status(
        &self,
        id: CircleId,
        status: CircleStatus,
    ) -> Result<Option<Circle>, DomainError>;

    /// Returns the updated circle, or `None` if it does not exist.
    async fn update_circle_lead(
        &self,
        id: CircleId,
        lead: &ConsultantId,
    ) -> Result<Option<Circle>, DomainError>;

    /// Approved members of a circle, counted at call time.
    async fn count_approved_members(&self, circle_id: CircleId) -> Result<u32, DomainError>;

    async fn find_join_request(
        &self,
        id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, DomainError>;

    /// Pending join requests across all circles, oldest first.
    async fn list_pending_join_requests(&self) -> Result<Vec<JoinRequest>, DomainError>;

    /// Marks a `pending` request owned by `user` as cancelled.
    /// Returns `None` when no row matched.
    async fn cancel_join_request(
        &self,
        id: JoinRequestId,
        user: &UserId,
    ) -> Result<Option<JoinRequest>, DomainError>;
}

/// Unit of work over the entity store.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Reads a booking and locks it until the transaction ends.
    async fn lock_booking(&mut self, id: BookingId) -> Result<Option<Booking>, DomainError>;

    /// Moves a booking from `from` to `to`. Returns false when the booking
    /// was not in `from`.
    async fn transition_booking(
        &mut self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, DomainError>;

    /// Reads the payment for a booking, locking it.
    async fn find_payment_for_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Option<Payment>, DomainError>;

    /// Inserts a payment; `Duplicate` when the booking already has one.
    async fn insert_payment(&mut self, payment: &Payment) -> Result<InsertOutcome, DomainError>;

    /// Persists a refund (status, refunded amount, details). Applies only
    /// while the stored payment is still `completed`.
    async fn record_refund(&mut self, payment: &Payment) -> Result<bool, DomainError>;

    /// Reads a circle and locks it until the transaction ends.
    async fn lock_circle(&mut self, id: CircleId) -> Result<Option<Circle>, DomainError>;

    async fn count_approved_members(&mut self, circle_id: CircleId) -> Result<u32, DomainError>;

    /// Inserts a join request; `Duplicate` when the user already holds a
    /// pending or approved request for the circle.
    async fn insert_join_request(
        &mut self,
        request: &JoinRequest,
    ) -> Result<InsertOutcome, DomainError>;

    /// Reads a join request and locks it until the transaction ends.
    async fn lock_join_request(
        &mut self,
        id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, DomainError>;

    /// Persists a decided request. Applies only while the stored request is
    /// still `pending`.
    async fn record_decision(&mut self, request: &JoinRequest) -> Result<bool, DomainError>;

    /// Makes every write of this unit of work durable.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that both traits are object-safe
    #[allow(dead_code)]
    fn assert_store_object_safe(_: &dyn EntityStore) {}

    #[allow(dead_code)]
    fn assert_transaction_object_safe(_: Box<dyn StoreTransaction>) {}

    #[test]
    fn insert_outcomes_are_distinct() {
        assert_ne!(InsertOutcome::Inserted, InsertOutcome::Duplicate);
    }
}
