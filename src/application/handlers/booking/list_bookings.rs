//! Booking list queries.
//!
//! Users see their own bookings, newest first. Consultants see the pending
//! requests they may decide and, separately, the bookings assigned to them,
//! both soonest session first. Admins see every booking.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError, BookingStatus};
use crate::domain::foundation::Actor;
use crate::ports::EntityStore;

#[derive(Debug, Clone)]
pub struct ListUserBookingsQuery {
    pub actor: Actor,
}

#[derive(Debug, Clone)]
pub struct ListPendingBookingsQuery {
    pub actor: Actor,
}

/// Bookings assigned to the calling consultant.
#[derive(Debug, Clone)]
pub struct ListConsultantBookingsQuery {
    pub actor: Actor,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone)]
pub struct ListAllBookingsQuery {
    pub actor: Actor,
    pub status: Option<BookingStatus>,
}

pub struct ListUserBookingsHandler {
    store: Arc<dyn EntityStore>,
}

impl ListUserBookingsHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListUserBookingsQuery) -> Result<Vec<Booking>, BookingError> {
        let user = query
            .actor
            .as_user()
            .ok_or_else(|| BookingError::unauthorized(None, "list own bookings", &query.actor))?;
        Ok(self.store.list_bookings_for_user(user).await?)
    }
}

pub struct ListPendingBookingsHandler {
    store: Arc<dyn EntityStore>,
}

impl ListPendingBookingsHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ListPendingBookingsQuery,
    ) -> Result<Vec<Booking>, BookingError> {
        let consultant = query.actor.as_consultant().ok_or_else(|| {
            BookingError::unauthorized(None, "list pending bookings", &query.actor)
        })?;
        Ok(self.store.list_open_bookings_for(consultant).await?)
    }
}

pub struct ListConsultantBookingsHandler {
    store: Arc<dyn EntityStore>,
}

impl ListConsultantBookingsHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ListConsultantBookingsQuery,
    ) -> Result<Vec<Booking>, BookingError> {
        let consultant = query.actor.as_consultant().ok_or_else(|| {
            BookingError::unauthorized(None, "list assigned bookings", &query.actor)
        })?;
        Ok(self
            .store
            .list_bookings_for_consultant(consultant, query.status)
            .await?)
    }
}

/// Admin view over every booking.
pub struct ListAllBookingsHandler {
    store: Arc<dyn EntityStore>,
}

impl ListAllBookingsHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListAllBookingsQuery) -> Result<Vec<Booking>, BookingError> {
        if query.actor.as_admin().is_none() {
            tracing::warn!(
                operation = "list_all_bookings",
                actor = %query.actor,
                "Booking overview refused"
            );
            return Err(BookingError::unauthorized(None, "list all", &query.actor));
        }
        Ok(self.store.list_all_bookings(query.status).await?)
    }
}
