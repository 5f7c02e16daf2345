//! GetBookingHandler - Query handler for a single booking.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::foundation::{Actor, BookingId};
use crate::ports::EntityStore;

#[derive(Debug, Clone)]
pub struct GetBookingQuery {
    pub booking_id: BookingId,
    pub actor: Actor,
}

/// Returns a booking to its owner, its consultant or an administrator.
pub struct GetBookingHandler {
    store: Arc<dyn EntityStore>,
}

impl GetBookingHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetBookingQuery) -> Result<Booking, BookingError> {
        let booking = self
            .store
            .find_booking(query.booking_id)
            .await?
            .ok_or(BookingError::NotFound(query.booking_id))?;

        if !booking.is_visible_to(&query.actor) {
            return Err(BookingError::unauthorized(
                Some(booking.id),
                "view",
                &query.actor,
            ));
        }
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;

    #[tokio::test]
    async fn open_booking_is_visible_to_any_consultant() {
        let fx = Fixture::new();
        let booking = fx.pending_booking("u-1").await;
        let handler = GetBookingHandler::new(fx.store());

        let found = handler
            .handle(GetBookingQuery {
                booking_id: booking.id,
                actor: consultant("c-7"),
            })
            .await
            .unwrap();
        assert_eq!(found.id, booking.id);
    }

    #[tokio::test]
    async fn other_users_cannot_read() {
        let fx = Fixture::new();
        let booking = fx.pending_booking("u-1").await;

        let err = GetBookingHandler::new(fx.store())
            .handle(GetBookingQuery {
                booking_id: booking.id,
                actor: user("u-2"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn accepted_booking_hidden_from_other_consultants() {
        let fx = Fixture::new();
        let booking = fx.accepted_booking("u-1", "c-1").await;

        let err = GetBookingHandler::new(fx.store())
            .handle(GetBookingQuery {
                booking_id: booking.id,
                actor: consultant("c-2"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Unauthorized { .. }));
    }
}
