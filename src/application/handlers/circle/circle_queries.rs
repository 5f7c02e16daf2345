//! Circle queries: pending requests for administrators, circle roster.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::circle::{Circle, CircleError, JoinRequest};
use crate::domain::foundation::{Actor, CircleId};
use crate::ports::EntityStore;

#[derive(Debug, Clone)]
pub struct ListPendingRequestsQuery {
    pub actor: Actor,
}

/// Pending join requests across all circles, oldest first. Admins only.
pub struct ListPendingRequestsHandler {
    store: Arc<dyn EntityStore>,
}

impl ListPendingRequestsHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ListPendingRequestsQuery,
    ) -> Result<Vec<JoinRequest>, CircleError> {
        if query.actor.as_admin().is_none() {
            return Err(CircleError::unauthorized(
                "list pending join requests",
                &query.actor,
            ));
        }
        Ok(self.store.list_pending_join_requests().await?)
    }
}

#[derive(Debug, Clone)]
pub struct GetCircleRosterQuery {
    pub circle_id: CircleId,
}

/// A circle with its live membership count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircleRoster {
    pub circle: Circle,
    pub approved_members: u32,
    pub open_seats: u32,
}

pub struct GetCircleRosterHandler {
    store: Arc<dyn EntityStore>,
}

impl GetCircleRosterHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetCircleRosterQuery) -> Result<CircleRoster, CircleError> {
        let circle = self
            .store
            .find_circle(query.circle_id)
            .await?
            .ok_or(CircleError::CircleNotFound(query.circle_id))?;
        let approved_members = self.store.count_approved_members(circle.id).await?;
        let open_seats = circle.max_members.saturating_sub(approved_members);

        Ok(CircleRoster {
            circle,
            approved_members,
            open_seats,
        })
    }
}
