//! DecideJoinRequestHandler - Command handler for admin approval/rejection.
//!
//! Approval re-counts approved members while holding the circle lock, so
//! concurrent approvals cannot push a circle past capacity.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::circle::{CircleError, CircleEvent, Decision, JoinRequest, JoinRequestStatus};
use crate::domain::foundation::{Actor, JoinRequestId};
use crate::ports::EntityStore;

#[derive(Debug, Clone)]
pub struct DecideJoinRequestCommand {
    pub request_id: JoinRequestId,
    pub decision: Decision,
    pub actor: Actor,
}

pub struct DecideJoinRequestHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl DecideJoinRequestHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(&self, cmd: DecideJoinRequestCommand) -> Result<JoinRequest, CircleError> {
        let request_id = cmd.request_id;
        let admin = cmd
            .actor
            .as_admin()
            .ok_or_else(|| CircleError::unauthorized("decide join requests", &cmd.actor))?;

        // Circle first, then request: the same lock order as request_join.
        let circle_id = self
            .store
            .find_join_request(request_id)
            .await?
            .ok_or(CircleError::RequestNotFound(request_id))?
            .circle_id;

        let mut tx = self.store.begin().await?;
        let circle = tx
            .lock_circle(circle_id)
            .await?
            .ok_or(CircleError::CircleNotFound(circle_id))?;
        let mut request = tx
            .lock_join_request(request_id)
            .await?
            .ok_or(CircleError::RequestNotFound(request_id))?;
        let approved = tx.count_approved_members(circle_id).await?;

        if let Err(err) = request.decide(cmd.decision, admin, &circle, approved) {
            tracing::warn!(
                operation = "decide_join_request",
                request_id = %request_id,
                circle_id = %circle_id,
                actor = %cmd.actor,
                approved,
                max_members = circle.max_members,
                error = %err,
                "Join decision refused"
            );
            return Err(err);
        }

        if !tx.record_decision(&request).await? {
            return Err(CircleError::InvalidTransition {
                request_id,
                current: JoinRequestStatus::Pending,
                attempted: "decide",
            });
        }
        tx.commit().await?;

        tracing::info!(
            operation = "decide_join_request",
            request_id = %request_id,
            circle_id = %circle_id,
            actor = %cmd.actor,
            status = %request.status,
            "Join request decided"
        );

        let event = CircleEvent::decided(&request, admin, cmd.decision == Decision::Approve);
        self.notifier
            .dispatch(event.recipient(), &event, Some(&cmd.actor));
        Ok(request)
    }
}
