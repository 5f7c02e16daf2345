//! CancelJoinRequestHandler - Command handler for withdrawing a request.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::circle::{CircleError, CircleEvent, JoinRequest};
use crate::domain::foundation::{Actor, JoinRequestId};
use crate::ports::EntityStore;

#[derive(Debug, Clone)]
pub struct CancelJoinRequestCommand {
    pub request_id: JoinRequestId,
    pub actor: Actor,
}

/// Lets a user withdraw their own pending request. The row is kept with
/// status `cancelled`, which frees the user to ask again later.
pub struct CancelJoinRequestHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl CancelJoinRequestHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(&self, cmd: CancelJoinRequestCommand) -> Result<JoinRequest, CircleError> {
        let request_id = cmd.request_id;
        let user = cmd
            .actor
            .as_user()
            .ok_or_else(|| CircleError::unauthorized("cancel join request", &cmd.actor))?;

        let Some(request) = self.store.cancel_join_request(request_id, user).await? else {
            let current = self
                .store
                .find_join_request(request_id)
                .await?
                .ok_or(CircleError::RequestNotFound(request_id))?;
            let err = match current.check_cancellable_by(user) {
                Err(err) => err,
                Ok(()) => CircleError::InvalidTransition {
                    request_id,
                    current: current.status,
                    attempted: "cancel",
                },
            };
            tracing::warn!(
                operation = "cancel_join_request",
                request_id = %request_id,
                actor = %cmd.actor,
                error = %err,
                "Join request cancellation refused"
            );
            return Err(err);
        };

        tracing::info!(
            operation = "cancel_join_request",
            request_id = %request_id,
            circle_id = %request.circle_id,
            actor = %cmd.actor,
            "Join request cancelled"
        );

        let event = CircleEvent::JoinCancelled {
            request_id,
            circle_id: request.circle_id,
            user_id: request.user_id.clone(),
        };
        self.notifier
            .dispatch(event.recipient(), &event, Some(&cmd.actor));
        Ok(request)
    }
}
