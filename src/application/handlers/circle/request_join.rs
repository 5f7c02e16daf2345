//! RequestJoinHandler - Command handler for asking to join a circle.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::circle::{CircleError, CircleEvent, JoinRequest};
use crate::domain::foundation::{Actor, CircleId};
use crate::ports::{EntityStore, InsertOutcome};

#[derive(Debug, Clone)]
pub struct RequestJoinCommand {
    pub circle_id: CircleId,
    pub actor: Actor,
}

/// Opens a pending join request.
///
/// Fails fast when the circle is inactive or already full; capacity is
/// checked again when an administrator approves. At most one pending or
/// approved request per user and circle, enforced by the store.
pub struct RequestJoinHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl RequestJoinHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(&self, cmd: RequestJoinCommand) -> Result<JoinRequest, CircleError> {
        let user = cmd
            .actor
            .as_user()
            .ok_or_else(|| CircleError::unauthorized("request to join a circle", &cmd.actor))?;

        let mut tx = self.store.begin().await?;
        let circle = tx
            .lock_circle(cmd.circle_id)
            .await?
            .ok_or(CircleError::CircleNotFound(cmd.circle_id))?;
        let approved = tx.count_approved_members(circle.id).await?;

        let request = JoinRequest::open(&circle, user.clone(), approved).map_err(|err| {
            tracing::warn!(
                operation = "request_join",
                circle_id = %circle.id,
                actor = %cmd.actor,
                approved,
                error = %err,
                "Join request refused"
            );
            err
        })?;

        if tx.insert_join_request(&request).await? == InsertOutcome::Duplicate {
            tracing::warn!(
                operation = "request_join",
                circle_id = %circle.id,
                actor = %cmd.actor,
                "Duplicate join request"
            );
            return Err(CircleError::DuplicateRequest {
                circle_id: circle.id,
                user_id: user.clone(),
            });
        }
        tx.commit().await?;

        tracing::info!(
            operation = "request_join",
            request_id = %request.id,
            circle_id = %circle.id,
            actor = %cmd.actor,
            "Join requested"
        );

        let event = CircleEvent::join_requested(&request);
        self.notifier
            .dispatch(event.recipient(), &event, Some(&cmd.actor));
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::circle::{CircleStatus, JoinRequestStatus};

    fn handler(fx: &Fixture) -> RequestJoinHandler {
        RequestJoinHandler::new(fx.store(), fx.notifier.clone())
    }

    fn cmd(circle_id: CircleId, actor: Actor) -> RequestJoinCommand {
        RequestJoinCommand { circle_id, actor }
    }

    #[tokio::test]
    async fn opens_pending_request() {
        let fx = Fixture::new();
        let circle = fx.circle(5).await;

        let request = handler(&fx).handle(cmd(circle.id, user("u-1"))).await.unwrap();

        assert_eq!(request.status, JoinRequestStatus::Pending);
        assert_eq!(
            fx.store.find_join_request(request.id).await.unwrap(),
            Some(request)
        );
    }

    #[tokio::test]
    async fn second_request_is_duplicate() {
        let fx = Fixture::new();
        let circle = fx.circle(5).await;
        handler(&fx).handle(cmd(circle.id, user("u-1"))).await.unwrap();

        let err = handler(&fx)
            .handle(cmd(circle.id, user("u-1")))
            .await
            .unwrap_err();

        assert!(matches!(err, CircleError::DuplicateRequest { .. }));
        assert_eq!(fx.store.list_pending_join_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn inactive_circle_refuses_requests() {
        let fx = Fixture::new();
        let circle = fx.circle(5).await;
        fx.store
            .update_circle_status(circle.id, CircleStatus::Inactive)
            .await
            .unwrap();

        let err = handler(&fx)
            .handle(cmd(circle.id, user("u-1")))
            .await
            .unwrap_err();

        assert_eq!(err, CircleError::CircleInactive(circle.id));
    }

    #[tokio::test]
    async fn full_circle_fails_fast() {
        let fx = Fixture::new();
        let circle = fx.circle(5).await;
        fx.approve_members(&circle, 5).await;

        let err = handler(&fx)
            .handle(cmd(circle.id, user("late")))
            .await
            .unwrap_err();

        assert_eq!(err, CircleError::CircleFull(circle.id));
    }

    #[tokio::test]
    async fn unknown_circle_is_not_found() {
        let fx = Fixture::new();
        let id = CircleId::new();
        let err = handler(&fx).handle(cmd(id, user("u-1"))).await.unwrap_err();
        assert_eq!(err, CircleError::CircleNotFound(id));
    }

    #[tokio::test]
    async fn only_users_may_request() {
        let fx = Fixture::new();
        let circle = fx.circle(5).await;
        let err = handler(&fx)
            .handle(cmd(circle.id, consultant("c-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, CircleError::Unauthorized { .. }));
    }
}
