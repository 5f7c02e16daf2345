//! Circle administration commands: create, activate/deactivate, change lead.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::circle::{Circle, CircleDraft, CircleError, CircleEvent, CircleStatus};
use crate::domain::foundation::{Actor, AdminId, CircleId, ConsultantId};
use crate::ports::EntityStore;

fn require_admin<'a>(actor: &'a Actor, action: &'static str) -> Result<&'a AdminId, CircleError> {
    actor
        .as_admin()
        .ok_or_else(|| CircleError::unauthorized(action, actor))
}

// ─── Create ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CreateCircleCommand {
    pub actor: Actor,
    pub draft: CircleDraft,
}

pub struct CreateCircleHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl CreateCircleHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(&self, cmd: CreateCircleCommand) -> Result<Circle, CircleError> {
        require_admin(&cmd.actor, "create circle")?;
        let circle = Circle::create(cmd.draft)?;
        self.store.insert_circle(&circle).await?;

        tracing::info!(
            operation = "create_circle",
            circle_id = %circle.id,
            actor = %cmd.actor,
            max_members = circle.max_members,
            "Circle created"
        );

        let event = CircleEvent::Created {
            circle_id: circle.id,
            title: circle.title.clone(),
            lead_consultant_id: circle.lead_consultant_id.clone(),
        };
        self.notifier
            .dispatch(event.recipient(), &event, Some(&cmd.actor));
        Ok(circle)
    }
}

// ─── Status ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SetCircleStatusCommand {
    pub actor: Actor,
    pub circle_id: CircleId,
    pub status: CircleStatus,
}

/// Activates or deactivates a circle. Existing members stay; an inactive
/// circle takes no new requests or approvals.
pub struct SetCircleStatusHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl SetCircleStatusHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(&self, cmd: SetCircleStatusCommand) -> Result<Circle, CircleError> {
        require_admin(&cmd.actor, "change circle status")?;
        let circle = self
            .store
            .update_circle_status(cmd.circle_id, cmd.status)
            .await?
            .ok_or(CircleError::CircleNotFound(cmd.circle_id))?;

        tracing::info!(
            operation = "set_circle_status",
            circle_id = %circle.id,
            actor = %cmd.actor,
            status = %circle.status,
            "Circle status changed"
        );

        let event = CircleEvent::StatusChanged {
            circle_id: circle.id,
            status: circle.status,
            lead_consultant_id: circle.lead_consultant_id.clone(),
        };
        self.notifier
            .dispatch(event.recipient(), &event, Some(&cmd.actor));
        Ok(circle)
    }
}

// ─── Lead ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChangeCircleLeadCommand {
    pub actor: Actor,
    pub circle_id: CircleId,
    pub lead_consultant_id: ConsultantId,
}

pub struct ChangeCircleLeadHandler {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl ChangeCircleLeadHandler {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(&self, cmd: ChangeCircleLeadCommand) -> Result<Circle, CircleError> {
        require_admin(&cmd.actor, "change circle lead")?;
        let circle = self
            .store
            .update_circle_lead(cmd.circle_id, &cmd.lead_consultant_id)
            .await?
            .ok_or(CircleError::CircleNotFound(cmd.circle_id))?;

        tracing::info!(
            operation = "change_circle_lead",
            circle_id = %circle.id,
            actor = %cmd.actor,
            lead = %circle.lead_consultant_id,
            "Circle lead changed"
        );

        let event = CircleEvent::LeadChanged {
            circle_id: circle.id,
            lead_consultant_id: circle.lead_consultant_id.clone(),
        };
        self.notifier
            .dispatch(event.recipient(), &event, Some(&cmd.actor));
        Ok(circle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;

    #[tokio::test]
    async fn admin_creates_active_circle_and_lead_hears() {
        let fx = Fixture::new();
        let circle = CreateCircleHandler::new(fx.store(), fx.notifier.clone())
            .handle(CreateCircleCommand {
                actor: admin("a-1"),
                draft: draft(12),
            })
            .await
            .unwrap();

        assert!(circle.is_active());
        assert_eq!(fx.store.find_circle(circle.id).await.unwrap(), Some(circle));
        assert_eq!(fx.sink.settle(1).await[0].recipient, "lead-1");
    }

    #[tokio::test]
    async fn capacity_outside_bounds_is_rejected() {
        let fx = Fixture::new();
        let handler = CreateCircleHandler::new(fx.store(), fx.notifier.clone());
        for max in [4, 21] {
            let err = handler
                .handle(CreateCircleCommand {
                    actor: admin("a-1"),
                    draft: draft(max),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, CircleError::ValidationFailed { .. }));
        }
    }

    #[tokio::test]
    async fn consultants_cannot_create() {
        let fx = Fixture::new();
        let err = CreateCircleHandler::new(fx.store(), fx.notifier.clone())
            .handle(CreateCircleCommand {
                actor: consultant("lead-1"),
                draft: draft(10),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CircleError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn deactivate_then_reactivate() {
        let fx = Fixture::new();
        let circle = fx.circle(10).await;
        let handler = SetCircleStatusHandler::new(fx.store(), fx.notifier.clone());

        let off = handler
            .handle(SetCircleStatusCommand {
                actor: admin("a-1"),
                circle_id: circle.id,
                status: CircleStatus::Inactive,
            })
            .await
            .unwrap();
        assert!(!off.is_active());

        let on = handler
            .handle(SetCircleStatusCommand {
                actor: admin("a-1"),
                circle_id: circle.id,
                status: CircleStatus::Active,
            })
            .await
            .unwrap();
        assert!(on.is_active());
    }

    #[tokio::test]
    async fn status_change_on_unknown_circle_is_not_found() {
        let fx = Fixture::new();
        let id = CircleId::new();
        let err = SetCircleStatusHandler::new(fx.store(), fx.notifier.clone())
            .handle(SetCircleStatusCommand {
                actor: admin("a-1"),
                circle_id: id,
                status: CircleStatus::Inactive,
            })
            .await
            .unwrap_err();
        assert_eq!(err, CircleError::CircleNotFound(id));
    }

    #[tokio::test]
    async fn new_lead_is_stored_and_notified() {
        let fx = Fixture::new();
        let circle = fx.circle(10).await;

        let updated = ChangeCircleLeadHandler::new(fx.store(), fx.notifier.clone())
            .handle(ChangeCircleLeadCommand {
                actor: admin("a-1"),
                circle_id: circle.id,
                lead_consultant_id: consultant_id("lead-2"),
            })
            .await
            .unwrap();

        assert_eq!(updated.lead_consultant_id, consultant_id("lead-2"));
        assert_eq!(fx.sink.settle(1).await[0].recipient, "lead-2");
    }
}
