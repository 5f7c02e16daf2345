//! Circle and join request events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AdminId, CircleId, ConsultantId, JoinRequestId, LifecycleEvent, UserId,
};

use super::{CircleStatus, JoinRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CircleEvent {
    Created {
        circle_id: CircleId,
        title: String,
        lead_consultant_id: ConsultantId,
    },

    StatusChanged {
        circle_id: CircleId,
        status: CircleStatus,
        lead_consultant_id: ConsultantId,
    },

    LeadChanged {
        circle_id: CircleId,
        lead_consultant_id: ConsultantId,
    },

    JoinRequested {
        request_id: JoinRequestId,
        circle_id: CircleId,
        user_id: UserId,
    },

    /// State transition: Pending → Approved
    JoinApproved {
        request_id: JoinRequestId,
        circle_id: CircleId,
        user_id: UserId,
        decided_by: AdminId,
    },

    /// State transition: Pending → Rejected
    JoinRejected {
        request_id: JoinRequestId,
        circle_id: CircleId,
        user_id: UserId,
        decided_by: AdminId,
    },

    /// State transition: Pending → Cancelled
    JoinCancelled {
        request_id: JoinRequestId,
        circle_id: CircleId,
        user_id: UserId,
    },
}

impl CircleEvent {
    pub fn join_requested(request: &JoinRequest) -> Self {
        CircleEvent::JoinRequested {
            request_id: request.id,
            circle_id: request.circle_id,
            user_id: request.user_id.clone(),
        }
    }

    /// Event for a request that was just decided by `admin`.
    pub fn decided(request: &JoinRequest, admin: &AdminId, approved: bool) -> Self {
        let (request_id, circle_id, user_id, decided_by) = (
            request.id,
            request.circle_id,
            request.user_id.clone(),
            admin.clone(),
        );
        if approved {
            CircleEvent::JoinApproved {
                request_id,
                circle_id,
                user_id,
                decided_by,
            }
        } else {
            CircleEvent::JoinRejected {
                request_id,
                circle_id,
                user_id,
                decided_by,
            }
        }
    }

    /// Lead consultants hear about their circle; requesters hear about
    /// decisions. Requests and withdrawals are surfaced to administrators
    /// through the pending list instead.
    pub fn recipient(&self) -> Option<String> {
        match self {
            CircleEvent::Created {
                lead_consultant_id, ..
            }
            | CircleEvent::StatusChanged {
                lead_consultant_id, ..
            }
            | CircleEvent::LeadChanged {
                lead_consultant_id, ..
            } => Some(lead_consultant_id.to_string()),
            CircleEvent::JoinApproved { user_id, .. } | CircleEvent::JoinRejected { user_id, .. } => {
                Some(user_id.to_string())
            }
            CircleEvent::JoinRequested { .. } | CircleEvent::JoinCancelled { .. } => None,
        }
    }
}

impl LifecycleEvent for CircleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircleEvent::Created { .. } => "circle.created.v1",
            CircleEvent::StatusChanged { .. } => "circle.status_changed.v1",
            CircleEvent::LeadChanged { .. } => "circle.lead_changed.v1",
            CircleEvent::JoinRequested { .. } => "circle.join_requested.v1",
            CircleEvent::JoinApproved { .. } => "circle.join_approved.v1",
            CircleEvent::JoinRejected { .. } => "circle.join_rejected.v1",
            CircleEvent::JoinCancelled { .. } => "circle.join_cancelled.v1",
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            CircleEvent::Created { circle_id, .. }
            | CircleEvent::StatusChanged { circle_id, .. }
            | CircleEvent::LeadChanged { circle_id, .. } => circle_id.to_string(),
            CircleEvent::JoinRequested { request_id, .. }
            | CircleEvent::JoinApproved { request_id, .. }
            | CircleEvent::JoinRejected { request_id, .. }
            | CircleEvent::JoinCancelled { request_id, .. } => request_id.to_string(),
        }
    }

    fn aggregate_type(&self) -> &'static str {
        match self {
            CircleEvent::Created { .. }
            | CircleEvent::StatusChanged { .. }
            | CircleEvent::LeadChanged { .. } => "Circle",
            _ => "JoinRequest",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_notify_requester() {
        let event = CircleEvent::JoinApproved {
            request_id: JoinRequestId::new(),
            circle_id: CircleId::new(),
            user_id: UserId::new("u-7").unwrap(),
            decided_by: AdminId::new("a-1").unwrap(),
        };
        assert_eq!(event.recipient().as_deref(), Some("u-7"));
        assert_eq!(event.aggregate_type(), "JoinRequest");
    }

    #[test]
    fn all_event_types_are_namespaced() {
        let event = CircleEvent::LeadChanged {
            circle_id: CircleId::new(),
            lead_consultant_id: ConsultantId::new("c-2").unwrap(),
        };
        assert!(event.event_type().starts_with("circle."));
        assert_eq!(event.aggregate_type(), "Circle");
        assert_eq!(event.recipient().as_deref(), Some("c-2"));
    }
}
