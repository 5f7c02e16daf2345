//! Shared shape of the lifecycle status enums.
//!
//! Booking, payment and join-request statuses all move forward through a
//! small graph and stop at terminal states. Each enum lists its outgoing
//! edges; the checked `transition_to` and `is_terminal` come for free.

use super::ValidationError;

pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Statuses reachable in one step from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` when the edge exists.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "status",
                format!("no transition from {:?} to {:?}", self, target),
            ));
        }
        Ok(target)
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Seat {
        Held,
        Taken,
        Released,
    }

    impl StateMachine for Seat {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Seat::Held => vec![Seat::Taken, Seat::Released],
                Seat::Taken | Seat::Released => vec![],
            }
        }
    }

    #[test]
    fn listed_edges_are_allowed() {
        assert_eq!(Seat::Held.transition_to(Seat::Taken), Ok(Seat::Taken));
        assert!(Seat::Held.can_transition_to(&Seat::Released));
    }

    #[test]
    fn unlisted_edge_names_both_statuses() {
        let err = Seat::Taken.transition_to(Seat::Held).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Taken"));
        assert!(message.contains("Held"));
    }

    #[test]
    fn self_loops_are_not_implied() {
        assert!(!Seat::Held.can_transition_to(&Seat::Held));
    }

    #[test]
    fn statuses_without_exits_are_terminal() {
        assert!(Seat::Taken.is_terminal());
        assert!(Seat::Released.is_terminal());
        assert!(!Seat::Held.is_terminal());
    }
}
