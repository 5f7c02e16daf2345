//! Booking aggregate.
//!
//! A booking is a user's request for a counselling session. It is never
//! deleted; every change is a status transition along the booking state
//! machine.
//!
//! # Invariants
//!
//! - `consultant_id` is set for every status other than `Pending`
//!   (and may be pre-set while pending when the user asked for someone)
//! - `preferred_date` was not in the past when the booking was requested

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    Actor, BookingId, ConsultantId, StateMachine, Timestamp, UserId,
};

use super::{BookingError, BookingStatus, CancellationParty};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub consultant_id: Option<ConsultantId>,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub status: BookingStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    /// Creates a pending booking.
    ///
    /// `today` is passed in so the past-date check is deterministic in tests.
    pub fn request(
        user_id: UserId,
        preferred_date: NaiveDate,
        preferred_time: NaiveTime,
        preferred_consultant: Option<ConsultantId>,
        today: NaiveDate,
    ) -> Result<Self, BookingError> {
        if preferred_date < today {
            return Err(BookingError::validation(
                "preferred_date",
                format!("{} is in the past", preferred_date),
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: BookingId::new(),
            user_id,
            consultant_id: preferred_consultant,
            preferred_date,
            preferred_time,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// True if `consultant` may accept or decline this booking right now.
    pub fn is_open_to(&self, consultant: &ConsultantId) -> bool {
        self.status == BookingStatus::Pending
            && self
                .consultant_id
                .as_ref()
                .map_or(true, |assigned| assigned == consultant)
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }

    pub fn is_assigned_to(&self, consultant: &ConsultantId) -> bool {
        self.consultant_id.as_ref() == Some(consultant)
    }

    /// Owner, assigned consultant and administrators may read a booking.
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        match actor {
            Actor::User(id) => self.is_owned_by(id),
            Actor::Consultant(id) => self.is_assigned_to(id) || self.is_open_to(id),
            Actor::Admin(_) => true,
        }
    }

    /// Records a consultant's decision on a pending booking.
    pub fn decide(
        &mut self,
        consultant: &ConsultantId,
        target: BookingStatus,
    ) -> Result<(), BookingError> {
        let attempted = match target {
            BookingStatus::Accepted => "accept",
            _ => "decline",
        };
        if !self.is_open_to(consultant) {
            return Err(self.classify_lost_decision(consultant, attempted));
        }
        self.transition_to(target, attempted)?;
        self.consultant_id = Some(consultant.clone());
        Ok(())
    }

    /// Explains why a decision by `consultant` could not be applied.
    ///
    /// Used after a conditional write matched no row: a booking already
    /// decided for someone else means the caller lost a race.
    pub fn classify_lost_decision(
        &self,
        consultant: &ConsultantId,
        attempted: &'static str,
    ) -> BookingError {
        let decided_by_other = matches!(
            self.status,
            BookingStatus::Accepted | BookingStatus::Declined
        ) && !self.is_assigned_to(consultant);

        if decided_by_other {
            BookingError::AlreadyTaken(self.id)
        } else {
            BookingError::invalid_transition(self.id, self.status, attempted)
        }
    }

    /// Checks that `consultant` may mark this booking completed on `today`.
    pub fn check_completable(
        &self,
        consultant: &ConsultantId,
        today: NaiveDate,
    ) -> Result<(), BookingError> {
        if !self.is_assigned_to(consultant) {
            return Err(BookingError::unauthorized(
                Some(self.id),
                "complete",
                format!("consultant:{}", consultant),
            ));
        }
        if self.status != BookingStatus::Accepted {
            return Err(BookingError::invalid_transition(self.id, self.status, "complete"));
        }
        if self.preferred_date > today {
            return Err(BookingError::invalid_transition(self.id, self.status, "complete before session date"));
        }
        Ok(())
    }

    /// Resolves which party `actor` cancels as and checks the precondition.
    pub fn authorize_cancel(&self, actor: &Actor) -> Result<CancellationParty, BookingError> {
        let party = match actor {
            Actor::User(id) if self.is_owned_by(id) => CancellationParty::User,
            Actor::Consultant(id) if self.is_assigned_to(id) => CancellationParty::Consultant,
            _ => return Err(BookingError::unauthorized(Some(self.id), "cancel", actor)),
        };
        if self.status != BookingStatus::Accepted {
            return Err(BookingError::invalid_transition(self.id, self.status, "cancel"));
        }
        Ok(party)
    }

    pub fn complete(&mut self, consultant: &ConsultantId, today: NaiveDate) -> Result<(), BookingError> {
        self.check_completable(consultant, today)?;
        self.transition_to(BookingStatus::Completed, "complete")
    }

    pub fn cancel(&mut self, actor: &Actor) -> Result<CancellationParty, BookingError> {
        let party = self.authorize_cancel(actor)?;
        self.transition_to(BookingStatus::cancelled_by(party), "cancel")?;
        Ok(party)
    }

    fn transition_to(
        &mut self,
        target: BookingStatus,
        attempted: &'static str,
    ) -> Result<(), BookingError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| BookingError::invalid_transition(self.id, self.status, attempted))?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
