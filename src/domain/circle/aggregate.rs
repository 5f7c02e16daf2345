//! Circle entity: a capacity-bounded, consultant-led support group.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{CircleId, ConsultantId, Timestamp, ValidationError};

use super::CircleError;

/// Smallest capacity a circle may be created with.
pub const MIN_MEMBERS: u32 = 5;

/// Largest capacity a circle may be created with.
pub const MAX_MEMBERS: u32 = 20;

const MAX_TITLE_LEN: usize = 100;

/// True if a circle with `approved` members can take one more.
pub fn has_capacity(circle: &Circle, approved: u32) -> bool {
    approved < circle.max_members
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircleStatus {
    Active,
    Inactive,
}

impl CircleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircleStatus::Active => "active",
            CircleStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for CircleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CircleStatus::Active),
            "inactive" => Ok(CircleStatus::Inactive),
            other => Err(ValidationError::invalid_format(
                "circle_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

impl fmt::Display for CircleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircleCategory {
    MentalHealth,
    Addiction,
    Grief,
    Stress,
    Relationships,
}

impl CircleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircleCategory::MentalHealth => "mental-health",
            CircleCategory::Addiction => "addiction",
            CircleCategory::Grief => "grief",
            CircleCategory::Stress => "stress",
            CircleCategory::Relationships => "relationships",
        }
    }
}

impl FromStr for CircleCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mental-health" => Ok(CircleCategory::MentalHealth),
            "addiction" => Ok(CircleCategory::Addiction),
            "grief" => Ok(CircleCategory::Grief),
            "stress" => Ok(CircleCategory::Stress),
            "relationships" => Ok(CircleCategory::Relationships),
            other => Err(ValidationError::invalid_format(
                "category",
                format!("unknown category '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl MeetingDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingDay::Monday => "monday",
            MeetingDay::Tuesday => "tuesday",
            MeetingDay::Wednesday => "wednesday",
            MeetingDay::Thursday => "thursday",
            MeetingDay::Friday => "friday",
            MeetingDay::Saturday => "saturday",
            MeetingDay::Sunday => "sunday",
        }
    }
}

impl FromStr for MeetingDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monday" => Ok(MeetingDay::Monday),
            "tuesday" => Ok(MeetingDay::Tuesday),
            "wednesday" => Ok(MeetingDay::Wednesday),
            "thursday" => Ok(MeetingDay::Thursday),
            "friday" => Ok(MeetingDay::Friday),
            "saturday" => Ok(MeetingDay::Saturday),
            "sunday" => Ok(MeetingDay::Sunday),
            other => Err(ValidationError::invalid_format(
                "meeting_day",
                format!("'{}' is not a weekday name", other),
            )),
        }
    }
}

/// Unvalidated circle fields as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub lead_consultant_id: ConsultantId,
    pub meeting_day: String,
    /// `HH:MM`, 24-hour clock.
    pub meeting_time: String,
    pub max_members: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub id: CircleId,
    pub title: String,
    pub description: String,
    pub category: CircleCategory,
    pub lead_consultant_id: ConsultantId,
    pub meeting_day: MeetingDay,
    pub meeting_time: NaiveTime,
    pub max_members: u32,
    pub status: CircleStatus,
    pub created_at: Timestamp,
}

impl Circle {
    /// Validates a draft and creates an active circle.
    pub fn create(draft: CircleDraft) -> Result<Self, CircleError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title").into());
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(CircleError::validation(
                "title",
                format!("must be at most {} characters", MAX_TITLE_LEN),
            ));
        }
        let category: CircleCategory = draft.category.trim().parse()?;
        let meeting_day: MeetingDay = draft.meeting_day.trim().parse()?;
        let meeting_time = NaiveTime::parse_from_str(draft.meeting_time.trim(), "%H:%M")
            .map_err(|_| CircleError::validation("meeting_time", "expected HH:MM"))?;
        if !(MIN_MEMBERS..=MAX_MEMBERS).contains(&draft.max_members) {
            return Err(ValidationError::out_of_range(
                "max_members",
                i64::from(MIN_MEMBERS),
                i64::from(MAX_MEMBERS),
                i64::from(draft.max_members),
            )
            .into());
        }

        Ok(Self {
            id: CircleId::new(),
            title: title.to_string(),
            description: draft.description.trim().to_string(),
            category,
            lead_consultant_id: draft.lead_consultant_id,
            meeting_day,
            meeting_time,
            max_members: draft.max_members,
            status: CircleStatus::Active,
            created_at: Timestamp::now(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == CircleStatus::Active
    }
}
