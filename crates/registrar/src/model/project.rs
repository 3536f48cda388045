//! Student projects.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::require_field;
use crate::error::Result;
use crate::store::{Collection, Record};

/// Lifecycle stage of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Proposed, not started.
    Proposed,
    /// Being worked on.
    InProgress,
    /// Handed in for review.
    Submitted,
    /// Accepted and closed.
    Completed,
}

impl ProjectStatus {
    /// Whether a project may move from `self` to `next`.
    ///
    /// A submitted project may be sent back to `InProgress`.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Proposed, Self::InProgress)
                | (Self::InProgress, Self::Submitted)
                | (Self::Submitted, Self::Completed | Self::InProgress)
        )
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Proposed => "proposed",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
        };
        f.pad(token)
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "proposed" => Ok(Self::Proposed),
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("{s:?} is not a valid project status")),
        }
    }
}

/// A project owned by a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project id.
    pub id: String,
    /// Owning student.
    pub owner_id: String,
    /// Short title.
    pub title: String,
    /// What the project is about.
    #[serde(default)]
    pub description: String,
    /// Lifecycle stage.
    pub status: ProjectStatus,
    /// Course the project is done for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    /// Other students in the group.
    #[serde(default)]
    pub group_members: BTreeSet<String>,
    /// Deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Awarded points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u32>,
    /// Reviewer comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project last changed.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Whether `user_id` owns the project or is in its group.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.owner_id == user_id || self.group_members.contains(user_id)
    }
}

impl Record for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        require_field(&self.title, "project title")?;
        require_field(&self.owner_id, "project owner")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(ProjectStatus::Proposed.can_transition(ProjectStatus::InProgress));
        assert!(ProjectStatus::InProgress.can_transition(ProjectStatus::Submitted));
        assert!(ProjectStatus::Submitted.can_transition(ProjectStatus::Completed));
    }

    #[test]
    fn test_send_back_and_invalid_transitions() {
        assert!(ProjectStatus::Submitted.can_transition(ProjectStatus::InProgress));
        assert!(!ProjectStatus::Proposed.can_transition(ProjectStatus::Completed));
        assert!(!ProjectStatus::Completed.can_transition(ProjectStatus::InProgress));
        assert!(!ProjectStatus::InProgress.can_transition(ProjectStatus::InProgress));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("in-progress".parse::<ProjectStatus>().unwrap(), ProjectStatus::InProgress);
        assert_eq!(ProjectStatus::InProgress.to_string(), "in_progress");
        assert!("done".parse::<ProjectStatus>().is_err());
    }
}
