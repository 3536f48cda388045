//! Assignments and the submissions made against them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{key_part, require_field, KEY_SEPARATOR};
use crate::error::{Error, Result};
use crate::store::{Collection, Record};

/// Default maximum points of an assignment.
pub const DEFAULT_MAX_POINTS: u32 = 100;

/// Coursework set for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assignment id, e.g. `CS101-A3`.
    pub id: String,
    /// Course the assignment belongs to.
    pub course_id: String,
    /// Teacher who set it.
    pub teacher_id: String,
    /// Short title.
    pub title: String,
    /// Instructions.
    #[serde(default)]
    pub description: String,
    /// Submission deadline.
    pub due_date: NaiveDate,
    /// Highest grade that can be awarded.
    pub max_points: u32,
    /// When the assignment was created.
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Create an assignment worth [`DEFAULT_MAX_POINTS`].
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        course_id: impl Into<String>,
        teacher_id: impl Into<String>,
        title: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            teacher_id: teacher_id.into(),
            title: title.into(),
            description: String::new(),
            due_date,
            max_points: DEFAULT_MAX_POINTS,
            created_at: Utc::now(),
        }
    }
}

impl Record for Assignment {
    const COLLECTION: Collection = Collection::Assignments;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        require_field(&self.title, "assignment title")?;
        key_part(&self.id, "assignment id")?;
        key_part(&self.course_id, "course id")?;
        if self.max_points == 0 {
            return Err(Error::validation("max_points must be greater than 0"));
        }
        Ok(())
    }
}

/// A student's answer to an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// `assignment:student`.
    pub id: String,
    /// Assignment answered.
    pub assignment_id: String,
    /// Submitting student.
    pub student_id: String,
    /// Submitted text.
    #[serde(default)]
    pub content: String,
    /// Path or URL of an attached file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// Awarded points, once graded.
    pub grade: Option<u32>,
    /// Grader's comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// When the work was handed in.
    pub submitted_at: DateTime<Utc>,
    /// When the work was graded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<DateTime<Utc>>,
}

impl Submission {
    /// Create an ungraded submission.
    #[must_use]
    pub fn new(
        assignment_id: impl Into<String>,
        student_id: impl Into<String>,
        content: impl Into<String>,
        attachment: Option<String>,
    ) -> Self {
        let assignment_id = assignment_id.into();
        let student_id = student_id.into();
        Self {
            id: Self::key(&assignment_id, &student_id),
            assignment_id,
            student_id,
            content: content.into(),
            attachment,
            grade: None,
            feedback: None,
            submitted_at: Utc::now(),
            graded_at: None,
        }
    }

    /// Natural key of a submission.
    #[must_use]
    pub fn key(assignment_id: &str, student_id: &str) -> String {
        format!("{assignment_id}{KEY_SEPARATOR}{student_id}")
    }

    /// Whether a grade has been recorded.
    #[must_use]
    pub const fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}

impl Record for Submission {
    const COLLECTION: Collection = Collection::Submissions;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        key_part(&self.assignment_id, "assignment id")?;
        key_part(&self.student_id, "student id")?;
        let expected = Self::key(&self.assignment_id, &self.student_id);
        if self.id != expected {
            return Err(Error::validation(format!(
                "submission id {:?} must be {expected:?}",
                self.id
            )));
        }
        if self.content.trim().is_empty() && self.attachment.is_none() {
            return Err(Error::validation("submission needs content or an attachment"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_key() {
        let submission = Submission::new("C1-A1", "S1", "my answer", None);
        assert_eq!(submission.id, "C1-A1:S1");
        assert!(!submission.is_graded());
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_empty_submission_rejected() {
        let submission = Submission::new("C1-A1", "S1", "  ", None);
        assert!(submission.validate().unwrap_err().is_validation());

        let with_file = Submission::new("C1-A1", "S1", "", Some("essay.pdf".to_string()));
        assert!(with_file.validate().is_ok());
    }

    #[test]
    fn test_assignment_requires_points() {
        let assignment = Assignment {
            id: "C1-A1".to_string(),
            course_id: "C1".to_string(),
            teacher_id: "T1".to_string(),
            title: "Sorting".to_string(),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            max_points: 0,
            created_at: Utc::now(),
        };
        assert!(assignment.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_submission_parts_exclude_separator() {
        assert!(Submission::new("C1-A1", "S:1", "answer", None)
            .validate()
            .unwrap_err()
            .is_validation());
        assert!(Submission::new("C1:A1", "S1", "answer", None)
            .validate()
            .unwrap_err()
            .is_validation());
    }
}
