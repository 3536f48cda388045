//! Courses and rosters.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{key_part, require_field};
use crate::error::Result;
use crate::store::{Collection, Record};

/// Default credit value of a course.
pub const DEFAULT_CREDITS: u32 = 3;

/// A taught course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course code, e.g. `CS101`.
    pub id: String,
    /// Course title.
    pub name: String,
    /// Id of the teaching user.
    pub teacher_id: String,
    /// Owning department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Credit value.
    pub credits: u32,
    /// Ids of enrolled students.
    #[serde(default)]
    pub roster: BTreeSet<String>,
    /// When the course was created.
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Create a course with an empty roster.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, teacher_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            teacher_id: teacher_id.into(),
            department: None,
            description: String::new(),
            credits: DEFAULT_CREDITS,
            roster: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether `student_id` is on the roster.
    #[must_use]
    pub fn is_enrolled(&self, student_id: &str) -> bool {
        self.roster.contains(student_id)
    }

    /// Whether `user_id` teaches this course.
    #[must_use]
    pub fn is_taught_by(&self, user_id: &str) -> bool {
        self.teacher_id == user_id
    }
}

impl Record for Course {
    const COLLECTION: Collection = Collection::Courses;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        key_part(&self.id, "course code")?;
        require_field(&self.name, "course name")?;
        require_field(&self.teacher_id, "teacher")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_course_has_empty_roster() {
        let course = Course::new("C1", "Algorithms", "T1");
        assert!(course.roster.is_empty());
        assert_eq!(course.credits, DEFAULT_CREDITS);
        assert!(course.is_taught_by("T1"));
        assert!(!course.is_taught_by("T2"));
    }

    #[test]
    fn test_roster_membership() {
        let mut course = Course::new("C1", "Algorithms", "T1");
        course.roster.insert("S1".to_string());
        assert!(course.is_enrolled("S1"));
        assert!(!course.is_enrolled("S2"));
    }

    #[test]
    fn test_missing_roster_deserializes_empty() {
        let json = r#"{"id":"C1","name":"Algorithms","teacher_id":"T1","credits":4,"created_at":"2024-01-01T00:00:00Z"}"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert!(course.roster.is_empty());
        assert_eq!(course.credits, 4);
    }

    #[test]
    fn test_validate_requires_name() {
        let course = Course::new("C1", "", "T1");
        assert!(course.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_code_with_key_separator_rejected() {
        let course = Course::new("A:B", "Algebra", "T1");
        assert!(course.validate().unwrap_err().is_validation());
    }
}
