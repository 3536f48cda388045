//! Exams, the subjects they cover and per-subject results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{key_part, require_field, KEY_SEPARATOR};
use crate::error::{Error, Result};
use crate::store::{Collection, Record};

/// A subject taught in one semester, e.g. "Data Structures" in semester 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Subject id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Semester the subject is taught in.
    pub semester: u8,
    /// Owning department id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// When the subject was added.
    pub created_at: DateTime<Utc>,
}

impl Record for Subject {
    const COLLECTION: Collection = Collection::Subjects;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        key_part(&self.id, "subject id")?;
        require_field(&self.name, "subject name")
    }
}

/// A scheduled exam sitting, e.g. "Mid Sem 1" of semester 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    /// Exam id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Sitting kind ("Mid Sem 1", "End Sem", ...).
    pub kind: String,
    /// Semester the exam belongs to.
    pub semester: u8,
    /// Date of the exam.
    pub date: NaiveDate,
    /// Highest mark per subject.
    pub max_marks: u32,
    /// When the exam was created.
    pub created_at: DateTime<Utc>,
}

impl Record for Exam {
    const COLLECTION: Collection = Collection::Exams;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        key_part(&self.id, "exam id")?;
        require_field(&self.name, "exam name")?;
        if self.max_marks == 0 {
            return Err(Error::validation("max_marks must be greater than 0"));
        }
        Ok(())
    }
}

/// Marks of one student in one subject of an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResult {
    /// `exam:student:subject`.
    pub id: String,
    /// Exam sat.
    pub exam_id: String,
    /// Student marked.
    pub student_id: String,
    /// Subject examined.
    pub subject_id: String,
    /// Marks awarded.
    pub marks: u32,
    /// Examiner remarks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// When the marks were last changed.
    pub updated_at: DateTime<Utc>,
}

impl ExamResult {
    /// Natural key of a result.
    #[must_use]
    pub fn key(exam_id: &str, student_id: &str, subject_id: &str) -> String {
        format!("{exam_id}{sep}{student_id}{sep}{subject_id}", sep = KEY_SEPARATOR)
    }
}

impl Record for ExamResult {
    const COLLECTION: Collection = Collection::ExamResults;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        key_part(&self.exam_id, "exam id")?;
        key_part(&self.student_id, "student id")?;
        key_part(&self.subject_id, "subject id")?;
        let expected = Self::key(&self.exam_id, &self.student_id, &self.subject_id);
        if self.id == expected {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "exam result id {:?} must be {expected:?}",
                self.id
            )))
        }
    }
}
