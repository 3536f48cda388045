//! Attendance marks.
//!
//! A record's id is its natural key `course:student:date`, so the store can
//! never hold two marks for the same student, course and day.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{key_part, KEY_SEPARATOR};
use crate::error::{Error, Result};
use crate::store::{Collection, Record};

/// Attendance outcome for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// Attended.
    Present,
    /// Did not attend.
    Absent,
    /// Attended late.
    Late,
    /// Absence excused.
    Excused,
}

impl AttendanceStatus {
    /// Whether the status counts as present.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Late => "Late",
            Self::Excused => "Excused",
        };
        f.pad(token)
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            "excused" => Ok(Self::Excused),
            _ => Err(format!("{s:?} is not a valid attendance status")),
        }
    }
}

/// One student's attendance in one course on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// `course:student:date`.
    pub id: String,
    /// Course the class belongs to.
    pub course_id: String,
    /// Student being marked.
    pub student_id: String,
    /// Day of the class.
    pub date: NaiveDate,
    /// Outcome.
    pub status: AttendanceStatus,
    /// User who recorded the mark.
    pub marked_by: String,
    /// When the mark was recorded.
    pub marked_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Create a record keyed by course, student and date.
    #[must_use]
    pub fn new(
        course_id: impl Into<String>,
        student_id: impl Into<String>,
        date: NaiveDate,
        status: AttendanceStatus,
        marked_by: impl Into<String>,
    ) -> Self {
        let course_id = course_id.into();
        let student_id = student_id.into();
        Self {
            id: Self::key(&course_id, &student_id, date),
            course_id,
            student_id,
            date,
            status,
            marked_by: marked_by.into(),
            marked_at: Utc::now(),
        }
    }

    /// Natural key of a record.
    #[must_use]
    pub fn key(course_id: &str, student_id: &str, date: NaiveDate) -> String {
        format!("{course_id}{sep}{student_id}{sep}{date}", sep = KEY_SEPARATOR)
    }
}

impl Record for AttendanceRecord {
    const COLLECTION: Collection = Collection::Attendance;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        key_part(&self.course_id, "course id")?;
        key_part(&self.student_id, "student id")?;
        let expected = Self::key(&self.course_id, &self.student_id, self.date);
        if self.id == expected {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "attendance id {:?} must be {expected:?}",
                self.id
            )))
        }
    }
}

/// Counts of each status over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    /// Days present.
    pub present: usize,
    /// Days absent.
    pub absent: usize,
    /// Days late.
    pub late: usize,
    /// Days excused.
    pub excused: usize,
}

impl AttendanceSummary {
    /// Tally a set of records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::Excused => summary.excused += 1,
            }
        }
        summary
    }

    /// Number of marked days.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.present + self.absent + self.late + self.excused
    }

    /// Percentage of marked days the student was present; 0 with no marks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.present as f64 / total as f64 * 100.0
        }
    }
}
