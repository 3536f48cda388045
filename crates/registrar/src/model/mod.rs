//! Entity records held by the store.
//!
//! Every type here is a flat, serde-serializable record with a string id;
//! the [`Record`](crate::store::Record) impls tie each one to its collection.

pub mod announcement;
pub mod attendance;
pub mod certificate;
pub mod course;
pub mod coursework;
pub mod department;
pub mod exam;
pub mod project;
pub mod user;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use announcement::{Announcement, Audience};
pub use attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary};
pub use certificate::{Certificate, CertificateStatus, Issuer};
pub use course::{Course, DEFAULT_CREDITS};
pub use coursework::{Assignment, Submission, DEFAULT_MAX_POINTS};
pub use department::Department;
pub use exam::{Exam, ExamResult, Subject};
pub use project::{Project, ProjectStatus};
pub use user::{User, UserProfile};

/// Role of an account. Every permission check matches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// College administration.
    Admin,
    /// Teaching staff.
    Teacher,
    /// Enrolled student.
    Student,
}

impl Role {
    /// All roles.
    pub const ALL: &'static [Role] = &[Role::Admin, Role::Teacher, Role::Student];

    /// Whether this role belongs to college staff.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Teacher)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
        };
        f.pad(token)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            _ => Err(format!("{s:?} is not a valid role")),
        }
    }
}

/// Returns an error message if `value` is blank.
pub(crate) fn require_field(value: &str, field: &str) -> crate::error::Result<()> {
    if value.trim().is_empty() {
        Err(crate::error::Error::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Separator between the parts of a natural key such as
/// `course:student:date`.
pub(crate) const KEY_SEPARATOR: char = ':';

/// Check an id that can appear inside a natural key. Ids holding the
/// separator would let two different keys collide.
pub(crate) fn key_part(value: &str, field: &str) -> crate::error::Result<()> {
    require_field(value, field)?;
    if value.contains(KEY_SEPARATOR) {
        Err(crate::error::Error::validation(format!(
            "{field} {value:?} must not contain '{KEY_SEPARATOR}'"
        )))
    } else {
        Ok(())
    }
}
