//! Collection layout of the record store.
//!
//! Each collection is persisted as one JSON object (id → record) under the
//! name returned by [`Collection::name`].

use std::fmt;

/// Name of the metadata document holding the schema version and id sequences.
pub const META_NAME: &str = "_meta";

/// Contents written for a collection that has no records yet.
pub const EMPTY_COLLECTION: &str = "{}";

/// One collection of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Academic departments.
    Departments,
    /// Accounts of every role.
    Users,
    /// Courses and their rosters.
    Courses,
    /// Per-day attendance marks.
    Attendance,
    /// Coursework set by teachers.
    Assignments,
    /// Student submissions for assignments.
    Submissions,
    /// Student projects.
    Projects,
    /// Certificates submitted for verification.
    Certificates,
    /// Posted announcements.
    Announcements,
    /// Subjects examined per semester.
    Subjects,
    /// Scheduled exams.
    Exams,
    /// Per-subject exam marks.
    ExamResults,
}

impl Collection {
    /// Every collection, in the order they are created.
    pub const ALL: &'static [Collection] = &[
        Collection::Departments,
        Collection::Users,
        Collection::Courses,
        Collection::Attendance,
        Collection::Assignments,
        Collection::Submissions,
        Collection::Projects,
        Collection::Certificates,
        Collection::Announcements,
        Collection::Subjects,
        Collection::Exams,
        Collection::ExamResults,
    ];

    /// Storage name of the collection.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Departments => "departments",
            Self::Users => "users",
            Self::Courses => "courses",
            Self::Attendance => "attendance",
            Self::Assignments => "assignments",
            Self::Submissions => "submissions",
            Self::Projects => "projects",
            Self::Certificates => "certificates",
            Self::Announcements => "announcements",
            Self::Subjects => "subjects",
            Self::Exams => "exams",
            Self::ExamResults => "exam_results",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
