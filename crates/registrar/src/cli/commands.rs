//! CLI command definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};

use crate::model::{AttendanceStatus, CertificateStatus, ProjectStatus, Role};
use crate::ops::certificates::Review;

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Account commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create an account (admin)
    Add {
        /// Account id, e.g. S42
        id: String,
        /// admin, teacher or student
        #[arg(short, long)]
        role: Role,
        /// Login email
        #[arg(short, long)]
        email: String,
        /// Initial password
        #[arg(short, long)]
        password: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Department
        #[arg(long)]
        department: Option<String>,
        /// Student number
        #[arg(long)]
        student_number: Option<String>,
        /// Year of study
        #[arg(long)]
        year: Option<u8>,
    },

    /// List accounts
    List {
        /// Only this role
        #[arg(short, long)]
        role: Option<Role>,
    },

    /// Show one profile
    Show {
        /// Account id
        id: String,
    },

    /// Edit a profile (self or admin)
    Edit {
        /// Account id
        id: String,
        /// New email
        #[arg(long)]
        email: Option<String>,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New department
        #[arg(long)]
        department: Option<String>,
        /// New student number
        #[arg(long)]
        student_number: Option<String>,
        /// New year of study
        #[arg(long)]
        year: Option<u8>,
    },

    /// Change a password (self or admin)
    Passwd {
        /// Account id
        id: String,
        /// New password
        password: String,
    },

    /// Delete an account (admin)
    Remove {
        /// Account id
        id: String,
    },

    /// Check an email and password
    Login {
        /// Login email
        email: String,
        /// Password
        password: String,
    },
}

/// Course commands.
#[derive(Debug, Subcommand)]
pub enum CourseCommand {
    /// Create a course (admin)
    Add {
        /// Course code, e.g. CS101
        id: String,
        /// Course title
        name: String,
        /// Teacher in charge
        #[arg(short, long)]
        teacher: String,
        /// Department
        #[arg(long)]
        department: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Credit value
        #[arg(long)]
        credits: Option<u32>,
    },

    /// List courses
    List {
        /// Only courses taught by this teacher
        #[arg(short, long, conflicts_with = "student")]
        teacher: Option<String>,
        /// Only courses this student is enrolled in
        #[arg(short, long)]
        student: Option<String>,
    },

    /// Enroll a student
    Enroll {
        /// Course code
        course: String,
        /// Student id
        student: String,
    },

    /// Remove a student with their attendance and submissions
    Drop {
        /// Course code
        course: String,
        /// Student id
        student: String,
    },

    /// Show enrolled students
    Roster {
        /// Course code
        course: String,
    },

    /// Delete a course with its records (admin)
    Delete {
        /// Course code
        course: String,
    },
}

/// Attendance commands.
#[derive(Debug, Subcommand)]
pub enum AttendanceCommand {
    /// Mark students for a day, e.g. `S1=present S2=late`
    Mark {
        /// Course code
        course: String,
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        /// STUDENT=STATUS pairs
        #[arg(required = true, value_parser = parse_mark)]
        marks: Vec<(String, AttendanceStatus)>,
        /// Fail instead of overwriting an existing mark
        #[arg(long)]
        no_overwrite: bool,
    },

    /// List attendance records
    List {
        /// Only this student
        #[arg(short, long)]
        student: Option<String>,
        /// Only this course
        #[arg(long)]
        course: Option<String>,
    },

    /// Attendance counts and rate for a student
    Summary {
        /// Student id
        student: String,
        /// Only this course
        #[arg(long)]
        course: Option<String>,
    },

    /// Summary of every enrolled student in a course
    Report {
        /// Course code
        course: String,
    },
}

/// Assignment commands.
#[derive(Debug, Subcommand)]
pub enum AssignmentCommand {
    /// Set an assignment for a course
    Create {
        /// Course code
        course: String,
        /// Title
        title: String,
        /// Deadline (YYYY-MM-DD)
        #[arg(short, long)]
        due: NaiveDate,
        /// Instructions
        #[arg(long)]
        description: Option<String>,
        /// Highest grade
        #[arg(long)]
        max_points: Option<u32>,
    },

    /// List a course's assignments
    List {
        /// Course code
        course: String,
    },

    /// Hand in an assignment (student)
    Submit {
        /// Assignment id
        assignment: String,
        /// Answer text
        #[arg(long, default_value = "")]
        content: String,
        /// Path of an attached file
        #[arg(long)]
        attachment: Option<String>,
    },

    /// Grade a submission
    Grade {
        /// Assignment id
        assignment: String,
        /// Student id
        student: String,
        /// Points awarded
        points: u32,
        /// Comments for the student
        #[arg(long)]
        feedback: Option<String>,
    },

    /// List submissions
    Submissions {
        /// Only this assignment
        #[arg(short, long, conflicts_with = "student")]
        assignment: Option<String>,
        /// Only this student
        #[arg(short, long)]
        student: Option<String>,
    },

    /// Ungraded submissions for a teacher
    Pending {
        /// Teacher id; defaults to the acting user
        #[arg(short, long)]
        teacher: Option<String>,
    },

    /// Delete an assignment and its submissions
    Delete {
        /// Assignment id
        assignment: String,
    },
}

/// Project commands.
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Propose a project
    Create {
        /// Title
        title: String,
        /// Owning student; defaults to the acting user
        #[arg(long)]
        owner: Option<String>,
        /// Course the project is done for
        #[arg(long)]
        course: Option<String>,
        /// Group member (repeatable)
        #[arg(short, long = "member")]
        members: Vec<String>,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// Move a project to its next stage
    Advance {
        /// Project id
        project: String,
        /// in_progress, submitted or completed
        status: ProjectStatus,
    },

    /// Grade a submitted project
    Grade {
        /// Project id
        project: String,
        /// Points awarded
        points: u32,
        /// Comments
        #[arg(long)]
        feedback: Option<String>,
    },

    /// List projects
    List {
        /// Only projects this user is part of
        #[arg(short, long)]
        user: Option<String>,
        /// Only projects for this course
        #[arg(long)]
        course: Option<String>,
        /// Only projects at this stage
        #[arg(short, long)]
        status: Option<ProjectStatus>,
    },
}

/// Certificate commands.
#[derive(Debug, Subcommand)]
pub enum CertificateCommand {
    /// Submit a certificate (student)
    Submit {
        /// Certificate title
        title: String,
        /// Issuing organization
        #[arg(short, long)]
        organization: String,
        /// Issue date (YYYY-MM-DD)
        #[arg(short, long)]
        issued: NaiveDate,
        /// Verification link
        #[arg(long)]
        url: Option<String>,
        /// Path of the scan
        #[arg(long)]
        attachment: Option<String>,
    },

    /// Verify or reject a pending certificate (staff)
    Review {
        /// Certificate id
        certificate: String,
        /// Outcome
        #[arg(value_enum)]
        decision: ReviewArg,
        /// Note for the student
        #[arg(long)]
        note: Option<String>,
    },

    /// List certificates
    List {
        /// Only this student
        #[arg(short, long)]
        student: Option<String>,
        /// Only this review state
        #[arg(long)]
        status: Option<CertificateStatus>,
    },
}

/// Announcement commands.
#[derive(Debug, Subcommand)]
pub enum AnnouncementCommand {
    /// Post an announcement (staff); no audience flags means everyone
    Post {
        /// Headline
        title: String,
        /// Message text
        body: String,
        /// Address a role (repeatable)
        #[arg(long = "role")]
        roles: Vec<Role>,
        /// Address a department (repeatable)
        #[arg(long = "department")]
        departments: Vec<String>,
        /// Address a user (repeatable)
        #[arg(long = "user")]
        users: Vec<String>,
    },

    /// Announcements for the acting user
    List {
        /// Show every announcement
        #[arg(short, long)]
        all: bool,
    },

    /// Delete an announcement (author or admin)
    Delete {
        /// Announcement id
        id: String,
    },
}

/// Exam commands.
#[derive(Debug, Subcommand)]
pub enum ExamCommand {
    /// Schedule an exam (staff)
    Create {
        /// Display name
        name: String,
        /// Sitting kind; defaults to the name
        #[arg(short, long)]
        kind: Option<String>,
        /// Semester
        #[arg(short, long)]
        semester: u8,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Highest mark per subject
        #[arg(long)]
        max_marks: Option<u32>,
    },

    /// Record or correct marks (staff)
    Record {
        /// Exam id
        exam: String,
        /// Student id
        student: String,
        /// Subject id, e.g. SUB3
        subject: String,
        /// Marks awarded
        marks: u32,
        /// Examiner remarks
        #[arg(long)]
        remarks: Option<String>,
    },

    /// Show results
    Results {
        /// Only this exam
        #[arg(short, long, conflicts_with = "student")]
        exam: Option<String>,
        /// Only this student
        #[arg(short, long)]
        student: Option<String>,
    },

    /// Delete one result (staff)
    Unrecord {
        /// Exam id
        exam: String,
        /// Student id
        student: String,
        /// Subject id
        subject: String,
    },

    /// Delete an exam and its results (staff)
    Delete {
        /// Exam id
        exam: String,
    },
}

/// Subject commands.
#[derive(Debug, Subcommand)]
pub enum SubjectCommand {
    /// Add a subject to the syllabus (staff)
    Add {
        /// Subject name
        name: String,
        /// Semester it is taught in
        #[arg(short, long)]
        semester: u8,
        /// Owning department
        #[arg(long)]
        department: Option<String>,
    },

    /// List subjects
    List {
        /// Only this semester
        #[arg(short, long)]
        semester: Option<u8>,
    },

    /// Edit a subject (staff)
    Edit {
        /// Subject id
        subject: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New semester
        #[arg(long)]
        semester: Option<u8>,
        /// New department; empty clears it
        #[arg(long)]
        department: Option<String>,
    },

    /// Delete a subject without results (staff)
    Delete {
        /// Subject id
        subject: String,
    },
}

/// Department commands.
#[derive(Debug, Subcommand)]
pub enum DepartmentCommand {
    /// Add a department (admin)
    Add {
        /// Short code, e.g. CS
        id: String,
        /// Full name
        name: String,
        /// Head of department, a teacher
        #[arg(long)]
        head: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// List departments
    List,

    /// Edit a department (admin)
    Edit {
        /// Department code
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New head; empty clears it
        #[arg(long)]
        head: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an unused department (admin)
    Delete {
        /// Department code
        id: String,
    },
}

/// Report commands.
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Distribution of assignment grades
    Grades {
        /// Only this course
        #[arg(long)]
        course: Option<String>,
    },

    /// A student's assignment and exam performance
    Student {
        /// Student id
        student: String,
    },

    /// Submission and grading counts per assignment
    Assignments {
        /// Only this course
        #[arg(long)]
        course: Option<String>,
    },

    /// Courses, teachers and students per department
    Departments,
}

/// Review outcome argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewArg {
    /// Accept the certificate
    Verify,
    /// Refuse the certificate
    Reject,
}

impl From<ReviewArg> for Review {
    fn from(arg: ReviewArg) -> Self {
        match arg {
            ReviewArg::Verify => Self::Verify,
            ReviewArg::Reject => Self::Reject,
        }
    }
}

/// Parse a `STUDENT=STATUS` attendance mark.
///
/// # Errors
///
/// Returns a message if the `=` is missing or the status is unknown.
pub fn parse_mark(s: &str) -> Result<(String, AttendanceStatus), String> {
    let (student, status) = s
        .split_once('=')
        .ok_or_else(|| format!("{s:?} is not STUDENT=STATUS"))?;
    let student = student.trim();
    if student.is_empty() {
        return Err(format!("{s:?} has no student id"));
    }
    Ok((student.to_string(), status.trim().parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mark() {
        assert_eq!(
            parse_mark("S1=present").unwrap(),
            ("S1".to_string(), AttendanceStatus::Present)
        );
        assert_eq!(
            parse_mark(" S2 = Excused ").unwrap(),
            ("S2".to_string(), AttendanceStatus::Excused)
        );
        assert!(parse_mark("S1").is_err());
        assert!(parse_mark("=present").is_err());
        assert!(parse_mark("S1=asleep").is_err());
    }

    #[test]
    fn test_review_arg_conversion() {
        assert_eq!(Review::from(ReviewArg::Verify), Review::Verify);
        assert_eq!(Review::from(ReviewArg::Reject), Review::Reject);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Validate { file: None };
        assert!(format!("{cmd:?}").contains("Validate"));
    }
}
