//! Command-line interface for registrar.
//!
//! Defines the argument structure of the `registrar` binary; the handlers
//! live in `main.rs`.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    parse_mark, AnnouncementCommand, AssignmentCommand, AttendanceCommand, CertificateCommand,
    ConfigCommand, CourseCommand, DepartmentCommand, ExamCommand, ProjectCommand, ReportCommand,
    ReviewArg, SubjectCommand, UserCommand,
};

/// registrar - College records from the command line
///
/// Keeps departments, users, courses, attendance, coursework, projects,
/// certificates, announcements, subjects and exam results in a directory of
/// JSON files.
#[derive(Debug, Parser)]
#[command(name = "registrar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this data directory instead of the configured one
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Act as this user id
    #[arg(long = "as", global = true, value_name = "USER_ID")]
    pub as_user: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the data directory and default accounts
    Init,

    /// Show store location and record counts
    Status,

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage departments
    #[command(subcommand)]
    Department(DepartmentCommand),

    /// Manage accounts
    #[command(subcommand)]
    User(UserCommand),

    /// Manage courses and rosters
    #[command(subcommand)]
    Course(CourseCommand),

    /// Mark and report attendance
    #[command(subcommand)]
    Attendance(AttendanceCommand),

    /// Set, submit and grade assignments
    #[command(subcommand)]
    Assignment(AssignmentCommand),

    /// Track student projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Submit and review certificates
    #[command(subcommand)]
    Certificate(CertificateCommand),

    /// Post and read announcements
    #[command(subcommand)]
    Announcement(AnnouncementCommand),

    /// Manage the subjects exams are marked in
    #[command(subcommand)]
    Subject(SubjectCommand),

    /// Schedule exams and record results
    #[command(subcommand)]
    Exam(ExamCommand),

    /// Grade, performance and department analytics
    #[command(subcommand)]
    Report(ReportCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use crate::model::{AttendanceStatus, ProjectStatus, Role};
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_name(), "registrar");
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["registrar", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["registrar", "-q", "status"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["registrar", "-v", "status"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["registrar", "-vv", "status"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = parse(&["registrar", "status", "--json", "--data-dir", "/tmp/reg", "--as", "A1"]);
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/reg")));
        assert_eq!(cli.as_user.as_deref(), Some("A1"));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["registrar", "-c", "/custom/config.toml", "init"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Init));
    }

    #[test]
    fn test_parse_user_add() {
        let cli = parse(&[
            "registrar", "user", "add", "S2", "--role", "student", "--email", "s2@college.edu",
            "--password", "secret1", "--name", "Grace", "--year", "1",
        ]);
        match cli.command {
            Command::User(UserCommand::Add { id, role, year, .. }) => {
                assert_eq!(id, "S2");
                assert_eq!(role, Role::Student);
                assert_eq!(year, Some(1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_attendance_mark() {
        let cli = parse(&[
            "registrar", "attendance", "mark", "C1", "2024-03-01", "S1=present", "S2=late",
        ]);
        match cli.command {
            Command::Attendance(AttendanceCommand::Mark { course, marks, .. }) => {
                assert_eq!(course, "C1");
                assert_eq!(marks[1], ("S2".to_string(), AttendanceStatus::Late));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_project_advance() {
        let cli = parse(&["registrar", "project", "advance", "P1", "in-progress"]);
        assert!(matches!(
            cli.command,
            Command::Project(ProjectCommand::Advance {
                status: ProjectStatus::InProgress,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_exam_record_takes_subject_id() {
        let cli = parse(&["registrar", "exam", "record", "EX1", "S1", "SUB2", "71"]);
        match cli.command {
            Command::Exam(ExamCommand::Record { subject, marks, .. }) => {
                assert_eq!(subject, "SUB2");
                assert_eq!(marks, 71);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_department_and_subject() {
        let cli = parse(&["registrar", "department", "add", "MATH", "Mathematics", "--head", "T2"]);
        assert!(matches!(
            cli.command,
            Command::Department(DepartmentCommand::Add { head: Some(ref h), .. }) if h == "T2"
        ));

        let cli = parse(&["registrar", "subject", "add", "Optics", "-s", "3", "--department", "PHY"]);
        assert!(matches!(
            cli.command,
            Command::Subject(SubjectCommand::Add { semester: 3, .. })
        ));
    }

    #[test]
    fn test_parse_reports() {
        let cli = parse(&["registrar", "report", "grades", "--course", "C1"]);
        assert!(matches!(
            cli.command,
            Command::Report(ReportCommand::Grades { course: Some(ref c) }) if c == "C1"
        ));
        assert!(matches!(
            parse(&["registrar", "report", "departments"]).command,
            Command::Report(ReportCommand::Departments)
        ));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let args = ["registrar", "attendance", "mark", "C1", "yesterday", "S1=present"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
