//! `registrar` - CLI for the college record store
//!
//! This binary opens the configured store and runs one record operation per
//! invocation, acting as the user named by `--as`.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;
use serde::Serialize;

use registrar::cli::{
    AnnouncementCommand, AssignmentCommand, AttendanceCommand, CertificateCommand, Cli, Command,
    ConfigCommand, CourseCommand, DepartmentCommand, ExamCommand, ProjectCommand, ReportCommand,
    SubjectCommand, UserCommand,
};
use registrar::model::{Audience, Certificate, Project, User};
use registrar::ops::{
    announcements, attendance, certificates, courses, coursework, departments, exams, projects,
    reports, users,
};
use registrar::{init_logging, seed_default_accounts, Config, Error, RecordStore, Session};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command handler needs.
#[derive(Debug)]
struct Context {
    config: Config,
    store: RecordStore,
    as_user: Option<String>,
    json: bool,
}

impl Context {
    fn session(&self) -> registrar::Result<Session> {
        let id = self
            .as_user
            .as_deref()
            .ok_or_else(|| Error::validation("this command needs --as USER_ID"))?;
        Ok(Session::for_user(&self.store.get::<User>(id)?))
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, plain: impl FnOnce(&T)) -> CliResult {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            plain(value);
        }
        Ok(())
    }
}

fn main() -> CliResult {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(dir);
    }

    if let Command::Config(config_cmd) = &cli.command {
        return handle_config(&config, config_cmd, cli.json);
    }

    let mut store = RecordStore::open_with_config(&config)?;
    if config.accounts.seed_defaults || matches!(cli.command, Command::Init) {
        departments::seed_default_departments(&mut store)?;
        seed_default_accounts(&mut store)?;
    }

    let mut ctx = Context {
        config,
        store,
        as_user: cli.as_user,
        json: cli.json,
    };

    match cli.command {
        Command::Init => {
            println!("Store ready at {}", ctx.store.location());
            Ok(())
        }
        Command::Status => handle_status(&ctx),
        Command::Config(_) => Ok(()),
        Command::Department(cmd) => handle_department(&mut ctx, cmd),
        Command::User(cmd) => handle_user(&mut ctx, cmd),
        Command::Course(cmd) => handle_course(&mut ctx, cmd),
        Command::Attendance(cmd) => handle_attendance(&mut ctx, cmd),
        Command::Assignment(cmd) => handle_assignment(&mut ctx, cmd),
        Command::Project(cmd) => handle_project(&mut ctx, cmd),
        Command::Certificate(cmd) => handle_certificate(&mut ctx, cmd),
        Command::Announcement(cmd) => handle_announcement(&mut ctx, cmd),
        Command::Subject(cmd) => handle_subject(&mut ctx, cmd),
        Command::Exam(cmd) => handle_exam(&mut ctx, cmd),
        Command::Report(cmd) => handle_report(&ctx, cmd),
    }
}

fn handle_status(ctx: &Context) -> CliResult {
    let stats = ctx.store.stats()?;
    ctx.emit(&stats, |stats| {
        println!("registrar status");
        println!("----------------");
        println!("Store:          {}", stats.location);
        println!("Schema version: {}", stats.schema_version);
        println!("Size:           {} bytes", stats.size_bytes);
        println!();
        for (collection, count) in &stats.counts {
            println!("  {collection:<14} {count}");
        }
        println!("  {:<14} {}", "total", stats.total_records());
    })
}

fn handle_config(config: &Config, cmd: &ConfigCommand, json: bool) -> CliResult {
    match cmd {
        ConfigCommand::Show => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data directory:      {}", config.data_dir().display());
                println!("  Pretty JSON:         {}", config.storage.pretty_json);
                println!();
                println!("[Accounts]");
                println!("  Seed defaults:       {}", config.accounts.seed_defaults);
                println!(
                    "  Min password length: {}",
                    config.accounts.min_password_length
                );
                println!("  Email pattern:       {}", config.accounts.email_pattern);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.clone().unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_profiles(profiles: &[registrar::model::UserProfile]) {
    for p in profiles {
        println!("{:<8} {:<8} {:<30} {}", p.id, p.role, p.email, p.name);
    }
}

fn handle_user(ctx: &mut Context, cmd: UserCommand) -> CliResult {
    match cmd {
        UserCommand::Add {
            id,
            role,
            email,
            password,
            name,
            department,
            student_number,
            year,
        } => {
            let session = ctx.session()?;
            let new = users::NewUser {
                id,
                role,
                email,
                password,
                name,
                department,
                student_number,
                year,
            };
            let user = users::create_user(&mut ctx.store, &session, &ctx.config.accounts, new)?;
            ctx.emit(&user.profile(), |p| println!("Created {} {}", p.role, p.id))
        }
        UserCommand::List { role } => {
            let profiles = users::list_users(&ctx.store, role)?;
            ctx.emit(&profiles, |p| print_profiles(p))
        }
        UserCommand::Show { id } => {
            let profile = users::get_profile(&ctx.store, &id)?;
            ctx.emit(&profile, |p| {
                println!("Id:         {}", p.id);
                println!("Name:       {}", p.name);
                println!("Role:       {}", p.role);
                println!("Email:      {}", p.email);
                if let Some(department) = &p.department {
                    println!("Department: {department}");
                }
                if let Some(number) = &p.student_number {
                    println!("Student no: {number}");
                }
                if let Some(year) = p.year {
                    println!("Year:       {year}");
                }
            })
        }
        UserCommand::Edit {
            id,
            email,
            name,
            department,
            student_number,
            year,
        } => {
            let session = ctx.session()?;
            let update = users::ProfileUpdate {
                email,
                name,
                department,
                student_number,
                year,
            };
            let user = users::update_profile(&mut ctx.store, &session, &ctx.config.accounts, &id, update)?;
            ctx.emit(&user.profile(), |p| println!("Updated {}", p.id))
        }
        UserCommand::Passwd { id, password } => {
            let session = ctx.session()?;
            users::change_password(&mut ctx.store, &session, &ctx.config.accounts, &id, &password)?;
            println!("Password changed for {id}");
            Ok(())
        }
        UserCommand::Remove { id } => {
            let session = ctx.session()?;
            let user = users::delete_user(&mut ctx.store, &session, &id)?;
            ctx.emit(&user.profile(), |p| println!("Removed {} {}", p.role, p.id))
        }
        UserCommand::Login { email, password } => {
            let session = registrar::authenticate(&ctx.store, &email, &password)?;
            ctx.emit(&session, |s| println!("Signed in as {} ({})", s.user_id, s.role))
        }
    }
}

fn print_courses(courses: &[registrar::model::Course]) {
    for c in courses {
        println!(
            "{:<8} {:<30} {:<8} {} enrolled",
            c.id,
            c.name,
            c.teacher_id,
            c.roster.len()
        );
    }
}

fn handle_course(ctx: &mut Context, cmd: CourseCommand) -> CliResult {
    match cmd {
        CourseCommand::Add {
            id,
            name,
            teacher,
            department,
            description,
            credits,
        } => {
            let session = ctx.session()?;
            let new = courses::NewCourse {
                id,
                name,
                teacher_id: teacher,
                department,
                description,
                credits,
            };
            let course = courses::add_course(&mut ctx.store, &session, new)?;
            ctx.emit(&course, |c| println!("Added course {} ({})", c.id, c.name))
        }
        CourseCommand::List { teacher, student } => {
            let list = match (teacher, student) {
                (Some(teacher), _) => courses::teacher_courses(&ctx.store, &teacher)?,
                (None, Some(student)) => courses::student_courses(&ctx.store, &student)?,
                (None, None) => courses::all_courses(&ctx.store)?,
            };
            ctx.emit(&list, |c| print_courses(c))
        }
        CourseCommand::Enroll { course, student } => {
            let session = ctx.session()?;
            let updated = courses::enroll_student(&mut ctx.store, &session, &course, &student)?;
            ctx.emit(&updated, |c| println!("Enrolled {student} in {}", c.id))
        }
        CourseCommand::Drop { course, student } => {
            let session = ctx.session()?;
            let cascade = courses::unenroll_student(&mut ctx.store, &session, &course, &student)?;
            ctx.emit(&cascade, |c| {
                println!(
                    "Removed {student} from {course} ({} attendance, {} submissions)",
                    c.attendance, c.submissions
                );
            })
        }
        CourseCommand::Roster { course } => {
            let roster = courses::roster(&ctx.store, &course)?;
            ctx.emit(&roster, |r| {
                for student in r {
                    println!("{student}");
                }
            })
        }
        CourseCommand::Delete { course } => {
            let session = ctx.session()?;
            let cascade = courses::delete_course(&mut ctx.store, &session, &course)?;
            ctx.emit(&cascade, |c| {
                println!(
                    "Deleted {course} ({} attendance, {} assignments, {} submissions)",
                    c.attendance, c.assignments, c.submissions
                );
            })
        }
    }
}

fn print_attendance(records: &[registrar::model::AttendanceRecord]) {
    for r in records {
        println!("{}  {:<8} {:<8} {}", r.date, r.course_id, r.student_id, r.status);
    }
}

fn print_summary(label: &str, s: &registrar::model::AttendanceSummary) {
    println!(
        "{label:<8} present {:>3}  absent {:>3}  late {:>3}  excused {:>3}  rate {:>5.1}%",
        s.present,
        s.absent,
        s.late,
        s.excused,
        s.rate()
    );
}

fn handle_attendance(ctx: &mut Context, cmd: AttendanceCommand) -> CliResult {
    match cmd {
        AttendanceCommand::Mark {
            course,
            date,
            marks,
            no_overwrite,
        } => {
            let session = ctx.session()?;
            let count = if no_overwrite {
                for (student, status) in &marks {
                    attendance::record_attendance(&mut ctx.store, &session, &course, student, date, *status)?;
                }
                marks.len()
            } else {
                attendance::mark_class(&mut ctx.store, &session, &course, date, &marks)?
            };
            println!("Marked {count} students in {course} for {date}");
            Ok(())
        }
        AttendanceCommand::List { student, course } => {
            let records = match (student, course) {
                (Some(student), Some(course)) => {
                    attendance::student_course_attendance(&ctx.store, &student, &course)?
                }
                (Some(student), None) => attendance::student_attendance(&ctx.store, &student)?,
                (None, Some(course)) => attendance::course_attendance(&ctx.store, &course)?,
                (None, None) => return Err(Error::validation("give --student or --course").into()),
            };
            ctx.emit(&records, |r| print_attendance(r))
        }
        AttendanceCommand::Summary { student, course } => {
            let summary = attendance::attendance_summary(&ctx.store, &student, course.as_deref())?;
            ctx.emit(&summary, |s| print_summary(&student, s))
        }
        AttendanceCommand::Report { course } => {
            let report = attendance::course_report(&ctx.store, &course)?;
            ctx.emit(&report, |report| {
                for (student, summary) in report {
                    print_summary(student, summary);
                }
            })
        }
    }
}

fn print_submissions(submissions: &[registrar::model::Submission]) {
    for s in submissions {
        let grade = s.grade.map_or_else(|| "ungraded".to_string(), |g| g.to_string());
        println!("{:<10} {:<8} {}", s.assignment_id, s.student_id, grade);
    }
}

fn handle_assignment(ctx: &mut Context, cmd: AssignmentCommand) -> CliResult {
    match cmd {
        AssignmentCommand::Create {
            course,
            title,
            due,
            description,
            max_points,
        } => {
            let session = ctx.session()?;
            let new = coursework::NewAssignment {
                course_id: course,
                title,
                description,
                due_date: due,
                max_points,
            };
            let assignment = coursework::create_assignment(&mut ctx.store, &session, new)?;
            ctx.emit(&assignment, |a| println!("Created assignment {} due {}", a.id, a.due_date))
        }
        AssignmentCommand::List { course } => {
            let assignments = coursework::course_assignments(&ctx.store, &course)?;
            ctx.emit(&assignments, |list| {
                for a in list {
                    println!("{:<10} {}  {:>4} pts  {}", a.id, a.due_date, a.max_points, a.title);
                }
            })
        }
        AssignmentCommand::Submit {
            assignment,
            content,
            attachment,
        } => {
            let session = ctx.session()?;
            let submission =
                coursework::submit_assignment(&mut ctx.store, &session, &assignment, &content, attachment)?;
            ctx.emit(&submission, |s| println!("Submitted {}", s.assignment_id))
        }
        AssignmentCommand::Grade {
            assignment,
            student,
            points,
            feedback,
        } => {
            let session = ctx.session()?;
            let submission =
                coursework::grade_submission(&mut ctx.store, &session, &assignment, &student, points, feedback)?;
            ctx.emit(&submission, |s| {
                println!("Graded {} for {}: {points}", s.assignment_id, s.student_id);
            })
        }
        AssignmentCommand::Submissions { assignment, student } => {
            let submissions = match (assignment, student) {
                (Some(assignment), _) => coursework::assignment_submissions(&ctx.store, &assignment)?,
                (None, Some(student)) => coursework::student_submissions(&ctx.store, &student)?,
                (None, None) => return Err(Error::validation("give --assignment or --student").into()),
            };
            ctx.emit(&submissions, |s| print_submissions(s))
        }
        AssignmentCommand::Pending { teacher } => {
            let teacher = match teacher {
                Some(teacher) => teacher,
                None => ctx.session()?.user_id,
            };
            let pending = coursework::pending_grading(&ctx.store, &teacher)?;
            ctx.emit(&pending, |s| print_submissions(s))
        }
        AssignmentCommand::Delete { assignment } => {
            let session = ctx.session()?;
            let removed = coursework::delete_assignment(&mut ctx.store, &session, &assignment)?;
            println!("Deleted {assignment} and {removed} submissions");
            Ok(())
        }
    }
}

fn handle_project(ctx: &mut Context, cmd: ProjectCommand) -> CliResult {
    match cmd {
        ProjectCommand::Create {
            title,
            owner,
            course,
            members,
            due,
            description,
        } => {
            let session = ctx.session()?;
            let new = projects::NewProject {
                owner_id: owner,
                title,
                description,
                course_id: course,
                group_members: members,
                due_date: due,
            };
            let project = projects::create_project(&mut ctx.store, &session, new)?;
            ctx.emit(&project, |p| println!("Created project {} for {}", p.id, p.owner_id))
        }
        ProjectCommand::Advance { project, status } => {
            let session = ctx.session()?;
            let project = projects::advance_project(&mut ctx.store, &session, &project, status)?;
            ctx.emit(&project, |p| println!("Project {} is now {}", p.id, p.status))
        }
        ProjectCommand::Grade {
            project,
            points,
            feedback,
        } => {
            let session = ctx.session()?;
            let project = projects::grade_project(&mut ctx.store, &session, &project, points, feedback)?;
            ctx.emit(&project, |p| println!("Graded project {}: {points}", p.id))
        }
        ProjectCommand::List { user, course, status } => {
            let mut list = match (user, course) {
                (Some(user), _) => projects::projects_for(&ctx.store, &user)?,
                (None, Some(course)) => projects::course_projects(&ctx.store, &course)?,
                (None, None) => ctx.store.all::<Project>()?,
            };
            if let Some(status) = status {
                list.retain(|p| p.status == status);
            }
            ctx.emit(&list, |list| {
                for p in list {
                    println!("{:<6} {:<12} {:<8} {}", p.id, p.status, p.owner_id, p.title);
                }
            })
        }
    }
}

fn handle_certificate(ctx: &mut Context, cmd: CertificateCommand) -> CliResult {
    match cmd {
        CertificateCommand::Submit {
            title,
            organization,
            issued,
            url,
            attachment,
        } => {
            let session = ctx.session()?;
            let new = certificates::NewCertificate {
                title,
                organization,
                issue_date: issued,
                credential_url: url,
                attachment,
            };
            let certificate = certificates::submit_certificate(&mut ctx.store, &session, new)?;
            ctx.emit(&certificate, |c| println!("Submitted certificate {}", c.id))
        }
        CertificateCommand::Review {
            certificate,
            decision,
            note,
        } => {
            let session = ctx.session()?;
            let certificate =
                certificates::review_certificate(&mut ctx.store, &session, &certificate, decision.into(), note)?;
            ctx.emit(&certificate, |c| println!("Certificate {} {}", c.id, c.status))
        }
        CertificateCommand::List { student, status } => {
            let mut list = match (student, status) {
                (Some(student), _) => certificates::student_certificates(&ctx.store, &student)?,
                (None, Some(status)) => certificates::certificates_with_status(&ctx.store, status)?,
                (None, None) => ctx.store.all::<Certificate>()?,
            };
            if let Some(status) = status {
                list.retain(|c| c.status == status);
            }
            ctx.emit(&list, |list| {
                for c in list {
                    println!(
                        "{:<12} {:<9} {:<8} {} ({})",
                        c.id, c.status, c.student_id, c.title, c.issuer.organization
                    );
                }
            })
        }
    }
}

fn handle_announcement(ctx: &mut Context, cmd: AnnouncementCommand) -> CliResult {
    match cmd {
        AnnouncementCommand::Post {
            title,
            body,
            roles,
            departments,
            users,
        } => {
            let session = ctx.session()?;
            let audience = Audience {
                roles,
                departments,
                user_ids: users,
            };
            let announcement =
                announcements::post_announcement(&mut ctx.store, &session, &title, &body, audience)?;
            ctx.emit(&announcement, |a| println!("Posted announcement {}", a.id))
        }
        AnnouncementCommand::List { all } => {
            let list = if all {
                announcements::all_announcements(&ctx.store)?
            } else {
                let session = ctx.session()?;
                announcements::announcements_for(&ctx.store, &session.user_id)?
            };
            ctx.emit(&list, |list| {
                for a in list {
                    println!("[{}] {} ({}, {})", a.id, a.title, a.author_id, a.created_at.date_naive());
                    println!("    {}", a.body);
                }
            })
        }
        AnnouncementCommand::Delete { id } => {
            let session = ctx.session()?;
            let removed = announcements::delete_announcement(&mut ctx.store, &session, &id)?;
            println!("Deleted announcement {}", removed.id);
            Ok(())
        }
    }
}

fn handle_exam(ctx: &mut Context, cmd: ExamCommand) -> CliResult {
    match cmd {
        ExamCommand::Create {
            name,
            kind,
            semester,
            date,
            max_marks,
        } => {
            let session = ctx.session()?;
            let new = exams::NewExam {
                kind: kind.unwrap_or_else(|| name.clone()),
                name,
                semester,
                date,
                max_marks,
            };
            let exam = exams::create_exam(&mut ctx.store, &session, new)?;
            ctx.emit(&exam, |e| println!("Created exam {} on {}", e.id, e.date))
        }
        ExamCommand::Record {
            exam,
            student,
            subject,
            marks,
            remarks,
        } => {
            let session = ctx.session()?;
            let result = exams::record_result(&mut ctx.store, &session, &exam, &student, &subject, marks, remarks)?;
            ctx.emit(&result, |r| {
                println!("Recorded {} {} {}: {}", r.exam_id, r.student_id, r.subject_id, r.marks);
            })
        }
        ExamCommand::Results { exam, student } => {
            let results = match (exam, student) {
                (Some(exam), _) => exams::exam_results(&ctx.store, &exam)?,
                (None, Some(student)) => exams::student_results(&ctx.store, &student)?,
                (None, None) => return Err(Error::validation("give --exam or --student").into()),
            };
            ctx.emit(&results, |list| {
                for r in list {
                    println!("{:<6} {:<8} {:<8} {:>4}", r.exam_id, r.student_id, r.subject_id, r.marks);
                }
            })
        }
        ExamCommand::Unrecord { exam, student, subject } => {
            let session = ctx.session()?;
            let removed = exams::delete_result(&mut ctx.store, &session, &exam, &student, &subject)?;
            println!("Deleted result {}", removed.id);
            Ok(())
        }
        ExamCommand::Delete { exam } => {
            let session = ctx.session()?;
            let removed = exams::delete_exam(&mut ctx.store, &session, &exam)?;
            println!("Deleted {exam} and {removed} results");
            Ok(())
        }
    }
}

fn handle_department(ctx: &mut Context, cmd: DepartmentCommand) -> CliResult {
    match cmd {
        DepartmentCommand::Add {
            id,
            name,
            head,
            description,
        } => {
            let session = ctx.session()?;
            let new = departments::NewDepartment {
                id,
                name,
                head_id: head,
                description,
            };
            let department = departments::add_department(&mut ctx.store, &session, new)?;
            ctx.emit(&department, |d| println!("Added department {} ({})", d.id, d.name))
        }
        DepartmentCommand::List => {
            let list = departments::all_departments(&ctx.store)?;
            ctx.emit(&list, |list| {
                for d in list {
                    println!("{:<6} {:<28} {}", d.id, d.name, d.head_id.as_deref().unwrap_or("-"));
                }
            })
        }
        DepartmentCommand::Edit {
            id,
            name,
            head,
            description,
        } => {
            let session = ctx.session()?;
            let update = departments::DepartmentUpdate {
                name,
                head_id: head,
                description,
            };
            let department = departments::update_department(&mut ctx.store, &session, &id, update)?;
            ctx.emit(&department, |d| println!("Updated department {}", d.id))
        }
        DepartmentCommand::Delete { id } => {
            let session = ctx.session()?;
            departments::delete_department(&mut ctx.store, &session, &id)?;
            println!("Deleted department {id}");
            Ok(())
        }
    }
}

fn handle_subject(ctx: &mut Context, cmd: SubjectCommand) -> CliResult {
    match cmd {
        SubjectCommand::Add {
            name,
            semester,
            department,
        } => {
            let session = ctx.session()?;
            let new = exams::NewSubject {
                name,
                semester,
                department,
            };
            let subject = exams::add_subject(&mut ctx.store, &session, new)?;
            ctx.emit(&subject, |s| println!("Added subject {} ({})", s.id, s.name))
        }
        SubjectCommand::List { semester } => {
            let list = match semester {
                Some(semester) => exams::semester_subjects(&ctx.store, semester)?,
                None => exams::all_subjects(&ctx.store)?,
            };
            ctx.emit(&list, |list| {
                for s in list {
                    println!(
                        "{:<6} sem {:<2} {:<24} {}",
                        s.id,
                        s.semester,
                        s.name,
                        s.department.as_deref().unwrap_or("-")
                    );
                }
            })
        }
        SubjectCommand::Edit {
            subject,
            name,
            semester,
            department,
        } => {
            let session = ctx.session()?;
            let update = exams::SubjectUpdate {
                name,
                semester,
                department,
            };
            let updated = exams::update_subject(&mut ctx.store, &session, &subject, update)?;
            ctx.emit(&updated, |s| println!("Updated subject {}", s.id))
        }
        SubjectCommand::Delete { subject } => {
            let session = ctx.session()?;
            exams::delete_subject(&mut ctx.store, &session, &subject)?;
            println!("Deleted subject {subject}");
            Ok(())
        }
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}%"))
}

fn handle_report(ctx: &Context, cmd: ReportCommand) -> CliResult {
    match cmd {
        ReportCommand::Grades { course } => {
            let distribution = reports::grade_distribution(&ctx.store, course.as_deref())?;
            ctx.emit(&distribution, |d| {
                println!("Grades for {}", d.course_id.as_deref().unwrap_or("all courses"));
                for (band, count) in d.buckets.iter().enumerate() {
                    let low = band * 10;
                    let high = if band + 1 == reports::BUCKETS { 100 } else { low + 9 };
                    println!("  {low:>3}-{high:<3}% {count:>4} {}", "#".repeat(*count));
                }
                match &d.stats {
                    Some(s) => println!(
                        "  n={} mean={:.1}% median={:.1}% min={:.1}% max={:.1}%",
                        s.count, s.average, s.median, s.minimum, s.maximum
                    ),
                    None => println!("  nothing graded yet"),
                }
            })
        }
        ReportCommand::Student { student } => {
            let performance = reports::student_performance(&ctx.store, &student)?;
            ctx.emit(&performance, |p| {
                println!("Performance of {}", p.student_id);
                println!(
                    "  assignments: {}/{} graded, {}",
                    p.assignments.graded,
                    p.assignments.submitted,
                    percent(p.assignments.percentage())
                );
                println!("  exams:       {} results, {}", p.exams.graded, percent(p.exams.percentage()));
                for (course, score) in &p.courses {
                    println!("  {course:<10} {}", percent(score.percentage()));
                }
                println!("  overall:     {}", percent(p.overall));
            })
        }
        ReportCommand::Assignments { course } => {
            let stats = reports::assignment_statistics(&ctx.store, course.as_deref())?;
            ctx.emit(&stats, |list| {
                for a in list {
                    println!(
                        "{:<12} {:<8} {:>3} submitted {:>3} graded {:>7}  {}",
                        a.assignment_id,
                        a.course_id,
                        a.submissions,
                        a.graded,
                        percent(a.average),
                        a.title
                    );
                }
            })
        }
        ReportCommand::Departments => {
            let stats = reports::department_statistics(&ctx.store)?;
            ctx.emit(&stats, |list| {
                for d in list {
                    println!(
                        "{:<6} {:<28} {:>3} courses {:>3} teachers {:>4} students",
                        d.department_id, d.name, d.courses, d.teachers, d.students
                    );
                }
            })
        }
    }
}
