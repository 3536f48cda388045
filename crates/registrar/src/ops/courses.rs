//! Courses and their rosters.

use serde::Serialize;
use tracing::info;

use super::{department_ref, managed_course, non_blank, referenced_user};
use crate::error::{Error, Result};
use crate::model::{Assignment, AttendanceRecord, Course, Role, Submission};
use crate::session::Session;
use crate::store::RecordStore;

/// Fields of a new course.
#[derive(Debug, Clone, Default)]
pub struct NewCourse {
    /// Course code, used as the id.
    pub id: String,
    /// Title.
    pub name: String,
    /// Teacher in charge.
    pub teacher_id: String,
    /// Owning department.
    pub department: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Credit value; defaults to [`crate::model::DEFAULT_CREDITS`].
    pub credits: Option<u32>,
}

/// Course changes; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    /// New title.
    pub name: Option<String>,
    /// New teacher. Admin only.
    pub teacher_id: Option<String>,
    /// New department.
    pub department: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New credit value.
    pub credits: Option<u32>,
}

/// Records removed alongside a roster entry or course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cascade {
    /// Attendance records removed.
    pub attendance: usize,
    /// Assignments removed.
    pub assignments: usize,
    /// Submissions removed.
    pub submissions: usize,
}

fn require_teacher(store: &RecordStore, teacher_id: &str) -> Result<()> {
    referenced_user(store, teacher_id, &[Role::Teacher], "teacher").map(|_| ())
}

/// Create a course. Admin only.
///
/// # Errors
///
/// Returns a validation error for a non-admin session, a blank name, an
/// unknown teacher or department, and a duplicate error if the code is taken.
pub fn add_course(store: &mut RecordStore, session: &Session, new: NewCourse) -> Result<Course> {
    session.require(&[Role::Admin], "add courses")?;
    require_teacher(store, &new.teacher_id)?;

    let mut course = Course::new(new.id.trim(), new.name.trim(), new.teacher_id);
    course.department = department_ref(store, new.department)?;
    course.description = non_blank(new.description).unwrap_or_default();
    if let Some(credits) = new.credits {
        course.credits = credits;
    }

    store.insert(course.clone())?;
    info!("Added course {} taught by {}", course.id, course.teacher_id);
    Ok(course)
}

/// Edit a course. The course's teacher may edit it; only admins may
/// reassign it to another teacher.
///
/// # Errors
///
/// Returns not-found for an unknown course and a validation error if the
/// session may not make the change.
pub fn update_course(
    store: &mut RecordStore,
    session: &Session,
    course_id: &str,
    update: CourseUpdate,
) -> Result<Course> {
    let mut course = managed_course(store, session, course_id, "edit this course")?;

    if let Some(teacher_id) = update.teacher_id {
        session.require(&[Role::Admin], "reassign courses")?;
        require_teacher(store, &teacher_id)?;
        course.teacher_id = teacher_id;
    }
    if let Some(name) = non_blank(update.name) {
        course.name = name;
    }
    if update.department.is_some() {
        course.department = department_ref(store, update.department)?;
    }
    if let Some(description) = update.description {
        course.description = description.trim().to_string();
    }
    if let Some(credits) = update.credits {
        course.credits = credits;
    }

    store.upsert(course.clone())?;
    Ok(course)
}

/// Delete a course with its attendance, assignments and submissions.
/// Admin only.
///
/// # Errors
///
/// Returns a validation error for a non-admin session and not-found for an
/// unknown course.
pub fn delete_course(store: &mut RecordStore, session: &Session, course_id: &str) -> Result<Cascade> {
    session.require(&[Role::Admin], "delete courses")?;
    store.get::<Course>(course_id)?;

    let assignment_ids: Vec<String> = store
        .list(|a: &Assignment| a.course_id == course_id)?
        .into_iter()
        .map(|a| a.id)
        .collect();

    // dependents first, so a failed write never leaves them without a course
    let cascade = Cascade {
        attendance: store.delete_where(|r: &AttendanceRecord| r.course_id == course_id)?,
        submissions: store.delete_where(|s: &Submission| assignment_ids.contains(&s.assignment_id))?,
        assignments: store.delete_where(|a: &Assignment| a.course_id == course_id)?,
    };
    store.delete::<Course>(course_id)?;

    info!(
        "Deleted course {} ({} attendance, {} assignments, {} submissions)",
        course_id, cascade.attendance, cascade.assignments, cascade.submissions
    );
    Ok(cascade)
}

/// Every course.
///
/// # Errors
///
/// Returns an error if the courses collection cannot be read.
pub fn all_courses(store: &RecordStore) -> Result<Vec<Course>> {
    store.all()
}

/// Courses taught by a teacher.
///
/// # Errors
///
/// Returns an error if the courses collection cannot be read.
pub fn teacher_courses(store: &RecordStore, teacher_id: &str) -> Result<Vec<Course>> {
    store.list(|c: &Course| c.is_taught_by(teacher_id))
}

/// Courses a student is enrolled in.
///
/// # Errors
///
/// Returns an error if the courses collection cannot be read.
pub fn student_courses(store: &RecordStore, student_id: &str) -> Result<Vec<Course>> {
    store.list(|c: &Course| c.is_enrolled(student_id))
}

/// Enrolled student ids, sorted.
///
/// # Errors
///
/// Returns not-found for an unknown course.
pub fn roster(store: &RecordStore, course_id: &str) -> Result<Vec<String>> {
    Ok(store.get::<Course>(course_id)?.roster.into_iter().collect())
}

/// Add a student to a course roster.
///
/// # Errors
///
/// Returns a validation error if the session does not manage the course or
/// the user is not a student, and a duplicate error if already enrolled.
pub fn enroll_student(
    store: &mut RecordStore,
    session: &Session,
    course_id: &str,
    student_id: &str,
) -> Result<Course> {
    let mut course = managed_course(store, session, course_id, "enroll students")?;
    referenced_user(store, student_id, &[Role::Student], "student")?;

    if !course.roster.insert(student_id.to_string()) {
        return Err(Error::duplicate("roster", format!("{course_id}:{student_id}")));
    }
    store.upsert(course.clone())?;
    info!("Enrolled {} in {}", student_id, course_id);
    Ok(course)
}

/// Remove a student from a course along with their attendance and their
/// submissions to the course's assignments.
///
/// # Errors
///
/// Returns a validation error if the session does not manage the course and
/// not-found if the student is not enrolled.
pub fn unenroll_student(
    store: &mut RecordStore,
    session: &Session,
    course_id: &str,
    student_id: &str,
) -> Result<Cascade> {
    let mut course = managed_course(store, session, course_id, "remove students")?;
    if !course.roster.remove(student_id) {
        return Err(Error::not_found("roster", format!("{course_id}:{student_id}")));
    }
    store.upsert(course)?;

    let assignment_ids: Vec<String> = store
        .list(|a: &Assignment| a.course_id == course_id)?
        .into_iter()
        .map(|a| a.id)
        .collect();

    let cascade = Cascade {
        attendance: store.delete_where(|r: &AttendanceRecord| {
            r.course_id == course_id && r.student_id == student_id
        })?,
        submissions: store.delete_where(|s: &Submission| {
            s.student_id == student_id && assignment_ids.contains(&s.assignment_id)
        })?,
        assignments: 0,
    };

    info!("Removed {} from {}", student_id, course_id);
    Ok(cascade)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::model::{AttendanceStatus, User};
    use crate::ops::fixtures::*;
    use crate::store::{Backend, Collection, MemoryBackend};

    /// Memory backend whose writes to one document fail once armed.
    #[derive(Debug)]
    struct FailingWrites {
        inner: MemoryBackend,
        document: &'static str,
        armed: Arc<AtomicBool>,
    }

    impl Backend for FailingWrites {
        fn location(&self) -> String {
            self.inner.location()
        }

        fn read(&self, name: &str) -> Result<Option<String>> {
            self.inner.read(name)
        }

        fn write(&mut self, name: &str, contents: &str) -> Result<()> {
            if name == self.document && self.armed.load(Ordering::SeqCst) {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            self.inner.write(name, contents)
        }

        fn size_bytes(&self) -> u64 {
            self.inner.size_bytes()
        }
    }

    fn c2() -> NewCourse {
        NewCourse {
            id: "C2".to_string(),
            name: "Databases".to_string(),
            teacher_id: "T2".to_string(),
            credits: Some(4),
            ..NewCourse::default()
        }
    }

    #[test]
    fn test_roster_before_and_after_enrollment() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.upsert(Course::new("C1", "Algorithms", "T1")).unwrap();
        store
            .upsert(User::new("S1", Role::Student, "s1@college.edu", "Ada"))
            .unwrap();
        store
            .upsert(User::new("T1", Role::Teacher, "t1@college.edu", "Tess"))
            .unwrap();

        assert!(roster(&store, "C1").unwrap().is_empty());
        enroll_student(&mut store, &teacher(), "C1", "S1").unwrap();
        assert_eq!(roster(&store, "C1").unwrap(), vec!["S1".to_string()]);
    }

    #[test]
    fn test_add_course() {
        let mut store = campus();
        let course = add_course(&mut store, &admin(), c2()).unwrap();
        assert_eq!(course.credits, 4);
        assert_eq!(teacher_courses(&store, "T2").unwrap().len(), 1);

        assert!(add_course(&mut store, &admin(), c2()).unwrap_err().is_duplicate());
        assert!(add_course(&mut store, &teacher(), c2()).unwrap_err().is_validation());
    }

    #[test]
    fn test_add_course_checks_department() {
        let mut store = campus();
        let mut new = c2();
        new.department = Some("History".to_string());
        assert!(add_course(&mut store, &admin(), new).unwrap_err().is_validation());

        let mut new = c2();
        new.department = Some("CS".to_string());
        let course = add_course(&mut store, &admin(), new).unwrap();
        assert_eq!(course.department.as_deref(), Some("CS"));
    }

    #[test]
    fn test_course_code_with_separator_rejected() {
        let mut store = campus();
        let mut new = c2();
        new.id = "A:B".to_string();
        assert!(add_course(&mut store, &admin(), new).unwrap_err().is_validation());
    }

    #[test]
    fn test_add_course_needs_teacher() {
        let mut store = campus();
        let mut new = c2();
        new.teacher_id = "S1".to_string();
        let err = add_course(&mut store, &admin(), new).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_teacher_edits_but_cannot_reassign() {
        let mut store = campus();
        let update = CourseUpdate {
            description: Some("Sorting and searching".to_string()),
            ..CourseUpdate::default()
        };
        let course = update_course(&mut store, &teacher(), "C1", update).unwrap();
        assert_eq!(course.description, "Sorting and searching");

        let reassign = CourseUpdate {
            teacher_id: Some("T2".to_string()),
            ..CourseUpdate::default()
        };
        assert!(update_course(&mut store, &teacher(), "C1", reassign.clone()).is_err());
        let course = update_course(&mut store, &admin(), "C1", reassign).unwrap();
        assert_eq!(course.teacher_id, "T2");
    }

    #[test]
    fn test_enroll_rules() {
        let mut store = campus();
        assert!(enroll_student(&mut store, &teacher(), "C1", "S1")
            .unwrap_err()
            .is_duplicate());
        assert!(enroll_student(&mut store, &teacher(), "C1", "T2")
            .unwrap_err()
            .is_validation());
        assert!(enroll_student(&mut store, &other_teacher(), "C1", "S2")
            .unwrap_err()
            .is_validation());

        enroll_student(&mut store, &admin(), "C1", "S2").unwrap();
        assert_eq!(student_courses(&store, "S2").unwrap()[0].id, "C1");
    }

    #[test]
    fn test_unenroll_cascades() {
        let mut store = campus();
        store
            .upsert(AttendanceRecord::new("C1", "S1", day(1), AttendanceStatus::Present, "T1"))
            .unwrap();
        let mut assignment = crate::model::Assignment::new("C1-A1", "C1", "T1", "Heaps", day(9));
        assignment.description = "Build a heap".to_string();
        store.upsert(assignment).unwrap();
        store
            .upsert(Submission::new("C1-A1", "S1", "done", None))
            .unwrap();

        let cascade = unenroll_student(&mut store, &teacher(), "C1", "S1").unwrap();
        assert_eq!(cascade.attendance, 1);
        assert_eq!(cascade.submissions, 1);
        assert!(roster(&store, "C1").unwrap().is_empty());

        assert!(unenroll_student(&mut store, &teacher(), "C1", "S1")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_course_cascades() {
        let mut store = campus();
        store
            .upsert(AttendanceRecord::new("C1", "S1", day(1), AttendanceStatus::Late, "T1"))
            .unwrap();
        store
            .upsert(crate::model::Assignment::new("C1-A1", "C1", "T1", "Heaps", day(9)))
            .unwrap();
        store
            .upsert(Submission::new("C1-A1", "S1", "done", None))
            .unwrap();

        let cascade = delete_course(&mut store, &admin(), "C1").unwrap();
        assert_eq!(
            cascade,
            Cascade {
                attendance: 1,
                assignments: 1,
                submissions: 1
            }
        );
        assert!(all_courses(&store).unwrap().is_empty());
        assert_eq!(store.count::<Submission>().unwrap(), 0);
    }

    #[test]
    fn test_failed_cascade_keeps_course() {
        let armed = Arc::new(AtomicBool::new(false));
        let backend = FailingWrites {
            inner: MemoryBackend::new(),
            document: Collection::Assignments.name(),
            armed: Arc::clone(&armed),
        };
        let mut store = RecordStore::with_backend(Box::new(backend)).unwrap();
        store.upsert(Course::new("C1", "Algorithms", "T1")).unwrap();
        store
            .upsert(AttendanceRecord::new("C1", "S1", day(1), AttendanceStatus::Present, "T1"))
            .unwrap();
        store
            .upsert(crate::model::Assignment::new("C1-A1", "C1", "T1", "Heaps", day(9)))
            .unwrap();

        armed.store(true, Ordering::SeqCst);
        assert!(delete_course(&mut store, &admin(), "C1").is_err());

        assert!(store.get::<Course>("C1").is_ok());
        assert_eq!(store.count::<crate::model::Assignment>().unwrap(), 1);
    }

    #[test]
    fn test_delete_unknown_course() {
        let mut store = campus();
        assert!(delete_course(&mut store, &admin(), "C9").unwrap_err().is_not_found());
    }
}
