//! Assignments, submissions and grading.

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::{managed_course, non_blank, referenced_user};
use crate::error::{Error, Result};
use crate::model::{Assignment, Course, Role, Submission};
use crate::session::Session;
use crate::store::RecordStore;

/// Fields of a new assignment.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    /// Course it is set for.
    pub course_id: String,
    /// Short title.
    pub title: String,
    /// Instructions.
    pub description: Option<String>,
    /// Deadline.
    pub due_date: NaiveDate,
    /// Highest grade; defaults to [`crate::model::DEFAULT_MAX_POINTS`].
    pub max_points: Option<u32>,
}

/// Assignment changes; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct AssignmentUpdate {
    /// New title.
    pub title: Option<String>,
    /// New instructions.
    pub description: Option<String>,
    /// New deadline.
    pub due_date: Option<NaiveDate>,
    /// New highest grade.
    pub max_points: Option<u32>,
}

/// Set an assignment for a course. Ids look like `CS101-A3`.
///
/// # Errors
///
/// Returns not-found for an unknown course, and a validation error if the
/// session does not manage it or the title is blank.
pub fn create_assignment(
    store: &mut RecordStore,
    session: &Session,
    new: NewAssignment,
) -> Result<Assignment> {
    managed_course(store, session, &new.course_id, "set assignments")?;

    let id = store.allocate_id::<Assignment>(&format!("{}-A", new.course_id))?;
    let mut assignment = Assignment::new(id, new.course_id, &session.user_id, new.title.trim(), new.due_date);
    assignment.description = non_blank(new.description).unwrap_or_default();
    if let Some(max_points) = new.max_points {
        assignment.max_points = max_points;
    }

    store.insert(assignment.clone())?;
    info!("Created assignment {} for {}", assignment.id, assignment.course_id);
    Ok(assignment)
}

/// Edit an assignment.
///
/// # Errors
///
/// Returns not-found for an unknown assignment, and a validation error if the
/// session does not manage its course or the new maximum is below a grade
/// already given.
pub fn update_assignment(
    store: &mut RecordStore,
    session: &Session,
    assignment_id: &str,
    update: AssignmentUpdate,
) -> Result<Assignment> {
    let mut assignment = store.get::<Assignment>(assignment_id)?;
    managed_course(store, session, &assignment.course_id, "edit assignments")?;

    if let Some(max_points) = update.max_points {
        let highest = assignment_submissions(store, assignment_id)?
            .iter()
            .filter_map(|s| s.grade)
            .max()
            .unwrap_or(0);
        if max_points < highest {
            return Err(Error::validation(format!(
                "max_points {max_points} is below an existing grade of {highest}"
            )));
        }
        assignment.max_points = max_points;
    }
    if let Some(title) = non_blank(update.title) {
        assignment.title = title;
    }
    if let Some(description) = update.description {
        assignment.description = description.trim().to_string();
    }
    if let Some(due_date) = update.due_date {
        assignment.due_date = due_date;
    }

    store.upsert(assignment.clone())?;
    Ok(assignment)
}

/// Delete an assignment and its submissions, returning how many
/// submissions went with it.
///
/// # Errors
///
/// Returns not-found for an unknown assignment and a validation error if the
/// session does not manage its course.
pub fn delete_assignment(store: &mut RecordStore, session: &Session, assignment_id: &str) -> Result<usize> {
    let assignment = store.get::<Assignment>(assignment_id)?;
    managed_course(store, session, &assignment.course_id, "delete assignments")?;

    store.delete::<Assignment>(assignment_id)?;
    let removed = store.delete_where(|s: &Submission| s.assignment_id == assignment_id)?;
    info!("Deleted assignment {} and {} submissions", assignment_id, removed);
    Ok(removed)
}

/// Assignments of a course, soonest deadline first.
///
/// # Errors
///
/// Returns an error if the assignments collection cannot be read.
pub fn course_assignments(store: &RecordStore, course_id: &str) -> Result<Vec<Assignment>> {
    let mut assignments = store.list(|a: &Assignment| a.course_id == course_id)?;
    assignments.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
    Ok(assignments)
}

/// Hand in an assignment as the session's student. One submission per
/// student per assignment.
///
/// # Errors
///
/// Returns a validation error if the session is not a student, the
/// assignment does not exist, the student is not enrolled in its course or
/// there is neither content nor attachment, and a duplicate error for a
/// second submission.
pub fn submit_assignment(
    store: &mut RecordStore,
    session: &Session,
    assignment_id: &str,
    content: &str,
    attachment: Option<String>,
) -> Result<Submission> {
    session.require(&[Role::Student], "submit assignments")?;
    referenced_user(store, &session.user_id, &[Role::Student], "student")?;

    let assignment = store
        .find::<Assignment>(assignment_id)?
        .ok_or_else(|| Error::validation(format!("assignment '{assignment_id}' does not exist")))?;
    let enrolled = store
        .find::<Course>(&assignment.course_id)?
        .is_some_and(|c| c.is_enrolled(&session.user_id));
    if !enrolled {
        return Err(Error::validation(format!(
            "student '{}' is not enrolled in {}",
            session.user_id, assignment.course_id
        )));
    }

    let submission = Submission::new(assignment_id, &session.user_id, content.trim(), non_blank(attachment));
    store.insert(submission.clone())?;
    info!("{} submitted {}", session.user_id, assignment_id);
    Ok(submission)
}

/// Grade a submission.
///
/// # Errors
///
/// Returns not-found for an unknown assignment or submission, and a
/// validation error if the session does not manage the course or the points
/// exceed the assignment's maximum.
pub fn grade_submission(
    store: &mut RecordStore,
    session: &Session,
    assignment_id: &str,
    student_id: &str,
    points: u32,
    feedback: Option<String>,
) -> Result<Submission> {
    let assignment = store.get::<Assignment>(assignment_id)?;
    managed_course(store, session, &assignment.course_id, "grade submissions")?;
    if points > assignment.max_points {
        return Err(Error::validation(format!(
            "grade {points} exceeds max_points {}",
            assignment.max_points
        )));
    }

    let mut submission = store.get::<Submission>(&Submission::key(assignment_id, student_id))?;
    submission.grade = Some(points);
    submission.feedback = non_blank(feedback);
    submission.graded_at = Some(Utc::now());

    store.upsert(submission.clone())?;
    info!("Graded {} for {}: {}/{}", assignment_id, student_id, points, assignment.max_points);
    Ok(submission)
}

/// A student's submissions.
///
/// # Errors
///
/// Returns an error if the submissions collection cannot be read.
pub fn student_submissions(store: &RecordStore, student_id: &str) -> Result<Vec<Submission>> {
    store.list(|s: &Submission| s.student_id == student_id)
}

/// Submissions made against an assignment.
///
/// # Errors
///
/// Returns an error if the submissions collection cannot be read.
pub fn assignment_submissions(store: &RecordStore, assignment_id: &str) -> Result<Vec<Submission>> {
    store.list(|s: &Submission| s.assignment_id == assignment_id)
}

/// Ungraded submissions in courses a teacher teaches, oldest first.
///
/// # Errors
///
/// Returns an error if a collection cannot be read.
pub fn pending_grading(store: &RecordStore, teacher_id: &str) -> Result<Vec<Submission>> {
    let courses: Vec<String> = store
        .list(|c: &Course| c.is_taught_by(teacher_id))?
        .into_iter()
        .map(|c| c.id)
        .collect();
    let assignments: Vec<String> = store
        .list(|a: &Assignment| courses.contains(&a.course_id))?
        .into_iter()
        .map(|a| a.id)
        .collect();

    let mut pending =
        store.list(|s: &Submission| !s.is_graded() && assignments.contains(&s.assignment_id))?;
    pending.sort_by_key(|s| s.submitted_at);
    Ok(pending)
}
