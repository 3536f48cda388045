//! Subjects, exams and results.

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::{department_ref, non_blank, referenced_user};
use crate::error::{Error, Result};
use crate::model::{Exam, ExamResult, Role, Subject};
use crate::session::Session;
use crate::store::RecordStore;

/// Default highest mark per subject.
pub const DEFAULT_MAX_MARKS: u32 = 100;

/// Fields of a new subject.
#[derive(Debug, Clone)]
pub struct NewSubject {
    /// Display name.
    pub name: String,
    /// Semester it is taught in.
    pub semester: u8,
    /// Owning department id.
    pub department: Option<String>,
}

/// Subject changes; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct SubjectUpdate {
    /// New name.
    pub name: Option<String>,
    /// New semester.
    pub semester: Option<u8>,
    /// New department; blank clears it.
    pub department: Option<String>,
}

/// Fields of a new exam.
#[derive(Debug, Clone)]
pub struct NewExam {
    /// Display name.
    pub name: String,
    /// Sitting kind, e.g. "Mid Sem 1".
    pub kind: String,
    /// Semester.
    pub semester: u8,
    /// Date of the exam.
    pub date: NaiveDate,
    /// Highest mark per subject.
    pub max_marks: Option<u32>,
}

/// Exam changes; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ExamUpdate {
    /// New name.
    pub name: Option<String>,
    /// New sitting kind.
    pub kind: Option<String>,
    /// New semester.
    pub semester: Option<u8>,
    /// New date.
    pub date: Option<NaiveDate>,
    /// New highest mark.
    pub max_marks: Option<u32>,
}

const STAFF: &[Role] = &[Role::Admin, Role::Teacher];

/// Add a subject.
///
/// # Errors
///
/// Returns a validation error for a student session, a blank name or an
/// unknown department.
pub fn add_subject(store: &mut RecordStore, session: &Session, new: NewSubject) -> Result<Subject> {
    session.require(STAFF, "add subjects")?;

    let subject = Subject {
        id: store.allocate_id::<Subject>("SUB")?,
        name: new.name.trim().to_string(),
        semester: new.semester,
        department: department_ref(store, new.department)?,
        created_at: Utc::now(),
    };

    store.insert(subject.clone())?;
    info!("Added subject {} ({}) to semester {}", subject.id, subject.name, subject.semester);
    Ok(subject)
}

/// Edit a subject.
///
/// # Errors
///
/// Returns not-found for an unknown subject, and a validation error for a
/// student session or an unknown department.
pub fn update_subject(
    store: &mut RecordStore,
    session: &Session,
    subject_id: &str,
    update: SubjectUpdate,
) -> Result<Subject> {
    session.require(STAFF, "edit subjects")?;
    let mut subject = store.get::<Subject>(subject_id)?;

    if let Some(name) = non_blank(update.name) {
        subject.name = name;
    }
    if let Some(semester) = update.semester {
        subject.semester = semester;
    }
    if update.department.is_some() {
        subject.department = department_ref(store, update.department)?;
    }

    store.upsert(subject.clone())?;
    Ok(subject)
}

/// Delete a subject that has no results.
///
/// # Errors
///
/// Returns not-found for an unknown subject, and a validation error for a
/// student session or a subject with recorded marks.
pub fn delete_subject(store: &mut RecordStore, session: &Session, subject_id: &str) -> Result<Subject> {
    session.require(STAFF, "delete subjects")?;
    store.get::<Subject>(subject_id)?;

    let marked = store.list(|r: &ExamResult| r.subject_id == subject_id)?.len();
    if marked > 0 {
        return Err(Error::validation(format!(
            "subject {subject_id} has {marked} recorded results"
        )));
    }
    store.delete::<Subject>(subject_id)
}

/// Every subject, by semester then name.
///
/// # Errors
///
/// Returns an error if the subjects collection cannot be read.
pub fn all_subjects(store: &RecordStore) -> Result<Vec<Subject>> {
    let mut subjects: Vec<Subject> = store.all()?;
    subjects.sort_by(|a, b| a.semester.cmp(&b.semester).then_with(|| a.name.cmp(&b.name)));
    Ok(subjects)
}

/// Subjects taught in one semester, by name.
///
/// # Errors
///
/// Returns an error if the subjects collection cannot be read.
pub fn semester_subjects(store: &RecordStore, semester: u8) -> Result<Vec<Subject>> {
    let mut subjects = store.list(|s: &Subject| s.semester == semester)?;
    subjects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(subjects)
}

/// Schedule an exam.
///
/// # Errors
///
/// Returns a validation error for a student session, a blank name or a zero
/// maximum.
pub fn create_exam(store: &mut RecordStore, session: &Session, new: NewExam) -> Result<Exam> {
    session.require(STAFF, "create exams")?;

    let exam = Exam {
        id: store.allocate_id::<Exam>("EX")?,
        name: new.name.trim().to_string(),
        kind: new.kind.trim().to_string(),
        semester: new.semester,
        date: new.date,
        max_marks: new.max_marks.unwrap_or(DEFAULT_MAX_MARKS),
        created_at: Utc::now(),
    };

    store.insert(exam.clone())?;
    info!("Created exam {} ({})", exam.id, exam.name);
    Ok(exam)
}

/// Edit an exam.
///
/// # Errors
///
/// Returns not-found for an unknown exam, and a validation error for a
/// student session or a maximum below marks already recorded.
pub fn update_exam(store: &mut RecordStore, session: &Session, exam_id: &str, update: ExamUpdate) -> Result<Exam> {
    session.require(STAFF, "edit exams")?;
    let mut exam = store.get::<Exam>(exam_id)?;

    if let Some(max_marks) = update.max_marks {
        let highest = exam_results(store, exam_id)?
            .iter()
            .map(|r| r.marks)
            .max()
            .unwrap_or(0);
        if max_marks < highest {
            return Err(Error::validation(format!(
                "max_marks {max_marks} is below recorded marks of {highest}"
            )));
        }
        exam.max_marks = max_marks;
    }
    if let Some(name) = non_blank(update.name) {
        exam.name = name;
    }
    if let Some(kind) = update.kind {
        exam.kind = kind.trim().to_string();
    }
    if let Some(semester) = update.semester {
        exam.semester = semester;
    }
    if let Some(date) = update.date {
        exam.date = date;
    }

    store.upsert(exam.clone())?;
    Ok(exam)
}

/// Delete an exam with all its results, returning how many results went.
///
/// # Errors
///
/// Returns a validation error for a student session and not-found for an
/// unknown exam.
pub fn delete_exam(store: &mut RecordStore, session: &Session, exam_id: &str) -> Result<usize> {
    session.require(STAFF, "delete exams")?;
    store.delete::<Exam>(exam_id)?;
    let removed = store.delete_where(|r: &ExamResult| r.exam_id == exam_id)?;
    info!("Deleted exam {} and {} results", exam_id, removed);
    Ok(removed)
}

/// Record or correct a student's marks in one subject of an exam.
///
/// # Errors
///
/// Returns not-found for an unknown exam, and a validation error for a
/// student session, an unknown student, a subject that does not exist or is
/// not taught in the exam's semester, or marks above the maximum.
pub fn record_result(
    store: &mut RecordStore,
    session: &Session,
    exam_id: &str,
    student_id: &str,
    subject_id: &str,
    marks: u32,
    remarks: Option<String>,
) -> Result<ExamResult> {
    session.require(STAFF, "record exam results")?;
    let exam = store.get::<Exam>(exam_id)?;
    referenced_user(store, student_id, &[Role::Student], "student")?;

    let subject_id = subject_id.trim();
    let subject = store
        .find::<Subject>(subject_id)?
        .ok_or_else(|| Error::validation(format!("subject '{subject_id}' does not exist")))?;
    if subject.semester != exam.semester {
        return Err(Error::validation(format!(
            "subject {subject_id} is taught in semester {}, not semester {}",
            subject.semester, exam.semester
        )));
    }
    if marks > exam.max_marks {
        return Err(Error::validation(format!(
            "marks {marks} exceed max_marks {}",
            exam.max_marks
        )));
    }

    let result = ExamResult {
        id: ExamResult::key(exam_id, student_id, subject_id),
        exam_id: exam_id.to_string(),
        student_id: student_id.to_string(),
        subject_id: subject_id.to_string(),
        marks,
        remarks: non_blank(remarks),
        updated_at: Utc::now(),
    };

    store.upsert(result.clone())?;
    Ok(result)
}

/// Remove one result.
///
/// # Errors
///
/// Returns a validation error for a student session and not-found if there
/// is no such result.
pub fn delete_result(
    store: &mut RecordStore,
    session: &Session,
    exam_id: &str,
    student_id: &str,
    subject_id: &str,
) -> Result<ExamResult> {
    session.require(STAFF, "delete exam results")?;
    store.delete::<ExamResult>(&ExamResult::key(exam_id, student_id, subject_id.trim()))
}

/// Results of an exam, by student then subject.
///
/// # Errors
///
/// Returns an error if the results collection cannot be read.
pub fn exam_results(store: &RecordStore, exam_id: &str) -> Result<Vec<ExamResult>> {
    store.list(|r: &ExamResult| r.exam_id == exam_id)
}

/// A student's results across exams.
///
/// # Errors
///
/// Returns an error if the results collection cannot be read.
pub fn student_results(store: &RecordStore, student_id: &str) -> Result<Vec<ExamResult>> {
    store.list(|r: &ExamResult| r.student_id == student_id)
}
