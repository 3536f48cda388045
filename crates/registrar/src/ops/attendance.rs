//! Attendance marking and reporting.
//!
//! A student has at most one record per course per day; the record id is
//! that triple, so the store itself keeps dates unique.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use super::managed_course;
use crate::error::{Error, Result};
use crate::model::{AttendanceRecord, AttendanceStatus, AttendanceSummary, Course};
use crate::session::Session;
use crate::store::RecordStore;

fn require_enrolled(course: &Course, student_id: &str) -> Result<()> {
    if course.is_enrolled(student_id) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "student '{student_id}' is not enrolled in {}",
            course.id
        )))
    }
}

/// Record a student's attendance for a day that has no record yet.
///
/// # Errors
///
/// Returns a validation error if the session does not manage the course or
/// the student is not enrolled, and a duplicate error if the day is already
/// recorded.
pub fn record_attendance(
    store: &mut RecordStore,
    session: &Session,
    course_id: &str,
    student_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
) -> Result<AttendanceRecord> {
    let course = managed_course(store, session, course_id, "mark attendance")?;
    require_enrolled(&course, student_id)?;

    let record = AttendanceRecord::new(course_id, student_id, date, status, &session.user_id);
    store.insert(record.clone())?;
    Ok(record)
}

/// Set a student's attendance for a day, replacing any earlier mark.
///
/// # Errors
///
/// Returns a validation error if the session does not manage the course or
/// the student is not enrolled.
pub fn mark_attendance(
    store: &mut RecordStore,
    session: &Session,
    course_id: &str,
    student_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
) -> Result<AttendanceRecord> {
    let course = managed_course(store, session, course_id, "mark attendance")?;
    require_enrolled(&course, student_id)?;

    let record = AttendanceRecord::new(course_id, student_id, date, status, &session.user_id);
    store.upsert(record.clone())?;
    Ok(record)
}

/// Mark a whole class for one day. Every student is checked before any
/// record is written.
///
/// # Errors
///
/// Returns a validation error if the session does not manage the course or
/// any student is not enrolled.
pub fn mark_class(
    store: &mut RecordStore,
    session: &Session,
    course_id: &str,
    date: NaiveDate,
    marks: &[(String, AttendanceStatus)],
) -> Result<usize> {
    let course = managed_course(store, session, course_id, "mark attendance")?;
    for (student_id, _) in marks {
        require_enrolled(&course, student_id)?;
    }

    for (student_id, status) in marks {
        let record = AttendanceRecord::new(course_id, student_id, date, *status, &session.user_id);
        store.upsert(record)?;
    }
    info!("Marked {} students in {} for {}", marks.len(), course_id, date);
    Ok(marks.len())
}

/// A student's records across courses, by date.
///
/// # Errors
///
/// Returns an error if the attendance collection cannot be read.
pub fn student_attendance(store: &RecordStore, student_id: &str) -> Result<Vec<AttendanceRecord>> {
    let mut records = store.list(|r: &AttendanceRecord| r.student_id == student_id)?;
    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.course_id.cmp(&b.course_id)));
    Ok(records)
}

/// Every record of a course, by date then student.
///
/// # Errors
///
/// Returns an error if the attendance collection cannot be read.
pub fn course_attendance(store: &RecordStore, course_id: &str) -> Result<Vec<AttendanceRecord>> {
    let mut records = store.list(|r: &AttendanceRecord| r.course_id == course_id)?;
    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.student_id.cmp(&b.student_id)));
    Ok(records)
}

/// One student's records in one course, by date.
///
/// # Errors
///
/// Returns an error if the attendance collection cannot be read.
pub fn student_course_attendance(
    store: &RecordStore,
    student_id: &str,
    course_id: &str,
) -> Result<Vec<AttendanceRecord>> {
    // ids share the course:student prefix and dates sort as ISO strings
    store.list(|r: &AttendanceRecord| r.student_id == student_id && r.course_id == course_id)
}

/// Counts and rate for a student, in one course or overall.
///
/// # Errors
///
/// Returns an error if the attendance collection cannot be read.
pub fn attendance_summary(
    store: &RecordStore,
    student_id: &str,
    course_id: Option<&str>,
) -> Result<AttendanceSummary> {
    let records = match course_id {
        Some(course_id) => student_course_attendance(store, student_id, course_id)?,
        None => student_attendance(store, student_id)?,
    };
    Ok(AttendanceSummary::from_records(&records))
}

/// Summary of every enrolled student in a course.
///
/// # Errors
///
/// Returns not-found for an unknown course.
pub fn course_report(store: &RecordStore, course_id: &str) -> Result<BTreeMap<String, AttendanceSummary>> {
    let course = store.get::<Course>(course_id)?;
    let records = course_attendance(store, course_id)?;

    Ok(course
        .roster
        .iter()
        .map(|student_id| {
            let summary =
                AttendanceSummary::from_records(records.iter().filter(|r| &r.student_id == student_id));
            (student_id.clone(), summary)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::courses::enroll_student;
    use crate::ops::fixtures::*;

    #[test]
    fn test_record_twice_is_duplicate() {
        let mut store = campus();
        record_attendance(&mut store, &teacher(), "C1", "S1", day(1), AttendanceStatus::Present).unwrap();

        let err = record_attendance(&mut store, &teacher(), "C1", "S1", day(1), AttendanceStatus::Absent)
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_separator_ids_never_share_a_key() {
        let mut store = campus();
        assert!(store
            .upsert(Course::new("A:B", "Algebra", "T1"))
            .unwrap_err()
            .is_validation());
        assert!(store
            .upsert(crate::model::User::new("B:C", crate::model::Role::Student, "bc@college.edu", "Bea"))
            .unwrap_err()
            .is_validation());

        // a roster entry written before ids were checked still cannot reach a key
        let mut course = Course::new("A", "Analysis", "T1");
        course.roster.insert("B:C".to_string());
        store.upsert(course).unwrap();
        let err = mark_attendance(&mut store, &teacher(), "A", "B:C", day(1), AttendanceStatus::Present)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count::<AttendanceRecord>().unwrap(), 0);
    }

    #[test]
    fn test_mark_overwrites_same_day() {
        let mut store = campus();
        mark_attendance(&mut store, &teacher(), "C1", "S1", day(1), AttendanceStatus::Absent).unwrap();
        mark_attendance(&mut store, &teacher(), "C1", "S1", day(1), AttendanceStatus::Late).unwrap();
        mark_attendance(&mut store, &teacher(), "C1", "S1", day(2), AttendanceStatus::Present).unwrap();

        let records = student_course_attendance(&store, "S1", "C1").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, day(1));
        assert_eq!(records[0].status, AttendanceStatus::Late);
    }

    #[test]
    fn test_only_course_staff_mark_enrolled_students() {
        let mut store = campus();
        let err = mark_attendance(&mut store, &other_teacher(), "C1", "S1", day(1), AttendanceStatus::Present)
            .unwrap_err();
        assert!(err.is_validation());

        let err = mark_attendance(&mut store, &student(), "C1", "S1", day(1), AttendanceStatus::Present)
            .unwrap_err();
        assert!(err.is_validation());

        let err = mark_attendance(&mut store, &teacher(), "C1", "S2", day(1), AttendanceStatus::Present)
            .unwrap_err();
        assert!(err.to_string().contains("not enrolled"));

        assert!(mark_attendance(&mut store, &admin(), "C1", "S1", day(1), AttendanceStatus::Present).is_ok());
    }

    #[test]
    fn test_mark_class_checks_everyone_first() {
        let mut store = campus();
        let marks = vec![
            ("S1".to_string(), AttendanceStatus::Present),
            ("S2".to_string(), AttendanceStatus::Absent),
        ];
        assert!(mark_class(&mut store, &teacher(), "C1", day(4), &marks).is_err());
        assert!(course_attendance(&store, "C1").unwrap().is_empty());

        enroll_student(&mut store, &teacher(), "C1", "S2").unwrap();
        assert_eq!(mark_class(&mut store, &teacher(), "C1", day(4), &marks).unwrap(), 2);
        assert_eq!(course_attendance(&store, "C1").unwrap().len(), 2);
    }

    #[test]
    fn test_summary_and_report() {
        let mut store = campus();
        enroll_student(&mut store, &teacher(), "C1", "S2").unwrap();
        for (d, status) in [
            (1, AttendanceStatus::Present),
            (2, AttendanceStatus::Present),
            (3, AttendanceStatus::Absent),
            (4, AttendanceStatus::Late),
        ] {
            mark_attendance(&mut store, &teacher(), "C1", "S1", day(d), status).unwrap();
        }

        let summary = attendance_summary(&store, "S1", Some("C1")).unwrap();
        assert_eq!(summary.present, 2);
        assert_eq!(summary.total(), 4);
        assert!((summary.rate() - 50.0).abs() < f64::EPSILON);

        let report = course_report(&store, "C1").unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report["S1"].absent, 1);
        assert_eq!(report["S2"].total(), 0);

        assert_eq!(attendance_summary(&store, "S1", None).unwrap(), summary);
    }
}
