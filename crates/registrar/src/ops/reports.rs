//! Grade and enrollment analytics.
//!
//! Percentages are points over maximum points, times 100. Ungraded
//! submissions count towards completion but not towards a percentage.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::model::{Assignment, Course, Department, Exam, ExamResult, Role, Submission, User};
use crate::store::RecordStore;

/// Number of 10% bands in a grade distribution.
pub const BUCKETS: usize = 10;

#[allow(clippy::cast_precision_loss)]
fn percentage(points: u64, max: u64) -> Option<f64> {
    (max > 0).then(|| points as f64 / max as f64 * 100.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bucket(percentage: f64) -> usize {
    ((percentage / 10.0) as usize).min(BUCKETS - 1)
}

/// Points earned against points available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    /// Submissions or results counted.
    pub submitted: usize,
    /// How many of them carry a grade.
    pub graded: usize,
    /// Points awarded over graded work.
    pub points: u64,
    /// Points available over graded work.
    pub max_points: u64,
}

impl Score {
    fn add(&mut self, grade: Option<u32>, max_points: u32) {
        self.submitted += 1;
        if let Some(grade) = grade {
            self.graded += 1;
            self.points += u64::from(grade);
            self.max_points += u64::from(max_points);
        }
    }

    fn merged(self, other: Self) -> Self {
        Self {
            submitted: self.submitted + other.submitted,
            graded: self.graded + other.graded,
            points: self.points + other.points,
            max_points: self.max_points + other.max_points,
        }
    }

    /// Grade percentage, `None` with nothing graded.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        percentage(self.points, self.max_points)
    }

    /// Share of counted work that is graded, `None` with nothing counted.
    #[must_use]
    pub fn completion_rate(&self) -> Option<f64> {
        percentage(self.graded as u64, self.submitted as u64)
    }
}

/// Summary statistics over a set of grade percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeStats {
    /// Number of grades.
    pub count: usize,
    /// Mean percentage.
    pub average: f64,
    /// Median percentage.
    pub median: f64,
    /// Lowest percentage.
    pub minimum: f64,
    /// Highest percentage.
    pub maximum: f64,
}

impl GradeStats {
    #[allow(clippy::cast_precision_loss)]
    fn from_percentages(mut values: Vec<f64>) -> Option<Self> {
        values.sort_by(f64::total_cmp);
        let (&minimum, &maximum) = (values.first()?, values.last()?);
        let count = values.len();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
        Some(Self {
            count,
            average: values.iter().sum::<f64>() / count as f64,
            median,
            minimum,
            maximum,
        })
    }
}

/// Graded submissions bucketed by percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeDistribution {
    /// Course covered, or `None` for every course.
    pub course_id: Option<String>,
    /// Grades per 10% band, lowest first; the last band includes 100%.
    pub buckets: [usize; BUCKETS],
    /// Statistics, `None` if nothing is graded.
    pub stats: Option<GradeStats>,
}

/// Per-course totals and overall grade of one student.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentPerformance {
    /// Student reported on.
    pub student_id: String,
    /// Assignment submissions.
    pub assignments: Score,
    /// Exam results.
    pub exams: Score,
    /// Assignment submissions per course.
    pub courses: BTreeMap<String, Score>,
    /// Percentage over graded assignments and exam results together.
    pub overall: Option<f64>,
}

/// Submission and grading counts of one assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentStats {
    /// Assignment id.
    pub assignment_id: String,
    /// Owning course.
    pub course_id: String,
    /// Assignment title.
    pub title: String,
    /// Submissions received.
    pub submissions: usize,
    /// Submissions graded.
    pub graded: usize,
    /// Mean grade percentage, `None` if nothing is graded.
    pub average: Option<f64>,
}

/// Size of one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentStats {
    /// Department code.
    pub department_id: String,
    /// Department name.
    pub name: String,
    /// Head of department.
    pub head_id: Option<String>,
    /// Courses owned.
    pub courses: usize,
    /// Teachers in the department.
    pub teachers: usize,
    /// Students in the department.
    pub students: usize,
}

fn assignments_by_id(store: &RecordStore, course_id: Option<&str>) -> Result<BTreeMap<String, Assignment>> {
    if let Some(course_id) = course_id {
        store.get::<Course>(course_id)?;
    }
    Ok(store
        .list(|a: &Assignment| course_id.map_or(true, |c| a.course_id == c))?
        .into_iter()
        .map(|a| (a.id.clone(), a))
        .collect())
}

/// Distribution of graded submissions, in one course or across all.
///
/// # Errors
///
/// Returns not-found for an unknown course.
pub fn grade_distribution(store: &RecordStore, course_id: Option<&str>) -> Result<GradeDistribution> {
    let assignments = assignments_by_id(store, course_id)?;
    let percentages: Vec<f64> = store
        .list(|s: &Submission| assignments.contains_key(&s.assignment_id))?
        .iter()
        .filter_map(|s| {
            let assignment = assignments.get(&s.assignment_id)?;
            percentage(u64::from(s.grade?), u64::from(assignment.max_points))
        })
        .collect();

    let mut buckets = [0; BUCKETS];
    for value in &percentages {
        buckets[bucket(*value)] += 1;
    }

    Ok(GradeDistribution {
        course_id: course_id.map(str::to_string),
        buckets,
        stats: GradeStats::from_percentages(percentages),
    })
}

/// Assignment and exam performance of a student.
///
/// # Errors
///
/// Returns not-found for an unknown student.
pub fn student_performance(store: &RecordStore, student_id: &str) -> Result<StudentPerformance> {
    store.get::<User>(student_id)?;
    let assignments = assignments_by_id(store, None)?;
    let exams: BTreeMap<String, Exam> = store.all::<Exam>()?.into_iter().map(|e| (e.id.clone(), e)).collect();

    let mut performance = StudentPerformance {
        student_id: student_id.to_string(),
        ..StudentPerformance::default()
    };
    for submission in store.list(|s: &Submission| s.student_id == student_id)? {
        let Some(assignment) = assignments.get(&submission.assignment_id) else {
            continue;
        };
        performance.assignments.add(submission.grade, assignment.max_points);
        performance
            .courses
            .entry(assignment.course_id.clone())
            .or_default()
            .add(submission.grade, assignment.max_points);
    }
    for result in store.list(|r: &ExamResult| r.student_id == student_id)? {
        if let Some(exam) = exams.get(&result.exam_id) {
            performance.exams.add(Some(result.marks), exam.max_marks);
        }
    }

    performance.overall = performance.assignments.merged(performance.exams).percentage();
    Ok(performance)
}

/// Submission and grading counts per assignment, in one course or across
/// all, by assignment id.
///
/// # Errors
///
/// Returns not-found for an unknown course.
pub fn assignment_statistics(store: &RecordStore, course_id: Option<&str>) -> Result<Vec<AssignmentStats>> {
    let assignments = assignments_by_id(store, course_id)?;
    let mut scores: BTreeMap<&str, Score> = BTreeMap::new();
    for submission in store.list(|s: &Submission| assignments.contains_key(&s.assignment_id))? {
        if let Some((id, assignment)) = assignments.get_key_value(&submission.assignment_id) {
            scores
                .entry(id.as_str())
                .or_default()
                .add(submission.grade, assignment.max_points);
        }
    }

    Ok(assignments
        .values()
        .map(|a| {
            let score = scores.get(a.id.as_str()).copied().unwrap_or_default();
            AssignmentStats {
                assignment_id: a.id.clone(),
                course_id: a.course_id.clone(),
                title: a.title.clone(),
                submissions: score.submitted,
                graded: score.graded,
                average: score.percentage(),
            }
        })
        .collect())
}

/// Course, teacher and student counts per department, largest student body
/// first.
///
/// # Errors
///
/// Returns an error if a collection cannot be read.
pub fn department_statistics(store: &RecordStore) -> Result<Vec<DepartmentStats>> {
    let courses = store.all::<Course>()?;
    let users = store.all::<User>()?;

    let mut stats: Vec<DepartmentStats> = store
        .all::<Department>()?
        .into_iter()
        .map(|d| {
            let ours = |department: &Option<String>| department.as_deref() == Some(d.id.as_str());
            let members = |role: Role| users.iter().filter(|u| u.role == role && ours(&u.department)).count();
            DepartmentStats {
                courses: courses.iter().filter(|c| ours(&c.department)).count(),
                teachers: members(Role::Teacher),
                students: members(Role::Student),
                department_id: d.id,
                name: d.name,
                head_id: d.head_id,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.students.cmp(&a.students).then_with(|| a.department_id.cmp(&b.department_id)));
    Ok(stats)
}
