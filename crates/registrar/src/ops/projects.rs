//! Student projects and their lifecycle.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::{non_blank, referenced_user};
use crate::error::{Error, Result};
use crate::model::{Course, Project, ProjectStatus, Role};
use crate::session::Session;
use crate::store::RecordStore;

/// Fields of a new project.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    /// Owning student; defaults to the session's user.
    pub owner_id: Option<String>,
    /// Short title.
    pub title: String,
    /// What the project is about.
    pub description: Option<String>,
    /// Course the project is done for.
    pub course_id: Option<String>,
    /// Other students in the group.
    pub group_members: Vec<String>,
    /// Deadline.
    pub due_date: Option<NaiveDate>,
}

/// Propose a project. Students propose their own; staff may propose on a
/// student's behalf.
///
/// # Errors
///
/// Returns a validation error if the owner or a group member is not a
/// student, a student proposes for someone else, or the course is unknown.
pub fn create_project(store: &mut RecordStore, session: &Session, new: NewProject) -> Result<Project> {
    let owner_id = new.owner_id.unwrap_or_else(|| session.user_id.clone());
    if session.role == Role::Student && owner_id != session.user_id {
        return Err(Error::validation("invalid role: students may only create their own projects"));
    }
    referenced_user(store, &owner_id, &[Role::Student], "project owner")?;

    let mut group_members = BTreeSet::new();
    for member in new.group_members {
        referenced_user(store, &member, &[Role::Student], "group member")?;
        if member != owner_id {
            group_members.insert(member);
        }
    }

    let course_id = non_blank(new.course_id);
    if let Some(course_id) = &course_id {
        if !store.contains::<Course>(course_id)? {
            return Err(Error::validation(format!("course '{course_id}' does not exist")));
        }
    }

    let now = Utc::now();
    let project = Project {
        id: store.allocate_id::<Project>("P")?,
        owner_id,
        title: new.title.trim().to_string(),
        description: non_blank(new.description).unwrap_or_default(),
        status: ProjectStatus::Proposed,
        course_id,
        group_members,
        due_date: new.due_date,
        grade: None,
        feedback: None,
        created_at: now,
        updated_at: now,
    };

    store.insert(project.clone())?;
    info!("Created project {} for {}", project.id, project.owner_id);
    Ok(project)
}

/// Move a project to the next stage.
///
/// Students in the project start and submit it; staff complete it or send
/// a submitted project back.
///
/// # Errors
///
/// Returns not-found for an unknown project and a validation error for an
/// illegal transition or a session that may not make it.
pub fn advance_project(
    store: &mut RecordStore,
    session: &Session,
    project_id: &str,
    next: ProjectStatus,
) -> Result<Project> {
    let mut project = store.get::<Project>(project_id)?;
    if !project.status.can_transition(next) {
        return Err(Error::validation(format!(
            "project {project_id} cannot move from {} to {next}",
            project.status
        )));
    }

    if project.status == ProjectStatus::Submitted {
        session.require(&[Role::Admin, Role::Teacher], "review projects")?;
    } else if session.role == Role::Student && !project.involves(&session.user_id) {
        return Err(Error::validation(format!(
            "invalid role: {} is not part of project {project_id}",
            session.user_id
        )));
    }

    info!("Project {}: {} -> {}", project_id, project.status, next);
    project.status = next;
    project.updated_at = Utc::now();
    store.upsert(project.clone())?;
    Ok(project)
}

/// Grade a submitted project, completing it.
///
/// # Errors
///
/// Returns not-found for an unknown project, and a validation error for a
/// student session or a project that has not been submitted.
pub fn grade_project(
    store: &mut RecordStore,
    session: &Session,
    project_id: &str,
    points: u32,
    feedback: Option<String>,
) -> Result<Project> {
    session.require(&[Role::Admin, Role::Teacher], "grade projects")?;
    let mut project = store.get::<Project>(project_id)?;
    if !matches!(project.status, ProjectStatus::Submitted | ProjectStatus::Completed) {
        return Err(Error::validation(format!(
            "project {project_id} is {} and cannot be graded",
            project.status
        )));
    }

    project.grade = Some(points);
    project.feedback = non_blank(feedback);
    project.status = ProjectStatus::Completed;
    project.updated_at = Utc::now();
    store.upsert(project.clone())?;
    Ok(project)
}

/// Projects a user owns or is a group member of.
///
/// # Errors
///
/// Returns an error if the projects collection cannot be read.
pub fn projects_for(store: &RecordStore, user_id: &str) -> Result<Vec<Project>> {
    store.list(|p: &Project| p.involves(user_id))
}

/// Projects done for a course.
///
/// # Errors
///
/// Returns an error if the projects collection cannot be read.
pub fn course_projects(store: &RecordStore, course_id: &str) -> Result<Vec<Project>> {
    store.list(|p: &Project| p.course_id.as_deref() == Some(course_id))
}

/// Projects at a lifecycle stage.
///
/// # Errors
///
/// Returns an error if the projects collection cannot be read.
pub fn projects_with_status(store: &RecordStore, status: ProjectStatus) -> Result<Vec<Project>> {
    store.list(|p: &Project| p.status == status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fixtures::*;

    fn compiler() -> NewProject {
        NewProject {
            title: "Toy compiler".to_string(),
            course_id: Some("C1".to_string()),
            group_members: vec!["S2".to_string()],
            ..NewProject::default()
        }
    }

    #[test]
    fn test_student_creates_own_project() {
        let mut store = campus();
        let project = create_project(&mut store, &student(), compiler()).unwrap();
        assert_eq!(project.id, "P1");
        assert_eq!(project.owner_id, "S1");
        assert_eq!(project.status, ProjectStatus::Proposed);
        assert!(projects_for(&store, "S2").unwrap()[0].involves("S2"));
        assert_eq!(course_projects(&store, "C1").unwrap().len(), 1);
    }

    #[test]
    fn test_creation_rules() {
        let mut store = campus();
        let mut for_other = compiler();
        for_other.owner_id = Some("S2".to_string());
        assert!(create_project(&mut store, &student(), for_other.clone()).is_err());
        assert_eq!(create_project(&mut store, &teacher(), for_other).unwrap().owner_id, "S2");

        let mut bad_member = compiler();
        bad_member.group_members = vec!["T1".to_string()];
        assert!(create_project(&mut store, &student(), bad_member).unwrap_err().is_validation());

        let mut bad_course = compiler();
        bad_course.course_id = Some("C9".to_string());
        assert!(create_project(&mut store, &student(), bad_course).unwrap_err().is_validation());

        // a teacher cannot own a project
        assert!(create_project(&mut store, &teacher(), compiler()).is_err());
    }

    #[test]
    fn test_lifecycle() {
        let mut store = campus();
        let project = create_project(&mut store, &student(), compiler()).unwrap();

        let err = advance_project(&mut store, &student(), &project.id, ProjectStatus::Completed).unwrap_err();
        assert!(err.to_string().contains("cannot move"));

        let group_member = Session::new("S2", Role::Student);
        advance_project(&mut store, &group_member, &project.id, ProjectStatus::InProgress).unwrap();
        advance_project(&mut store, &student(), &project.id, ProjectStatus::Submitted).unwrap();

        let err = advance_project(&mut store, &student(), &project.id, ProjectStatus::Completed).unwrap_err();
        assert!(err.is_validation());

        let back = advance_project(&mut store, &teacher(), &project.id, ProjectStatus::InProgress).unwrap();
        assert_eq!(back.status, ProjectStatus::InProgress);
        assert_eq!(projects_with_status(&store, ProjectStatus::InProgress).unwrap().len(), 1);
    }

    #[test]
    fn test_outsider_cannot_advance() {
        let mut store = campus();
        let mut solo = compiler();
        solo.group_members.clear();
        let project = create_project(&mut store, &student(), solo).unwrap();

        let outsider = Session::new("S2", Role::Student);
        assert!(advance_project(&mut store, &outsider, &project.id, ProjectStatus::InProgress).is_err());
    }

    #[test]
    fn test_grade_requires_submission() {
        let mut store = campus();
        let project = create_project(&mut store, &student(), compiler()).unwrap();
        assert!(grade_project(&mut store, &teacher(), &project.id, 90, None).is_err());

        advance_project(&mut store, &student(), &project.id, ProjectStatus::InProgress).unwrap();
        advance_project(&mut store, &student(), &project.id, ProjectStatus::Submitted).unwrap();
        assert!(grade_project(&mut store, &student(), &project.id, 90, None).is_err());

        let graded = grade_project(&mut store, &admin(), &project.id, 90, Some("Great".to_string())).unwrap();
        assert_eq!(graded.status, ProjectStatus::Completed);
        assert_eq!(graded.grade, Some(90));
    }
}
