//! Record operations behind each feature of the college system.
//!
//! Every function takes the store and, where the action is restricted, the
//! acting [`Session`]. Role checks happen here, at the boundary, before any
//! record is touched.

pub mod announcements;
pub mod attendance;
pub mod certificates;
pub mod courses;
pub mod coursework;
pub mod departments;
pub mod exams;
pub mod projects;
pub mod reports;
pub mod users;

use crate::error::{Error, Result};
use crate::model::{Course, Department, Role, User};
use crate::session::Session;
use crate::store::RecordStore;

/// Load a referenced user and check their role.
///
/// A missing user or a user with another role is a validation error, since
/// the caller supplied a bad reference.
pub(crate) fn referenced_user(
    store: &RecordStore,
    user_id: &str,
    allowed: &[Role],
    what: &str,
) -> Result<User> {
    let user = store
        .find::<User>(user_id)?
        .ok_or_else(|| Error::validation(format!("{what} '{user_id}' does not exist")))?;

    if allowed.contains(&user.role) {
        Ok(user)
    } else {
        Err(Error::validation(format!(
            "invalid role: {what} '{user_id}' is a {}",
            user.role
        )))
    }
}

/// Load a course the session is allowed to manage: admins manage every
/// course, teachers only their own.
pub(crate) fn managed_course(
    store: &RecordStore,
    session: &Session,
    course_id: &str,
    action: &str,
) -> Result<Course> {
    session.require(&[Role::Admin, Role::Teacher], action)?;
    let course = store.get::<Course>(course_id)?;
    if session.is_admin() || course.is_taught_by(&session.user_id) {
        Ok(course)
    } else {
        Err(Error::validation(format!(
            "invalid role: {} does not teach {course_id} and may not {action}",
            session.user_id
        )))
    }
}

/// Trim an optional department id and check that it exists. Blank means no
/// department.
pub(crate) fn department_ref(store: &RecordStore, department: Option<String>) -> Result<Option<String>> {
    let Some(id) = non_blank(department) else {
        return Ok(None);
    };
    if store.contains::<Department>(&id)? {
        Ok(Some(id))
    } else {
        Err(Error::validation(format!("department '{id}' does not exist")))
    }
}

/// Trim an optional string, mapping blank to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_referenced_user_checks_role() {
        let store = campus();
        assert!(referenced_user(&store, "S1", &[Role::Student], "student").is_ok());

        let err = referenced_user(&store, "T1", &[Role::Student], "student").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("is a teacher"));

        let err = referenced_user(&store, "S9", &[Role::Student], "student").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_managed_course() {
        let store = campus();
        assert!(managed_course(&store, &teacher(), "C1", "edit").is_ok());
        assert!(managed_course(&store, &admin(), "C1", "edit").is_ok());
        assert!(managed_course(&store, &other_teacher(), "C1", "edit")
            .unwrap_err()
            .is_validation());
        assert!(managed_course(&store, &student(), "C1", "edit")
            .unwrap_err()
            .is_validation());
        assert!(managed_course(&store, &admin(), "C9", "edit")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_department_ref() {
        let store = campus();
        assert_eq!(department_ref(&store, Some(" CS ".to_string())).unwrap(), Some("CS".to_string()));
        assert_eq!(department_ref(&store, Some(String::new())).unwrap(), None);
        assert_eq!(department_ref(&store, None).unwrap(), None);
        assert!(department_ref(&store, Some("History".to_string()))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}
