//! Department management.

use tracing::info;

use super::{non_blank, referenced_user};
use crate::error::{Error, Result};
use crate::model::{Course, Department, Role, Subject, User};
use crate::session::Session;
use crate::store::RecordStore;

/// Departments created on first run: (id, name).
const DEFAULT_DEPARTMENTS: &[(&str, &str)] = &[
    ("CS", "Computer Science"),
    ("MATH", "Mathematics"),
    ("PHY", "Physics"),
];

/// Fields of a new department.
#[derive(Debug, Clone, Default)]
pub struct NewDepartment {
    /// Short code, used as the id.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Head of department.
    pub head_id: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Department changes; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct DepartmentUpdate {
    /// New name.
    pub name: Option<String>,
    /// New head; blank clears it.
    pub head_id: Option<String>,
    /// New description.
    pub description: Option<String>,
}

fn head(store: &RecordStore, head_id: Option<String>) -> Result<Option<String>> {
    match non_blank(head_id) {
        Some(id) => Ok(Some(referenced_user(store, &id, &[Role::Teacher], "head of department")?.id)),
        None => Ok(None),
    }
}

/// Create the default departments if there are none.
///
/// Returns the number of departments created.
///
/// # Errors
///
/// Returns an error if the departments collection cannot be read or written.
pub fn seed_default_departments(store: &mut RecordStore) -> Result<usize> {
    if store.count::<Department>()? > 0 {
        return Ok(0);
    }

    for (id, name) in DEFAULT_DEPARTMENTS {
        let mut department = Department::new(*id, *name);
        department.description = format!("Department of {name}");
        store.insert(department)?;
    }

    info!("Seeded {} default departments", DEFAULT_DEPARTMENTS.len());
    Ok(DEFAULT_DEPARTMENTS.len())
}

/// Add a department. Admin only.
///
/// # Errors
///
/// Returns a validation error for a non-admin session, a blank name or a
/// head who is not a teacher, and a duplicate error if the code is taken.
pub fn add_department(store: &mut RecordStore, session: &Session, new: NewDepartment) -> Result<Department> {
    session.require(&[Role::Admin], "add departments")?;

    let mut department = Department::new(new.id.trim(), new.name.trim());
    department.head_id = head(store, new.head_id)?;
    department.description = non_blank(new.description).unwrap_or_default();

    store.insert(department.clone())?;
    info!("Added department {} ({})", department.id, department.name);
    Ok(department)
}

/// Edit a department. Admin only.
///
/// # Errors
///
/// Returns not-found for an unknown department and a validation error for a
/// non-admin session or a head who is not a teacher.
pub fn update_department(
    store: &mut RecordStore,
    session: &Session,
    department_id: &str,
    update: DepartmentUpdate,
) -> Result<Department> {
    session.require(&[Role::Admin], "edit departments")?;
    let mut department = store.get::<Department>(department_id)?;

    if let Some(name) = non_blank(update.name) {
        department.name = name;
    }
    if update.head_id.is_some() {
        department.head_id = head(store, update.head_id)?;
    }
    if let Some(description) = update.description {
        department.description = description.trim().to_string();
    }

    store.upsert(department.clone())?;
    Ok(department)
}

/// Delete a department that nothing refers to. Admin only.
///
/// # Errors
///
/// Returns not-found for an unknown department, and a validation error for a
/// non-admin session or a department still used by courses, users or
/// subjects.
pub fn delete_department(store: &mut RecordStore, session: &Session, department_id: &str) -> Result<Department> {
    session.require(&[Role::Admin], "delete departments")?;
    store.get::<Department>(department_id)?;

    let in_department = |d: &Option<String>| d.as_deref() == Some(department_id);
    let courses = store.list(|c: &Course| in_department(&c.department))?.len();
    let users = store.list(|u: &User| in_department(&u.department))?.len();
    let subjects = store.list(|s: &Subject| in_department(&s.department))?.len();
    if courses + users + subjects > 0 {
        return Err(Error::validation(format!(
            "department {department_id} is in use by {courses} courses, {users} users and {subjects} subjects"
        )));
    }

    let department = store.delete::<Department>(department_id)?;
    info!("Deleted department {}", department_id);
    Ok(department)
}

/// Every department, by code.
///
/// # Errors
///
/// Returns an error if the departments collection cannot be read.
pub fn all_departments(store: &RecordStore) -> Result<Vec<Department>> {
    store.all()
}
