//! Account management.

use tracing::info;

use super::{department_ref, non_blank};
use crate::auth::hash_password;
use crate::config::AccountsConfig;
use crate::error::{Error, Result};
use crate::model::{Course, Role, User, UserProfile};
use crate::session::Session;
use crate::store::{Collection, RecordStore};

/// Fields of a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Account id.
    pub id: String,
    /// Role.
    pub role: Role,
    /// Login email.
    pub email: String,
    /// Plain-text password, hashed before storage.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Department.
    pub department: Option<String>,
    /// Student number.
    pub student_number: Option<String>,
    /// Year of study.
    pub year: Option<u8>,
}

/// Profile changes; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New email.
    pub email: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New department.
    pub department: Option<String>,
    /// New student number.
    pub student_number: Option<String>,
    /// New year of study.
    pub year: Option<u8>,
}

fn check_email(store: &RecordStore, policy: &AccountsConfig, email: &str, owner: Option<&str>) -> Result<()> {
    if !policy.email_regex()?.is_match(email) {
        return Err(Error::validation(format!("{email:?} is not a valid email")));
    }
    let taken = store
        .list(|u: &User| u.email.eq_ignore_ascii_case(email) && Some(u.id.as_str()) != owner)?;
    if taken.is_empty() {
        Ok(())
    } else {
        Err(Error::duplicate(Collection::Users.name(), email))
    }
}

fn check_password(policy: &AccountsConfig, password: &str) -> Result<()> {
    if password.chars().count() < policy.min_password_length {
        return Err(Error::validation(format!(
            "password must be at least {} characters",
            policy.min_password_length
        )));
    }
    Ok(())
}

/// Create an account. Admin only.
///
/// # Errors
///
/// Returns a validation error for a non-admin session, a malformed email, a
/// short password or an unknown department, and a duplicate error if the id
/// or email is taken.
pub fn create_user(
    store: &mut RecordStore,
    session: &Session,
    policy: &AccountsConfig,
    new: NewUser,
) -> Result<User> {
    session.require(&[Role::Admin], "create users")?;
    let email = new.email.trim().to_string();
    check_email(store, policy, &email, None)?;
    check_password(policy, &new.password)?;

    let mut user = User::new(new.id.trim(), new.role, email, new.name.trim());
    if user.name.is_empty() {
        return Err(Error::validation("name is required"));
    }
    user.password_hash = hash_password(&new.password);
    user.department = department_ref(store, new.department)?;
    user.student_number = non_blank(new.student_number);
    user.year = new.year;

    store.insert(user.clone())?;
    info!("Created {} account {}", user.role, user.id);
    Ok(user)
}

/// Update a profile. Users may edit themselves; admins may edit anyone.
///
/// # Errors
///
/// Returns a validation error if the session may not edit the user or the
/// new email is malformed, a duplicate error if the email is taken, and
/// not-found if the user does not exist.
pub fn update_profile(
    store: &mut RecordStore,
    session: &Session,
    policy: &AccountsConfig,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<User> {
    session.require_admin_or(user_id, "edit this profile")?;
    let mut user = store.get::<User>(user_id)?;

    if let Some(email) = update.email {
        let email = email.trim().to_string();
        check_email(store, policy, &email, Some(user_id))?;
        user.email = email;
    }
    if let Some(name) = non_blank(update.name) {
        user.name = name;
    }
    if update.department.is_some() {
        user.department = department_ref(store, update.department)?;
    }
    if update.student_number.is_some() {
        user.student_number = non_blank(update.student_number);
    }
    if update.year.is_some() {
        user.year = update.year;
    }

    store.upsert(user.clone())?;
    Ok(user)
}

/// Replace a password. Users may change their own; admins may reset anyone's.
///
/// # Errors
///
/// Returns a validation error if the session may not change it or it is too
/// short, and not-found if the user does not exist.
pub fn change_password(
    store: &mut RecordStore,
    session: &Session,
    policy: &AccountsConfig,
    user_id: &str,
    password: &str,
) -> Result<()> {
    session.require_admin_or(user_id, "change this password")?;
    check_password(policy, password)?;

    let mut user = store.get::<User>(user_id)?;
    user.password_hash = hash_password(password);
    store.upsert(user)?;
    info!("Password changed for {}", user_id);
    Ok(())
}

/// Delete an account and drop it from every roster. Admin only; admins
/// cannot delete themselves.
///
/// # Errors
///
/// Returns a validation error for a non-admin session or self-deletion, and
/// not-found if the user does not exist.
pub fn delete_user(store: &mut RecordStore, session: &Session, user_id: &str) -> Result<User> {
    session.require(&[Role::Admin], "delete users")?;
    if session.user_id == user_id {
        return Err(Error::validation("admins cannot delete their own account"));
    }

    let user = store.delete::<User>(user_id)?;
    if user.is_student() {
        for mut course in store.list(|c: &Course| c.is_enrolled(user_id))? {
            course.roster.remove(user_id);
            store.upsert(course)?;
        }
    }

    info!("Deleted {} account {}", user.role, user.id);
    Ok(user)
}

/// Public profile of a user.
///
/// # Errors
///
/// Returns not-found if the user does not exist.
pub fn get_profile(store: &RecordStore, user_id: &str) -> Result<UserProfile> {
    Ok(store.get::<User>(user_id)?.profile())
}

/// Public profiles, optionally restricted to one role.
///
/// # Errors
///
/// Returns an error if the users collection cannot be read.
pub fn list_users(store: &RecordStore, role: Option<Role>) -> Result<Vec<UserProfile>> {
    Ok(store
        .list(|u: &User| role.map_or(true, |r| u.role == r))?
        .iter()
        .map(User::profile)
        .collect())
}
