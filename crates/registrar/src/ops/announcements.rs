//! Announcements and who sees them.

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{Announcement, Audience, Department, Role, User};
use crate::session::Session;
use crate::store::RecordStore;

/// Post an announcement. Admins and teachers only.
///
/// # Errors
///
/// Returns a validation error for a student session, a blank title or body,
/// or an audience naming an unknown department.
pub fn post_announcement(
    store: &mut RecordStore,
    session: &Session,
    title: &str,
    body: &str,
    audience: Audience,
) -> Result<Announcement> {
    session.require(&[Role::Admin, Role::Teacher], "post announcements")?;
    for department in &audience.departments {
        if !store.contains::<Department>(department)? {
            return Err(Error::validation(format!("department '{department}' does not exist")));
        }
    }

    let announcement = Announcement {
        id: store.allocate_id::<Announcement>("N")?,
        author_id: session.user_id.clone(),
        title: title.trim().to_string(),
        body: body.trim().to_string(),
        audience,
        created_at: Utc::now(),
    };

    store.insert(announcement.clone())?;
    info!("{} posted announcement {}", session.user_id, announcement.id);
    Ok(announcement)
}

/// Delete an announcement. Its author or an admin may delete it.
///
/// # Errors
///
/// Returns not-found for an unknown id and a validation error for anyone
/// else.
pub fn delete_announcement(store: &mut RecordStore, session: &Session, id: &str) -> Result<Announcement> {
    let announcement = store.get::<Announcement>(id)?;
    session.require_admin_or(&announcement.author_id, "delete this announcement")?;
    store.delete::<Announcement>(id)
}

fn newest_first(mut announcements: Vec<Announcement>) -> Vec<Announcement> {
    announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    announcements
}

/// Announcements addressed to a user, newest first. Authors always see
/// their own.
///
/// # Errors
///
/// Returns not-found for an unknown user.
pub fn announcements_for(store: &RecordStore, user_id: &str) -> Result<Vec<Announcement>> {
    let user = store.get::<User>(user_id)?;
    let visible = store.list(|a: &Announcement| a.author_id == user.id || a.audience.includes(&user))?;
    Ok(newest_first(visible))
}

/// Every announcement, newest first.
///
/// # Errors
///
/// Returns an error if the announcements collection cannot be read.
pub fn all_announcements(store: &RecordStore) -> Result<Vec<Announcement>> {
    Ok(newest_first(store.all()?))
}
