//! Announcements and who they are addressed to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_field, Role, User};
use crate::error::Result;
use crate::store::{Collection, Record};

/// Recipients of an announcement.
///
/// An audience with no targets addresses everyone. Otherwise a user is
/// addressed when their role, department or id is listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Audience {
    /// Roles addressed.
    pub roles: Vec<Role>,
    /// Departments addressed.
    pub departments: Vec<String>,
    /// Individual users addressed.
    pub user_ids: Vec<String>,
}

impl Audience {
    /// Audience addressing every user.
    #[must_use]
    pub fn everyone() -> Self {
        Self::default()
    }

    /// Audience addressing the given roles.
    #[must_use]
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether no targets are set.
    #[must_use]
    pub fn is_everyone(&self) -> bool {
        self.roles.is_empty() && self.departments.is_empty() && self.user_ids.is_empty()
    }

    /// Whether `user` is addressed.
    #[must_use]
    pub fn includes(&self, user: &User) -> bool {
        if self.is_everyone() {
            return true;
        }
        let by_department = user
            .department
            .as_ref()
            .is_some_and(|d| self.departments.contains(d));

        self.roles.contains(&user.role) || by_department || self.user_ids.contains(&user.id)
    }
}

/// A posted announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Announcement id.
    pub id: String,
    /// Posting user.
    pub author_id: String,
    /// Headline.
    pub title: String,
    /// Message text.
    pub body: String,
    /// Recipients.
    #[serde(default)]
    pub audience: Audience,
    /// When it was posted.
    pub created_at: DateTime<Utc>,
}

impl Record for Announcement {
    const COLLECTION: Collection = Collection::Announcements;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        require_field(&self.title, "announcement title")?;
        require_field(&self.body, "announcement body")
    }
}
