//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{key_part, require_field, Role};
use crate::error::Result;
use crate::store::{Collection, Record};

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique id (e.g. a staff or student number).
    pub id: String,
    /// Account role.
    pub role: Role,
    /// Login email, unique across users.
    pub email: String,
    /// Salted password hash, see [`crate::auth`].
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Department the user belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// College-issued student number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    /// Year of study.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user without a password.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        role: Role,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            email: email.into(),
            password_hash: String::new(),
            name: name.into(),
            department: None,
            student_number: None,
            year: None,
            created_at: Utc::now(),
        }
    }

    /// Set the department.
    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Whether the account is a student.
    #[must_use]
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    /// Public view of the account without the password hash.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            role: self.role,
            email: self.email.clone(),
            name: self.name.clone(),
            department: self.department.clone(),
            student_number: self.student_number.clone(),
            year: self.year,
            created_at: self.created_at,
        }
    }
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        key_part(&self.id, "user id")?;
        require_field(&self.email, "email")
    }
}

/// A user as shown to other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// Account id.
    pub id: String,
    /// Account role.
    pub role: Role,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Student number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    /// Year of study.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}
