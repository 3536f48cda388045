//! Caller context passed into record operations.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Role, User};

/// The user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Acting user's id.
    pub user_id: String,
    /// Acting user's role.
    pub role: Role,
}

impl Session {
    /// Session acting as `user`.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            role: user.role,
        }
    }

    /// Session for an arbitrary id and role.
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Whether the session is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail unless the session's role is in `allowed`.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the role and `action`.
    pub fn require(&self, allowed: &[Role], action: &str) -> Result<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "invalid role: {} may not {action}",
                self.role
            )))
        }
    }

    /// Fail unless the session is an admin or is the user `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming `action`.
    pub fn require_admin_or(&self, owner_id: &str, action: &str) -> Result<()> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "invalid role: {} {} may not {action}",
                self.role, self.user_id
            )))
        }
    }
}
