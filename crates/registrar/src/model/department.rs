//! Academic departments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::require_field;
use crate::error::Result;
use crate::store::{Collection, Record};

/// A department that owns courses, subjects and staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Short code, e.g. `CS`.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Head of department, a teacher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_id: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// When the department was added.
    pub created_at: DateTime<Utc>,
}

impl Department {
    /// Create a department without a head.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            head_id: None,
            description: String::new(),
            created_at: Utc::now(),
        }
    }
}

impl Record for Department {
    const COLLECTION: Collection = Collection::Departments;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        require_field(&self.name, "department name")
    }
}
