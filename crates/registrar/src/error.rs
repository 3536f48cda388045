//! Error types for registrar.
//!
//! Every operation in the crate returns [`Result`]. The first three variants
//! are the user-facing outcomes a presentation layer shows as messages; the
//! rest describe infrastructure failures.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for registrar operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// No record with the given id exists in the collection.
    #[error("{collection} record '{id}' not found")]
    NotFound {
        /// Name of the collection that was searched.
        collection: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A record or request failed validation (missing field, bad reference,
    /// disallowed role).
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// A uniqueness constraint would be violated.
    #[error("{collection} record '{id}' already exists")]
    Duplicate {
        /// Name of the collection holding the conflicting record.
        collection: &'static str,
        /// The conflicting id or key.
        id: String,
    },

    /// Email/password pair did not match a stored account.
    #[error("invalid email or password")]
    InvalidCredentials,

    // === Storage Errors ===
    /// Failed to read a collection file.
    #[error("failed to read collection file {path}: {source}")]
    CollectionRead {
        /// Path of the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a collection file.
    #[error("failed to write collection file {path}: {source}")]
    CollectionWrite {
        /// Path of the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The store was written by a newer, unsupported schema version.
    #[error("unsupported store schema version {found} (this build supports up to {supported})")]
    SchemaVersion {
        /// Version recorded in the store.
        found: u32,
        /// Highest version this build understands.
        supported: u32,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for registrar operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for a collection.
    #[must_use]
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a duplicate-record error.
    #[must_use]
    pub fn duplicate(collection: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            collection,
            id: id.into(),
        }
    }

    /// Check if this error is a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is a uniqueness violation.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}
