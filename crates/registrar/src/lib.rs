//! `registrar` - College records kept as flat JSON files
//!
//! This library provides a typed record store for users, courses,
//! attendance, coursework, projects, certificates, announcements and exams,
//! together with the role-checked operations the `registrar` binary exposes.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod ops;
pub mod session;
pub mod store;

pub use auth::{authenticate, seed_default_accounts};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::Role;
pub use session::Session;
pub use store::{Record, RecordStore, StoreStats};
