//! Password hashing and sign-in.
//!
//! Passwords are stored as `salt$hash`, where the hash is BLAKE3 in key
//! derivation mode over the salt and password.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{Role, User};
use crate::session::Session;
use crate::store::RecordStore;

/// Key derivation context for password hashes.
const PASSWORD_CONTEXT: &str = "registrar 2024-01-01 password hash v1";

/// Characters of salt stored with each hash.
const SALT_LEN: usize = 16;

fn fresh_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}

fn derive(salt: &str, password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(PASSWORD_CONTEXT);
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize()
}

/// Hash a password with a fresh salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt = fresh_salt();
    let hash = derive(&salt, password);
    format!("{salt}${}", hash.to_hex())
}

/// Check a password against a stored `salt$hash`.
///
/// Malformed stored values never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(expected) = blake3::Hash::from_hex(hex) else {
        return false;
    };
    // blake3::Hash equality is constant-time
    derive(salt, password) == expected
}

/// Sign in with email and password.
///
/// # Errors
///
/// Returns [`Error::InvalidCredentials`] if no user has the email or the
/// password does not match.
pub fn authenticate(store: &RecordStore, email: &str, password: &str) -> Result<Session> {
    let email = email.trim();
    let user = store
        .list(|u: &User| u.email.eq_ignore_ascii_case(email))?
        .into_iter()
        .next();

    match user {
        Some(user) if verify_password(password, &user.password_hash) => {
            debug!("Authenticated {} as {}", user.id, user.role);
            Ok(Session::for_user(&user))
        }
        _ => {
            warn!("Failed sign-in for {}", email);
            Err(Error::InvalidCredentials)
        }
    }
}

/// Demo accounts created on first run: (id, role, email, password, name).
const DEFAULT_ACCOUNTS: &[(&str, Role, &str, &str, &str)] = &[
    ("A1", Role::Admin, "admin@college.edu", "admin123", "Admin User"),
    ("T1", Role::Teacher, "teacher@college.edu", "teacher123", "Demo Teacher"),
    ("S1", Role::Student, "student@college.edu", "student123", "Demo Student"),
];

/// Create the demo admin, teacher and student accounts if there are no users.
///
/// Returns the number of accounts created.
///
/// # Errors
///
/// Returns an error if the users collection cannot be read or written.
pub fn seed_default_accounts(store: &mut RecordStore) -> Result<usize> {
    if store.count::<User>()? > 0 {
        return Ok(0);
    }

    for (id, role, email, password, name) in DEFAULT_ACCOUNTS {
        let mut user = User::new(*id, *role, *email, *name);
        user.password_hash = hash_password(password);
        if *role != Role::Admin {
            user.department = Some("CS".to_string());
        }
        if *role == Role::Student {
            user.student_number = Some("S12345".to_string());
            user.year = Some(2);
        }
        store.insert(user)?;
    }

    info!("Seeded {} default accounts", DEFAULT_ACCOUNTS.len());
    Ok(DEFAULT_ACCOUNTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("correct horse");
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn test_salts_are_random_alphanumerics() {
        let salts: std::collections::HashSet<String> = (0..64).map(|_| fresh_salt()).collect();
        assert_eq!(salts.len(), 64);
        for salt in &salts {
            assert_eq!(salt.len(), SALT_LEN);
            assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
        }

        let stored = hash_password("pw");
        let (salt, _) = stored.split_once('$').unwrap();
        assert_eq!(salt.len(), SALT_LEN);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "no-separator"));
        assert!(!verify_password("x", "salt$not-hex"));
    }

    #[test]
    fn test_seed_then_authenticate() {
        let mut store = RecordStore::open_in_memory().unwrap();
        assert_eq!(seed_default_accounts(&mut store).unwrap(), 3);
        assert_eq!(seed_default_accounts(&mut store).unwrap(), 0);

        let session = authenticate(&store, "Teacher@College.edu", "teacher123").unwrap();
        assert_eq!(session.role, Role::Teacher);
        assert_eq!(session.user_id, "T1");

        let student = store.get::<User>("S1").unwrap();
        assert_eq!(student.student_number.as_deref(), Some("S12345"));
    }

    #[test]
    fn test_authenticate_rejects_bad_password() {
        let mut store = RecordStore::open_in_memory().unwrap();
        seed_default_accounts(&mut store).unwrap();

        let err = authenticate(&store, "admin@college.edu", "guess").unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
        let err = authenticate(&store, "nobody@college.edu", "admin123").unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }
}
