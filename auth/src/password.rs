//! Argon2id password hashing.
//!
//! Argon2 costs tens of milliseconds per call; both operations run on
//! tokio's blocking pool instead of a runtime worker.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use book_review_core::{CatalogueError, Result};

/// Hash a password into a PHC string with a fresh random salt.
///
/// # Errors
///
/// Returns [`CatalogueError::Internal`] if hashing fails or the blocking
/// task is cancelled.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CatalogueError::Internal(format!("Password hashing failed: {e}")))
    })
    .await
    .map_err(|e| CatalogueError::Internal(format!("Password hashing task failed: {e}")))?
}

/// Check a password against a stored PHC string.
///
/// A hash that cannot be parsed never matches.
///
/// # Errors
///
/// Returns [`CatalogueError::Internal`] if the blocking task is cancelled.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&stored_hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    })
    .await
    .map_err(|e| CatalogueError::Internal(format!("Password verification task failed: {e}")))
}
