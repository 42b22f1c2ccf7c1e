//! Bearer token generation and digests.
//!
//! Tokens are handed to the client once. The store only ever sees their
//! SHA-256 digest, so a leaked sessions table cannot be replayed.

use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure random token.
///
/// Returns a 256-bit random token encoded as base64url (43 characters).
#[must_use]
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let mut random_bytes = [0u8; 32];
    rng.fill_bytes(&mut random_bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Hex-encoded SHA-256 digest of a token, as stored in [`Session::token_hash`].
///
/// [`Session::token_hash`]: book_review_core::Session::token_hash
#[must_use]
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
