//! # Book Review Authentication
//!
//! Password identities and opaque bearer-token sessions.
//!
//! ## Flow
//!
//! ```text
//! register / login → argon2id check → random token → SHA-256 digest stored
//! request → Authorization: Bearer <token> → digest lookup → UserId
//! ```
//!
//! Tokens are 256-bit random values. Only their digests reach the
//! [`SessionStore`](book_review_core::SessionStore), with an expiry taken
//! from [`AuthConfig`].

pub mod config;
pub mod password;
pub mod service;
pub mod token;

// Re-export main types for convenience
pub use config::AuthConfig;
pub use service::{AuthenticatedUser, IdentityService, LoginRequest, RegisterRequest};
