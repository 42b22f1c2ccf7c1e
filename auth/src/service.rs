//! Registration, login and bearer-token sessions.

use crate::config::AuthConfig;
use crate::password::{hash_password, verify_password};
use crate::token::{generate_token, hash_token};
use book_review_core::environment::Clock;
use book_review_core::validation;
use book_review_core::{
    CatalogueError, Result, Session, SessionStore, User, UserId, UserRepository,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const DUPLICATE_USER: &str = "User with that email or username already exists";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Metric counting login attempts, labelled by `outcome`.
pub const LOGINS: &str = "auth_logins_total";

/// Register descriptions for the identity counters.
pub fn describe_metrics() {
    metrics::describe_counter!(LOGINS, "Total number of login attempts by outcome");
}

/// Registration input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
}

/// Login input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
}

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    /// User identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

/// Identity operations over the user and session stores.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl IdentityService {
    /// Create the service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            clock,
            config,
        }
    }

    /// Create a user and sign them in.
    ///
    /// The email is stored lowercase.
    ///
    /// # Errors
    ///
    /// - `Validation`: username, email or password malformed
    /// - `Conflict`: username or email already registered
    /// - `Internal`: store or hashing failure
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthenticatedUser> {
        let username = validation::trim(&request.username);
        let email = validation::trim(&request.email).to_lowercase();
        validation::registration(&username, &email, &request.password)?;

        if self
            .users
            .find_user_by_username_or_email(&username, &email)
            .await?
            .is_some()
        {
            return Err(CatalogueError::Conflict(DUPLICATE_USER.to_string()));
        }

        let user = User {
            id: UserId::new(),
            username,
            email,
            password_hash: hash_password(request.password).await?,
            created_at: self.clock.now(),
        };

        self.users.insert_user(&user).await.map_err(|e| {
            if e.is_unique_violation() {
                CatalogueError::Conflict(DUPLICATE_USER.to_string())
            } else {
                e.into()
            }
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        self.issue(user).await
    }

    /// Check credentials and issue a new token.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated`: unknown email or wrong password, indistinguishably
    /// - `Internal`: store or hashing failure
    pub async fn login(&self, request: LoginRequest) -> Result<AuthenticatedUser> {
        let email = validation::trim(&request.email).to_lowercase();

        let Some(user) = self.users.find_user_by_email(&email).await? else {
            counter!(LOGINS, "outcome" => "unknown_user").increment(1);
            return Err(CatalogueError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(request.password, user.password_hash.clone()).await? {
            counter!(LOGINS, "outcome" => "wrong_password").increment(1);
            tracing::info!(user_id = %user.id, "Login rejected");
            return Err(CatalogueError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        counter!(LOGINS, "outcome" => "success").increment(1);
        tracing::info!(user_id = %user.id, "User logged in");
        self.issue(user).await
    }

    /// Resolve a bearer token to its user.
    ///
    /// Expired sessions are deleted when seen.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated`: unknown or expired token
    /// - `Internal`: store failure
    pub async fn authenticate(&self, token: &str) -> Result<UserId> {
        let token_hash = hash_token(token);
        let Some(session) = self.sessions.find_session(&token_hash).await? else {
            return Err(CatalogueError::Unauthenticated(
                "Not authorized, token failed".to_string(),
            ));
        };

        if session.is_expired(self.clock.now()) {
            self.sessions.delete_session(&token_hash).await?;
            tracing::debug!(user_id = %session.user_id, "Expired session removed");
            return Err(CatalogueError::Unauthenticated(
                "Not authorized, token expired".to_string(),
            ));
        }

        Ok(session.user_id)
    }

    /// End the session behind a token. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// - `Internal`: store failure
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.delete_session(&hash_token(token)).await?;
        Ok(())
    }

    /// Delete every expired session.
    ///
    /// Returns the number of sessions removed.
    ///
    /// # Errors
    ///
    /// - `Internal`: store failure
    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        let removed = self
            .sessions
            .delete_expired_sessions(self.clock.now())
            .await?;
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions purged");
        }
        Ok(removed)
    }

    async fn issue(&self, user: User) -> Result<AuthenticatedUser> {
        let token = generate_token();
        let now = self.clock.now();
        let session = Session {
            token_hash: hash_token(&token),
            user_id: user.id,
            created_at: now,
            expires_at: now + self.config.session_ttl,
        };
        self.sessions.insert_session(&session).await?;

        Ok(AuthenticatedUser {
            id: user.id,
            username: user.username,
            email: user.email,
            token,
        })
    }
}

impl fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
