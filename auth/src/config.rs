//! Identity service configuration.

use chrono::Duration;

/// Session settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of a bearer token from the moment it is issued.
    ///
    /// Default: 10 hours
    pub session_ttl: Duration,
}

impl AuthConfig {
    /// Create the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session_ttl: Duration::hours(10),
        }
    }

    /// Set the session lifetime.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}
