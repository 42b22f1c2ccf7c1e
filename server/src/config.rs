//! Configuration management for the server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Only `DATABASE_URL` is required.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Pool acquire timeout
    pub connect_timeout: Duration,
    /// Connection attempts before giving up at startup
    pub connect_retries: u32,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: IpAddr,
    /// Port to bind to
    pub port: u16,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Socket address to listen on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database settings
    pub database: DatabaseConfig,
    /// Listener settings
    pub server: ServerConfig,
    /// Bearer session lifetime
    pub session_ttl: chrono::Duration,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`]: `DATABASE_URL` is not set
    /// - [`ConfigError::Invalid`]: a numeric or boolean variable does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);

        let url = vars
            .get("DATABASE_URL")
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections: vars.parse("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: vars.parse("DATABASE_MIN_CONNECTIONS", 1)?,
                connect_timeout: Duration::from_secs(vars.parse("DATABASE_CONNECT_TIMEOUT", 30)?),
                connect_retries: vars.parse("DATABASE_CONNECT_RETRIES", 5)?,
                run_migrations: vars.flag("RUN_MIGRATIONS", true)?,
            },
            server: ServerConfig {
                host: vars.parse("HOST", IpAddr::from([0, 0, 0, 0]))?,
                port: vars.parse("PORT", 3000)?,
                request_timeout: Duration::from_secs(vars.parse("REQUEST_TIMEOUT", 30)?),
            },
            session_ttl: chrono::Duration::hours(vars.parse("SESSION_TTL_HOURS", 10)?),
        })
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value }),
        }
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(name).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
            Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
            Some(value) => Err(ConfigError::Invalid { name, value }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/books")]).unwrap();

        assert_eq!(config.database.url, "postgres://localhost/books");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.database.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.database.connect_retries, 5);
        assert!(config.database.run_migrations);
        assert_eq!(config.server.addr(), "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.server.request_timeout, Duration::from_secs(30));
        assert_eq!(config.session_ttl, chrono::Duration::hours(10));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/books"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("RUN_MIGRATIONS", "false"),
            ("SESSION_TTL_HOURS", "2"),
        ])
        .unwrap();

        assert_eq!(config.database.max_connections, 25);
        assert!(!config.database.run_migrations);
        assert_eq!(config.server.addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.session_ttl, chrono::Duration::hours(2));
    }

    #[test]
    fn test_missing_database_url() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
        assert_eq!(
            load(&[("DATABASE_URL", "  ")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("DATABASE_URL", "postgres://db"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string()
            }
        );

        let err = load(&[("DATABASE_URL", "postgres://db"), ("RUN_MIGRATIONS", "maybe")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "RUN_MIGRATIONS", .. }));
    }
}
