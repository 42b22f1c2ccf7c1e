//! Error taxonomy for catalogue operations.
//!
//! Services return [`CatalogueError`]; stores return [`StoreError`], which the
//! services translate. Every error carries an [`ErrorKind`] that the API layer
//! maps onto an HTTP status code.

use thiserror::Error;

/// Result type alias for catalogue operations.
pub type Result<T> = std::result::Result<T, CatalogueError>;

/// Errors surfaced by catalogue, review and identity operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    // ═══════════════════════════════════════════════════════════
    // Client Errors
    // ═══════════════════════════════════════════════════════════

    /// The referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Authenticated, but not the owner of the resource.
    #[error("{0}")]
    Forbidden(String),

    /// Missing, malformed or expired credentials.
    #[error("{0}")]
    Unauthenticated(String),

    /// Duplicate review, duplicate book, or duplicate username/email.
    #[error("{0}")]
    Conflict(String),

    /// One message per failing field.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// A path or body identifier is not well formed.
    #[error("Invalid {resource} ID")]
    InvalidIdentifier {
        /// Resource the identifier was meant to reference
        resource: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Store unavailable or an unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of a [`CatalogueError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CatalogueError::NotFound`].
    NotFound,
    /// See [`CatalogueError::Forbidden`].
    Forbidden,
    /// See [`CatalogueError::Unauthenticated`].
    Unauthenticated,
    /// See [`CatalogueError::Conflict`].
    Conflict,
    /// See [`CatalogueError::Validation`].
    ValidationError,
    /// See [`CatalogueError::InvalidIdentifier`].
    InvalidIdentifier,
    /// See [`CatalogueError::Internal`].
    InternalError,
}

impl ErrorKind {
    /// HTTP status code the API layer responds with.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Forbidden => 403,
            Self::Unauthenticated => 401,
            Self::Conflict => 409,
            Self::ValidationError => 422,
            Self::InvalidIdentifier => 400,
            Self::InternalError => 500,
        }
    }

    /// Stable machine-readable code for clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Unauthenticated => "UNAUTHORIZED",
            Self::Conflict => "CONFLICT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::InternalError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl CatalogueError {
    /// Shorthand for a [`CatalogueError::NotFound`] naming the resource.
    #[must_use]
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }

    /// Shorthand for a single-field [`CatalogueError::Validation`].
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            Self::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Returns `true` for errors caused by the request rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

/// Errors reported by store implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation {
        /// Name of the violated constraint
        constraint: String,
    },

    /// The row addressed by the write no longer exists.
    #[error("Record not found")]
    NotFound,

    /// Connection, query or transaction failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Returns `true` if this is a unique-constraint violation.
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

impl From<StoreError> for CatalogueError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                Self::Conflict(format!("Duplicate entry ({constraint})"))
            }
            StoreError::NotFound => Self::NotFound("Record not found".to_string()),
            StoreError::Database(message) => Self::Internal(message),
        }
    }
}
