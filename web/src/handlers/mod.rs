//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod auth;
pub mod books;
pub mod health;
pub mod reviews;

use serde::Serialize;

pub use health::health_check;

/// Plain `{"message": ...}` acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Human-readable outcome.
    pub message: String,
}

impl Message {
    /// Wrap a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
