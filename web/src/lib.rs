//! HTTP API for the book review catalogue.
//!
//! Thin Axum shell over the catalogue and identity services:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Axum (this crate)          │  ← JSON, bearer tokens
//! │  - Extract ids, bodies, caller          │  ← CORS, timeouts
//! │  - Map CatalogueError → status + body   │  ← tracing, correlation ids
//! ├─────────────────────────────────────────┤
//! │      BookService / ReviewService        │  ← validation, ownership
//! │      IdentityService                    │  ← rating aggregation
//! ├─────────────────────────────────────────┤
//! │      Store traits (Postgres, memory)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use book_review_auth::AuthConfig;
//! use book_review_core::environment::SystemClock;
//! use book_review_testing::InMemoryStore;
//! use book_review_web::{AppState, build_router};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let state = AppState::from_store(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(SystemClock),
//!     AuthConfig::default(),
//! );
//! let app = build_router(state, Duration::from_secs(30));
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::AppError;
pub use extractors::{AuthUser, BearerToken, CorrelationId};
pub use metrics::{MetricsError, install_recorder};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;
