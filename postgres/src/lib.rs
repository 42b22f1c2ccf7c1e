//! `PostgreSQL` persistence for the book review catalogue.
//!
//! [`PostgresStore`] implements every store contract from
//! `book-review-core` on top of a sqlx pool:
//!
//! - Unique (title, author) and (user, book) enforced by constraints
//! - Book deletion removes reviews and the book in one transaction
//! - Rating refresh locks the book row, scans its reviews and writes the
//!   summary in one transaction
//! - Embedded migrations via `sqlx::migrate!`
//!
//! # Example
//!
//! ```no_run
//! use book_review_postgres::{PoolSettings, PostgresStore, RetryPolicy, connect};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect(&PoolSettings::new("postgres://localhost/book_review"), &RetryPolicy::new()).await?;
//! let store = PostgresStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

pub mod connect;
pub mod retry;
pub mod store;

pub use connect::{PoolSettings, connect};
pub use retry::RetryPolicy;
pub use store::PostgresStore;
