//! # Book Review Testing
//!
//! Testing utilities for the book review catalogue.
//!
//! This crate provides:
//! - [`InMemoryStore`]: every store contract over shared in-memory tables
//! - Deterministic clocks ([`FixedClock`], [`ManualClock`])
//! - Entity fixtures and proptest strategies
//!
//! ## Example
//!
//! ```
//! use book_review_testing::{InMemoryStore, fixtures, test_clock};
//! use book_review_core::{BookRepository, ReviewRepository, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let book = fixtures::book("Dune", "Herbert", UserId::new());
//! store.insert_book(&book).await?;
//! store.insert_review(&fixtures::review(UserId::new(), book.id, 4)).await?;
//!
//! let summary = store.refresh_rating_summary(book.id).await?;
//! assert_eq!(summary.map(|s| s.num_reviews), Some(1));
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod store;

use book_review_core::environment::Clock;
use chrono::{DateTime, Utc};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use book_review_testing::mocks::FixedClock;
    /// use book_review_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to.
    ///
    /// Clones share the same time, so a test can keep one handle and give
    /// another to the service under test.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a clock stopped at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward.
        ///
        /// # Panics
        ///
        /// Panics if the lock is poisoned.
        #[allow(clippy::unwrap_used)]
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap();
            *time += by;
        }
    }

    impl Clock for ManualClock {
        #[allow(clippy::unwrap_used)]
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Property-based testing strategies.
pub mod properties {
    use proptest::prelude::*;

    /// A valid rating (1 to 5).
    pub fn rating() -> impl Strategy<Value = i16> {
        1i16..=5
    }

    /// A sequence of review mutations against one book.
    ///
    /// Each step is `(reviewer, rating)`: reviewers are drawn from a small
    /// pool so creates, updates and deletes of the same review interleave.
    /// A rating of `0` stands for "delete this reviewer's review".
    pub fn review_ops(max_len: usize) -> impl Strategy<Value = Vec<(usize, i16)>> {
        prop::collection::vec((0usize..4, 0i16..=5), 1..max_len)
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock};
pub use store::InMemoryStore;
