//! Injected environment dependencies.
//!
//! External effects the services depend on (time, here) sit behind traits
//! so tests can substitute deterministic implementations.

use chrono::{DateTime, Datelike, Utc};

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use book_review_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert!(clock.current_year() >= 2024);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;

    /// Calendar year of [`Clock::now`], used to bound publication years.
    fn current_year(&self) -> i32 {
        self.now().year()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
