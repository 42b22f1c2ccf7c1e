//! Store contracts the catalogue depends on.
//!
//! # Guarantees required from implementations
//!
//! - `(user, book)` on reviews and `(title, author)` on books are unique at
//!   the store level; a violating write fails with
//!   [`StoreError::UniqueViolation`], even when two writes race.
//! - [`ReviewRepository::refresh_rating_summary`] is an atomic
//!   read-modify-write of one book: a full scan of the book's current
//!   ratings and the write of the resulting summary happen under a per-book
//!   lock, never from a stale read.
//! - [`BookRepository::delete_book_cascade`] removes the book's reviews and
//!   the book together; no review is left referencing a missing book.
//!
//! # Implementations
//!
//! - `PostgresStore` (in `book-review-postgres`): production implementation
//! - `InMemoryStore` (in `book-review-testing`): fast, deterministic testing
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of `async fn` so services
//! can hold stores as `Arc<dyn BookRepository>` and the web layer stays free
//! of store type parameters.

use crate::error::StoreError;
use crate::ids::{BookId, ReviewId, UserId};
use crate::model::{Book, RatingSummary, Review, Session, User};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every store method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Books, including their denormalized rating summary.
pub trait BookRepository: Send + Sync {
    /// Insert a new book.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation`: a book with the same title and author exists
    /// - `Database`: query failed
    fn insert_book<'a>(&'a self, book: &'a Book) -> StoreFuture<'a, ()>;

    /// Load a book.
    ///
    /// Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_book(&self, id: BookId) -> StoreFuture<'_, Option<Book>>;

    /// Find the book with exactly this title and author.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_book_by_title_author<'a>(
        &'a self,
        title: &'a str,
        author: &'a str,
    ) -> StoreFuture<'a, Option<Book>>;

    /// All books, newest first.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn list_books(&self) -> StoreFuture<'_, Vec<Book>>;

    /// Books whose title or author contains `like_pattern` (SQL `ILIKE`
    /// syntax, `\` as escape). Callers apply the exact word match on top.
    ///
    /// Implementations may return a superset.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn search_candidates<'a>(&'a self, like_pattern: &'a str) -> StoreFuture<'a, Vec<Book>>;

    /// Persist the descriptive fields of a book.
    ///
    /// `average_rating` and `num_reviews` are not written.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the book was deleted
    /// - `UniqueViolation`: the new title and author collide with another book
    /// - `Database`: query failed
    fn update_book<'a>(&'a self, book: &'a Book) -> StoreFuture<'a, ()>;

    /// Delete a book and every review referencing it, atomically.
    ///
    /// Returns the number of reviews removed.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the book does not exist
    /// - `Database`: query or transaction failed
    fn delete_book_cascade(&self, id: BookId) -> StoreFuture<'_, u64>;
}

/// Reviews and the rating aggregate derived from them.
pub trait ReviewRepository: Send + Sync {
    /// Insert a new review.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation`: the user already reviewed this book
    /// - `NotFound`: the book does not exist
    /// - `Database`: query failed
    fn insert_review<'a>(&'a self, review: &'a Review) -> StoreFuture<'a, ()>;

    /// Load a review.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_review(&self, id: ReviewId) -> StoreFuture<'_, Option<Review>>;

    /// The review `user` wrote for `book`, if any.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_review_by_user_and_book(
        &self,
        user: UserId,
        book: BookId,
    ) -> StoreFuture<'_, Option<Review>>;

    /// All reviews of a book, oldest first.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn list_reviews_for_book(&self, book: BookId) -> StoreFuture<'_, Vec<Review>>;

    /// Persist rating and comment of a review.
    ///
    /// The book reference is never rewritten.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the review was deleted
    /// - `Database`: query failed
    fn update_review<'a>(&'a self, review: &'a Review) -> StoreFuture<'a, ()>;

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the review does not exist
    /// - `Database`: query failed
    fn delete_review(&self, id: ReviewId) -> StoreFuture<'_, ()>;

    /// Recompute a book's rating summary from all of its current reviews and
    /// store it on the book, atomically.
    ///
    /// The summary is computed with [`RatingSummary::from_ratings`]. Returns
    /// `None` when the book does not exist (for example deleted concurrently).
    ///
    /// # Errors
    ///
    /// - `Database`: query or transaction failed
    fn refresh_rating_summary(&self, book: BookId) -> StoreFuture<'_, Option<RatingSummary>>;
}

/// Registered users.
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation`: username or email already registered
    /// - `Database`: query failed
    fn insert_user<'a>(&'a self, user: &'a User) -> StoreFuture<'a, ()>;

    /// Load a user.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_user(&self, id: UserId) -> StoreFuture<'_, Option<User>>;

    /// Load a user by (lowercase) email.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>>;

    /// Load any user holding either the username or the email.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_user_by_username_or_email<'a>(
        &'a self,
        username: &'a str,
        email: &'a str,
    ) -> StoreFuture<'a, Option<User>>;

    /// Load several users at once. Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_users<'a>(&'a self, ids: &'a [UserId]) -> StoreFuture<'a, Vec<User>>;
}

/// Bearer-token sessions, keyed by token digest.
pub trait SessionStore: Send + Sync {
    /// Store a session.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation`: digest collision
    /// - `Database`: query failed
    fn insert_session<'a>(&'a self, session: &'a Session) -> StoreFuture<'a, ()>;

    /// Load a session by token digest, expired or not.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_session<'a>(&'a self, token_hash: &'a str) -> StoreFuture<'a, Option<Session>>;

    /// Delete a session. Deleting a missing session is not an error.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn delete_session<'a>(&'a self, token_hash: &'a str) -> StoreFuture<'a, ()>;

    /// Delete every session that expired before `now`.
    ///
    /// Returns the number of sessions removed.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreFuture<'_, u64>;
}

/// Connectivity probe used by readiness checks.
pub trait HealthProbe: Send + Sync {
    /// Succeeds when the store answers a trivial query.
    ///
    /// # Errors
    ///
    /// - `Database`: the store is unreachable
    fn ping(&self) -> StoreFuture<'_, ()>;
}
