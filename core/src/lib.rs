//! # Book Review Core
//!
//! Domain model, error kinds and store contracts for the book review
//! catalogue.
//!
//! ## Core Concepts
//!
//! - **Book**: catalogue entry carrying a denormalized rating summary
//! - **Review**: one rating per (user, book), owned by its author
//! - **RatingSummary**: mean and count over a book's current review set
//! - **Stores**: dyn-compatible traits the services are written against
//! - **Environment**: injected dependencies (clock) behind traits
//!
//! ## Invariant
//!
//! For every book, `average_rating`/`num_reviews` equal
//! [`RatingSummary::from_ratings`] over the ratings of its current reviews.
//! Stores recompute the summary from a full scan, never by increments.

pub mod environment;
pub mod error;
pub mod ids;
pub mod model;
pub mod search;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use error::{CatalogueError, ErrorKind, Result, StoreError};
pub use ids::{BookId, ReviewId, UserId};
pub use model::{
    Book, BookChanges, BookDetails, BookSummary, NewBook, NewReview, RatingSummary, Review,
    ReviewChanges, ReviewDetails, ReviewWithAuthor, Session, User, UserSummary,
};
pub use search::SearchPattern;
pub use store::{
    BookRepository, HealthProbe, ReviewRepository, SessionStore, StoreFuture, UserRepository,
};
