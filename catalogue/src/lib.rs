//! # Book Review Catalogue
//!
//! Services over the store contracts: book and review mutations guarded by
//! validation, ownership and uniqueness, whole-word search, and the rating
//! aggregation that keeps every book's summary equal to its review set.
//!
//! ## Example
//!
//! ```
//! use book_review_catalogue::{BookService, CatalogueEnvironment, ReviewService};
//! use book_review_core::{NewBook, NewReview, UserId};
//! use book_review_testing::{InMemoryStore, test_clock};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), book_review_core::CatalogueError> {
//! let env = CatalogueEnvironment::from_store(Arc::new(InMemoryStore::new()), Arc::new(test_clock()));
//! let books = BookService::new(env.clone());
//! let reviews = ReviewService::new(env);
//!
//! let owner = UserId::new();
//! let book = books
//!     .create_book(owner, NewBook { title: "Dune".into(), author: "Herbert".into(), ..NewBook::default() })
//!     .await?;
//! reviews
//!     .create_review(UserId::new(), book.id, NewReview { rating: Some(4), comment: None })
//!     .await?;
//!
//! let stored = books.get_book(book.id).await?;
//! assert_eq!(stored.book.num_reviews, 1);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod books;
pub mod environment;
pub mod metrics;
pub mod reviews;

pub use aggregation::RatingAggregator;
pub use books::BookService;
pub use environment::CatalogueEnvironment;
pub use reviews::ReviewService;
