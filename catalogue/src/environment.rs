//! Dependencies injected into the catalogue services.

use book_review_core::environment::Clock;
use book_review_core::{BookRepository, ReviewRepository, UserRepository};
use std::fmt;
use std::sync::Arc;

/// Stores and clock shared by [`BookService`](crate::BookService) and
/// [`ReviewService`](crate::ReviewService).
///
/// Cloning is cheap: every field is an `Arc`.
#[derive(Clone)]
pub struct CatalogueEnvironment {
    /// Book store.
    pub books: Arc<dyn BookRepository>,
    /// Review store, including the rating refresh.
    pub reviews: Arc<dyn ReviewRepository>,
    /// User store, used to attach owner and author details.
    pub users: Arc<dyn UserRepository>,
    /// Time source for timestamps and the publication year bound.
    pub clock: Arc<dyn Clock>,
}

impl CatalogueEnvironment {
    /// Create an environment from separate stores.
    #[must_use]
    pub fn new(
        books: Arc<dyn BookRepository>,
        reviews: Arc<dyn ReviewRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            books,
            reviews,
            users,
            clock,
        }
    }

    /// Create an environment where one store backs every repository.
    ///
    /// Both `PostgresStore` and `InMemoryStore` implement all three.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: BookRepository + ReviewRepository + UserRepository + 'static,
    {
        Self {
            books: store.clone(),
            reviews: store.clone(),
            users: store,
            clock,
        }
    }
}

impl fmt::Debug for CatalogueEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogueEnvironment").finish_non_exhaustive()
    }
}
