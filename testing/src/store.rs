//! In-memory store for fast, deterministic testing.
//!
//! [`InMemoryStore`] implements every store contract with the same semantics
//! as the Postgres store: unique (title, author) and (user, book), cascading
//! book deletion, and rating refreshes computed from a full scan. All tables
//! sit behind one lock, so each method is atomic.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use book_review_core::store::StoreFuture;
use book_review_core::{
    Book, BookId, BookRepository, HealthProbe, RatingSummary, Review, ReviewId, ReviewRepository,
    Session, SessionStore, StoreError, User, UserId, UserRepository,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Tables {
    books: HashMap<BookId, Book>,
    reviews: HashMap<ReviewId, Review>,
    users: HashMap<UserId, User>,
    sessions: HashMap<String, Session>,
}

impl Tables {
    fn title_author_taken(&self, book: &Book) -> bool {
        self.books
            .values()
            .any(|b| b.id != book.id && b.title == book.title && b.author == book.author)
    }
}

#[derive(Debug, Default)]
struct Faults {
    rating_refresh: AtomicBool,
    unavailable: AtomicBool,
}

/// In-memory implementation of all store traits.
///
/// Cloning shares the underlying tables.
///
/// # Example
///
/// ```
/// use book_review_testing::{InMemoryStore, fixtures};
/// use book_review_core::BookRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryStore::new();
/// let book = fixtures::book("Dune", "Herbert", book_review_core::UserId::new());
/// store.insert_book(&book).await?;
/// assert!(store.find_book(book.id).await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `refresh_rating_summary` call fail with a database error.
    pub fn fail_rating_refresh(&self, fail: bool) {
        self.faults.rating_refresh.store(fail, Ordering::SeqCst);
    }

    /// Make `ping` fail, simulating a lost connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored books.
    #[must_use]
    pub fn book_count(&self) -> usize {
        self.tables.read().unwrap().books.len()
    }

    /// Number of stored reviews, across all books.
    #[must_use]
    pub fn review_count(&self) -> usize {
        self.tables.read().unwrap().reviews.len()
    }

    /// Number of stored sessions, expired ones included.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.tables.read().unwrap().sessions.len()
    }

    /// Reviews whose book no longer exists. Always empty unless a contract
    /// was broken.
    #[must_use]
    pub fn orphaned_reviews(&self) -> Vec<Review> {
        let tables = self.tables.read().unwrap();
        tables
            .reviews
            .values()
            .filter(|r| !tables.books.contains_key(&r.book))
            .cloned()
            .collect()
    }

    /// Overwrite a book's rating summary directly, bypassing the refresh.
    ///
    /// Used to simulate stale aggregates.
    pub fn force_rating_summary(&self, book: BookId, summary: RatingSummary) {
        if let Some(b) = self.tables.write().unwrap().books.get_mut(&book) {
            b.average_rating = summary.average_rating;
            b.num_reviews = summary.num_reviews;
        }
    }
}

impl BookRepository for InMemoryStore {
    fn insert_book<'a>(&'a self, book: &'a Book) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            if tables.title_author_taken(book) {
                return Err(StoreError::UniqueViolation {
                    constraint: "books_title_author_key".to_string(),
                });
            }
            tables.books.insert(book.id, book.clone());
            Ok(())
        })
    }

    fn find_book(&self, id: BookId) -> StoreFuture<'_, Option<Book>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().books.get(&id).cloned()) })
    }

    fn find_book_by_title_author<'a>(
        &'a self,
        title: &'a str,
        author: &'a str,
    ) -> StoreFuture<'a, Option<Book>> {
        Box::pin(async move {
            Ok(self
                .tables
                .read()
                .unwrap()
                .books
                .values()
                .find(|b| b.title == title && b.author == author)
                .cloned())
        })
    }

    fn list_books(&self) -> StoreFuture<'_, Vec<Book>> {
        Box::pin(async move {
            let mut books: Vec<Book> = self.tables.read().unwrap().books.values().cloned().collect();
            books.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.title.cmp(&b.title)));
            Ok(books)
        })
    }

    fn search_candidates<'a>(&'a self, _like_pattern: &'a str) -> StoreFuture<'a, Vec<Book>> {
        // Superset by contract; the caller applies the word match.
        self.list_books()
    }

    fn update_book<'a>(&'a self, book: &'a Book) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            if !tables.books.contains_key(&book.id) {
                return Err(StoreError::NotFound);
            }
            if tables.title_author_taken(book) {
                return Err(StoreError::UniqueViolation {
                    constraint: "books_title_author_key".to_string(),
                });
            }
            let stored = tables.books.get_mut(&book.id).ok_or(StoreError::NotFound)?;
            stored.title.clone_from(&book.title);
            stored.author.clone_from(&book.author);
            stored.genre.clone_from(&book.genre);
            stored.publication_year = book.publication_year;
            stored.description.clone_from(&book.description);
            Ok(())
        })
    }

    fn delete_book_cascade(&self, id: BookId) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            if tables.books.remove(&id).is_none() {
                return Err(StoreError::NotFound);
            }
            let before = tables.reviews.len();
            tables.reviews.retain(|_, r| r.book != id);
            Ok((before - tables.reviews.len()) as u64)
        })
    }
}

impl ReviewRepository for InMemoryStore {
    fn insert_review<'a>(&'a self, review: &'a Review) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            if !tables.books.contains_key(&review.book) {
                return Err(StoreError::NotFound);
            }
            if tables
                .reviews
                .values()
                .any(|r| r.user == review.user && r.book == review.book)
            {
                return Err(StoreError::UniqueViolation {
                    constraint: "reviews_user_book_key".to_string(),
                });
            }
            tables.reviews.insert(review.id, review.clone());
            Ok(())
        })
    }

    fn find_review(&self, id: ReviewId) -> StoreFuture<'_, Option<Review>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().reviews.get(&id).cloned()) })
    }

    fn find_review_by_user_and_book(
        &self,
        user: UserId,
        book: BookId,
    ) -> StoreFuture<'_, Option<Review>> {
        Box::pin(async move {
            Ok(self
                .tables
                .read()
                .unwrap()
                .reviews
                .values()
                .find(|r| r.user == user && r.book == book)
                .cloned())
        })
    }

    fn list_reviews_for_book(&self, book: BookId) -> StoreFuture<'_, Vec<Review>> {
        Box::pin(async move {
            let mut reviews: Vec<Review> = self
                .tables
                .read()
                .unwrap()
                .reviews
                .values()
                .filter(|r| r.book == book)
                .cloned()
                .collect();
            reviews.sort_by_key(|r| r.created_at);
            Ok(reviews)
        })
    }

    fn update_review<'a>(&'a self, review: &'a Review) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let stored = tables.reviews.get_mut(&review.id).ok_or(StoreError::NotFound)?;
            stored.rating = review.rating;
            stored.comment.clone_from(&review.comment);
            Ok(())
        })
    }

    fn delete_review(&self, id: ReviewId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.tables
                .write()
                .unwrap()
                .reviews
                .remove(&id)
                .map(|_| ())
                .ok_or(StoreError::NotFound)
        })
    }

    fn refresh_rating_summary(&self, book: BookId) -> StoreFuture<'_, Option<RatingSummary>> {
        Box::pin(async move {
            if self.faults.rating_refresh.load(Ordering::SeqCst) {
                return Err(StoreError::Database("rating refresh unavailable".to_string()));
            }

            let mut tables = self.tables.write().unwrap();
            let ratings: Vec<i16> = tables
                .reviews
                .values()
                .filter(|r| r.book == book)
                .map(|r| r.rating)
                .collect();
            let summary = RatingSummary::from_ratings(&ratings);

            let Some(stored) = tables.books.get_mut(&book) else {
                return Ok(None);
            };
            stored.average_rating = summary.average_rating;
            stored.num_reviews = summary.num_reviews;
            Ok(Some(summary))
        })
    }
}

impl UserRepository for InMemoryStore {
    fn insert_user<'a>(&'a self, user: &'a User) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            if let Some(existing) = tables
                .users
                .values()
                .find(|u| u.username == user.username || u.email == user.email)
            {
                let constraint = if existing.email == user.email {
                    "users_email_key"
                } else {
                    "users_username_key"
                };
                return Err(StoreError::UniqueViolation {
                    constraint: constraint.to_string(),
                });
            }
            tables.users.insert(user.id, user.clone());
            Ok(())
        })
    }

    fn find_user(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().users.get(&id).cloned()) })
    }

    fn find_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move {
            Ok(self
                .tables
                .read()
                .unwrap()
                .users
                .values()
                .find(|u| u.email == email)
                .cloned())
        })
    }

    fn find_user_by_username_or_email<'a>(
        &'a self,
        username: &'a str,
        email: &'a str,
    ) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move {
            Ok(self
                .tables
                .read()
                .unwrap()
                .users
                .values()
                .find(|u| u.username == username || u.email == email)
                .cloned())
        })
    }

    fn find_users<'a>(&'a self, ids: &'a [UserId]) -> StoreFuture<'a, Vec<User>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
        })
    }
}

impl SessionStore for InMemoryStore {
    fn insert_session<'a>(&'a self, session: &'a Session) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            if tables.sessions.contains_key(&session.token_hash) {
                return Err(StoreError::UniqueViolation {
                    constraint: "sessions_pkey".to_string(),
                });
            }
            tables
                .sessions
                .insert(session.token_hash.clone(), session.clone());
            Ok(())
        })
    }

    fn find_session<'a>(&'a self, token_hash: &'a str) -> StoreFuture<'a, Option<Session>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().sessions.get(token_hash).cloned()) })
    }

    fn delete_session<'a>(&'a self, token_hash: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.tables.write().unwrap().sessions.remove(token_hash);
            Ok(())
        })
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let before = tables.sessions.len();
            tables.sessions.retain(|_, s| !s.is_expired(now));
            Ok((before - tables.sessions.len()) as u64)
        })
    }
}

impl HealthProbe for InMemoryStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            if self.faults.unavailable.load(Ordering::SeqCst) {
                Err(StoreError::Database("connection refused".to_string()))
            } else {
                Ok(())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn duplicate_title_author_is_unique_violation() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        store.insert_book(&fixtures::book("Dune", "Herbert", owner)).await.unwrap();

        let err = store
            .insert_book(&fixtures::book("Dune", "Herbert", owner))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn cascade_removes_only_that_books_reviews() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let dune = fixtures::book("Dune", "Herbert", owner);
        let emma = fixtures::book("Emma", "Austen", owner);
        store.insert_book(&dune).await.unwrap();
        store.insert_book(&emma).await.unwrap();
        store.insert_review(&fixtures::review(UserId::new(), dune.id, 5)).await.unwrap();
        store.insert_review(&fixtures::review(UserId::new(), dune.id, 3)).await.unwrap();
        store.insert_review(&fixtures::review(UserId::new(), emma.id, 4)).await.unwrap();

        let removed = store.delete_book_cascade(dune.id).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.review_count(), 1);
        assert!(store.orphaned_reviews().is_empty());
    }

    #[tokio::test]
    async fn refresh_of_missing_book_returns_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.refresh_rating_summary(BookId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_review_never_moves_it_to_another_book() {
        let store = InMemoryStore::new();
        let book = fixtures::book("Dune", "Herbert", UserId::new());
        store.insert_book(&book).await.unwrap();
        let review = fixtures::review(UserId::new(), book.id, 2);
        store.insert_review(&review).await.unwrap();

        let mut moved = review.clone();
        moved.book = BookId::new();
        moved.rating = 5;
        store.update_review(&moved).await.unwrap();

        let stored = store.find_review(review.id).await.unwrap().unwrap();
        assert_eq!(stored.book, book.id);
        assert_eq!(stored.rating, 5);
    }
}
