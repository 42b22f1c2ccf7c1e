//! Book reads, search and the guarded book mutations.

use crate::environment::CatalogueEnvironment;
use crate::metrics::{BOOKS_CREATED, BOOKS_DELETED};
use book_review_core::validation;
use book_review_core::{
    Book, BookChanges, BookDetails, BookId, CatalogueError, NewBook, RatingSummary, Result,
    SearchPattern, StoreError, UserId, UserSummary,
};
use metrics::counter;
use std::collections::HashMap;

const DUPLICATE_BOOK: &str = "A book with this title and author already exists.";

/// Book operations.
#[derive(Debug, Clone)]
pub struct BookService {
    env: CatalogueEnvironment,
}

impl BookService {
    /// Create the service.
    #[must_use]
    pub const fn new(env: CatalogueEnvironment) -> Self {
        Self { env }
    }

    /// All books, newest first.
    ///
    /// # Errors
    ///
    /// - `Internal`: store failure
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.env.books.list_books().await?)
    }

    /// A book with its owner's username and email.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the book does not exist
    /// - `Internal`: store failure
    pub async fn get_book(&self, book_id: BookId) -> Result<BookDetails> {
        let book = self.find_existing(book_id).await?;
        let owner = self
            .env
            .users
            .find_user(book.added_by)
            .await?
            .map(|u| u.summary());
        Ok(BookDetails { book, owner })
    }

    /// Books whose title or author contains `term` as a whole word,
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// - `Validation`: the term is blank
    /// - `NotFound`: nothing matched
    /// - `Internal`: store failure
    pub async fn search_books(&self, term: &str) -> Result<Vec<BookDetails>> {
        let pattern = SearchPattern::new(term)?;
        let matches: Vec<Book> = self
            .env
            .books
            .search_candidates(&pattern.like_pattern())
            .await?
            .into_iter()
            .filter(|book| pattern.matches_book(book))
            .collect();

        tracing::debug!(term = pattern.term(), matches = matches.len(), "Book search");

        if matches.is_empty() {
            return Err(CatalogueError::NotFound(
                "No books found matching your search".to_string(),
            ));
        }

        self.attach_owners(matches).await
    }

    /// Add a book owned by `actor`. Its rating summary starts empty.
    ///
    /// # Errors
    ///
    /// - `Validation`: missing title or author, year out of range,
    ///   description too long
    /// - `Conflict`: a book with the same title and author exists
    /// - `Internal`: store failure
    pub async fn create_book(&self, actor: UserId, input: NewBook) -> Result<Book> {
        let title = validation::trim(&input.title);
        let author = validation::trim(&input.author);
        let description = validation::trim_optional(input.description.as_deref());
        validation::book(
            &title,
            &author,
            input.publication_year,
            description.as_deref(),
            self.env.clock.current_year(),
        )?;

        if self
            .env
            .books
            .find_book_by_title_author(&title, &author)
            .await?
            .is_some()
        {
            return Err(CatalogueError::Conflict(DUPLICATE_BOOK.to_string()));
        }

        let book = Book {
            id: BookId::new(),
            title,
            author,
            genre: validation::trim_optional(input.genre.as_deref()),
            publication_year: input.publication_year,
            description,
            average_rating: RatingSummary::EMPTY.average_rating,
            num_reviews: RatingSummary::EMPTY.num_reviews,
            added_by: actor,
            created_at: self.env.clock.now(),
        };

        self.env
            .books
            .insert_book(&book)
            .await
            .map_err(|e| duplicate_or(e, CatalogueError::from))?;

        counter!(BOOKS_CREATED).increment(1);
        tracing::info!(book_id = %book.id, user_id = %actor, title = %book.title, "Book created");
        Ok(book)
    }

    /// Apply a partial update to a book owned by `actor`.
    ///
    /// Empty strings and a `0` year leave the field unchanged. The rating
    /// summary is never writable here.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the book does not exist
    /// - `Forbidden`: `actor` does not own the book
    /// - `Validation`: the merged book is invalid
    /// - `Conflict`: the new title and author belong to another book
    /// - `Internal`: store failure
    pub async fn update_book(
        &self,
        actor: UserId,
        book_id: BookId,
        changes: BookChanges,
    ) -> Result<Book> {
        let book = self.find_existing(book_id).await?;
        if !book.is_owned_by(actor) {
            return Err(CatalogueError::Forbidden(
                "Not authorized to update this book".to_string(),
            ));
        }

        let mut updated = book.with_changes(changes);
        updated.title = validation::trim(&updated.title);
        updated.author = validation::trim(&updated.author);
        updated.genre = validation::trim_optional(updated.genre.as_deref());
        updated.description = validation::trim_optional(updated.description.as_deref());
        validation::book(
            &updated.title,
            &updated.author,
            updated.publication_year,
            updated.description.as_deref(),
            self.env.clock.current_year(),
        )?;

        if let Some(other) = self
            .env
            .books
            .find_book_by_title_author(&updated.title, &updated.author)
            .await?
        {
            if other.id != book_id {
                return Err(CatalogueError::Conflict(DUPLICATE_BOOK.to_string()));
            }
        }

        self.env
            .books
            .update_book(&updated)
            .await
            .map_err(|e| {
                duplicate_or(e, |other| match other {
                    StoreError::NotFound => CatalogueError::not_found("Book"),
                    other => other.into(),
                })
            })?;

        tracing::info!(%book_id, user_id = %actor, "Book updated");

        // Return what is stored: a concurrent review may have moved the rating.
        Ok(self.env.books.find_book(book_id).await?.unwrap_or(updated))
    }

    /// Delete a book owned by `actor` together with all of its reviews.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the book does not exist
    /// - `Forbidden`: `actor` does not own the book
    /// - `Internal`: store failure
    pub async fn delete_book(&self, actor: UserId, book_id: BookId) -> Result<()> {
        let book = self.find_existing(book_id).await?;
        if !book.is_owned_by(actor) {
            return Err(CatalogueError::Forbidden(
                "Not authorized to delete this book".to_string(),
            ));
        }

        let removed_reviews = self
            .env
            .books
            .delete_book_cascade(book_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CatalogueError::not_found("Book"),
                other => other.into(),
            })?;

        counter!(BOOKS_DELETED).increment(1);
        tracing::info!(%book_id, user_id = %actor, removed_reviews, "Book deleted");
        Ok(())
    }

    async fn find_existing(&self, book_id: BookId) -> Result<Book> {
        self.env
            .books
            .find_book(book_id)
            .await?
            .ok_or_else(|| CatalogueError::not_found("Book"))
    }

    async fn attach_owners(&self, books: Vec<Book>) -> Result<Vec<BookDetails>> {
        let mut owner_ids: Vec<UserId> = books.iter().map(|b| b.added_by).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<UserId, UserSummary> = self
            .env
            .users
            .find_users(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.summary()))
            .collect();

        Ok(books
            .into_iter()
            .map(|book| BookDetails {
                owner: owners.get(&book.added_by).cloned(),
                book,
            })
            .collect())
    }
}

/// Map a (title, author) unique violation to the duplicate-book conflict and
/// anything else through `otherwise`.
fn duplicate_or(
    error: StoreError,
    otherwise: impl FnOnce(StoreError) -> CatalogueError,
) -> CatalogueError {
    if error.is_unique_violation() {
        CatalogueError::Conflict(DUPLICATE_BOOK.to_string())
    } else {
        otherwise(error)
    }
}
