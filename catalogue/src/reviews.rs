//! Review reads and the guarded review mutations.
//!
//! Every committed create, update or delete is followed by a rating refresh
//! of the affected book. Rejected mutations (validation, ownership,
//! duplicates) never trigger one.

use crate::aggregation::RatingAggregator;
use crate::environment::CatalogueEnvironment;
use crate::metrics::{REVIEW_CONFLICTS, REVIEWS_CREATED, REVIEWS_DELETED, REVIEWS_UPDATED};
use book_review_core::validation;
use book_review_core::{
    BookId, BookSummary, CatalogueError, NewReview, Result, Review, ReviewChanges, ReviewDetails,
    ReviewId, ReviewWithAuthor, StoreError, UserId,
};
use metrics::counter;
use std::collections::HashMap;

const ALREADY_REVIEWED: &str = "You have already reviewed this book";

/// Review operations.
#[derive(Debug, Clone)]
pub struct ReviewService {
    env: CatalogueEnvironment,
    aggregator: RatingAggregator,
}

impl ReviewService {
    /// Create the service.
    #[must_use]
    pub fn new(env: CatalogueEnvironment) -> Self {
        let aggregator = RatingAggregator::new(env.reviews.clone());
        Self { env, aggregator }
    }

    /// All reviews of a book, oldest first, each with its author's username.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the book does not exist
    /// - `Internal`: store failure
    pub async fn list_reviews_for_book(&self, book_id: BookId) -> Result<Vec<ReviewWithAuthor>> {
        if self.env.books.find_book(book_id).await?.is_none() {
            return Err(CatalogueError::NotFound(
                "Book not found for the given ID".to_string(),
            ));
        }

        let reviews = self.env.reviews.list_reviews_for_book(book_id).await?;
        let mut author_ids: Vec<UserId> = reviews.iter().map(|r| r.user).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let usernames: HashMap<UserId, String> = self
            .env
            .users
            .find_users(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(reviews
            .into_iter()
            .map(|review| ReviewWithAuthor {
                username: usernames.get(&review.user).cloned(),
                review,
            })
            .collect())
    }

    /// A review with its author and the reviewed book's title and author.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the review does not exist
    /// - `Internal`: store failure
    pub async fn get_review(&self, review_id: ReviewId) -> Result<ReviewDetails> {
        let review = self.find_existing(review_id).await?;
        let author = self
            .env
            .users
            .find_user(review.user)
            .await?
            .map(|u| u.summary());
        let book_summary = self
            .env
            .books
            .find_book(review.book)
            .await?
            .map(|b| BookSummary {
                id: b.id,
                title: b.title,
                author: b.author,
            });

        Ok(ReviewDetails {
            review,
            author,
            book_summary,
        })
    }

    /// Post `actor`'s review of a book and refresh the book's rating.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the book does not exist (checked before the input)
    /// - `Validation`: rating missing or out of range, comment too long
    /// - `Conflict`: `actor` already reviewed this book
    /// - `Internal`: store failure
    pub async fn create_review(
        &self,
        actor: UserId,
        book_id: BookId,
        input: NewReview,
    ) -> Result<Review> {
        if self.env.books.find_book(book_id).await?.is_none() {
            return Err(CatalogueError::not_found("Book"));
        }

        let comment = validation::trim_optional(input.comment.as_deref());
        validation::review(input.rating, comment.as_deref())?;
        let rating = input
            .rating
            .ok_or_else(|| CatalogueError::invalid("Please add a rating (1-5)"))?;

        if self
            .env
            .reviews
            .find_review_by_user_and_book(actor, book_id)
            .await?
            .is_some()
        {
            counter!(REVIEW_CONFLICTS).increment(1);
            return Err(CatalogueError::Conflict(ALREADY_REVIEWED.to_string()));
        }

        let review = Review {
            id: ReviewId::new(),
            user: actor,
            book: book_id,
            rating,
            comment,
            created_at: self.env.clock.now(),
        };

        // The pre-check above can lose a race; the store constraint cannot.
        match self.env.reviews.insert_review(&review).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => {
                counter!(REVIEW_CONFLICTS).increment(1);
                tracing::info!(%book_id, user_id = %actor, "Concurrent duplicate review rejected");
                return Err(CatalogueError::Conflict(ALREADY_REVIEWED.to_string()));
            }
            Err(StoreError::NotFound) => return Err(CatalogueError::not_found("Book")),
            Err(e) => return Err(e.into()),
        }

        counter!(REVIEWS_CREATED).increment(1);
        tracing::info!(review_id = %review.id, %book_id, user_id = %actor, rating, "Review created");

        self.aggregator.recompute_rating(book_id).await;
        Ok(review)
    }

    /// Apply a partial update to `actor`'s review and refresh the book's rating.
    ///
    /// A rating of `0` or an empty comment leaves that field unchanged.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the review does not exist
    /// - `Forbidden`: `actor` did not write the review
    /// - `Validation`: the merged review is invalid
    /// - `Internal`: store failure
    pub async fn update_review(
        &self,
        actor: UserId,
        review_id: ReviewId,
        changes: ReviewChanges,
    ) -> Result<Review> {
        let review = self.find_existing(review_id).await?;
        if !review.is_owned_by(actor) {
            return Err(CatalogueError::Forbidden(
                "Not authorized to update this review".to_string(),
            ));
        }

        let mut updated = review.with_changes(changes);
        updated.comment = validation::trim_optional(updated.comment.as_deref());
        validation::review(Some(updated.rating), updated.comment.as_deref())?;

        self.env
            .reviews
            .update_review(&updated)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CatalogueError::not_found("Review"),
                other => other.into(),
            })?;

        counter!(REVIEWS_UPDATED).increment(1);
        tracing::info!(%review_id, book_id = %review.book, rating = updated.rating, "Review updated");

        self.aggregator.recompute_rating(review.book).await;
        Ok(updated)
    }

    /// Delete `actor`'s review and refresh the book's rating.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the review does not exist
    /// - `Forbidden`: `actor` did not write the review
    /// - `Internal`: store failure
    pub async fn delete_review(&self, actor: UserId, review_id: ReviewId) -> Result<()> {
        let review = self.find_existing(review_id).await?;
        if !review.is_owned_by(actor) {
            return Err(CatalogueError::Forbidden(
                "Not authorized to delete this review".to_string(),
            ));
        }
        let book_id = review.book;

        self.env
            .reviews
            .delete_review(review_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CatalogueError::not_found("Review"),
                other => other.into(),
            })?;

        counter!(REVIEWS_DELETED).increment(1);
        tracing::info!(%review_id, %book_id, "Review deleted");

        self.aggregator.recompute_rating(book_id).await;
        Ok(())
    }

    async fn find_existing(&self, review_id: ReviewId) -> Result<Review> {
        self.env
            .reviews
            .find_review(review_id)
            .await?
            .ok_or_else(|| CatalogueError::not_found("Review"))
    }
}
