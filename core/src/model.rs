//! Catalogue entities and the inputs that create or change them.
//!
//! `Book::average_rating` and `Book::num_reviews` are a materialized view of
//! the book's review set. Nothing outside the rating refresh writes them.

use crate::ids::{BookId, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Entities
// ═══════════════════════════════════════════════════════════════════════

/// A book in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Book identifier.
    #[serde(rename = "_id")]
    pub id: BookId,
    /// Title (trimmed, non-empty).
    pub title: String,
    /// Author (trimmed, non-empty).
    pub author: String,
    /// Genre.
    pub genre: Option<String>,
    /// Year of first publication.
    pub publication_year: Option<i32>,
    /// Free-text description.
    pub description: Option<String>,
    /// Mean rating over the current review set, `0.0` when there are none.
    pub average_rating: f64,
    /// Size of the current review set.
    pub num_reviews: i64,
    /// Owner.
    pub added_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Returns `true` if `user` owns this book.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.added_by == user
    }

    /// Current rating summary as stored on the record.
    #[must_use]
    pub const fn rating_summary(&self) -> RatingSummary {
        RatingSummary {
            average_rating: self.average_rating,
            num_reviews: self.num_reviews,
        }
    }
}

/// A rating/review of a book by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review identifier.
    #[serde(rename = "_id")]
    pub id: ReviewId,
    /// Author of the review (owner).
    pub user: UserId,
    /// Reviewed book. Never changes after creation.
    pub book: BookId,
    /// Rating from 1 to 5.
    pub rating: i16,
    /// Optional comment, at most 500 characters.
    pub comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Returns `true` if `user` wrote this review.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.user == user
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Unique display name.
    pub username: String,
    /// Unique email address, lowercase.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public projection of this user.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// A bearer-token session. Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Hex-encoded SHA-256 of the bearer token.
    pub token_hash: String,
    /// Session owner.
    pub user_id: UserId,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` once `now` is past the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Rating Aggregate
// ═══════════════════════════════════════════════════════════════════════

/// Mean and count over a book's review set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Arithmetic mean of the ratings, `0.0` for an empty set.
    pub average_rating: f64,
    /// Number of ratings.
    pub num_reviews: i64,
}

impl RatingSummary {
    /// Summary of a book with no reviews.
    pub const EMPTY: Self = Self {
        average_rating: 0.0,
        num_reviews: 0,
    };

    /// Compute the summary of a full review set.
    ///
    /// An empty set yields [`RatingSummary::EMPTY`] rather than a division by
    /// zero. The mean is not rounded.
    ///
    /// # Examples
    ///
    /// ```
    /// use book_review_core::RatingSummary;
    ///
    /// let summary = RatingSummary::from_ratings(&[4, 2]);
    /// assert_eq!(summary.average_rating, 3.0);
    /// assert_eq!(summary.num_reviews, 2);
    ///
    /// assert_eq!(RatingSummary::from_ratings(&[]), RatingSummary::EMPTY);
    /// ```
    #[must_use]
    pub fn from_ratings(ratings: &[i16]) -> Self {
        if ratings.is_empty() {
            return Self::EMPTY;
        }

        let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        #[allow(clippy::cast_precision_loss)] // review counts stay far below 2^52
        let count = ratings.len() as f64;
        #[allow(clippy::cast_precision_loss)]
        let sum = total as f64;

        Self {
            average_rating: sum / count,
            num_reviews: i64::try_from(ratings.len()).unwrap_or(i64::MAX),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Read Models
// ═══════════════════════════════════════════════════════════════════════

/// Public user fields attached to books and reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
}

/// A book together with its owner's public fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    /// The book.
    #[serde(flatten)]
    pub book: Book,
    /// Owner, `None` if the account no longer exists.
    pub owner: Option<UserSummary>,
}

/// A review with the author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithAuthor {
    /// The review.
    #[serde(flatten)]
    pub review: Review,
    /// Author's username, `None` if the account no longer exists.
    pub username: Option<String>,
}

/// Title and author of the reviewed book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    /// Book identifier.
    #[serde(rename = "_id")]
    pub id: BookId,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
}

/// A review with author and book details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    /// The review.
    #[serde(flatten)]
    pub review: Review,
    /// Author, `None` if the account no longer exists.
    pub author: Option<UserSummary>,
    /// Reviewed book, `None` if it was deleted concurrently.
    pub book_summary: Option<BookSummary>,
}

// ═══════════════════════════════════════════════════════════════════════
// Inputs
// ═══════════════════════════════════════════════════════════════════════

/// Fields supplied when adding a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Author.
    #[serde(default)]
    pub author: String,
    /// Genre.
    pub genre: Option<String>,
    /// Year of first publication.
    pub publication_year: Option<i32>,
    /// Description.
    pub description: Option<String>,
}

/// Partial book update. Absent or falsy fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookChanges {
    /// New title.
    pub title: Option<String>,
    /// New author.
    pub author: Option<String>,
    /// New genre.
    pub genre: Option<String>,
    /// New publication year; `0` means unchanged.
    pub publication_year: Option<i32>,
    /// New description.
    pub description: Option<String>,
}

/// Fields supplied when posting a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewReview {
    /// Rating from 1 to 5. Required.
    pub rating: Option<i16>,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Partial review update. Absent or falsy fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewChanges {
    /// New rating; `0` means unchanged.
    pub rating: Option<i16>,
    /// New comment; empty means unchanged.
    pub comment: Option<String>,
}

/// Keep `current` unless `candidate` carries a non-empty value.
pub(crate) fn pick_text(candidate: Option<String>, current: String) -> String {
    match candidate {
        Some(value) if !value.trim().is_empty() => value,
        _ => current,
    }
}

/// Optional-field variant of [`pick_text`].
pub(crate) fn pick_optional_text(candidate: Option<String>, current: Option<String>) -> Option<String> {
    match candidate {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => current,
    }
}

impl Book {
    /// Apply a partial update, keeping current values for absent or falsy fields.
    ///
    /// Rating fields, owner and identity are not touched.
    #[must_use]
    pub fn with_changes(&self, changes: BookChanges) -> Self {
        Self {
            title: pick_text(changes.title, self.title.clone()),
            author: pick_text(changes.author, self.author.clone()),
            genre: pick_optional_text(changes.genre, self.genre.clone()),
            publication_year: match changes.publication_year {
                Some(year) if year != 0 => Some(year),
                _ => self.publication_year,
            },
            description: pick_optional_text(changes.description, self.description.clone()),
            ..self.clone()
        }
    }
}

impl Review {
    /// Apply a partial update, keeping current values for absent or falsy fields.
    ///
    /// The reviewed book and the author are not touched.
    #[must_use]
    pub fn with_changes(&self, changes: ReviewChanges) -> Self {
        Self {
            rating: match changes.rating {
                Some(rating) if rating != 0 => rating,
                _ => self.rating,
            },
            comment: pick_optional_text(changes.comment, self.comment.clone()),
            ..self.clone()
        }
    }
}
