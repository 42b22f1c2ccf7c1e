//! Entity builders with sensible defaults.
//!
//! Timestamps come from [`test_clock`](crate::test_clock) so fixtures compare
//! equal across runs.

use crate::test_clock;
use book_review_core::environment::Clock;
use book_review_core::{Book, BookId, Review, ReviewId, User, UserId};

/// A book with no reviews.
#[must_use]
pub fn book(title: &str, author: &str, owner: UserId) -> Book {
    Book {
        id: BookId::new(),
        title: title.to_string(),
        author: author.to_string(),
        genre: None,
        publication_year: None,
        description: None,
        average_rating: 0.0,
        num_reviews: 0,
        added_by: owner,
        created_at: test_clock().now(),
    }
}

/// A review without comment.
#[must_use]
pub fn review(user: UserId, book: BookId, rating: i16) -> Review {
    Review {
        id: ReviewId::new(),
        user,
        book,
        rating,
        comment: None,
        created_at: test_clock().now(),
    }
}

/// A user with an unusable password hash.
#[must_use]
pub fn user(username: &str) -> User {
    User {
        id: UserId::new(),
        username: username.to_string(),
        email: format!("{}@example.com", username.to_lowercase()),
        password_hash: "!".to_string(),
        created_at: test_clock().now(),
    }
}
