//! Metric names emitted by the catalogue services.
//!
//! The recorder is installed by the server binary; without one, every
//! counter is a no-op.

use metrics::describe_counter;

/// Books created.
pub const BOOKS_CREATED: &str = "catalogue_books_created_total";
/// Books deleted, together with their reviews.
pub const BOOKS_DELETED: &str = "catalogue_books_deleted_total";
/// Reviews created.
pub const REVIEWS_CREATED: &str = "catalogue_reviews_created_total";
/// Reviews updated.
pub const REVIEWS_UPDATED: &str = "catalogue_reviews_updated_total";
/// Reviews deleted.
pub const REVIEWS_DELETED: &str = "catalogue_reviews_deleted_total";
/// Review creations rejected because the user already reviewed the book.
pub const REVIEW_CONFLICTS: &str = "catalogue_review_conflicts_total";
/// Rating refreshes that failed after a committed review mutation.
pub const RATING_RECOMPUTE_FAILURES: &str = "catalogue_rating_recompute_failures_total";

/// Register descriptions for every catalogue counter.
pub fn describe() {
    describe_counter!(BOOKS_CREATED, "Total number of books added to the catalogue");
    describe_counter!(BOOKS_DELETED, "Total number of books removed with their reviews");
    describe_counter!(REVIEWS_CREATED, "Total number of reviews posted");
    describe_counter!(REVIEWS_UPDATED, "Total number of reviews edited");
    describe_counter!(REVIEWS_DELETED, "Total number of reviews removed");
    describe_counter!(
        REVIEW_CONFLICTS,
        "Total number of duplicate review attempts for the same user and book"
    );
    describe_counter!(
        RATING_RECOMPUTE_FAILURES,
        "Total number of rating summary refreshes that failed after a review change"
    );
}
