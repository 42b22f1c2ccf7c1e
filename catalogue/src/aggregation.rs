//! Rating aggregation.
//!
//! A book's `average_rating` and `num_reviews` are recomputed from scratch
//! after every committed review mutation. The store does the scan and the
//! write atomically; this module decides what happens when that fails.

use crate::metrics::RATING_RECOMPUTE_FAILURES;
use book_review_core::{BookId, RatingSummary, ReviewRepository};
use metrics::counter;
use std::fmt;
use std::sync::Arc;

/// Recomputes denormalized rating summaries.
#[derive(Clone)]
pub struct RatingAggregator {
    reviews: Arc<dyn ReviewRepository>,
}

impl RatingAggregator {
    /// Create an aggregator over a review store.
    #[must_use]
    pub fn new(reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { reviews }
    }

    /// Recompute and store the rating summary of `book_id`.
    ///
    /// Returns the summary now stored on the book, or `None` when the
    /// refresh failed or the book no longer exists. A failure is logged and
    /// counted but never propagated: the review change that triggered it has
    /// already been committed.
    pub async fn recompute_rating(&self, book_id: BookId) -> Option<RatingSummary> {
        match self.reviews.refresh_rating_summary(book_id).await {
            Ok(Some(summary)) => {
                tracing::debug!(
                    %book_id,
                    average_rating = summary.average_rating,
                    num_reviews = summary.num_reviews,
                    "Rating summary refreshed"
                );
                Some(summary)
            }
            Ok(None) => {
                tracing::warn!(%book_id, "Book disappeared before its rating summary was refreshed");
                counter!(RATING_RECOMPUTE_FAILURES).increment(1);
                None
            }
            Err(error) => {
                tracing::error!(%book_id, %error, "Failed to refresh rating summary");
                counter!(RATING_RECOMPUTE_FAILURES).increment(1);
                None
            }
        }
    }
}

impl fmt::Debug for RatingAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RatingAggregator").finish_non_exhaustive()
    }
}
