//! Review endpoints.
//!
//! `POST /api/reviews/:id` takes a book id while `PUT`/`DELETE` on the same
//! path take a review id; the router shares one parameter name for both.

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::handlers::Message;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use book_review_core::{
    BookId, NewReview, Review, ReviewChanges, ReviewDetails, ReviewId, ReviewWithAuthor,
};

/// `GET /api/reviews/book/:book_id`
///
/// # Errors
///
/// 400 for a malformed id, 404 for an unknown book.
pub async fn list_reviews_for_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<Vec<ReviewWithAuthor>>, AppError> {
    let book_id = BookId::parse(&book_id)?;
    Ok(Json(state.reviews.list_reviews_for_book(book_id).await?))
}

/// `GET /api/reviews/:id`
///
/// # Errors
///
/// 400 for a malformed id, 404 for an unknown one.
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewDetails>, AppError> {
    let review_id = ReviewId::parse(&id)?;
    Ok(Json(state.reviews.get_review(review_id).await?))
}

/// `POST /api/reviews/:book_id`
///
/// # Errors
///
/// 401, 400, 404 for an unknown book, 422, 409 when already reviewed.
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(book_id): Path<String>,
    Json(input): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let book_id = BookId::parse(&book_id)?;
    let review = state.reviews.create_review(user_id, book_id, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// `PUT /api/reviews/:id`
///
/// # Errors
///
/// 401, 400, 404, 403 for a non-author, 422.
pub async fn update_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(changes): Json<ReviewChanges>,
) -> Result<Json<Review>, AppError> {
    let review_id = ReviewId::parse(&id)?;
    Ok(Json(
        state.reviews.update_review(user_id, review_id, changes).await?,
    ))
}

/// `DELETE /api/reviews/:id`
///
/// # Errors
///
/// 401, 400, 404, 403 for a non-author.
pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Message>, AppError> {
    let review_id = ReviewId::parse(&id)?;
    state.reviews.delete_review(user_id, review_id).await?;
    Ok(Json(Message::new("Review removed")))
}
