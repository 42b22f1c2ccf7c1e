//! Catalogue endpoints.

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::handlers::Message;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use book_review_core::{Book, BookChanges, BookDetails, BookId, NewBook};
use serde::Deserialize;

/// Query string of `GET /api/books/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Search term, matched against title and author.
    #[serde(default)]
    pub q: String,
}

/// `GET /api/books`
///
/// # Errors
///
/// 500 on store failure.
pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.books.list_books().await?))
}

/// `GET /api/books/search?q=`
///
/// # Errors
///
/// 422 for a blank term, 404 when nothing matches.
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<BookDetails>>, AppError> {
    Ok(Json(state.books.search_books(&params.q).await?))
}

/// `GET /api/books/:id`
///
/// # Errors
///
/// 400 for a malformed id, 404 for an unknown one.
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookDetails>, AppError> {
    let book_id = BookId::parse(&id)?;
    Ok(Json(state.books.get_book(book_id).await?))
}

/// `POST /api/books`
///
/// # Errors
///
/// 401 without a valid token, 422 on invalid input, 409 for a duplicate
/// title and author.
pub async fn create_book(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(input): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = state.books.create_book(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// `PUT /api/books/:id`
///
/// # Errors
///
/// 401, 400, 404, 403 for a non-owner, 422, 409.
pub async fn update_book(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(changes): Json<BookChanges>,
) -> Result<Json<Book>, AppError> {
    let book_id = BookId::parse(&id)?;
    Ok(Json(state.books.update_book(user_id, book_id, changes).await?))
}

/// `DELETE /api/books/:id`
///
/// Removes the book and every review of it.
///
/// # Errors
///
/// 401, 400, 404, 403 for a non-owner.
pub async fn delete_book(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Message>, AppError> {
    let book_id = BookId::parse(&id)?;
    state.books.delete_book(user_id, book_id).await?;
    Ok(Json(Message::new("Book removed")))
}
