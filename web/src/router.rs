//! Router composition.

use crate::handlers::{auth, books, health, reviews};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Build the full application router.
///
/// # Routes
///
/// ## Identity
/// - `POST /api/register`, `POST /api/login`, `POST /api/logout`
///
/// ## Books
/// - `GET /api/books`, `POST /api/books`
/// - `GET /api/books/search?q=`
/// - `GET|PUT|DELETE /api/books/:id`
///
/// ## Reviews
/// - `GET /api/reviews/book/:book_id`
/// - `POST /api/reviews/:book_id`
/// - `GET|PUT|DELETE /api/reviews/:id`
///
/// ## Operations
/// - `GET /health`, `GET /health/ready`, `GET /metrics`, `GET /`
///
/// Requests exceeding `request_timeout` are answered with 408.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/reviews/book/:id", get(reviews::list_reviews_for_book))
        .route(
            "/reviews/:id",
            get(reviews::get_review)
                .post(reviews::create_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        );

    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(health::metrics))
        .nest("/api", api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
}
