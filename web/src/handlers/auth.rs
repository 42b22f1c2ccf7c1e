//! Registration, login and logout.

use crate::error::AppError;
use crate::extractors::{AuthUser, BearerToken};
use crate::handlers::Message;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use book_review_auth::{AuthenticatedUser, LoginRequest, RegisterRequest};

/// `POST /api/register`
///
/// # Errors
///
/// 422 on invalid input, 409 when the username or email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthenticatedUser>), AppError> {
    let user = state.identity.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/login`
///
/// # Errors
///
/// 401 for an unknown email or a wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthenticatedUser>, AppError> {
    Ok(Json(state.identity.login(request).await?))
}

/// `POST /api/logout`
///
/// # Errors
///
/// 401 when the token is missing or no longer valid.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    BearerToken(token): BearerToken,
) -> Result<Json<Message>, AppError> {
    state.identity.logout(&token).await?;
    tracing::info!(%user_id, "User logged out");
    Ok(Json(Message::new("Logged out")))
}
