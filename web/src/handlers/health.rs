//! Health, metrics and welcome endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Liveness probe.
///
/// Returns 200 OK while the process is serving. Does NOT touch the store.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report.
#[derive(Debug, Serialize)]
pub struct Readiness {
    /// `"ready"` or `"unavailable"`.
    pub status: &'static str,
    /// Failure detail when the store did not answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness probe: pings the store.
///
/// - 200 OK: store answered
/// - 503 Service Unavailable: store unreachable
///
/// ```text
/// GET /health/ready
/// ```
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Readiness {
                status: "ready",
                message: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    status: "unavailable",
                    message: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Prometheus exposition.
///
/// 404 when no recorder was installed for this process.
///
/// ```text
/// GET /metrics
/// ```
#[allow(clippy::unused_async)]
pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    state.metrics.as_ref().map_or_else(
        || (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
        |handle| (StatusCode::OK, handle.render()),
    )
}

/// Root greeting.
#[allow(clippy::unused_async)]
pub async fn welcome() -> &'static str {
    "Welcome to the Book Review API!"
}
