//! Prometheus recorder installation.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the global Prometheus recorder and describe every counter.
///
/// Call once per process; the handle renders the `/metrics` body.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] when a recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    book_review_catalogue::metrics::describe();
    book_review_auth::service::describe_metrics();

    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}
