//! Book review API server.
//!
//! Reads configuration from the environment (and `.env`), connects to
//! `PostgreSQL`, applies migrations and serves the HTTP API until SIGINT or
//! SIGTERM.

mod config;

use anyhow::Context;
use book_review_auth::{AuthConfig, IdentityService};
use book_review_core::environment::SystemClock;
use book_review_postgres::{PoolSettings, PostgresStore, RetryPolicy, connect};
use book_review_web::{AppState, build_router, install_recorder};
use config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired sessions are deleted.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,book_review=debug,sqlx=warn,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(addr = %config.server.addr(), "Starting Book Review API");

    let metrics = install_recorder().context("Failed to install metrics recorder")?;

    let settings = PoolSettings {
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        acquire_timeout: config.database.connect_timeout,
        ..PoolSettings::new(config.database.url.clone())
    };
    let policy = RetryPolicy::new().with_max_retries(config.database.connect_retries);
    let pool = connect(&settings, &policy)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let store = Arc::new(PostgresStore::new(pool));
    if config.database.run_migrations {
        store.migrate().await.context("Failed to run migrations")?;
        info!("Migrations complete");
    }

    let auth = AuthConfig::new().with_session_ttl(config.session_ttl);
    let state = AppState::from_store(Arc::clone(&store), Arc::new(SystemClock), auth)
        .with_metrics(metrics);
    let purge = tokio::spawn(purge_sessions(state.identity.clone()));

    let app = build_router(state, config.server.request_timeout);
    let listener = tokio::net::TcpListener::bind(config.server.addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr()))?;
    info!(addr = %config.server.addr(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    purge.abort();
    store.pool().close().await;
    info!("Server stopped");
    Ok(())
}

/// Periodically delete expired bearer sessions.
async fn purge_sessions(identity: IdentityService) {
    let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = identity.purge_expired_sessions().await {
            warn!(error = %e, "Session purge failed");
        }
    }
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
