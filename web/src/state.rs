//! Application state for Axum handlers.

use book_review_auth::{AuthConfig, IdentityService};
use book_review_catalogue::{BookService, CatalogueEnvironment, ReviewService};
use book_review_core::environment::Clock;
use book_review_core::{
    BookRepository, HealthProbe, ReviewRepository, SessionStore, UserRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fmt;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Every field is cheap to clone; Axum clones the state per request.
#[derive(Clone)]
pub struct AppState {
    /// Catalogue operations.
    pub books: BookService,
    /// Review operations (with rating aggregation).
    pub reviews: ReviewService,
    /// Registration, login and token checks.
    pub identity: IdentityService,
    /// Store readiness probe for `/health/ready`.
    pub health: Arc<dyn HealthProbe>,
    /// Prometheus handle rendered by `/metrics`, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build every service over a single store implementing all contracts.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>, clock: Arc<dyn Clock>, auth: AuthConfig) -> Self
    where
        S: BookRepository
            + ReviewRepository
            + UserRepository
            + SessionStore
            + HealthProbe
            + 'static,
    {
        let env = CatalogueEnvironment::from_store(Arc::clone(&store), Arc::clone(&clock));
        let identity = IdentityService::new(
            Arc::clone(&store) as Arc<dyn UserRepository>,
            Arc::clone(&store) as Arc<dyn SessionStore>,
            clock,
            auth,
        );

        Self {
            books: BookService::new(env.clone()),
            reviews: ReviewService::new(env),
            identity,
            health: store,
            metrics: None,
        }
    }

    /// Attach the Prometheus handle served at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("books", &self.books)
            .field("reviews", &self.reviews)
            .field("identity", &self.identity)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
