//! Router configuration for the interactions endpoint.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::interactions::{health_check, interactions, AppState};

/// Create the interactions router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/interactions", post(interactions))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the full application router.
pub fn create_app(app_state: Arc<AppState>) -> Router {
    create_router(app_state).merge(create_health_router())
}
