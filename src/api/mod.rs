//! API layer for the realtime relay.
//!
//! This module contains the HTTP handlers, request/response models,
//! OpenAPI docs and the router that ties them together.

pub mod docs;
pub mod handlers;
pub mod models;

use crate::core::middleware::{request_id_middleware, MetricsMiddleware};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

// Re-export commonly used types
pub use docs::ApiDoc;
pub use handlers::{check_api_key, create_session, health, metrics_handler, AppState};
pub use models::{ErrorResponse, HealthResponse, KeyCheck, SessionErrorResponse, SessionRequest};

/// Build the router with all endpoints.
///
/// Unmatched paths fall through to static files under `config.public_dir`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.public_dir);

    Router::new()
        .route("/session", post(create_session))
        .route("/check-api-key", get(check_api_key))
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .merge(docs::swagger_ui())
        .fallback_service(static_files)
        .with_state(state)
        .layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}
