//! HTTP request handlers for the realtime relay.
//!
//! Each relay handler performs exactly one upstream call through
//! [`RelayClient`] and maps its outcome to a status/body pair.

use crate::api::models::{ErrorResponse, HealthResponse, KeyCheck, SessionErrorResponse};
use crate::core::config::{ApiKey, AppConfig};
use crate::core::error::{AppError, RelayError, Result};
use crate::services::relay::{RelayClient, SessionCreated};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub relay: RelayClient,
}

impl AppState {
    pub fn new(config: AppConfig, http_client: reqwest::Client) -> Self {
        let relay = RelayClient::from_config(&config, http_client);
        Self { config, relay }
    }
}

/// Create an ephemeral realtime session.
///
/// Any request body is ignored; model and voice come from configuration.
#[utoipa::path(
    post,
    path = "/session",
    tag = "realtime",
    responses(
        (status = 200, description = "Upstream session object, relayed verbatim"),
        (status = 401, description = "Upstream rejected the request", body = SessionErrorResponse),
        (status = 500, description = "Upstream unreachable or response malformed", body = SessionErrorResponse)
    )
)]
pub async fn create_session(State(state): State<Arc<AppState>>) -> Response {
    let key = state.relay.api_key();
    match state.relay.create_session().await {
        Ok(created) => session_response(created, key),
        Err(e) => session_error_response(&e, key),
    }
}

fn session_response(created: SessionCreated, key: &ApiKey) -> Response {
    (
        created.status,
        [(header::CONTENT_TYPE, "application/json")],
        key.redact_bytes(created.body),
    )
        .into_response()
}

/// Map a failed session call to the caller-facing response.
pub fn session_error_response(err: &RelayError, key: &ApiKey) -> Response {
    let details = key.redact(err.detail()).into_owned();
    let body = match err {
        RelayError::Upstream { .. } => SessionErrorResponse::upstream(details),
        RelayError::Local(_) => SessionErrorResponse::local(details),
    };
    (err.status(), Json(body)).into_response()
}

/// Report whether the configured API key is accepted upstream.
#[utoipa::path(
    get,
    path = "/check-api-key",
    tag = "realtime",
    responses(
        (status = 200, description = "Check ran; see `valid`", body = KeyCheck),
        (status = 500, description = "Upstream unreachable or response malformed", body = ErrorResponse)
    )
)]
pub async fn check_api_key(State(state): State<Arc<AppState>>) -> Response {
    match state.relay.list_models().await {
        Ok(check) => Json(check).into_response(),
        Err(e) => check_error_response(&e, state.relay.api_key()),
    }
}

/// Map a failed key check to the caller-facing response.
pub fn check_error_response(err: &RelayError, key: &ApiKey) -> Response {
    let body = ErrorResponse {
        error: key.redact(&err.to_string()).into_owned(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Basic health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response())
}
