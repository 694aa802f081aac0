//! HTTP middleware for request ids and request metrics.

use crate::core::logging::{generate_request_id, REQUEST_ID};
use crate::core::metrics::get_metrics;
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Header carrying the request id on both requests and responses.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Routes reported under their own label; everything else is a static asset.
const API_ENDPOINTS: &[&str] = &[
    "/session",
    "/check-api-key",
    "/health",
    "/metrics",
];

/// Normalize a request path into a bounded metrics label.
pub fn endpoint_label(path: &str) -> &'static str {
    API_ENDPOINTS
        .iter()
        .find(|endpoint| **endpoint == path)
        .copied()
        .unwrap_or("static")
}

/// Assign a request id and run the rest of the stack inside its scope.
///
/// A valid inbound `x-request-id` is reused; otherwise a UUID is generated.
/// The id is echoed on the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let mut response = REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(X_REQUEST_ID), value);
    }

    response
}

/// Holds one slot of the `active_requests` gauge until dropped.
///
/// Dropping covers the case where the client disconnects and axum drops the
/// request future before the handler finishes.
struct ActiveRequestGuard {
    endpoint: &'static str,
}

impl ActiveRequestGuard {
    fn new(endpoint: &'static str) -> Self {
        get_metrics()
            .active_requests
            .with_label_values(&[endpoint])
            .inc();
        Self { endpoint }
    }
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        get_metrics()
            .active_requests
            .with_label_values(&[self.endpoint])
            .dec();
    }
}

/// Middleware for tracking request metrics.
pub struct MetricsMiddleware;

impl MetricsMiddleware {
    /// Track metrics for incoming requests.
    ///
    /// Increments the active request gauge, measures duration, records the
    /// request count by status code and logs one line per API request.
    pub async fn track_metrics(request: Request, next: Next) -> Response {
        let path = request.uri().path().to_string();
        let method = request.method().to_string();

        // Skip metrics endpoint itself to avoid recursion
        if path == "/metrics" {
            return next.run(request).await;
        }

        let endpoint = endpoint_label(&path);
        let metrics = get_metrics();

        let _active = ActiveRequestGuard::new(endpoint);

        let start = Instant::now();
        let response = next.run(request).await;
        let duration = start.elapsed().as_secs_f64();
        let status_code = response.status().as_u16().to_string();

        metrics
            .request_count
            .with_label_values(&[&method, endpoint, &status_code])
            .inc();
        metrics
            .request_duration
            .with_label_values(&[&method, endpoint])
            .observe(duration);

        if endpoint == "static" {
            tracing::debug!(
                "{} {} - status={} duration={:.3}s",
                method,
                path,
                status_code,
                duration
            );
        } else {
            tracing::info!(
                "{} {} - status={} duration={:.3}s",
                method,
                path,
                status_code,
                duration
            );
        }

        response
    }
}
