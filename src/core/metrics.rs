//! Prometheus metrics for monitoring the realtime relay.
//!
//! Tracks inbound HTTP traffic and the outbound calls made to the upstream API.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, GaugeVec, HistogramVec,
    IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of inbound requests by method, endpoint, and status
    pub request_count: IntCounterVec,

    /// Inbound request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Upstream calls by operation and outcome (`ok`, `upstream_error`, `local_error`)
    pub upstream_requests: IntCounterVec,

    /// Upstream round-trip latency histogram in seconds
    pub upstream_latency: HistogramVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// This should be called once at application startup. Subsequent calls will
/// return the same instance.
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "realtime_relay_requests_total",
            "Total number of requests",
            &["method", "endpoint", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "realtime_relay_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "realtime_relay_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let upstream_requests = register_int_counter_vec!(
            "realtime_relay_upstream_requests_total",
            "Total number of upstream API calls",
            &["operation", "outcome"]
        )
        .expect("Failed to register upstream_requests metric");

        let upstream_latency = register_histogram_vec!(
            "realtime_relay_upstream_latency_seconds",
            "Upstream API response latency in seconds",
            &["operation"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0]
        )
        .expect("Failed to register upstream_latency metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            upstream_requests,
            upstream_latency,
        }
    })
}

/// Get the global metrics instance, initializing it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}
