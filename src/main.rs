//! Realtime Relay - Main entry point
//!
//! Loads configuration from the environment, then serves the relay endpoints
//! and the static client.

use anyhow::Result;
use chrono::Local;
use realtime_relay::{
    api::{build_router, AppState},
    core::{init_metrics, AppConfig},
    services::relay::build_http_client,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

fn init_tracing() {
    let no_color = std::env::var("NO_COLOR").is_ok();

    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,realtime_relay=debug".to_string());

    // Always suppress noisy HTTP library logs regardless of RUST_LOG setting
    let filter_str = format!(
        "{},hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn",
        base_filter
    );
    let filter = tracing_subscriber::EnvFilter::new(filter_str);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(!no_color),
        )
        .init();
}

async fn async_main() -> Result<()> {
    init_tracing();
    init_metrics();

    let config = AppConfig::from_env()?;
    if config.api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; upstream calls will be rejected");
    }

    let http_client = build_http_client(&config)?;
    let addr = config.bind_addr();

    tracing::info!(
        model = %config.realtime.model,
        voice = %config.realtime.voice,
        api_base = %config.upstream.api_base,
        timeout_secs = ?config.request_timeout_secs,
        public_dir = %config.public_dir.display(),
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(config, http_client));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("Server running on http://localhost:{}", port);
    tracing::info!("Open this URL in your browser to test the realtime chatbot");
    tracing::info!("Relay API: POST /session, GET /check-api-key");
    tracing::info!("Swagger UI: /swagger-ui");

    axum::serve(listener, app).await?;

    Ok(())
}
