//! Realtime Relay - keeps the upstream API key on the server
//!
//! This library provides a small HTTP service that sits between a browser
//! client and the OpenAI API:
//!
//! - **Session minting**: `POST /session` creates an ephemeral realtime session
//!   and relays the upstream JSON verbatim
//! - **Key check**: `GET /check-api-key` reports whether the configured key is
//!   accepted by listing models
//! - **Static assets**: everything else is served from a public directory
//! - **Metrics & Monitoring**: Prometheus metrics and a health endpoint
//!
//! # Architecture
//!
//! - [`core`]: Core functionality (config, errors, logging, metrics, middleware)
//! - [`api`]: HTTP handlers, models, OpenAPI docs and the router
//! - [`services`]: The upstream relay client
//!
//! # Configuration
//!
//! Read once at startup from the environment (and `.env`):
//! - `OPENAI_API_KEY`: upstream secret key
//! - `PORT`: Server port (default: 3000)
//! - `HOST`: Server bind address (default: 0.0.0.0)
//! - `OPENAI_API_BASE`: Upstream base URL (default: https://api.openai.com/v1)
//! - `REALTIME_MODEL` / `REALTIME_VOICE`: session parameters
//! - `REQUEST_TIMEOUT_SECS`: upstream timeout, `0` to disable (default: 300)
//! - `VERIFY_SSL`: Verify SSL certificates for upstream (default: true)
//! - `PUBLIC_DIR`: static asset directory (default: public)

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use crate::api::{build_router, AppState};
pub use crate::core::{AppConfig, AppError, RelayError, Result};
pub use crate::services::RelayClient;
