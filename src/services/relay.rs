//! Outbound calls to the upstream API with server-side credential injection.
//!
//! [`RelayClient`] is the only place the secret key leaves the process. Every
//! call reduces the upstream response to `Ok(..)` or a [`RelayError`], so
//! handlers never deal with transport details.

use crate::api::models::{KeyCheck, ModelList, SessionRequest};
use crate::core::config::{ApiKey, AppConfig, RealtimeConfig};
use crate::core::error::{AppError, RelayError};
use crate::core::logging::get_request_id;
use crate::core::metrics::get_metrics;
use axum::http::StatusCode;
use bytes::Bytes;
use std::time::Instant;

/// Beta opt-in header required by the realtime session endpoint.
pub const OPENAI_BETA_HEADER: &str = "OpenAI-Beta";
pub const OPENAI_BETA_REALTIME: &str = "realtime=v1";

const OP_CREATE_SESSION: &str = "create_session";
const OP_LIST_MODELS: &str = "list_models";

/// Build the shared outbound HTTP client.
///
/// The timeout covers the whole upstream round trip; when it elapses the call
/// surfaces as [`RelayError::Local`].
pub fn build_http_client(config: &AppConfig) -> Result<reqwest::Client, AppError> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.verify_ssl)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60));

    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

/// Successful session creation: upstream status and untouched JSON body.
#[derive(Debug, Clone)]
pub struct SessionCreated {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Client for the upstream API.
#[derive(Clone)]
pub struct RelayClient {
    http_client: reqwest::Client,
    api_base: String,
    api_key: ApiKey,
    realtime: RealtimeConfig,
}

impl RelayClient {
    pub fn new(
        http_client: reqwest::Client,
        api_base: impl Into<String>,
        api_key: ApiKey,
        realtime: RealtimeConfig,
    ) -> Self {
        Self {
            http_client,
            api_base: api_base.into(),
            api_key,
            realtime,
        }
    }

    pub fn from_config(config: &AppConfig, http_client: reqwest::Client) -> Self {
        Self::new(
            http_client,
            config.upstream.api_base.clone(),
            config.api_key.clone(),
            config.realtime.clone(),
        )
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Mint an ephemeral realtime session using the configured model and voice.
    pub async fn create_session(&self) -> Result<SessionCreated, RelayError> {
        let url = format!("{}/realtime/sessions", self.api_base);
        let payload = SessionRequest {
            model: self.realtime.model.clone(),
            voice: self.realtime.voice,
        };

        let start = Instant::now();
        let result = self.send_create_session(&url, &payload).await;
        self.record(OP_CREATE_SESSION, start, &result);

        let request_id = get_request_id();
        match &result {
            Ok(created) => {
                let body = String::from_utf8_lossy(&created.body);
                tracing::info!(
                    request_id = %request_id,
                    status = %created.status,
                    session = %self.api_key.redact(&body),
                    "Session created"
                );
            }
            Err(e) if e.is_upstream() => {
                tracing::error!(
                    request_id = %request_id,
                    status = %e.status(),
                    details = %self.api_key.redact(e.detail()),
                    "OpenAI API Error"
                );
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    url = %url,
                    error = %self.api_key.redact(e.detail()),
                    "Error generating session token"
                );
            }
        }

        result
    }

    async fn send_create_session(
        &self,
        url: &str,
        payload: &SessionRequest,
    ) -> Result<SessionCreated, RelayError> {
        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose())
            .header(OPENAI_BETA_HEADER, OPENAI_BETA_REALTIME)
            .json(payload)
            .send()
            .await?;

        let status = to_status(response.status());
        if !status.is_success() {
            let body = response.text().await?;
            return Err(RelayError::Upstream { status, body });
        }

        let body = response.bytes().await?;
        // The body is relayed as-is, but it must at least be JSON.
        serde_json::from_slice::<serde_json::Value>(&body)?;

        Ok(SessionCreated { status, body })
    }

    /// Check the key by listing models.
    ///
    /// A non-2xx upstream status is a valid answer (`valid: false`), not an error.
    pub async fn list_models(&self) -> Result<KeyCheck, RelayError> {
        let url = format!("{}/models", self.api_base);

        let start = Instant::now();
        let result = self.send_list_models(&url).await;
        self.record(OP_LIST_MODELS, start, &result);

        let request_id = get_request_id();
        match &result {
            Ok(check) => {
                tracing::info!(
                    request_id = %request_id,
                    status = check.status,
                    valid = check.valid,
                    models = ?check.models,
                    "API key checked"
                );
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    url = %url,
                    error = %self.api_key.redact(e.detail()),
                    "Error checking API key"
                );
            }
        }

        result
    }

    async fn send_list_models(&self, url: &str) -> Result<KeyCheck, RelayError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.api_key.expose())
            .send()
            .await?;

        let status = to_status(response.status());
        if !status.is_success() {
            return Ok(KeyCheck {
                status: status.as_u16(),
                valid: false,
                models: None,
            });
        }

        let body = response.bytes().await?;
        let list: ModelList = serde_json::from_slice(&body)?;

        Ok(KeyCheck {
            status: status.as_u16(),
            valid: true,
            models: Some(list.data.len()),
        })
    }

    fn record<T>(&self, operation: &str, start: Instant, result: &Result<T, RelayError>) {
        let metrics = get_metrics();
        let outcome = match result {
            Ok(_) => "ok",
            Err(RelayError::Upstream { .. }) => "upstream_error",
            Err(RelayError::Local(_)) => "local_error",
        };
        metrics
            .upstream_requests
            .with_label_values(&[operation, outcome])
            .inc();
        metrics
            .upstream_latency
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
    }
}

/// reqwest and axum depend on different `http` major versions.
fn to_status(status: reqwest::StatusCode) -> StatusCode {
    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
}
