//! API request and response models.
//!
//! Wire types for the upstream calls and for the bodies returned to callers.

use crate::core::config::Voice;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Label used when upstream rejects a session request.
pub const UPSTREAM_ERROR_LABEL: &str = "OpenAI API Error";

/// Label used when a session request fails locally.
pub const SESSION_FAILURE_LABEL: &str = "Failed to generate session token";

/// Body sent upstream to create a realtime session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "model": "gpt-4o-realtime-preview-2024-12-17",
    "voice": "alloy"
}))]
pub struct SessionRequest {
    /// Realtime model identifier
    pub model: String,

    /// Output voice
    pub voice: Voice,
}

/// Upstream model listing. Only the number of entries is used.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    pub data: Vec<serde_json::Value>,
}

/// Result of an API key check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": 200,
    "valid": true,
    "models": 42
}))]
pub struct KeyCheck {
    /// HTTP status returned by the upstream model listing
    pub status: u16,

    /// Whether the upstream call succeeded
    pub valid: bool,

    /// Number of models listed; null when the key is not valid
    pub models: Option<usize>,
}

/// Error body for `POST /session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "OpenAI API Error",
    "details": "invalid_api_key"
}))]
pub struct SessionErrorResponse {
    /// Fixed error label
    pub error: String,

    /// Raw upstream error text or local failure message
    pub details: String,
}

impl SessionErrorResponse {
    pub fn upstream(details: impl Into<String>) -> Self {
        Self {
            error: UPSTREAM_ERROR_LABEL.to_string(),
            details: details.into(),
        }
    }

    pub fn local(details: impl Into<String>) -> Self {
        Self {
            error: SESSION_FAILURE_LABEL.to_string(),
            details: details.into(),
        }
    }
}

/// Error body for endpoints that report only a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"error": "fetch failed"}))]
pub struct ErrorResponse {
    pub error: String,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"status": "ok"}))]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_request_serialization() {
        let request = SessionRequest {
            model: "gpt-4o-realtime-preview-2024-12-17".to_string(),
            voice: Voice::Onyx,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"model": "gpt-4o-realtime-preview-2024-12-17", "voice": "onyx"})
        );
    }

    #[test]
    fn test_key_check_null_models() {
        let check = KeyCheck {
            status: 401,
            valid: false,
            models: None,
        };
        assert_eq!(
            serde_json::to_value(&check).unwrap(),
            json!({"status": 401, "valid": false, "models": null})
        );
    }

    #[test]
    fn test_session_error_labels() {
        assert_eq!(
            serde_json::to_value(SessionErrorResponse::upstream("invalid_api_key")).unwrap(),
            json!({"error": "OpenAI API Error", "details": "invalid_api_key"})
        );
        assert_eq!(
            serde_json::to_value(SessionErrorResponse::local("fetch failed")).unwrap(),
            json!({"error": "Failed to generate session token", "details": "fetch failed"})
        );
    }

    #[test]
    fn test_model_list_ignores_extra_fields() {
        let list: ModelList = serde_json::from_value(json!({
            "object": "list",
            "data": [{"id": "m1", "owned_by": "system"}, {"id": "m2"}]
        }))
        .unwrap();
        assert_eq!(list.data.len(), 2);
    }
}
