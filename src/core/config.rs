//! Configuration management for the realtime relay.
//!
//! Configuration is read once at startup from environment variables (a `.env`
//! file is loaded first by the binary) and is immutable afterwards. Handlers
//! receive it through shared state rather than reading the environment.

use crate::core::error::AppError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use utoipa::ToSchema;

/// Placeholder substituted for the secret key wherever it would be emitted.
pub const REDACTED: &str = "[REDACTED]";

/// Server-held upstream API key.
///
/// `Debug` and `Display` never print the key, so it is safe to log an
/// [`AppConfig`] or to format this value by accident.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building the upstream `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace every occurrence of the key in `text` with [`REDACTED`].
    ///
    /// Borrows when there is nothing to replace.
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.0.is_empty() || !text.contains(self.0.as_str()) {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.replace(self.0.as_str(), REDACTED))
        }
    }

    /// Byte-level variant of [`ApiKey::redact`] for pass-through bodies.
    pub fn redact_bytes(&self, body: Bytes) -> Bytes {
        let needle = self.0.as_bytes();
        if needle.is_empty() || !body.windows(needle.len()).any(|w| w == needle) {
            return body;
        }

        let mut out = Vec::with_capacity(body.len());
        let mut rest: &[u8] = &body;
        while let Some(pos) = rest.windows(needle.len()).position(|w| w == needle) {
            out.extend_from_slice(&rest[..pos]);
            out.extend_from_slice(REDACTED.as_bytes());
            rest = &rest[pos + needle.len()..];
        }
        out.extend_from_slice(rest);
        Bytes::from(out)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Voices offered by the realtime API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "REALTIME_VOICE must be one of alloy, echo, fable, onyx, nova, shimmer; got '{}'",
                    s
                ))
            })
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Secret key injected into every upstream request
    pub api_key: ApiKey,

    /// Server configuration (host, port)
    pub server: ServerConfig,

    /// Upstream API location
    pub upstream: UpstreamConfig,

    /// Fixed parameters for realtime session creation
    pub realtime: RealtimeConfig,

    /// Upstream request timeout in seconds; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,

    /// Whether to verify SSL certificates for upstream requests
    pub verify_ssl: bool,

    /// Directory of static assets served as the fallback route
    pub public_dir: PathBuf,
}

/// Server-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API, without a trailing slash
    pub api_base: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub model: String,
    pub voice: Voice,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            model: default_realtime_model(),
            voice: Voice::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_realtime_model() -> String {
    "gpt-4o-realtime-preview-2024-12-17".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl AppConfig {
    /// Load configuration from process environment variables.
    ///
    /// Recognised variables: `OPENAI_API_KEY`, `HOST`, `PORT`,
    /// `OPENAI_API_BASE`, `REALTIME_MODEL`, `REALTIME_VOICE`,
    /// `REQUEST_TIMEOUT_SECS` (`0` disables the timeout), `VERIFY_SSL`
    /// and `PUBLIC_DIR`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = ApiKey::new(get("OPENAI_API_KEY").unwrap_or_default());

        let mut server = ServerConfig::default();
        if let Some(host) = get("HOST") {
            server.host = host;
        }
        if let Some(port) = get("PORT") {
            server.port = port.parse::<u16>().map_err(|_| {
                AppError::Config(format!("PORT must be a valid port number, got '{}'", port))
            })?;
        }

        let upstream = UpstreamConfig {
            api_base: get("OPENAI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(default_api_base),
        };

        let realtime = RealtimeConfig {
            model: get("REALTIME_MODEL").unwrap_or_else(default_realtime_model),
            voice: get("REALTIME_VOICE")
                .map(|v| v.parse::<Voice>())
                .transpose()?
                .unwrap_or_default(),
        };

        let timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!(
                    "REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => default_request_timeout(),
        };

        Ok(Self {
            api_key,
            server,
            upstream,
            realtime,
            request_timeout_secs: (timeout > 0).then_some(timeout),
            verify_ssl: get("VERIFY_SSL").map(|v| str_to_bool(&v)).unwrap_or(true),
            public_dir: get("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_public_dir),
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.api_key.is_empty());
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.api_base, "https://api.openai.com/v1");
        assert_eq!(config.realtime.model, "gpt-4o-realtime-preview-2024-12-17");
        assert_eq!(config.realtime.voice, Voice::Alloy);
        assert_eq!(config.request_timeout_secs, Some(300));
        assert!(config.verify_ssl);
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("OPENAI_API_BASE", "http://localhost:9000/v1/"),
            ("REALTIME_MODEL", "gpt-4o-mini-realtime-preview"),
            ("REALTIME_VOICE", "Shimmer"),
            ("REQUEST_TIMEOUT_SECS", "15"),
            ("VERIFY_SSL", "off"),
            ("PUBLIC_DIR", "/srv/www"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.expose(), "sk-test");
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.upstream.api_base, "http://localhost:9000/v1");
        assert_eq!(config.realtime.model, "gpt-4o-mini-realtime-preview");
        assert_eq!(config.realtime.voice, Voice::Shimmer);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert!(!config.verify_ssl);
        assert_eq!(config.public_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[("PORT", "  "), ("HOST", "")])).unwrap();
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_invalid_port() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "abc")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_invalid_voice() {
        let err = AppConfig::from_lookup(lookup_from(&[("REALTIME_VOICE", "robot")])).unwrap_err();
        assert!(err.to_string().contains("robot"));
    }

    #[test]
    fn test_invalid_timeout() {
        let result = AppConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "-1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_voice_parse_and_serialize() {
        for voice in Voice::ALL {
            assert_eq!(voice.as_str().parse::<Voice>().unwrap(), voice);
            assert_eq!(
                serde_json::to_value(voice).unwrap(),
                serde_json::json!(voice.as_str())
            );
        }
        assert_eq!(" NOVA ".parse::<Voice>().unwrap(), Voice::Nova);
    }

    #[test]
    fn test_api_key_never_formatted() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-very-secret")])).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains(REDACTED));
        assert_eq!(config.api_key.to_string(), REDACTED);
    }

    #[test]
    fn test_redact() {
        let key = ApiKey::new("sk-abc");
        assert_eq!(key.redact("no secret here"), "no secret here");
        assert!(matches!(key.redact("no secret here"), Cow::Borrowed(_)));
        assert_eq!(
            key.redact("bad key sk-abc, again sk-abc"),
            "bad key [REDACTED], again [REDACTED]"
        );
    }

    #[test]
    fn test_redact_with_empty_key_is_noop() {
        let key = ApiKey::default();
        assert_eq!(key.redact("anything"), "anything");
        assert_eq!(
            key.redact_bytes(Bytes::from_static(b"anything")),
            Bytes::from_static(b"anything")
        );
    }

    #[test]
    fn test_redact_bytes() {
        let key = ApiKey::new("sk-abc");
        let body = Bytes::from_static(br#"{"echo":"sk-abc","n":1}"#);
        assert_eq!(
            key.redact_bytes(body),
            Bytes::from_static(br#"{"echo":"[REDACTED]","n":1}"#)
        );

        let untouched = Bytes::from_static(br#"{"id":"sess_123"}"#);
        assert_eq!(key.redact_bytes(untouched.clone()), untouched);
    }

    #[test]
    fn test_str_to_bool() {
        assert!(str_to_bool("true"));
        assert!(str_to_bool("TRUE"));
        assert!(str_to_bool("1"));
        assert!(str_to_bool("yes"));
        assert!(str_to_bool("On"));
        assert!(!str_to_bool("false"));
        assert!(!str_to_bool("0"));
        assert!(!str_to_bool("no"));
        assert!(!str_to_bool(""));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "sk-from-env");
            std::env::set_var("PORT", "4321");
            std::env::remove_var("REALTIME_VOICE");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.api_key.expose(), "sk-from-env");
        assert_eq!(config.server.port, 4321);
        assert_eq!(config.realtime.voice, Voice::Alloy);

        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
            std::env::remove_var("PORT");
        }
    }
}
