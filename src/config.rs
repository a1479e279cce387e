//! Client configuration parsed from environment variables.

pub const DEFAULT_LANG: &str = "fr";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while building the client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required env var {var}")]
    MissingVar { var: String },
}

/// Request/connect timeouts applied to every outbound HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Typed client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base REST URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Language loaded when no preference has been persisted yet.
    pub default_lang: String,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build a config with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            default_lang: DEFAULT_LANG.to_string(),
            timeouts: Timeouts::default(),
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `BACKEND_API_URL`: base REST URL of the backend
    ///
    /// Optional:
    /// - `DEFAULT_LANG`: default `fr`
    /// - `REQUEST_TIMEOUT_SECS`: default 30
    /// - `CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("BACKEND_API_URL")
            .map_err(|_| ConfigError::MissingVar { var: "BACKEND_API_URL".into() })?;
        let default_lang = std::env::var("DEFAULT_LANG").unwrap_or_else(|_| DEFAULT_LANG.to_string());
        let timeouts = Timeouts {
            request_secs: env_parse_u64("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url: normalize_base_url(base_url), default_lang, timeouts })
    }
}

fn normalize_base_url(raw: String) -> String {
    raw.trim_end_matches('/').to_string()
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
