//! Generic REST client wrapper.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is logged here and returned to the caller — no retry, no
//! backoff. Non-2xx responses carry the parsed body's message, the HTTP
//! status, and any field-level error list; a missing or unparsable body
//! falls back to a default message. A 204 or empty-body success decodes to
//! `Ok(None)`, never an error.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::ApiErrorBody;
use crate::config::ClientConfig;

pub use super::types::FieldError;

/// Errors produced by REST calls against the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    ClientBuild(String),

    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message} (status {status})")]
    Status {
        status: u16,
        message: String,
        /// Field-level errors from the structured body, empty when absent.
        errors: Vec<FieldError>,
    },

    /// The success body could not be deserialized.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of a [`ApiError::Status`] failure, if that is what this is.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin `reqwest` wrapper bound to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base_url}{path}`, optionally with a bearer token.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, bearer: Option<&str>) -> Result<Option<T>, ApiError> {
        self.send(Method::GET, path, None::<&()>, bearer).await
    }

    /// `POST {base_url}{path}` with a JSON body, optionally with a bearer token.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<Option<T>, ApiError> {
        self.send(Method::POST, path, Some(body), bearer).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<Option<T>, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "request transport failure");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            tracing::warn!(path, error = %e, "response body read failure");
            ApiError::Transport(e.to_string())
        })?;

        decode_body(status, &text).map_err(|e| {
            tracing::warn!(path, status, error = %e, "request failed");
            e
        })
    }
}

/// Decode a response from its status and raw body.
///
/// Split out of the request path so status/body handling is testable with
/// canned payloads.
pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<Option<T>, ApiError> {
    if !(200..300).contains(&status) {
        return Err(decode_error_body(status, body));
    }
    if status == 204 || body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) fn decode_error_body(status: u16, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).unwrap_or_default();
    ApiError::Status {
        status,
        message: parsed.message.unwrap_or_else(|| default_status_message(status)),
        errors: parsed.errors.unwrap_or_default(),
    }
}

fn default_status_message(status: u16) -> String {
    format!("request failed with status {status}")
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
