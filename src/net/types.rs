//! Backend wire types shared across the networking and session layers.

use serde::{Deserialize, Serialize};

/// Access/refresh token pair returned by login and register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response of `POST /auth/refresh` — only the access token is minted anew.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// The authenticated account, as returned by `GET /auth/me`.
///
/// Held in memory for the session only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Generic `{ "message": ... }` acknowledgment body.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Role-scoped profile lookup response (`GET /auth/me/{namespace}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
}

/// One field-level error inside a structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Structured error body the backend attaches to non-2xx responses.
/// Both fields are optional; absent or unparsable bodies fall back to a
/// default message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub errors: Option<Vec<FieldError>>,
}
