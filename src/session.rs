//! Token store and auth/session lifecycle.
//!
//! ARCHITECTURE
//! ============
//! The access token is a JWT decoded client-side **without verification**
//! (verification is the backend's job); only its expiry and subject are
//! inspected. [`Session::check_auth`] is the single session entry point:
//! it refreshes pre-emptively when the access token expires within
//! [`REFRESH_THRESHOLD_SECS`], then fetches the current user. Any failure
//! anywhere on that path collapses to "not authenticated" and clears the
//! stored credentials. A failed refresh is terminal — no retry.
//!
//! The token pair is handled atomically: one setter stores both tokens,
//! one clearer removes both. Refresh replaces the access token only.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{MessageResponse, RefreshResponse, TokenPair, User};
use crate::state::{Events, StateEvent, emit};
use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, Storage};

/// Refresh pre-emptively when the access token expires within this window.
pub const REFRESH_THRESHOLD_SECS: u64 = 300;

/// Errors produced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No access token is stored.
    #[error("no access token stored")]
    NoAccessToken,

    /// No refresh token is stored.
    #[error("no refresh token stored")]
    NoRefreshToken,

    /// The stored access token is not a decodable JWT.
    #[error("access token decode failed: {0}")]
    TokenDecode(String),

    /// The backend answered 2xx with no body where one was required.
    #[error("empty response from {0}")]
    EmptyResponse(&'static str),

    /// The underlying REST call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

// =============================================================================
// CLAIMS
// =============================================================================

/// Claims read from the access token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject identity (user id).
    #[serde(default)]
    pub sub: String,
    /// Expiry as a UNIX timestamp in seconds.
    pub exp: u64,
}

impl Claims {
    /// Decode the payload segment of a JWT without verifying the signature.
    pub fn decode(token: &str) -> Result<Self, SessionError> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| SessionError::TokenDecode("not a JWT".to_string()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| SessionError::TokenDecode(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| SessionError::TokenDecode(e.to_string()))
    }

    /// True when `exp` is within [`REFRESH_THRESHOLD_SECS`] of `now`
    /// (already-expired tokens included).
    #[must_use]
    pub fn is_near_expiry(&self, now: u64) -> bool {
        self.exp.saturating_sub(now) < REFRESH_THRESHOLD_SECS
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// Persisted access/refresh token pair.
///
/// Empty strings are treated as absent: storing one removes the key.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
    events: Events,
}

impl TokenStore {
    pub(crate) fn new(storage: Arc<dyn Storage>, events: Events) -> Self {
        Self { storage, events }
    }

    #[must_use]
    pub fn access(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY).filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn refresh(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY).filter(|v| !v.is_empty())
    }

    /// Store both tokens in one call.
    pub fn set_pair(&self, pair: &TokenPair) {
        self.set_or_remove(ACCESS_TOKEN_KEY, &pair.access_token);
        self.set_or_remove(REFRESH_TOKEN_KEY, &pair.refresh_token);
        emit(&self.events, StateEvent::TokensChanged);
    }

    /// Replace the access token, keeping the refresh token.
    pub fn set_access(&self, token: &str) {
        self.set_or_remove(ACCESS_TOKEN_KEY, token);
        emit(&self.events, StateEvent::TokensChanged);
    }

    /// Remove both tokens.
    pub fn clear(&self) {
        self.storage.remove(ACCESS_TOKEN_KEY);
        self.storage.remove(REFRESH_TOKEN_KEY);
        emit(&self.events, StateEvent::TokensChanged);
    }

    fn set_or_remove(&self, key: &str, value: &str) {
        if value.is_empty() {
            self.storage.remove(key);
        } else {
            self.storage.set(key, value);
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Auth lifecycle operations plus the in-memory user record.
#[derive(Clone)]
pub struct Session {
    tokens: TokenStore,
    user: Arc<RwLock<Option<User>>>,
    events: Events,
}

impl Session {
    pub(crate) fn new(storage: Arc<dyn Storage>, events: Events) -> Self {
        Self {
            tokens: TokenStore::new(storage, events.clone()),
            user: Arc::new(RwLock::new(None)),
            events,
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The current user record, if a session check or login has populated it.
    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    /// `POST /auth/login`, storing the returned token pair.
    pub async fn login(&self, api: &ApiClient, email: &str, password: &str) -> Result<TokenPair, SessionError> {
        let pair: TokenPair = api
            .post("/auth/login", &json!({ "email": email, "password": password }), None)
            .await?
            .ok_or(SessionError::EmptyResponse("/auth/login"))?;
        self.tokens.set_pair(&pair);
        Ok(pair)
    }

    /// `POST /auth/register`, storing the returned token pair.
    pub async fn register(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<TokenPair, SessionError> {
        let body = json!({
            "email": email,
            "password": password,
            "first_name": first_name,
            "last_name": last_name,
        });
        let pair: TokenPair = api
            .post("/auth/register", &body, None)
            .await?
            .ok_or(SessionError::EmptyResponse("/auth/register"))?;
        self.tokens.set_pair(&pair);
        Ok(pair)
    }

    /// `POST /auth/refresh`, replacing the stored access token.
    pub async fn refresh(&self, api: &ApiClient) -> Result<(), SessionError> {
        let refresh = self.tokens.refresh().ok_or(SessionError::NoRefreshToken)?;
        let resp: RefreshResponse = api
            .post("/auth/refresh", &json!({ "refresh_token": refresh }), None)
            .await?
            .ok_or(SessionError::EmptyResponse("/auth/refresh"))?;
        self.tokens.set_access(&resp.access_token);
        Ok(())
    }

    /// `POST /auth/forgot-password`.
    pub async fn forgot_password(&self, api: &ApiClient, email: &str) -> Result<MessageResponse, SessionError> {
        api.post("/auth/forgot-password", &json!({ "email": email }), None)
            .await?
            .ok_or(SessionError::EmptyResponse("/auth/forgot-password"))
    }

    /// `POST /auth/reset-password` with the emailed reset token.
    pub async fn reset_password(
        &self,
        api: &ApiClient,
        reset_token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, SessionError> {
        api.post(
            "/auth/reset-password",
            &json!({ "resetPasswordToken": reset_token, "password": new_password }),
            None,
        )
        .await?
        .ok_or(SessionError::EmptyResponse("/auth/reset-password"))
    }

    /// `GET /auth/me`, storing the user record on success.
    pub async fn fetch_me(&self, api: &ApiClient) -> Result<User, SessionError> {
        let access = self.tokens.access().ok_or(SessionError::NoAccessToken)?;
        let user: User = api
            .get("/auth/me", Some(&access))
            .await?
            .ok_or(SessionError::EmptyResponse("/auth/me"))?;
        *self.user.write().await = Some(user.clone());
        emit(&self.events, StateEvent::SessionChanged);
        Ok(user)
    }

    /// Single session entry point.
    ///
    /// Short-circuits to `false` without an access token; otherwise decodes
    /// the token, refreshes pre-emptively when near expiry, and fetches the
    /// current user. Any failure clears the stored credentials and the user
    /// record.
    pub async fn check_auth(&self, api: &ApiClient) -> bool {
        match self.try_check_auth(api).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "auth check failed, clearing session");
                self.clear().await;
                false
            }
        }
    }

    async fn try_check_auth(&self, api: &ApiClient) -> Result<(), SessionError> {
        let access = self.tokens.access().ok_or(SessionError::NoAccessToken)?;
        let claims = Claims::decode(&access)?;
        if claims.is_near_expiry(unix_now()) {
            self.refresh(api).await?;
        }
        self.fetch_me(api).await?;
        Ok(())
    }

    /// Drop the tokens and the user record.
    pub async fn clear(&self) {
        self.tokens.clear();
        *self.user.write().await = None;
        emit(&self.events, StateEvent::SessionChanged);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
