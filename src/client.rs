//! The top-level client aggregate.
//!
//! DESIGN
//! ======
//! One `Client` owns every state container and the API client, and is
//! passed by reference wherever the original front-end reached for a
//! global store. Observers subscribe to the broadcast event channel
//! instead of store subscriptions. Mutation inside the containers is
//! last-write-wins; callers await network operations before reading
//! dependent state.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::i18n::I18n;
use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{MessageResponse, TokenPair, User};
use crate::session::{Session, SessionError};
use crate::state::notifications::Notifications;
use crate::state::profiles::{ProfileError, ProfileKind, ProfileRegistry};
use crate::state::tour::Tour;
use crate::state::{Events, StateEvent};
use crate::storage::Storage;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Aggregate of the platform client's state and operations.
pub struct Client {
    config: ClientConfig,
    api: ApiClient,
    pub session: Session,
    pub profiles: ProfileRegistry,
    pub notifications: Notifications,
    pub i18n: I18n,
    pub tour: Tour,
    fallback_url: Mutex<String>,
    events: Events,
}

impl Client {
    /// Wire up a client over the given storage backend.
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            session: Session::new(storage.clone(), events.clone()),
            profiles: ProfileRegistry::load(storage.clone(), events.clone()),
            notifications: Notifications::new(events.clone()),
            i18n: I18n::new(storage.clone(), events.clone(), &config.default_lang),
            tour: Tour::new(storage),
            fallback_url: Mutex::new(String::new()),
            config,
            api,
            events,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Subscribe to state-change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, SessionError> {
        self.session.login(&self.api, email, password).await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<TokenPair, SessionError> {
        self.session
            .register(&self.api, email, password, first_name, last_name)
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, SessionError> {
        self.session.forgot_password(&self.api, email).await
    }

    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<MessageResponse, SessionError> {
        self.session.reset_password(&self.api, reset_token, new_password).await
    }

    /// Validate the session, refreshing the access token when it is close
    /// to expiry. See [`Session::check_auth`].
    pub async fn check_auth(&self) -> bool {
        self.session.check_auth(&self.api).await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.user().await
    }

    /// Sign out: drop tokens, the user record, and the resolved profiles.
    pub async fn logout(&self) {
        self.session.clear().await;
        self.profiles.clear().await;
    }

    // =========================================================================
    // PROFILES / I18N
    // =========================================================================

    /// Resolve the current user's profile id in `kind`'s namespace.
    pub async fn ensure_profile(&self, kind: ProfileKind) -> Result<i64, ProfileError> {
        self.profiles.ensure(&self.api, self.session.tokens(), kind).await
    }

    /// Load and activate the translation catalog for `lang`.
    pub async fn load_lang(&self, lang: &str) {
        self.i18n.load(&self.api, lang).await;
    }

    // =========================================================================
    // FALLBACK URL
    // =========================================================================

    /// Remember the URL a guard bounced the user away from.
    pub fn save_fallback_url(&self, url: &str) {
        if let Ok(mut fallback) = self.fallback_url.lock() {
            *fallback = url.to_string();
        }
    }

    /// Return and clear the saved fallback URL. Empty when none was saved.
    pub fn take_fallback_url(&self) -> String {
        self.fallback_url
            .lock()
            .map(|mut fallback| std::mem::take(&mut *fallback))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
