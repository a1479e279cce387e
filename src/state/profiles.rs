//! Lazy per-role profile resolution.
//!
//! A user account may own up to four role-scoped profiles (client,
//! delivery person, provider, trader). Ids are discovered opportunistically:
//! the persisted map is checked first, and on a miss the namespace endpoint
//! is queried once. A resolved id is trusted for the rest of the session —
//! nothing invalidates it except [`ProfileRegistry::clear`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::net::api::ApiClient;
use crate::net::types::ProfileResponse;
use crate::session::TokenStore;
use crate::state::{Events, StateEvent, emit};
use crate::storage::{PROFILE_IDS_KEY, Storage};

/// Errors produced by profile resolution.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// No access token is stored, so no lookup can be authenticated.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The account owns no profile in this namespace (or the lookup failed,
    /// which the platform treats the same way).
    #[error("no {0} profile for this account")]
    Denied(ProfileKind),
}

/// The four role namespaces a user may hold a profile in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Client,
    DeliveryPerson,
    Provider,
    Trader,
}

impl ProfileKind {
    /// Backend lookup endpoint for this namespace.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Client => "/auth/me/clients",
            Self::DeliveryPerson => "/auth/me/delivery-persons",
            Self::Provider => "/auth/me/providers",
            Self::Trader => "/auth/me/traders",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Client => "client",
            Self::DeliveryPerson => "delivery person",
            Self::Provider => "provider",
            Self::Trader => "trader",
        };
        f.write_str(label)
    }
}

/// Resolved profile ids per namespace. Persisted as a camelCase JSON blob
/// under the `profileIds` storage key, the format the platform has always
/// used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileIds {
    pub client_id: Option<i64>,
    pub delivery_person_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub trader_id: Option<i64>,
}

impl ProfileIds {
    #[must_use]
    pub fn get(&self, kind: ProfileKind) -> Option<i64> {
        match kind {
            ProfileKind::Client => self.client_id,
            ProfileKind::DeliveryPerson => self.delivery_person_id,
            ProfileKind::Provider => self.provider_id,
            ProfileKind::Trader => self.trader_id,
        }
    }

    fn set(&mut self, kind: ProfileKind, id: i64) {
        match kind {
            ProfileKind::Client => self.client_id = Some(id),
            ProfileKind::DeliveryPerson => self.delivery_person_id = Some(id),
            ProfileKind::Provider => self.provider_id = Some(id),
            ProfileKind::Trader => self.trader_id = Some(id),
        }
    }
}

/// Profile-id map with lazy API-backed resolution.
#[derive(Clone)]
pub struct ProfileRegistry {
    ids: Arc<RwLock<ProfileIds>>,
    storage: Arc<dyn Storage>,
    events: Events,
}

impl ProfileRegistry {
    /// Build the registry, loading any persisted map. A malformed blob is
    /// logged and replaced with an empty map.
    pub(crate) fn load(storage: Arc<dyn Storage>, events: Events) -> Self {
        let ids = storage
            .get(PROFILE_IDS_KEY)
            .and_then(|raw| match serde_json::from_str::<ProfileIds>(&raw) {
                Ok(ids) => Some(ids),
                Err(e) => {
                    tracing::warn!(error = %e, "persisted profile map malformed, starting empty");
                    None
                }
            })
            .unwrap_or_default();
        Self { ids: Arc::new(RwLock::new(ids)), storage, events }
    }

    /// Current snapshot of the map.
    pub async fn ids(&self) -> ProfileIds {
        self.ids.read().await.clone()
    }

    /// Resolve the profile id for `kind`, querying the backend on a miss.
    ///
    /// A successful lookup sets exactly that namespace's field and persists
    /// the map. Any lookup failure leaves the map unchanged and is reported
    /// as [`ProfileError::Denied`].
    pub async fn ensure(
        &self,
        api: &ApiClient,
        tokens: &TokenStore,
        kind: ProfileKind,
    ) -> Result<i64, ProfileError> {
        if let Some(id) = self.ids.read().await.get(kind) {
            return Ok(id);
        }

        let access = tokens.access().ok_or(ProfileError::NotAuthenticated)?;
        let resolved = match api.get::<ProfileResponse>(kind.endpoint(), Some(&access)).await {
            Ok(Some(profile)) => profile.id,
            Ok(None) => {
                tracing::debug!(%kind, "profile lookup returned no body");
                return Err(ProfileError::Denied(kind));
            }
            Err(e) => {
                tracing::debug!(%kind, error = %e, "profile lookup failed");
                return Err(ProfileError::Denied(kind));
            }
        };

        let snapshot = {
            let mut ids = self.ids.write().await;
            ids.set(kind, resolved);
            ids.clone()
        };
        self.persist(&snapshot);
        emit(&self.events, StateEvent::ProfilesChanged);
        Ok(resolved)
    }

    /// Forget every resolved id, in memory and on disk.
    pub async fn clear(&self) {
        *self.ids.write().await = ProfileIds::default();
        self.storage.remove(PROFILE_IDS_KEY);
        emit(&self.events, StateEvent::ProfilesChanged);
    }

    fn persist(&self, ids: &ProfileIds) {
        match serde_json::to_string(ids) {
            Ok(json) => self.storage.set(PROFILE_IDS_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "profile map serialize failed"),
        }
    }
}

#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;
