//! Persisted key-value storage.
//!
//! DESIGN
//! ======
//! The original front-end persisted state to browser `localStorage` as a
//! side effect of store subscribers. Here persistence is an explicit step:
//! the mutating call writes through a [`Storage`] handle. `MemoryStorage`
//! backs tests and ephemeral sessions; `FileStorage` keeps a JSON object on
//! disk and rewrites it on every mutation, matching localStorage's
//! best-effort, never-fails-the-caller behavior.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Storage key for the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Storage key for the persisted profile-id map (JSON blob).
pub const PROFILE_IDS_KEY: &str = "profileIds";
/// Storage key for the selected language.
pub const LANG_KEY: &str = "lang";
/// Storage key for the onboarding-tour-seen flag.
pub const TUTORIAL_SEEN_KEY: &str = "tutorialSeen";

/// String key-value persistence, localStorage-style.
///
/// Writes are best-effort and never fail the caller.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// In-memory storage for tests and sessions without persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.remove(key);
        }
    }
}

// =============================================================================
// FILE STORAGE
// =============================================================================

/// File-backed storage holding a single flat JSON object.
pub struct FileStorage {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open storage at `path`, loading any existing content.
    ///
    /// A missing or malformed file starts empty; the malformed case is
    /// logged and the file is overwritten on the next mutation.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let map = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "storage file malformed, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, map: Mutex::new(map) }
    }

    fn flush(&self, map: &HashMap<String, String>) {
        let json = match serde_json::to_string_pretty(map) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "storage serialize failed");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), error = %e, "storage write failed");
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_string(), value.to_string());
            self.flush(&map);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.remove(key);
            self.flush(&map);
        }
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
