//! Translation lookup with parameter interpolation.
//!
//! A language's catalog is fetched wholesale from `GET /langs/{lang}` as a
//! nested JSON document, flattened to dot-separated keys, and swapped in as
//! a unit — no merge semantics. A missing key resolves to the bracketed
//! sentinel `"[key]"` so untranslated strings stay visible instead of
//! failing silently.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::net::api::ApiClient;
use crate::state::{Events, StateEvent, emit};
use crate::storage::{LANG_KEY, Storage};

/// Translation catalog plus the persisted language preference.
#[derive(Clone)]
pub struct I18n {
    translations: Arc<RwLock<HashMap<String, String>>>,
    lang: Arc<RwLock<String>>,
    storage: Arc<dyn Storage>,
    events: Events,
}

impl I18n {
    /// Build the store; the language preference comes from storage, falling
    /// back to `default_lang`. No catalog is loaded yet.
    pub(crate) fn new(storage: Arc<dyn Storage>, events: Events, default_lang: &str) -> Self {
        let lang = storage
            .get(LANG_KEY)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default_lang.to_string());
        Self {
            translations: Arc::new(RwLock::new(HashMap::new())),
            lang: Arc::new(RwLock::new(lang)),
            storage,
            events,
        }
    }

    /// Currently selected language.
    pub async fn lang(&self) -> String {
        self.lang.read().await.clone()
    }

    /// True once a catalog has been loaded.
    pub async fn ready(&self) -> bool {
        !self.translations.read().await.is_empty()
    }

    /// Fetch and install the catalog for `lang`, persisting the selection.
    ///
    /// On failure the previous catalog and selection stay in place; the
    /// error is logged, not propagated — a missing catalog degrades to
    /// sentinel lookups.
    pub async fn load(&self, api: &ApiClient, lang: &str) {
        let document: Option<Value> = match api.get(&format!("/langs/{lang}"), None).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(lang, error = %e, "translation catalog load failed");
                return;
            }
        };
        let Some(document) = document else {
            tracing::warn!(lang, "translation catalog was empty");
            return;
        };

        *self.translations.write().await = flatten(&document);
        *self.lang.write().await = lang.to_string();
        self.storage.set(LANG_KEY, lang);
        emit(&self.events, StateEvent::LanguageChanged(lang.to_string()));
    }

    /// Look up `key`, returning the sentinel `"[key]"` when absent.
    pub async fn t(&self, key: &str) -> String {
        self.translations
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_else(|| format!("[{key}]"))
    }

    /// Look up `key` and substitute each `{name}` placeholder literally.
    /// Unknown placeholders are left as-is; values are not escaped.
    pub async fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut text = self.t(key).await;
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

/// Flatten a nested JSON document into dot-separated string keys.
///
/// Objects recurse; everything else is a leaf. String leaves keep their
/// value verbatim, other leaves (numbers, bools, arrays, null) are
/// serialized.
#[must_use]
pub fn flatten(document: &Value) -> HashMap<String, String> {
    let mut out = HashMap::new();
    flatten_into(document, "", &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, &child_key, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

#[cfg(test)]
#[path = "i18n_test.rs"]
mod tests;
