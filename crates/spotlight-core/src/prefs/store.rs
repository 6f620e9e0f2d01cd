use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{MemoryBackend, PreferenceBackend, PreferenceStoreError};

/// Prefix applied to every key so other users of the same storage are left alone.
pub const DEFAULT_NAMESPACE: &str = "artistSpotlight_";

/// Namespaced JSON key-value store that never fails its callers.
/// Clone is cheap and clones share the same backend.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn PreferenceBackend>,
    namespace: String,
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn PreferenceBackend>) -> Self {
        Self::with_namespace(backend, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(backend: Arc<dyn PreferenceBackend>, namespace: &str) -> Self {
        Self {
            backend,
            namespace: namespace.to_string(),
        }
    }

    /// A store on a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Read `key`, or `default` when it is missing, unreadable or of another shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "Could not read preference, using default");
                default
            }
        }
    }

    /// Replace the value stored at `key`. Failures are logged and dropped;
    /// the return value only reports whether the write landed.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Could not save preference");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(&self.full_key(key)) {
            warn!(key, error = %e, "Could not remove preference");
        }
    }

    /// Remove every key in this store's namespace, leaving other keys untouched.
    pub fn clear(&self) {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Could not list preferences to clear");
                return;
            }
        };
        let mut removed = 0usize;
        for key in keys.iter().filter(|k| k.starts_with(&self.namespace)) {
            match self.backend.remove(key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %key, error = %e, "Could not remove preference"),
            }
        }
        debug!(removed, namespace = %self.namespace, "Cleared preferences");
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PreferenceStoreError> {
        match self.backend.read(&self.full_key(key))? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PreferenceStoreError> {
        let text = serde_json::to_string(value)?;
        self.backend.write(&self.full_key(key), &text)
    }
}
