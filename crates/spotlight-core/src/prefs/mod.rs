//! Best-effort preference storage.
//!
//! `PreferenceStore` keeps JSON-serialized values under namespaced keys
//! on top of a `PreferenceBackend`. Reads fall back to a caller-supplied
//! default and writes quietly give up on failure; the errors below are
//! only ever logged, never returned to callers of the store.

pub mod backend;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, PreferenceBackend};
pub use store::{PreferenceStore, DEFAULT_NAMESPACE};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreferenceStoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Value could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage quota exceeded writing {key}: {needed} of {quota} bytes")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("Storage lock poisoned")]
    Poisoned,
}
