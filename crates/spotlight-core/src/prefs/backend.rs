use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use super::PreferenceStoreError;

/// Raw string storage underneath the preference store.
///
/// Implementations replace a key's value as a whole: a reader sees the
/// old text or the new text, never a mix.
pub trait PreferenceBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, PreferenceStoreError>;

    fn write(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError>;

    fn remove(&self, key: &str) -> Result<(), PreferenceStoreError>;

    fn keys(&self) -> Result<Vec<String>, PreferenceStoreError>;
}

/// In-process storage, optionally with a byte quota like browser storage has.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once keys plus values would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PreferenceStoreError> {
        self.entries.lock().map_err(|_| PreferenceStoreError::Poisoned)
    }
}

impl PreferenceBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, PreferenceStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError> {
        let mut entries = self.lock()?;
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > quota {
                return Err(PreferenceStoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceStoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, PreferenceStoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

/// One JSON text file per key inside a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: PathBuf) -> Result<Self, PreferenceStoreError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

impl PreferenceBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, PreferenceStoreError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError> {
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "Preference written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceStoreError> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, PreferenceStoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(key) = name.strip_suffix(".json") {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip_and_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.read("k").unwrap(), None);
        backend.write("k", "1").unwrap();
        backend.write("k", "2").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("2"));
        backend.remove("k").unwrap();
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn test_memory_quota_rejects_oversized_write() {
        let backend = MemoryBackend::with_quota(10);
        backend.write("a", "1234").unwrap();
        let err = backend.write("b", "123456789").unwrap_err();
        assert!(matches!(err, PreferenceStoreError::QuotaExceeded { .. }));
        assert_eq!(backend.read("b").unwrap(), None);
        // Replacing an existing key only counts the new value.
        backend.write("a", "12345678").unwrap();
    }

    #[test]
    fn test_file_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let backend = FileBackend::new(dir.path().to_path_buf()).unwrap();
            backend.write("artistSpotlight_visitCount", "3").unwrap();
        }
        let backend = FileBackend::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(backend.read("artistSpotlight_visitCount").unwrap().as_deref(), Some("3"));
        assert_eq!(backend.keys().unwrap(), vec!["artistSpotlight_visitCount".to_string()]);
        backend.remove("artistSpotlight_visitCount").unwrap();
        assert_eq!(backend.read("artistSpotlight_visitCount").unwrap(), None);
    }
}
