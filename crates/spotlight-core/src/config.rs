//! Application configuration management.
//!
//! Holds the data source, cache freshness windows and preview sizes.
//! Configuration is stored at `~/.config/artist-spotlight/config.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::models::ResourceKind;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "artist-spotlight";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL serving `artists.json` and `events.json`.
    pub data_url: Option<String>,
    /// Local directory holding the same files. Used when no URL is set.
    pub data_dir: Option<PathBuf>,
    pub artists_freshness_minutes: i64,
    pub events_freshness_minutes: i64,
    pub max_featured_artists: usize,
    pub max_upcoming_events: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: None,
            data_dir: None,
            artists_freshness_minutes: 15,
            events_freshness_minutes: 10,
            max_featured_artists: 3,
            max_upcoming_events: 2,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// `<config dir>/artist-spotlight/config.json`.
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
            .context("No config directory on this platform")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// A missing file means defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("Invalid config file {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Directory for the file-backed preference store.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|dir| dir.join(APP_NAME))
            .context("No cache directory on this platform")
    }

    /// Configured window for `kind`. Values too large for a duration
    /// fall back to the collection's default window.
    pub fn freshness(&self, kind: ResourceKind) -> Duration {
        let minutes = match kind {
            ResourceKind::Artists => self.artists_freshness_minutes,
            ResourceKind::Events => self.events_freshness_minutes,
        };
        Duration::try_minutes(minutes).unwrap_or_else(|| kind.default_freshness())
    }

    pub fn request_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_resource_windows() {
        let config = Config::default();
        for kind in ResourceKind::ALL {
            assert_eq!(config.freshness(kind), kind.default_freshness());
        }
        assert_eq!(config.request_timeout(), StdDuration::from_secs(30));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"data_url":"https://example.org/data","max_featured_artists":6}"#)
                .unwrap();
        assert_eq!(config.data_url.as_deref(), Some("https://example.org/data"));
        assert_eq!(config.max_featured_artists, 6);
        assert_eq!(config.max_upcoming_events, 2);
        assert_eq!(config.events_freshness_minutes, 10);
    }

    #[test]
    fn test_oversized_freshness_uses_default_window() {
        let config = Config {
            artists_freshness_minutes: i64::MAX,
            events_freshness_minutes: i64::MIN,
            ..Config::default()
        };
        for kind in ResourceKind::ALL {
            assert_eq!(config.freshness(kind), kind.default_freshness());
        }

        let config = Config {
            events_freshness_minutes: 90,
            ..Config::default()
        };
        assert_eq!(config.freshness(ResourceKind::Events), Duration::minutes(90));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_saved_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/spotlight")),
            max_upcoming_events: 4,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);

        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
