use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::api::{DataLoadError, Fetcher};
use crate::models::{decode_collection, normalize_all, Resource, ResourceKind};
use crate::prefs::PreferenceStore;
use crate::utils::epoch_millis;

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Cache,
    Network,
}

/// A normalized collection and its provenance.
#[derive(Debug, Clone)]
pub struct Loaded<R> {
    pub records: Vec<R>,
    pub source: LoadSource,
    pub cached_at: DateTime<Utc>,
}

/// Loads collections through the preference-store cache.
///
/// The cached collection and its timestamp live under separate keys. The
/// timestamp is dropped before a new collection is written and only put
/// back once the collection write has landed, so a failed write can never
/// make an old collection look fresh.
#[derive(Clone)]
pub struct DataLoader {
    prefs: PreferenceStore,
    fetcher: Arc<dyn Fetcher>,
    freshness: HashMap<ResourceKind, Duration>,
}

impl DataLoader {
    pub fn new(prefs: PreferenceStore, fetcher: Arc<dyn Fetcher>) -> Self {
        let freshness = ResourceKind::ALL
            .iter()
            .map(|kind| (*kind, kind.default_freshness()))
            .collect();
        Self {
            prefs,
            fetcher,
            freshness,
        }
    }

    /// Override the freshness window for one collection.
    pub fn with_freshness(mut self, kind: ResourceKind, window: Duration) -> Self {
        self.freshness.insert(kind, window);
        self
    }

    pub fn freshness(&self, kind: ResourceKind) -> Duration {
        self.freshness
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_freshness())
    }

    /// When the cached copy of `kind` was stored, if there is one.
    pub fn cached_at(&self, kind: ResourceKind) -> Option<DateTime<Utc>> {
        let millis: i64 = self.prefs.get(kind.timestamp_key(), 0);
        if millis <= 0 {
            return None;
        }
        DateTime::from_timestamp_millis(millis)
    }

    /// True when no cached copy exists or it has outlived its window.
    pub fn is_stale(&self, kind: ResourceKind, now: DateTime<Utc>) -> bool {
        match self.cached_at(kind) {
            Some(at) => now - at >= self.freshness(kind),
            None => true,
        }
    }

    /// Return the cached collection if it is still fresh, otherwise fetch,
    /// normalize and cache a new one.
    pub async fn load<R: Resource>(&self, now: DateTime<Utc>) -> Result<Loaded<R>, DataLoadError> {
        let kind = R::KIND;

        if let Some(cached_at) = self.cached_at(kind) {
            if now - cached_at < self.freshness(kind) {
                if let Some(records) = self.prefs.get::<Option<Vec<R>>>(kind.cache_key(), None) {
                    debug!(%kind, count = records.len(), "Using cached collection");
                    return Ok(Loaded {
                        records,
                        source: LoadSource::Cache,
                        cached_at,
                    });
                }
            }
        }

        let body = self
            .fetcher
            .fetch(kind)
            .await
            .map_err(|source| DataLoadError::Fetch { kind, source })?;

        let raws = decode_collection::<R>(&body)
            .map_err(|source| DataLoadError::Malformed { kind, source })?;
        let records: Vec<R> = normalize_all(raws, now);
        info!(%kind, count = records.len(), "Collection fetched");

        self.store(kind, &records, now);

        Ok(Loaded {
            records,
            source: LoadSource::Network,
            cached_at: now,
        })
    }

    fn store<R: Resource>(&self, kind: ResourceKind, records: &[R], now: DateTime<Utc>) {
        self.prefs.remove(kind.timestamp_key());
        if self.prefs.set(kind.cache_key(), records) {
            self.prefs.set(kind.timestamp_key(), &epoch_millis(now));
        } else {
            warn!(%kind, "Collection not cached, next load will fetch again");
        }
    }

    /// Force the next `load` of `kind` to fetch.
    pub fn invalidate(&self, kind: ResourceKind) {
        self.prefs.remove(kind.timestamp_key());
        self.prefs.remove(kind.cache_key());
        debug!(%kind, "Cache invalidated");
    }

    /// "just now", "12m ago", "3h ago", "2d ago", or "never".
    pub fn cache_age_display(&self, kind: ResourceKind, now: DateTime<Utc>) -> String {
        match self.cached_at(kind) {
            Some(at) => age_display((now - at).num_minutes()),
            None => "never".to_string(),
        }
    }
}

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// "12m ago" below an hour, then hours and days rounded to the nearest unit.
fn age_display(minutes: i64) -> String {
    match minutes {
        // Negative when the clock moved back after the write.
        m if m < 1 => "just now".to_string(),
        m if m < MINUTES_PER_HOUR => format!("{}m ago", m),
        m if m < MINUTES_PER_DAY => format!("{}h ago", round_to(m, MINUTES_PER_HOUR)),
        m => format!("{}d ago", round_to(m, MINUTES_PER_DAY)),
    }
}

fn round_to(minutes: i64, unit: i64) -> i64 {
    (minutes + unit / 2) / unit
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchError, MemoryFetcher};
    use crate::models::{Artist, Event};
    use crate::prefs::MemoryBackend;
    use chrono::TimeZone;

    const ARTISTS: &str = r#"{"artists":[
        {"name":"jane doe","medium":"painting","featured":true},
        {"name":"li wei","medium":"ceramics"}
    ]}"#;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn loader_with(fetcher: Arc<MemoryFetcher>) -> DataLoader {
        DataLoader::new(PreferenceStore::in_memory(), fetcher)
    }

    #[tokio::test]
    async fn test_first_load_fetches_and_caches() {
        let fetcher = Arc::new(MemoryFetcher::new().with_body(ResourceKind::Artists, ARTISTS));
        let loader = loader_with(fetcher.clone());

        let loaded = loader.load::<Artist>(t0()).await.unwrap();
        assert_eq!(loaded.source, LoadSource::Network);
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].display_name, "Jane Doe");
        assert_eq!(loader.cached_at(ResourceKind::Artists), Some(t0()));
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_freshness_boundary() {
        let fetcher = Arc::new(MemoryFetcher::new().with_body(ResourceKind::Artists, ARTISTS));
        let loader = loader_with(fetcher.clone());
        let window = loader.freshness(ResourceKind::Artists);

        let first = loader.load::<Artist>(t0()).await.unwrap();

        let just_inside = t0() + window - Duration::milliseconds(1);
        let cached = loader.load::<Artist>(just_inside).await.unwrap();
        assert_eq!(cached.source, LoadSource::Cache);
        assert_eq!(cached.records, first.records);
        assert_eq!(fetcher.request_count(), 1);

        let just_outside = t0() + window + Duration::milliseconds(1);
        let refreshed = loader.load::<Artist>(just_outside).await.unwrap();
        assert_eq!(refreshed.source, LoadSource::Network);
        assert_eq!(fetcher.request_count(), 2);
        assert_eq!(loader.cached_at(ResourceKind::Artists), Some(just_outside));
    }

    #[tokio::test]
    async fn test_cached_copy_is_not_renormalized() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_body(ResourceKind::Events, r#"[{"title":"Show","date":"2025-06-01T13:00:00Z"}]"#),
        );
        let loader = loader_with(fetcher);

        let first = loader.load::<Event>(t0()).await.unwrap();
        assert!(first.records[0].is_upcoming);

        // Two hours later the event has started, but the cached flags are kept.
        let loader = loader.with_freshness(ResourceKind::Events, Duration::hours(3));
        let later = loader.load::<Event>(t0() + Duration::hours(2)).await.unwrap();
        assert_eq!(later.source, LoadSource::Cache);
        assert!(later.records[0].is_upcoming);
    }

    #[tokio::test]
    async fn test_http_failure_is_tagged_with_kind() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.respond(ResourceKind::Events, 404, "missing");
        let loader = loader_with(fetcher);

        let err = loader.load::<Event>(t0()).await.unwrap_err();
        assert_eq!(err.kind(), ResourceKind::Events);
        assert!(matches!(
            err,
            DataLoadError::Fetch {
                source: FetchError::NotFound(_),
                ..
            }
        ));
        assert!(loader.cached_at(ResourceKind::Events).is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_leaves_cache_untouched() {
        let fetcher = Arc::new(MemoryFetcher::new().with_body(ResourceKind::Artists, ARTISTS));
        let loader = loader_with(fetcher.clone());
        let first = loader.load::<Artist>(t0()).await.unwrap();

        fetcher.respond(ResourceKind::Artists, 200, "<html>oops</html>");
        let later = t0() + Duration::hours(1);
        let err = loader.load::<Artist>(later).await.unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { .. }));

        // The previous collection and timestamp are still intact.
        assert_eq!(loader.cached_at(ResourceKind::Artists), Some(t0()));
        let kept: Option<Vec<Artist>> = loader.prefs.get(ResourceKind::Artists.cache_key(), None);
        assert_eq!(kept.unwrap(), first.records);
    }

    #[tokio::test]
    async fn test_failed_cache_write_does_not_mark_fresh() {
        let prefs = PreferenceStore::new(Arc::new(MemoryBackend::with_quota(64)));
        let fetcher = Arc::new(MemoryFetcher::new().with_body(ResourceKind::Artists, ARTISTS));
        let loader = DataLoader::new(prefs, fetcher.clone());

        let loaded = loader.load::<Artist>(t0()).await.unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert!(loader.cached_at(ResourceKind::Artists).is_none());

        loader.load::<Artist>(t0() + Duration::minutes(1)).await.unwrap();
        assert_eq!(fetcher.request_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_fetch() {
        let fetcher = Arc::new(MemoryFetcher::new().with_body(ResourceKind::Artists, ARTISTS));
        let loader = loader_with(fetcher.clone());
        loader.load::<Artist>(t0()).await.unwrap();
        loader.invalidate(ResourceKind::Artists);
        assert!(loader.is_stale(ResourceKind::Artists, t0()));
        loader.load::<Artist>(t0()).await.unwrap();
        assert_eq!(fetcher.request_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_age_display() {
        let fetcher = Arc::new(MemoryFetcher::new().with_body(ResourceKind::Artists, ARTISTS));
        let loader = loader_with(fetcher);
        assert_eq!(loader.cache_age_display(ResourceKind::Artists, t0()), "never");
        loader.load::<Artist>(t0()).await.unwrap();
        assert_eq!(loader.cache_age_display(ResourceKind::Artists, t0()), "just now");
        assert_eq!(
            loader.cache_age_display(ResourceKind::Artists, t0() + Duration::minutes(12)),
            "12m ago"
        );
    }

    #[test]
    fn test_age_display_rounding() {
        assert_eq!(age_display(-5), "just now");
        assert_eq!(age_display(89), "1h ago");
        assert_eq!(age_display(90), "2h ago");
        assert_eq!(age_display(1440 + 13 * 60), "2d ago");
        assert_eq!(age_display(0), "just now");
        assert_eq!(age_display(59), "59m ago");
        assert_eq!(age_display(60), "1h ago");
        assert_eq!(age_display(1439), "24h ago");
        assert_eq!(age_display(1440 + 11 * 60), "1d ago");
    }
}
