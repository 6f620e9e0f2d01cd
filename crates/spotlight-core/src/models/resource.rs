use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// The two collections the directory serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Artists,
    Events,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Artists, ResourceKind::Events];

    /// Plural resource name, also the wrapper key in `{ "artists": [...] }`.
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Artists => "artists",
            ResourceKind::Events => "events",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ResourceKind::Artists => "artists.json",
            ResourceKind::Events => "events.json",
        }
    }

    /// How long a cached collection stays fresh. Events change more often.
    pub fn default_freshness(&self) -> Duration {
        match self {
            ResourceKind::Artists => Duration::minutes(15),
            ResourceKind::Events => Duration::minutes(10),
        }
    }

    pub fn cache_key(&self) -> &'static str {
        match self {
            ResourceKind::Artists => "cachedArtists",
            ResourceKind::Events => "cachedEvents",
        }
    }

    pub fn timestamp_key(&self) -> &'static str {
        match self {
            ResourceKind::Artists => "artistsCacheTimestamp",
            ResourceKind::Events => "eventsCacheTimestamp",
        }
    }

    pub fn criteria_key(&self) -> &'static str {
        match self {
            ResourceKind::Artists => "currentArtistFilters",
            ResourceKind::Events => "currentEventFilters",
        }
    }

    pub fn recently_viewed_key(&self) -> &'static str {
        match self {
            ResourceKind::Artists => "recentlyViewedArtists",
            ResourceKind::Events => "recentlyViewedEvents",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A normalized record type that the loader can fetch, cache and sort.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Shape of one record as it appears in the source JSON.
    type Raw: DeserializeOwned;

    const KIND: ResourceKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Fill every derived field. Pure: `now` is passed in, never read from the clock.
    fn normalize(raw: Self::Raw, now: DateTime<Utc>) -> Self;

    /// Default presentation order of a freshly loaded collection. Must be stable.
    fn sort_collection(records: &mut [Self]);
}

/// Decode a response body into raw records.
///
/// Accepts a bare array or an object wrapping the array under the
/// resource name. Items that are not JSON objects are skipped; the rest
/// of the batch is kept. Mistyped fields inside an object fall back to
/// their defaults during decoding.
pub fn decode_collection<R: Resource>(body: &str) -> Result<Vec<R::Raw>, serde_json::Error> {
    let kind = R::KIND;
    let value: Value = serde_json::from_str(body)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(kind.name()) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                    "expected an array or an object with an `{}` array",
                    kind.name()
                )))
            }
        },
        _ => {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "expected a JSON array of records",
            ))
        }
    };

    let total = items.len();
    let raws: Vec<R::Raw> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                warn!(kind = %kind, index, "Skipping record that is not an object");
                return None;
            }
            match serde_json::from_value(item) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    warn!(kind = %kind, index, error = %e, "Skipping unreadable record");
                    None
                }
            }
        })
        .collect();

    debug!(kind = %kind, total, kept = raws.len(), "Decoded collection");
    Ok(raws)
}

/// Normalize a batch, make ids unique, then apply the default order.
pub fn normalize_all<R: Resource>(raws: Vec<R::Raw>, now: DateTime<Utc>) -> Vec<R> {
    let mut records: Vec<R> = raws.into_iter().map(|raw| R::normalize(raw, now)).collect();
    ensure_unique_ids(&mut records);
    R::sort_collection(&mut records);
    records
}

/// Suffix repeated ids with `-2`, `-3`, ... in input order.
fn ensure_unique_ids<R: Resource>(records: &mut [R]) {
    let kind = R::KIND;
    let mut seen: HashMap<String, usize> = HashMap::new();
    for record in records.iter_mut() {
        let base = record.id().to_string();
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            let mut n = *count;
            let mut candidate = format!("{}-{}", base, n);
            while seen.contains_key(&candidate) {
                n += 1;
                candidate = format!("{}-{}", base, n);
            }
            seen.insert(candidate.clone(), 1);
            debug!(kind = %kind, id = %base, renamed = %candidate, "Duplicate record id");
            record.set_id(candidate);
        }
    }
}
