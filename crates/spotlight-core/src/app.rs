//! Session state for one run of the directory.
//!
//! `App` owns the loaded collections and their facet tables, and is the
//! only place that writes the last-used criteria and recently viewed
//! lists back to the preference store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::api::{DataLoadError, Fetcher};
use crate::cache::{DataLoader, LoadSource, Loaded};
use crate::config::Config;
use crate::facets::{artist_medium_facets, event_type_facets, FacetCounts};
use crate::filter::{apply, ArtistCriteria, EventCriteria};
use crate::models::{group_by_status, Artist, Event, EventGroups, Resource, ResourceKind};
use crate::prefs::PreferenceStore;

// ============================================================================
// Constants
// ============================================================================

/// Longest recently viewed list kept per collection.
pub const MAX_RECENTLY_VIEWED: usize = 10;

/// Calendar additions kept; older ones are dropped first.
pub const MAX_CALENDAR_EVENTS: usize = 50;

const CALENDAR_EVENTS_KEY: &str = "calendarEvents";

// ============================================================================
// Recently viewed
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewed {
    pub id: String,
    pub name: String,
    /// Medium for artists, event type for events.
    pub category: String,
    pub image: Option<String>,
    pub viewed_at: DateTime<Utc>,
}

// ============================================================================
// Calendar additions
// ============================================================================

/// An event the user sent to their calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub event: Event,
    pub added_at: DateTime<Utc>,
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub config: Config,
    prefs: PreferenceStore,
    loader: DataLoader,

    pub artists: Vec<Artist>,
    pub events: Vec<Event>,
    pub medium_facets: FacetCounts,
    pub event_type_facets: FacetCounts,

    failures: HashMap<ResourceKind, DataLoadError>,
    sources: HashMap<ResourceKind, LoadSource>,
}

impl App {
    pub fn new(config: Config, prefs: PreferenceStore, fetcher: Arc<dyn Fetcher>) -> Self {
        let loader = ResourceKind::ALL
            .iter()
            .fold(DataLoader::new(prefs.clone(), fetcher), |loader, kind| {
                loader.with_freshness(*kind, config.freshness(*kind))
            });

        Self {
            config,
            prefs,
            loader,
            artists: Vec::new(),
            events: Vec::new(),
            medium_facets: FacetCounts::default(),
            event_type_facets: FacetCounts::default(),
            failures: HashMap::new(),
            sources: HashMap::new(),
        }
    }

    /// Load both collections concurrently and recompute the facets.
    ///
    /// A collection that fails to load is replaced by an empty one and the
    /// failure is kept for display; the other collection is unaffected.
    pub async fn refresh(&mut self, now: DateTime<Utc>) {
        let (artists, events) = futures::join!(
            self.loader.load::<Artist>(now),
            self.loader.load::<Event>(now)
        );

        self.artists = self.accept(artists);
        self.events = self.accept(events);

        self.medium_facets = artist_medium_facets(&self.artists);
        self.event_type_facets = event_type_facets(&self.events);

        info!(
            artists = self.artists.len(),
            events = self.events.len(),
            failures = self.failures.len(),
            "Session refreshed"
        );
    }

    fn accept<R: Resource>(&mut self, result: Result<Loaded<R>, DataLoadError>) -> Vec<R> {
        let kind = R::KIND;
        match result {
            Ok(loaded) => {
                self.failures.remove(&kind);
                self.sources.insert(kind, loaded.source);
                loaded.records
            }
            Err(e) => {
                error!(%kind, error = %e, "Collection unavailable, showing none");
                self.sources.remove(&kind);
                self.failures.insert(kind, e);
                Vec::new()
            }
        }
    }

    pub fn load_error(&self, kind: ResourceKind) -> Option<&DataLoadError> {
        self.failures.get(&kind)
    }

    /// Message to show in place of a collection that failed to load.
    pub fn failure_message(&self, kind: ResourceKind) -> Option<String> {
        self.load_error(kind).map(DataLoadError::user_message)
    }

    /// Whether the last refresh of `kind` was served from cache or network.
    pub fn load_source(&self, kind: ResourceKind) -> Option<LoadSource> {
        self.sources.get(&kind).copied()
    }

    // ------------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------------

    /// Apply `criteria` to the artists and remember them for next time.
    pub fn filtered_artists(&self, criteria: &ArtistCriteria) -> Vec<Artist> {
        self.prefs.set(ResourceKind::Artists.criteria_key(), criteria);
        apply(&self.artists, criteria)
    }

    /// Apply `criteria` to the events and remember them for next time.
    pub fn filtered_events(&self, criteria: &EventCriteria) -> Vec<Event> {
        self.prefs.set(ResourceKind::Events.criteria_key(), criteria);
        apply(&self.events, criteria)
    }

    pub fn restore_artist_criteria(&self) -> ArtistCriteria {
        self.prefs
            .get(ResourceKind::Artists.criteria_key(), ArtistCriteria::default())
    }

    pub fn restore_event_criteria(&self) -> EventCriteria {
        self.prefs
            .get(ResourceKind::Events.criteria_key(), EventCriteria::default())
    }

    // ------------------------------------------------------------------------
    // Previews
    // ------------------------------------------------------------------------

    /// The first featured artists in collection order.
    pub fn featured_artists(&self) -> Vec<&Artist> {
        self.artists
            .iter()
            .filter(|a| a.featured)
            .take(self.config.max_featured_artists)
            .collect()
    }

    /// The next upcoming events, soonest first.
    pub fn upcoming_events(&self) -> Vec<&Event> {
        let mut upcoming: Vec<&Event> = self.events.iter().filter(|e| e.is_upcoming).collect();
        upcoming.sort_by_key(|e| e.date);
        upcoming.truncate(self.config.max_upcoming_events);
        upcoming
    }

    pub fn event_groups(&self) -> EventGroups {
        group_by_status(&self.events)
    }

    pub fn find_artist(&self, id: &str) -> Option<&Artist> {
        self.artists.iter().find(|a| a.id == id)
    }

    pub fn find_event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    // ------------------------------------------------------------------------
    // Recently viewed
    // ------------------------------------------------------------------------

    pub fn record_artist_view(&self, artist: &Artist, now: DateTime<Utc>) {
        self.push_recent(
            ResourceKind::Artists,
            RecentlyViewed {
                id: artist.id.clone(),
                name: artist.display_name.clone(),
                category: artist.medium.clone(),
                image: artist.photo.clone(),
                viewed_at: now,
            },
        );
    }

    pub fn record_event_view(&self, event: &Event, now: DateTime<Utc>) {
        self.push_recent(
            ResourceKind::Events,
            RecentlyViewed {
                id: event.id.clone(),
                name: event.title.clone(),
                category: event.event_type.clone(),
                image: event.image.clone(),
                viewed_at: now,
            },
        );
    }

    /// Most recent first.
    pub fn recently_viewed(&self, kind: ResourceKind) -> Vec<RecentlyViewed> {
        self.prefs.get(kind.recently_viewed_key(), Vec::new())
    }

    fn push_recent(&self, kind: ResourceKind, entry: RecentlyViewed) {
        let mut list = self.recently_viewed(kind);
        list.retain(|seen| seen.id != entry.id);
        list.insert(0, entry);
        list.truncate(MAX_RECENTLY_VIEWED);
        self.prefs.set(kind.recently_viewed_key(), &list);
    }

    // ------------------------------------------------------------------------
    // Calendar
    // ------------------------------------------------------------------------

    /// Calendar link for `event`, remembered in the calendar list.
    /// Undated events have no link and are not recorded.
    pub fn add_to_calendar(&self, event: &Event, now: DateTime<Utc>) -> Option<String> {
        let url = event.calendar_url()?;

        let mut list = self.calendar_events();
        list.push(CalendarEntry {
            event: event.clone(),
            added_at: now,
        });
        let excess = list.len().saturating_sub(MAX_CALENDAR_EVENTS);
        list.drain(..excess);
        self.prefs.set(CALENDAR_EVENTS_KEY, &list);

        info!(event = %event.id, "Added event to calendar");
        Some(url)
    }

    /// Oldest first.
    pub fn calendar_events(&self) -> Vec<CalendarEntry> {
        self.prefs.get(CALENDAR_EVENTS_KEY, Vec::new())
    }

    // ------------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------------

    pub fn cache_age(&self, kind: ResourceKind, now: DateTime<Utc>) -> String {
        self.loader.cache_age_display(kind, now)
    }

    pub fn invalidate_cache(&self, kind: ResourceKind) {
        self.loader.invalidate(kind);
    }

    /// Forget cached collections, saved criteria and view history.
    /// The collections already in memory are kept until the next refresh.
    pub fn clear_user_data(&self) {
        self.prefs.clear();
        debug!("User data cleared");
    }
}

// ============================================================================
// Tests
// ============================================================================
