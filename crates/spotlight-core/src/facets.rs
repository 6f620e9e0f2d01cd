//! Per-category counts used to build filter choices.
//!
//! Counts are taken over a whole collection and do not follow the active
//! filters.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::{Artist, Event};
use crate::utils::category_label;

/// Artist mediums offered as filter choices, in display order.
pub const ARTIST_MEDIUMS: [(&str, &str); 8] = [
    ("painting", "Painting"),
    ("sculpture", "Sculpture"),
    ("photography", "Photography"),
    ("digital-art", "Digital Art"),
    ("mixed-media", "Mixed Media"),
    ("ceramics", "Ceramics"),
    ("textiles", "Textiles"),
    ("jewelry", "Jewelry"),
];

/// Event types offered as filter choices, in display order.
pub const EVENT_TYPES: [(&str, &str); 7] = [
    ("exhibition", "Exhibition"),
    ("workshop", "Workshop"),
    ("gallery-opening", "Gallery Opening"),
    ("art-fair", "Art Fair"),
    ("studio-tour", "Studio Tour"),
    ("lecture", "Lecture"),
    ("community", "Community Event"),
];

/// Records per category value, plus the collection total.
///
/// The total is kept apart from the per-value table so a category that
/// happens to be named "all" cannot overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetCounts {
    pub all: usize,
    pub by_value: BTreeMap<String, usize>,
}

impl FacetCounts {
    /// Count for `value`; `"all"` returns the total.
    pub fn get(&self, value: &str) -> usize {
        if value == "all" {
            self.all
        } else {
            self.by_value.get(value).copied().unwrap_or(0)
        }
    }
}

/// A row for a filter control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
    pub count: usize,
}

/// Bucket for records that declare no category value at all.
pub const UNCATEGORIZED: &str = "uncategorized";

/// One pass over `collection`. Each record adds one to `all` and one to
/// every distinct non-empty value `categories` yields for it, or to
/// `UNCATEGORIZED` when it yields none.
pub fn count_by<T, F>(collection: &[T], categories: F) -> FacetCounts
where
    F: Fn(&T) -> Vec<&str>,
{
    let mut counts = FacetCounts {
        all: collection.len(),
        by_value: BTreeMap::new(),
    };
    for record in collection {
        let mut distinct: BTreeSet<&str> = categories(record)
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect();
        if distinct.is_empty() {
            distinct.insert(UNCATEGORIZED);
        }
        for value in distinct {
            *counts.by_value.entry(value.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Artists per medium, primary and secondary.
pub fn artist_medium_facets(artists: &[Artist]) -> FacetCounts {
    count_by(artists, |artist| {
        std::iter::once(artist.medium.as_str())
            .chain(artist.secondary_mediums.iter().map(String::as_str))
            .collect()
    })
}

/// Events per type.
pub fn event_type_facets(events: &[Event]) -> FacetCounts {
    count_by(events, |event| vec![event.event_type.as_str()])
}

/// Join a catalog with counts: an "all" row first, then every catalog
/// entry, then any value seen in the data but missing from the catalog.
pub fn facet_options(catalog: &[(&str, &str)], counts: &FacetCounts) -> Vec<FacetOption> {
    let mut options = Vec::with_capacity(catalog.len() + 1);
    options.push(FacetOption {
        value: "all".to_string(),
        label: "All".to_string(),
        count: counts.all,
    });
    for (value, label) in catalog {
        options.push(FacetOption {
            value: value.to_string(),
            label: label.to_string(),
            count: counts.get(value),
        });
    }
    for (value, count) in &counts.by_value {
        if !catalog.iter().any(|(known, _)| known == value) {
            options.push(FacetOption {
                value: value.clone(),
                label: category_label(value),
                count: *count,
            });
        }
    }
    options
}
