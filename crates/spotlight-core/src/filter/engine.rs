use super::criteria::{
    active_category, active_term, ArtistCriteria, ArtistSort, EventCriteria, EventSort, PriceFilter,
    Timeframe,
};
use crate::models::event::cmp_dates;
use crate::models::{Artist, Event};
use crate::utils::{cmp_ignore_case, contains_ignore_case};

/// A declarative filter and ordering over records of type `T`.
pub trait Criteria<T> {
    /// All constraints combined with AND. Unset constraints pass.
    fn matches(&self, item: &T) -> bool;

    /// Reorder in place. Implementations use a stable sort so ties keep
    /// their incoming order.
    fn sort(&self, items: &mut [T]);
}

/// Filter then sort into a new collection; `collection` is left untouched.
pub fn apply<T: Clone, C: Criteria<T>>(collection: &[T], criteria: &C) -> Vec<T> {
    let mut result: Vec<T> = collection
        .iter()
        .filter(|item| criteria.matches(item))
        .cloned()
        .collect();
    criteria.sort(&mut result);
    result
}

impl Criteria<Artist> for ArtistCriteria {
    fn matches(&self, artist: &Artist) -> bool {
        if let Some(medium) = active_category(&self.medium) {
            if !artist.has_medium(medium) {
                return false;
            }
        }
        if self.available_only && !artist.available {
            return false;
        }
        if self.featured_only && !artist.featured {
            return false;
        }
        if let Some(level) = self.experience {
            if artist.experience != Some(level) {
                return false;
            }
        }
        if let Some(term) = active_term(&self.search) {
            let hit = contains_ignore_case(&artist.name, &term)
                || contains_ignore_case(&artist.bio, &term)
                || artist.tags.iter().any(|tag| contains_ignore_case(tag, &term));
            if !hit {
                return false;
            }
        }
        true
    }

    fn sort(&self, artists: &mut [Artist]) {
        let Some(sort) = self.sort_by else {
            return;
        };
        artists.sort_by(|a, b| match sort {
            ArtistSort::Name => cmp_ignore_case(&a.name, &b.name),
            ArtistSort::Newest => b.joined_date.cmp(&a.joined_date),
            ArtistSort::Rating => b.rating.total_cmp(&a.rating),
            ArtistSort::Portfolio => b.portfolio_count.cmp(&a.portfolio_count),
        });
    }
}

impl Criteria<Event> for EventCriteria {
    fn matches(&self, event: &Event) -> bool {
        if let Some(category) = active_category(&self.category) {
            if event.event_type != category {
                return false;
            }
        }
        if let Some(term) = active_term(&self.search) {
            let hit = contains_ignore_case(&event.title, &term)
                || contains_ignore_case(&event.description, &term)
                || event
                    .organizer
                    .as_deref()
                    .map(|o| contains_ignore_case(o, &term))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        if let Some(place) = active_term(&self.location) {
            let hit = contains_ignore_case(&event.location, &place)
                || event
                    .venue
                    .as_deref()
                    .map(|v| contains_ignore_case(v, &place))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        if let Some(price) = self.price {
            let hit = match price {
                PriceFilter::Free => event.is_free_event(),
                PriceFilter::Paid => event.is_paid_event(),
            };
            if !hit {
                return false;
            }
        }
        if let Some(timeframe) = self.timeframe {
            let hit = match timeframe {
                Timeframe::Upcoming => event.is_upcoming,
                Timeframe::Past => event.is_past,
                Timeframe::Ongoing => event.is_ongoing,
                Timeframe::Today => event.is_today,
                Timeframe::ThisWeek => event.is_this_week,
                Timeframe::ThisMonth => event.is_this_month,
            };
            if !hit {
                return false;
            }
        }
        true
    }

    fn sort(&self, events: &mut [Event]) {
        let Some(sort) = self.sort_by else {
            return;
        };
        events.sort_by(|a, b| match sort {
            EventSort::DateAsc => cmp_dates(a.date, b.date),
            // Undated events stay last in both directions.
            EventSort::DateDesc => match (a.date, b.date) {
                (Some(x), Some(y)) => y.cmp(&x),
                _ => cmp_dates(a.date, b.date),
            },
            EventSort::Title => cmp_ignore_case(&a.title, &b.title),
            EventSort::Location => cmp_ignore_case(&a.location, &b.location),
            EventSort::Price => price_key(a).total_cmp(&price_key(b)),
        });
    }
}

fn price_key(event: &Event) -> f64 {
    event.price.unwrap_or(0.0)
}
