use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Experience;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {what} '{value}' (expected one of: {expected})")]
pub struct ParseCriteriaError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

macro_rules! string_enum {
    ($name:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseCriteriaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseCriteriaError {
                        what: $what,
                        value: s.to_string(),
                        expected: concat!($($text, " "),+),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtistSort {
    Name,
    Newest,
    Rating,
    Portfolio,
}

string_enum!(ArtistSort, "artist sort", {
    Name => "name",
    Newest => "newest",
    Rating => "rating",
    Portfolio => "portfolio",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSort {
    DateAsc,
    DateDesc,
    Title,
    Location,
    Price,
}

string_enum!(EventSort, "event sort", {
    DateAsc => "date-asc",
    DateDesc => "date-desc",
    Title => "title",
    Location => "location",
    Price => "price",
});

/// Time window an event must fall in, read from its precomputed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    Upcoming,
    Past,
    Ongoing,
    Today,
    ThisWeek,
    ThisMonth,
}

string_enum!(Timeframe, "timeframe", {
    Upcoming => "upcoming",
    Past => "past",
    Ongoing => "ongoing",
    Today => "today",
    ThisWeek => "this-week",
    ThisMonth => "this-month",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceFilter {
    Free,
    Paid,
}

string_enum!(PriceFilter, "price range", {
    Free => "free",
    Paid => "paid",
});

/// Filters for the artists collection. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtistCriteria {
    /// Primary or secondary medium; `"all"` is the same as unset.
    pub medium: Option<String>,
    /// Only artists open for commissions.
    pub available_only: bool,
    pub featured_only: bool,
    pub experience: Option<Experience>,
    pub search: Option<String>,
    pub sort_by: Option<ArtistSort>,
}

/// Filters for the events collection. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventCriteria {
    /// Event type; `"all"` is the same as unset.
    pub category: Option<String>,
    pub timeframe: Option<Timeframe>,
    /// Substring of the location or venue.
    pub location: Option<String>,
    pub search: Option<String>,
    pub price: Option<PriceFilter>,
    pub sort_by: Option<EventSort>,
}

impl ArtistCriteria {
    pub fn with_search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn with_medium(mut self, medium: &str) -> Self {
        self.medium = Some(medium.to_string());
        self
    }

    pub fn sorted_by(mut self, sort: ArtistSort) -> Self {
        self.sort_by = Some(sort);
        self
    }
}

impl EventCriteria {
    pub fn with_search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = Some(timeframe);
        self
    }

    pub fn sorted_by(mut self, sort: EventSort) -> Self {
        self.sort_by = Some(sort);
        self
    }
}

/// A category value that actually constrains: not empty and not `"all"`.
pub(crate) fn active_category(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

/// A lowercased search term, or `None` when blank.
pub(crate) fn active_term(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_and_timeframe() {
        assert_eq!("date-desc".parse::<EventSort>().unwrap(), EventSort::DateDesc);
        assert_eq!("This-Week".parse::<Timeframe>().unwrap(), Timeframe::ThisWeek);
        assert_eq!("rating".parse::<ArtistSort>().unwrap(), ArtistSort::Rating);
        let err = "cheapest".parse::<PriceFilter>().unwrap_err();
        assert!(err.to_string().contains("free paid"));
    }

    #[test]
    fn test_criteria_json_shape() {
        let criteria = EventCriteria::default()
            .with_timeframe(Timeframe::ThisMonth)
            .sorted_by(EventSort::DateAsc);
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json["timeframe"], "this-month");
        assert_eq!(json["sortBy"], "date-asc");

        let parsed: ArtistCriteria =
            serde_json::from_str(r#"{"medium":"painting","availableOnly":true}"#).unwrap();
        assert_eq!(parsed.medium.as_deref(), Some("painting"));
        assert!(parsed.available_only);
        assert_eq!(parsed.search, None);
    }

    #[test]
    fn test_all_and_blank_are_unset() {
        assert_eq!(active_category(&Some("all".into())), None);
        assert_eq!(active_category(&Some("  ".into())), None);
        assert_eq!(active_category(&Some("workshop".into())), Some("workshop"));
        assert_eq!(active_term(&Some("".into())), None);
        assert_eq!(active_term(&Some(" Abstract ".into())).as_deref(), Some("abstract"));
    }
}
