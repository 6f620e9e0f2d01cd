use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use super::resource::{Resource, ResourceKind};
use crate::utils::{category_label, parse_timestamp, slugify, truncate_string};

const DAY_MS: f64 = 86_400_000.0;

/// Events without an end time are assumed to run this long on a calendar.
const DEFAULT_CALENDAR_HOURS: i64 = 2;

const GOOGLE_CALENDAR_URL: &str = "https://calendar.google.com/calendar/render";

/// Where an event sits relative to the moment it was normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Past,
    /// No readable start date.
    Undated,
}

impl EventStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "Upcoming",
            EventStatus::Ongoing => "Happening Now",
            EventStatus::Past => "Past Event",
            EventStatus::Undated => "Date TBD",
        }
    }
}

/// An event entry as it appears in `events.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub venue: Option<String>,
    /// A number, or a numeric string such as `"15.00"`.
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_free: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub registration_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub organizer: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub image: Option<String>,
}

/// A normalized event. The temporal flags are fixed at normalization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub location: String,
    pub venue: Option<String>,
    pub price: Option<f64>,
    pub is_free: bool,
    pub description: String,
    pub registration_url: Option<String>,
    pub organizer: Option<String>,
    pub image: Option<String>,

    pub is_upcoming: bool,
    pub is_past: bool,
    pub is_ongoing: bool,
    pub is_today: bool,
    pub is_this_week: bool,
    pub is_this_month: bool,
    pub days_until: i64,
    pub duration: String,
    pub formatted_date: String,
}

impl Event {
    /// Build a normalized event from its raw JSON form, classified against `now`.
    pub fn from_raw(raw: RawEvent, now: DateTime<Utc>) -> Self {
        let title = raw.title.unwrap_or_default();
        let date = raw.date.as_deref().and_then(parse_timestamp);
        let end_date = raw.end_date.as_deref().and_then(parse_timestamp);

        let id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_id(&title, date));

        let mut event = Self {
            id,
            title,
            event_type: raw.event_type.unwrap_or_default(),
            date,
            end_date,
            time: raw.time,
            location: raw.location.unwrap_or_default(),
            venue: raw.venue.filter(|v| !v.trim().is_empty()),
            price: raw.price.as_ref().and_then(parse_price),
            is_free: raw.is_free.unwrap_or(false),
            description: raw.description.unwrap_or_default(),
            registration_url: raw.registration_url.filter(|u| !u.trim().is_empty()),
            organizer: raw.organizer.filter(|o| !o.trim().is_empty()),
            image: raw.image,
            is_upcoming: false,
            is_past: false,
            is_ongoing: false,
            is_today: false,
            is_this_week: false,
            is_this_month: false,
            days_until: 0,
            duration: String::new(),
            formatted_date: "TBD".to_string(),
        };

        if let Some(start) = date {
            let end = end_date.unwrap_or(start);
            let status = classify(start, end, now);
            let days_ahead = (start - now).num_milliseconds() as f64 / DAY_MS;

            event.is_upcoming = status == EventStatus::Upcoming;
            event.is_ongoing = status == EventStatus::Ongoing;
            event.is_past = status == EventStatus::Past;
            event.is_today = start.date_naive() == now.date_naive();
            event.is_this_week = (0.0..=7.0).contains(&days_ahead);
            event.is_this_month = start.year() == now.year() && start.month() == now.month();
            event.days_until = days_ahead.ceil() as i64;
            event.duration = describe_duration(start, end);
            event.formatted_date = format_date_range(start, end);
        }

        event
    }

    pub fn status(&self) -> EventStatus {
        if self.is_upcoming {
            EventStatus::Upcoming
        } else if self.is_ongoing {
            EventStatus::Ongoing
        } else if self.is_past {
            EventStatus::Past
        } else {
            EventStatus::Undated
        }
    }

    pub fn is_free_event(&self) -> bool {
        self.is_free || self.price == Some(0.0)
    }

    pub fn is_paid_event(&self) -> bool {
        !self.is_free && self.price.map(|p| p > 0.0).unwrap_or(false)
    }

    pub fn price_label(&self) -> String {
        if self.is_free_event() {
            return "Free".to_string();
        }
        match self.price {
            Some(p) if p.fract() == 0.0 => format!("${}", p as i64),
            Some(p) => format!("${:.2}", p),
            None => "See details".to_string(),
        }
    }

    pub fn type_label(&self) -> String {
        category_label(&self.event_type)
    }

    pub fn description_excerpt(&self, max_len: usize) -> String {
        truncate_string(&self.description, max_len)
    }

    /// "Tomorrow!" or "In N days" for events in the coming week.
    pub fn countdown_label(&self) -> Option<String> {
        match self.days_until {
            1 => Some("Tomorrow!".to_string()),
            2..=7 => Some(format!("In {} days", self.days_until)),
            _ => None,
        }
    }

    /// Google Calendar "add event" link. `None` for undated events.
    pub fn calendar_url(&self) -> Option<String> {
        let start = self.date?;
        let end = self
            .end_date
            .unwrap_or_else(|| start + Duration::hours(DEFAULT_CALENDAR_HOURS));
        let dates = format!(
            "{}/{}",
            start.format("%Y%m%dT%H%M%SZ"),
            end.format("%Y%m%dT%H%M%SZ")
        );
        url::Url::parse_with_params(
            GOOGLE_CALENDAR_URL,
            &[
                ("action", "TEMPLATE"),
                ("text", self.title.as_str()),
                ("dates", dates.as_str()),
                ("details", self.description.as_str()),
                ("location", self.location.as_str()),
            ],
        )
        .ok()
        .map(String::from)
    }
}

impl Resource for Event {
    type Raw = RawEvent;

    const KIND: ResourceKind = ResourceKind::Events;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(raw: RawEvent, now: DateTime<Utc>) -> Self {
        Event::from_raw(raw, now)
    }

    /// Soonest first; undated events go last.
    fn sort_collection(records: &mut [Self]) {
        records.sort_by(|a, b| cmp_dates(a.date, b.date));
    }
}

/// Ascending date order with missing dates after all dated ones.
pub(crate) fn cmp_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Exactly one status applies. At the start instant an event is ongoing.
fn classify(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> EventStatus {
    if start > now {
        EventStatus::Upcoming
    } else if end >= now {
        EventStatus::Ongoing
    } else {
        EventStatus::Past
    }
}

fn generate_id(title: &str, date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(d) => format!("{}-{}", slugify(title), d.format("%Y-%m-%d")),
        None => format!("{}-tbd", slugify(title)),
    }
}

fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').parse().ok(),
        _ => None,
    }
}

fn describe_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let span_ms = (end - start).num_milliseconds().abs() as f64;
    let days = (span_ms / DAY_MS).ceil() as i64;
    if days == 0 {
        "Single day".to_string()
    } else {
        format!("{} days", days + 1)
    }
}

fn format_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    const FMT: &str = "%A, %B %-d, %Y";
    if start.date_naive() == end.date_naive() {
        start.format(FMT).to_string()
    } else {
        format!("{} - {}", start.format(FMT), end.format(FMT))
    }
}

/// Events split by status, each group in the input order.
#[derive(Debug, Clone, Default)]
pub struct EventGroups {
    pub upcoming: Vec<Event>,
    pub ongoing: Vec<Event>,
    pub past: Vec<Event>,
}

/// Undated events belong to no group.
pub fn group_by_status(events: &[Event]) -> EventGroups {
    let mut groups = EventGroups::default();
    for event in events {
        match event.status() {
            EventStatus::Upcoming => groups.upcoming.push(event.clone()),
            EventStatus::Ongoing => groups.ongoing.push(event.clone()),
            EventStatus::Past => groups.past.push(event.clone()),
            EventStatus::Undated => {}
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap()
    }

    fn event(json: &str) -> Event {
        Event::normalize(serde_json::from_str(json).unwrap(), now())
    }

    fn exactly_one_status(e: &Event) -> bool {
        [e.is_upcoming, e.is_ongoing, e.is_past].iter().filter(|&&f| f).count() == 1
    }

    #[test]
    fn test_upcoming_event() {
        let e = event(r#"{"title":"Spring Art Fair","date":"2025-06-14T10:00:00Z","type":"art-fair"}"#);
        assert!(e.is_upcoming);
        assert!(e.is_this_week);
        assert!(e.is_this_month);
        assert!(!e.is_today);
        assert_eq!(e.days_until, 3);
        assert_eq!(e.id, "spring-art-fair-2025-06-14");
        assert_eq!(e.formatted_date, "Saturday, June 14, 2025");
        assert_eq!(e.countdown_label().as_deref(), Some("In 3 days"));
        assert!(exactly_one_status(&e));
    }

    #[test]
    fn test_ongoing_multi_day_event() {
        let e = event(r#"{"title":"Biennial","date":"2025-06-10T09:00:00Z","endDate":"2025-06-13T17:00:00Z"}"#);
        assert!(e.is_ongoing);
        assert!(!e.is_upcoming && !e.is_past);
        assert_eq!(e.duration, "5 days");
        assert_eq!(e.formatted_date, "Tuesday, June 10, 2025 - Friday, June 13, 2025");
    }

    #[test]
    fn test_past_event_uses_end_date() {
        let e = event(r#"{"title":"Old Show","date":"2025-05-01T09:00:00Z","endDate":"2025-05-02T09:00:00Z"}"#);
        assert!(e.is_past);
        assert!(exactly_one_status(&e));
        assert!(e.days_until < 0);
    }

    #[test]
    fn test_start_instant_is_ongoing() {
        let e = event(r#"{"title":"Now","date":"2025-06-11T12:00:00Z"}"#);
        assert!(e.is_ongoing);
        assert!(!e.is_upcoming);
        assert!(e.is_today);
        assert_eq!(e.duration, "Single day");
    }

    #[test]
    fn test_undated_event_has_no_status() {
        let e = event(r#"{"title":"Someday Soon"}"#);
        assert_eq!(e.status(), EventStatus::Undated);
        assert_eq!(e.formatted_date, "TBD");
        assert_eq!(e.id, "someday-soon-tbd");
        assert!(e.calendar_url().is_none());
    }

    #[test]
    fn test_price_classification() {
        let free = event(r#"{"title":"a","price":0}"#);
        let flagged = event(r#"{"title":"b","price":20,"isFree":true}"#);
        let paid = event(r#"{"title":"c","price":"$12.50"}"#);
        let unknown = event(r#"{"title":"d"}"#);
        assert!(free.is_free_event() && !free.is_paid_event());
        assert!(flagged.is_free_event() && !flagged.is_paid_event());
        assert!(paid.is_paid_event());
        assert_eq!(paid.price_label(), "$12.50");
        assert!(!unknown.is_free_event() && !unknown.is_paid_event());
    }

    #[test]
    fn test_calendar_url() {
        let e = event(r#"{"title":"Open Studio","date":"2025-06-14T18:00:00Z","location":"Main St"}"#);
        let link = e.calendar_url().unwrap();
        assert!(link.starts_with(GOOGLE_CALENDAR_URL));
        assert!(link.contains("action=TEMPLATE"));
        assert!(link.contains("20250614T180000Z"));
        assert!(link.contains("20250614T200000Z"));
        assert!(link.contains("Open+Studio"));
    }

    #[test]
    fn test_sort_undated_last() {
        let mut events = vec![
            event(r#"{"id":"none","title":"x"}"#),
            event(r#"{"id":"late","title":"x","date":"2025-07-01"}"#),
            event(r#"{"id":"early","title":"x","date":"2025-05-01"}"#),
        ];
        Event::sort_collection(&mut events);
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "none"]);
    }

    #[test]
    fn test_group_by_status_keeps_order() {
        let events = vec![
            event(r#"{"id":"p1","title":"x","date":"2025-05-01"}"#),
            event(r#"{"id":"u1","title":"x","date":"2025-06-20"}"#),
            event(r#"{"id":"u2","title":"x","date":"2025-06-30"}"#),
            event(r#"{"id":"o1","title":"x","date":"2025-06-11T08:00:00Z","endDate":"2025-06-12"}"#),
            event(r#"{"id":"tbd","title":"x"}"#),
        ];
        let groups = group_by_status(&events);
        let ids = |v: &[Event]| v.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&groups.upcoming), vec!["u1", "u2"]);
        assert_eq!(ids(&groups.ongoing), vec!["o1"]);
        assert_eq!(ids(&groups.past), vec!["p1"]);
    }
}
