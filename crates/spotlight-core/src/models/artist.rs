use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::lenient;
use super::resource::{Resource, ResourceKind};
use crate::utils::{category_label, parse_timestamp, slugify, star_rating, title_case, truncate_string};

// ============================================================================
// Constants
// ============================================================================

/// Rating every artist starts from before the heuristic bonuses.
const BASE_RATING: f64 = 3.0;
const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

/// Portfolios larger than this earn a rating bonus.
const LARGE_PORTFOLIO_WORKS: usize = 10;

/// Descriptive words lifted from the bio into tags.
const BIO_KEYWORDS: [&str; 5] = ["contemporary", "traditional", "abstract", "realistic", "experimental"];

/// Length of the email digest used to disambiguate generated ids.
const ID_HASH_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Experience {
    Beginner,
    Intermediate,
    Experienced,
    Professional,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::Beginner,
        Experience::Intermediate,
        Experience::Experienced,
        Experience::Professional,
    ];

    /// Parse a level case-insensitively; unknown levels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Experience::Beginner),
            "intermediate" => Some(Experience::Intermediate),
            "experienced" => Some(Experience::Experienced),
            "professional" => Some(Experience::Professional),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Experience::Beginner => "beginner",
            Experience::Intermediate => "intermediate",
            Experience::Experienced => "experienced",
            Experience::Professional => "professional",
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An artist entry as it appears in `artists.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArtist {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub photo: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub secondary_mediums: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub portfolio: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
    #[serde(alias = "joinedDate", default, deserialize_with = "lenient::timestamp")]
    pub date_joined: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub last_active: Option<String>,
}

/// A normalized artist with every derived field filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub medium: String,
    #[serde(default)]
    pub secondary_mediums: Vec<String>,
    pub bio: String,
    pub featured: bool,
    pub available: bool,
    pub experience: Option<Experience>,
    #[serde(default)]
    pub portfolio: Vec<String>,
    pub portfolio_count: usize,
    pub rating: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub joined_date: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub photo: Option<String>,
}

impl Artist {
    /// Build a normalized artist from its raw JSON form.
    pub fn from_raw(raw: RawArtist, now: DateTime<Utc>) -> Self {
        let name = raw.name.unwrap_or_default();
        let medium = raw.medium.unwrap_or_default();
        let bio = raw.bio.unwrap_or_default();
        let featured = raw.featured.unwrap_or(false);
        let available = raw.available.unwrap_or(false);
        let experience = raw.experience.as_deref().and_then(Experience::parse);
        let portfolio = raw.portfolio.unwrap_or_default();
        let website = raw.website.filter(|w| !w.trim().is_empty());
        let email = raw.email.filter(|e| !e.trim().is_empty());
        let location = raw.location.filter(|l| !l.trim().is_empty());

        let id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_id(&name, email.as_deref()));

        // A zero or missing rating falls back to the heuristic.
        let rating = match raw.rating {
            Some(r) if r.is_finite() && r > 0.0 => clamp_rating(r),
            _ => heuristic_rating(featured, portfolio.len(), experience, website.is_some()),
        };

        let tags = derive_tags(&medium, featured, available, experience, location.as_deref(), &bio);

        Self {
            id,
            display_name: title_case(&name),
            name,
            medium,
            secondary_mediums: raw.secondary_mediums.unwrap_or_default(),
            bio,
            featured,
            available,
            experience,
            portfolio_count: portfolio.len(),
            portfolio,
            rating,
            tags,
            joined_date: raw.date_joined.as_deref().and_then(parse_timestamp).unwrap_or(now),
            last_active: raw.last_active.as_deref().and_then(parse_timestamp).unwrap_or(now),
            website,
            email,
            location,
            photo: raw.photo,
        }
    }

    /// True when `medium` is the primary medium or one of the secondary ones.
    pub fn has_medium(&self, medium: &str) -> bool {
        self.medium == medium || self.secondary_mediums.iter().any(|m| m == medium)
    }

    pub fn medium_label(&self) -> String {
        category_label(&self.medium)
    }

    pub fn status_label(&self) -> &'static str {
        if self.available {
            "Available"
        } else {
            "Busy"
        }
    }

    pub fn bio_excerpt(&self, max_len: usize) -> String {
        truncate_string(&self.bio, max_len)
    }

    pub fn stars(&self) -> String {
        star_rating(self.rating)
    }
}

impl Resource for Artist {
    type Raw = RawArtist;

    const KIND: ResourceKind = ResourceKind::Artists;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(raw: RawArtist, now: DateTime<Utc>) -> Self {
        Artist::from_raw(raw, now)
    }

    /// Featured artists first, then by rating, highest first.
    fn sort_collection(records: &mut [Self]) {
        records.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then_with(|| b.rating.total_cmp(&a.rating))
        });
    }
}

/// `<name-slug>-<email digest>`, or `<name-slug>-unknown` without an email.
fn generate_id(name: &str, email: Option<&str>) -> String {
    let suffix = match email {
        Some(email) => {
            let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
            digest
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<String>()
                .chars()
                .take(ID_HASH_LEN)
                .collect()
        }
        None => "unknown".to_string(),
    };
    format!("{}-{}", slugify(name), suffix)
}

fn clamp_rating(rating: f64) -> f64 {
    rating.clamp(MIN_RATING, MAX_RATING)
}

fn heuristic_rating(
    featured: bool,
    portfolio_len: usize,
    experience: Option<Experience>,
    has_website: bool,
) -> f64 {
    let mut rating = BASE_RATING;
    if featured {
        rating += 1.0;
    }
    if portfolio_len > LARGE_PORTFOLIO_WORKS {
        rating += 0.5;
    }
    if experience == Some(Experience::Professional) {
        rating += 0.5;
    }
    if has_website {
        rating += 0.3;
    }
    clamp_rating(rating)
}

fn derive_tags(
    medium: &str,
    featured: bool,
    available: bool,
    experience: Option<Experience>,
    location: Option<&str>,
    bio: &str,
) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: String| {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    push(medium.to_string());
    if featured {
        push("featured".to_string());
    }
    if available {
        push("available".to_string());
    }
    if let Some(level) = experience {
        push(level.as_str().to_string());
    }
    if let Some(location) = location {
        push(location.to_lowercase());
    }

    let bio_lower = bio.to_lowercase();
    for keyword in BIO_KEYWORDS {
        if bio_lower.contains(keyword) {
            push(keyword.to_string());
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn raw(json: &str) -> RawArtist {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_jane_doe_normalizes() {
        let artist = Artist::normalize(
            raw(r#"{"name":"jane doe","medium":"painting","bio":"a contemporary abstract painter",
                   "featured":true,"available":true,"experience":"professional"}"#),
            now(),
        );
        assert_eq!(artist.display_name, "Jane Doe");
        for tag in ["painting", "featured", "available", "professional", "contemporary", "abstract"] {
            assert!(artist.tags.iter().any(|t| t == tag), "missing tag {}", tag);
        }
        // 3 base + 1 featured + 0.5 professional
        assert_eq!(artist.rating, 4.5);
        assert_eq!(artist.id, "jane-doe-unknown");
        assert_eq!(artist.joined_date, now());
    }

    #[test]
    fn test_full_bonus_rating_clamps_to_five() {
        let works: Vec<String> = (0..12).map(|i| format!("w{}.jpg", i)).collect();
        let json = serde_json::json!({
            "name": "jane doe",
            "featured": true,
            "experience": "professional",
            "website": "https://jane.example",
            "portfolio": works,
        });
        let artist = Artist::normalize(serde_json::from_value(json).unwrap(), now());
        assert_eq!(artist.rating, 5.0);
        assert_eq!(artist.portfolio_count, 12);
    }

    #[test]
    fn test_rating_always_within_bounds() {
        for featured in [false, true] {
            for works in [0usize, 11] {
                for experience in [None, Some(Experience::Professional)] {
                    for website in [false, true] {
                        let r = heuristic_rating(featured, works, experience, website);
                        assert!((MIN_RATING..=MAX_RATING).contains(&r));
                    }
                }
            }
        }
        assert_eq!(Artist::normalize(raw(r#"{"rating":9}"#), now()).rating, 5.0);
        assert_eq!(Artist::normalize(raw(r#"{"rating":0.2}"#), now()).rating, 1.0);
        assert_eq!(Artist::normalize(raw(r#"{"rating":0}"#), now()).rating, 3.0);
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let artist = Artist::normalize(
            raw(r#"{"name":"x","medium":"abstract","bio":"Abstract and ABSTRACT again",
                   "location":"Boise"}"#),
            now(),
        );
        assert_eq!(artist.tags, vec!["abstract", "boise"]);
    }

    #[test]
    fn test_generated_id_is_deterministic() {
        let a = Artist::normalize(raw(r#"{"name":"Ana Ruiz","email":"ana@example.com"}"#), now());
        let b = Artist::normalize(raw(r#"{"name":"Ana Ruiz","email":"ana@example.com"}"#), now());
        let c = Artist::normalize(raw(r#"{"name":"Ana Ruiz","email":"ana@other.org"}"#), now());
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert!(a.id.starts_with("ana-ruiz-"));
        assert_eq!(a.id.len(), "ana-ruiz-".len() + ID_HASH_LEN);
    }

    #[test]
    fn test_explicit_id_and_dates_are_kept() {
        let artist = Artist::normalize(
            raw(r#"{"id":"a-1","name":"x","dateJoined":"2023-02-01","experience":"Guru"}"#),
            now(),
        );
        assert_eq!(artist.id, "a-1");
        assert_eq!(artist.joined_date, Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(artist.experience, None);
    }

    #[test]
    fn test_missing_fields_take_safe_defaults() {
        let artist = Artist::normalize(RawArtist::default(), now());
        assert_eq!(artist.name, "");
        assert_eq!(artist.bio, "");
        assert_eq!(artist.portfolio_count, 0);
        assert!(artist.tags.is_empty());
    }

    #[test]
    fn test_collection_sort_featured_then_rating() {
        let mut artists: Vec<Artist> = [
            r#"{"id":"plain","rating":4.9}"#,
            r#"{"id":"star","featured":true,"rating":3.1}"#,
            r#"{"id":"mid","rating":3.5}"#,
            r#"{"id":"top","featured":true,"rating":4.8}"#,
        ]
        .iter()
        .map(|j| Artist::normalize(raw(j), now()))
        .collect();
        Artist::sort_collection(&mut artists);
        let ids: Vec<&str> = artists.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "star", "plain", "mid"]);
    }

    #[test]
    fn test_secondary_medium_membership() {
        let artist = Artist::normalize(
            raw(r#"{"medium":"painting","secondaryMediums":["ceramics"]}"#),
            now(),
        );
        assert!(artist.has_medium("painting"));
        assert!(artist.has_medium("ceramics"));
        assert!(!artist.has_medium("jewelry"));
    }
}
