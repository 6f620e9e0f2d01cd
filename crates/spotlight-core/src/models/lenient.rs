//! Field decoders for hand-edited source JSON.
//!
//! Each one reads whatever JSON value is present and turns a value of the
//! wrong type into `None`, so one odd field falls back to its default
//! instead of costing the whole record. Use with
//! `#[serde(default, deserialize_with = "...")]`.

use chrono::DateTime;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Strings as-is; numbers in their decimal form.
pub(crate) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Booleans, or the strings `"true"` / `"false"`.
pub(crate) fn boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Numbers, or numeric strings such as `"4.5"`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

/// Arrays keep their string elements; a lone string becomes a one-item list.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        Value::String(s) => Some(vec![s]),
        _ => None,
    })
}

/// Timestamp text, or epoch milliseconds rewritten as RFC 3339 text.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "string")]
        text: Option<String>,
        #[serde(default, deserialize_with = "boolean")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "number")]
        score: Option<f64>,
        #[serde(default, deserialize_with = "string_list")]
        list: Option<Vec<String>>,
        #[serde(default, deserialize_with = "timestamp")]
        when: Option<String>,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_well_typed_values_pass_through() {
        let s = sample(r#"{"text":"hi","flag":true,"score":4.5,"list":["a","b"],"when":"2025-06-01"}"#);
        assert_eq!(s.text.as_deref(), Some("hi"));
        assert_eq!(s.flag, Some(true));
        assert_eq!(s.score, Some(4.5));
        assert_eq!(s.list.unwrap(), vec!["a", "b"]);
        assert_eq!(s.when.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn test_mistyped_values_become_none() {
        let s = sample(r#"{"text":{"a":1},"flag":"yes","score":"high","list":7,"when":false}"#);
        assert!(s.text.is_none());
        assert!(s.flag.is_none());
        assert!(s.score.is_none());
        assert!(s.list.is_none());
        assert!(s.when.is_none());
    }

    #[test]
    fn test_convertible_values_are_converted() {
        let s = sample(r#"{"text":12,"flag":"False","score":" 3.5 ","list":["a",1,"b"],"when":1750000000000}"#);
        assert_eq!(s.text.as_deref(), Some("12"));
        assert_eq!(s.flag, Some(false));
        assert_eq!(s.score, Some(3.5));
        assert_eq!(s.list.unwrap(), vec!["a", "b"]);
        let when = DateTime::parse_from_rfc3339(s.when.as_deref().unwrap()).unwrap();
        assert_eq!(when.timestamp_millis(), 1_750_000_000_000);
    }

    #[test]
    fn test_null_and_missing_are_none() {
        let s = sample(r#"{"text":null,"flag":null}"#);
        assert!(s.text.is_none() && s.flag.is_none() && s.score.is_none());
    }
}
