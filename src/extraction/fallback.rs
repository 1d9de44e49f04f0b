//! Fallback record synthesis.
//!
//! When a lenient deployment receives a body without a usable `datalayer`
//! array, a single record `{info, url, timestamp}` is built from the body's
//! top-level fields, with placeholders for anything absent.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

pub const DEFAULT_INFO: &str = "no_dataLayer";
pub const DEFAULT_URL: &str = "unknown";

/// The single record relayed in place of a missing datalayer.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRecord {
    pub info: Value,
    pub url: Value,
    pub timestamp: Value,
}

impl FallbackRecord {
    /// Build from the request body, using `now` for a missing timestamp.
    pub fn from_body(body: &Value, now: DateTime<Utc>) -> Self {
        Self {
            info: field_or(body, "info", || Value::from(DEFAULT_INFO)),
            url: field_or(body, "url", || Value::from(DEFAULT_URL)),
            timestamp: field_or(body, "timestamp", || {
                Value::from(now.to_rfc3339_opts(SecondsFormat::Millis, true))
            }),
        }
    }

    /// Record form, keys in `info`, `url`, `timestamp` order.
    pub fn into_record(self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("info".to_string(), self.info);
        record.insert("url".to_string(), self.url);
        record.insert("timestamp".to_string(), self.timestamp);
        record
    }
}

/// Null and empty strings count as absent.
fn field_or<F>(body: &Value, key: &str, default: F) -> Value
where
    F: FnOnce() -> Value,
{
    match body.get(key) {
        None | Some(Value::Null) => default(),
        Some(Value::String(s)) if s.is_empty() => default(),
        Some(value) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_present_fields_copied() {
        let body = json!({"url": "https://x", "timestamp": "2024-01-01T00:00:00Z"});
        let record = FallbackRecord::from_body(&body, fixed_now()).into_record();

        assert_eq!(
            Value::Object(record),
            json!({"info": "no_dataLayer", "url": "https://x", "timestamp": "2024-01-01T00:00:00Z"})
        );
    }

    #[test]
    fn test_all_defaults() {
        let record = FallbackRecord::from_body(&json!({}), fixed_now());

        assert_eq!(record.info, json!("no_dataLayer"));
        assert_eq!(record.url, json!("unknown"));
        assert_eq!(record.timestamp, json!("2024-05-01T12:30:00.000Z"));
    }

    #[test]
    fn test_null_and_empty_treated_as_absent() {
        let body = json!({"info": null, "url": "", "timestamp": null});
        let record = FallbackRecord::from_body(&body, fixed_now());

        assert_eq!(record.info, json!("no_dataLayer"));
        assert_eq!(record.url, json!("unknown"));
        assert_eq!(record.timestamp, json!("2024-05-01T12:30:00.000Z"));
    }

    #[test]
    fn test_non_object_body_uses_defaults() {
        let record = FallbackRecord::from_body(&json!("not an object"), fixed_now());
        assert_eq!(record.info, json!("no_dataLayer"));
    }

    #[test]
    fn test_record_key_order() {
        let record = FallbackRecord::from_body(&json!({"info": "custom"}), fixed_now()).into_record();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["info", "url", "timestamp"]);
    }
}
