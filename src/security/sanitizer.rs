//! Sensitive-field stripping for datalayer records.
//!
//! Removes every top-level key whose lowercase form is in the configured
//! sensitive set. Retained keys keep their values and their order.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::logging::structured::LogContext;

/// Case-insensitive set of field names that must never reach the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitiveKeys {
    keys: BTreeSet<String>,
}

impl SensitiveKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Counts collected while sanitizing a batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SanitizationResult {
    pub records: usize,
    pub records_modified: usize,
    pub fields_removed: usize,
}

/// Strip sensitive keys from one record, returning it with the removal count.
pub fn sanitize_record(record: Map<String, Value>, keys: &SensitiveKeys) -> (Map<String, Value>, usize) {
    let before = record.len();
    let retained: Map<String, Value> = record
        .into_iter()
        .filter(|(key, _)| !keys.is_sensitive(key))
        .collect();
    let removed = before - retained.len();
    (retained, removed)
}

/// Strip sensitive keys from every record of a batch.
pub fn sanitize_batch(
    records: Vec<Map<String, Value>>,
    keys: &SensitiveKeys,
    ctx: &LogContext,
) -> (Vec<Map<String, Value>>, SanitizationResult) {
    log::debug!("{} SANITIZE_START records={}", ctx, records.len());

    let mut result = SanitizationResult {
        records: records.len(),
        ..SanitizationResult::default()
    };

    let sanitized: Vec<Map<String, Value>> = records
        .into_iter()
        .map(|record| {
            let (clean, removed) = sanitize_record(record, keys);
            if removed > 0 {
                result.records_modified += 1;
                result.fields_removed += removed;
            }
            clean
        })
        .collect();

    if result.fields_removed > 0 {
        log::info!(
            "{} SANITIZED records={} records_modified={} fields_removed={}",
            ctx,
            result.records,
            result.records_modified,
            result.fields_removed
        );
    } else {
        log::debug!("{} SANITIZE_COMPLETE fields_removed=0", ctx);
    }

    (sanitized, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn default_keys() -> SensitiveKeys {
        SensitiveKeys::new([
            "email", "nome", "cpf", "phone", "telefone", "endereco", "address",
        ])
    }

    #[test]
    fn test_strips_sensitive_keys_case_insensitively() {
        let keys = default_keys();
        let record = object(json!({"event": "click", "Email": "a@b.com", "CPF": "123", "page": "/home"}));

        let (clean, removed) = sanitize_record(record, &keys);

        assert_eq!(clean, object(json!({"event": "click", "page": "/home"})));
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_preserves_key_order() {
        let keys = default_keys();
        let record = object(json!({"zeta": 1, "email": "x", "alpha": 2, "mid": {"email": "nested"}}));

        let (clean, _) = sanitize_record(record, &keys);
        let order: Vec<&str> = clean.keys().map(String::as_str).collect();

        assert_eq!(order, vec!["zeta", "alpha", "mid"]);
        // Only top-level keys are filtered.
        assert_eq!(clean["mid"], json!({"email": "nested"}));
    }

    #[test]
    fn test_clean_record_unchanged() {
        let keys = default_keys();
        let record = object(json!({"event": "view", "emails_sent": 3, "address_line": null}));

        let (clean, removed) = sanitize_record(record.clone(), &keys);

        assert_eq!(clean, record);
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_batch_counts() {
        let ctx = LogContext::new("test-request");
        let keys = default_keys();
        let batch = vec![
            object(json!({"event": "click", "email": "a@b.com"})),
            object(json!({"event": "view"})),
            object(json!({"phone": "555", "Telefone": "555", "event": "lead"})),
        ];

        let (clean, result) = sanitize_batch(batch, &keys, &ctx);

        assert_eq!(clean.len(), 3);
        assert_eq!(
            result,
            SanitizationResult {
                records: 3,
                records_modified: 2,
                fields_removed: 3,
            }
        );
        assert_eq!(clean[2], object(json!({"event": "lead"})));
    }

    #[test]
    fn test_key_set_normalizes_entries() {
        let keys = SensitiveKeys::new([" Email ", "", "CPF"]);
        assert_eq!(keys.len(), 2);
        assert!(keys.is_sensitive("eMaIl"));
        assert!(keys.is_sensitive("cpf"));
        assert!(!keys.is_sensitive("event"));
    }

    fn record_strategy() -> impl Strategy<Value = Map<String, Value>> {
        let key = prop_oneof![
            Just("email".to_string()),
            Just("EMAIL".to_string()),
            Just("Cpf".to_string()),
            Just("address".to_string()),
            "[a-zA-Z_]{1,12}",
        ];
        let value = prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[ -~]{0,16}".prop_map(Value::from),
        ];
        prop::collection::vec((key, value), 0..12)
            .prop_map(|pairs| pairs.into_iter().collect::<Map<String, Value>>())
    }

    proptest! {
        #[test]
        fn prop_no_sensitive_key_survives(batch in prop::collection::vec(record_strategy(), 0..20)) {
            let keys = default_keys();
            let ctx = LogContext::new("prop");
            let submitted = batch.len();
            let (clean, _) = sanitize_batch(batch, &keys, &ctx);

            prop_assert_eq!(clean.len(), submitted);
            for record in &clean {
                for key in record.keys() {
                    prop_assert!(!keys.is_sensitive(key), "sensitive key {} survived", key);
                }
            }
        }

        #[test]
        fn prop_sanitize_is_idempotent(batch in prop::collection::vec(record_strategy(), 0..20)) {
            let keys = default_keys();
            let ctx = LogContext::new("prop");
            let (once, _) = sanitize_batch(batch, &keys, &ctx);
            let (twice, second) = sanitize_batch(once.clone(), &keys, &ctx);

            prop_assert_eq!(once, twice);
            prop_assert_eq!(second.fields_removed, 0);
        }
    }
}
