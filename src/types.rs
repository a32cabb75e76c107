use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{BIKE_TYPE, BRAND, IN_STOCK, MODEL_ID, PRICE_GBP, WEIGHT_KG};

/// A single bicycle product entry.
///
/// Records are loosely structured: only a handful of keys are recognised and
/// everything else is carried through untouched, in its original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BikeRecord(Map<String, Value>);

impl BikeRecord {
    /// Value for `key` if the key exists and is not `null`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Value for `key` as stored, including an explicit `null`
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces `key`. A replaced key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn model_id(&self) -> Option<&Value> {
        self.get(MODEL_ID)
    }

    pub fn model_key(&self) -> Option<ModelKey> {
        self.model_id().map(ModelKey::from_value)
    }

    pub fn price_gbp(&self) -> Option<f64> {
        self.get(PRICE_GBP).and_then(Value::as_f64)
    }

    pub fn weight_kg(&self) -> Option<f64> {
        self.get(WEIGHT_KG).and_then(Value::as_f64)
    }

    pub fn in_stock(&self) -> Option<bool> {
        self.get(IN_STOCK).and_then(Value::as_bool)
    }

    pub fn bike_type(&self) -> Option<&str> {
        self.get(BIKE_TYPE).and_then(Value::as_str)
    }

    pub fn brand(&self) -> Option<&str> {
        self.get(BRAND).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl From<Map<String, Value>> for BikeRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Identity used when deduplicating on `model_id`.
///
/// Numbers compare by value, so `7` and `7.0` are the same model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelKey {
    Int(i64),
    Unsigned(u64),
    Float(u64),
    Other(String),
}

impl ModelKey {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ModelKey::Int(i)
                } else if let Some(u) = n.as_u64() {
                    ModelKey::Unsigned(u)
                } else {
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                        ModelKey::Int(f as i64)
                    } else if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 {
                        // Same key an integer literal above i64::MAX gets
                        ModelKey::Unsigned(f as u64)
                    } else {
                        ModelKey::Float(f.to_bits())
                    }
                }
            }
            other => ModelKey::Other(other.to_string()),
        }
    }
}

/// Brand frequency table, kept in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BrandCounts(IndexMap<String, usize>);

impl BrandCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, brand: &str) {
        *self.0.entry(brand.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, brand: &str) -> Option<usize> {
        self.0.get(brand).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(brand, count)| (brand.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> BikeRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_null_counts_as_missing() {
        let r = record(json!({"model_id": 1, "price_gbp": null}));
        assert!(r.contains_key("price_gbp"));
        assert!(!r.has_value("price_gbp"));
        assert_eq!(r.get_raw("price_gbp"), Some(&Value::Null));
        assert_eq!(r.price_gbp(), None);
    }

    #[test]
    fn test_unknown_keys_keep_order() {
        let r = record(json!({"zeta": 1, "model_id": 3, "alpha": "x"}));
        let keys: Vec<&String> = r.keys().collect();
        assert_eq!(keys, vec!["zeta", "model_id", "alpha"]);
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"zeta":1,"model_id":3,"alpha":"x"}"#
        );
    }

    #[test]
    fn test_model_key_numeric_equality() {
        assert_eq!(ModelKey::from_value(&json!(7)), ModelKey::from_value(&json!(7.0)));
        assert_ne!(ModelKey::from_value(&json!(7)), ModelKey::from_value(&json!("7")));
        assert_ne!(ModelKey::from_value(&json!(7.5)), ModelKey::from_value(&json!(7)));
    }

    #[test]
    fn test_model_key_large_integer_matches_float_form() {
        let literal: Value = serde_json::from_str("10000000000000000000").unwrap();
        let float: Value = serde_json::from_str("1e19").unwrap();
        assert_eq!(ModelKey::from_value(&literal), ModelKey::Unsigned(10_000_000_000_000_000_000));
        assert_eq!(ModelKey::from_value(&literal), ModelKey::from_value(&float));
    }

    #[test]
    fn test_brand_counts_serialize_in_first_seen_order() {
        let mut counts = BrandCounts::new();
        counts.increment("Trek");
        counts.increment("Giant");
        counts.increment("Trek");

        assert_eq!(counts.get("Trek"), Some(2));
        assert_eq!(counts.get("Cube"), None);
        assert_eq!(counts.total(), 3);
        assert_eq!(
            serde_json::to_string(&counts).unwrap(),
            r#"{"Trek":2,"Giant":1}"#
        );
    }
}
