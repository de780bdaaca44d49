//! Upstream Records
//!
//! One `Record` is one row returned by the FSS OpenAPI - a company or a
//! product. The upstream guarantees no fixed schema, so records stay
//! dynamic (a JSON object) behind uniform optional-field accessors:
//! every consumer sees the same defined-absent behavior instead of
//! sprinkling its own fallbacks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known upstream field names
pub mod field {
    pub const COMPANY: &str = "company";
    pub const PRODUCT: &str = "product";
    pub const PRODUCT_TYPE: &str = "productType";
    pub const AREA: &str = "area";
    pub const AVG_FEE_RATE3: &str = "avgFeeRate3";
    pub const AVG_FEE_RATE5: &str = "avgFeeRate5";
    pub const AVG_EARN_RATE3: &str = "avgEarnRate3";
    pub const AVG_EARN_RATE5: &str = "avgEarnRate5";
    pub const EARN_RATE1: &str = "earnRate1";
    pub const GUARANTEES: &str = "guarantees";
    pub const BALANCE: &str = "balance";
    pub const RESERVE: &str = "reserve";
    pub const SELLS: &str = "sells";
    pub const LAUNCH_DATE: &str = "launchDate";
    pub const YEAR: &str = "year";
    pub const QUARTER: &str = "quarter";
}

/// Marker value of the `sells`/`guarantees` flags when active
pub const ACTIVE_MARKER: &str = "Y";

/// Worst-case sort fallback for missing fee rates (upstream convention)
pub const WORST_FEE_SENTINEL: f64 = 999.0;

/// A single upstream data row with optional-field access
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value; non-objects yield an empty record
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    /// Raw field lookup
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String field, if present and a string
    pub fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Numeric field; accepts JSON numbers and numeric strings (the
    /// upstream emits both). Non-finite values count as absent.
    pub fn num(&self, name: &str) -> Option<f64> {
        match self.0.get(name)? {
            Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Numeric field with sentinel substitution for absent/malformed values
    pub fn num_or(&self, name: &str, sentinel: f64) -> f64 {
        self.num(name).unwrap_or(sentinel)
    }

    /// Y/N flag field; absent means false
    pub fn flag(&self, name: &str) -> bool {
        self.text(name) == Some(ACTIVE_MARKER)
    }

    /// Set a field (used by tests and the demo source)
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A record with its 1-based rank after a stable sort
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedRecord {
    pub rank: u32,

    #[serde(flatten)]
    pub record: Record,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        Record::from_value(json!({
            "company": "Samsung Life",
            "avgFeeRate3": 1.25,
            "avgEarnRate3": "4.1",
            "sells": "Y",
            "guarantees": "N",
            "balance": null,
        }))
    }

    #[test]
    fn test_text_and_num_access() {
        let r = sample();
        assert_eq!(r.text(field::COMPANY), Some("Samsung Life"));
        assert_eq!(r.num(field::AVG_FEE_RATE3), Some(1.25));
        // Numeric strings parse
        assert_eq!(r.num(field::AVG_EARN_RATE3), Some(4.1));
    }

    #[test]
    fn test_missing_and_malformed_fields_degrade() {
        let r = sample();
        assert_eq!(r.num(field::RESERVE), None);
        assert_eq!(r.num_or(field::RESERVE, WORST_FEE_SENTINEL), 999.0);
        // null is absent, not an error
        assert_eq!(r.num(field::BALANCE), None);
        // a non-numeric string is absent
        assert_eq!(r.num(field::COMPANY), None);
    }

    #[test]
    fn test_flags() {
        let r = sample();
        assert!(r.flag(field::SELLS));
        assert!(!r.flag(field::GUARANTEES));
        assert!(!r.flag("missing"));
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(Record::from_value(json!([1, 2, 3])).is_empty());
        assert!(Record::from_value(json!("text")).is_empty());
    }

    #[test]
    fn test_ranked_record_flattens() {
        let ranked = RankedRecord {
            rank: 1,
            record: sample(),
        };
        let v = serde_json::to_value(&ranked).unwrap();
        assert_eq!(v["rank"], 1);
        assert_eq!(v["company"], "Samsung Life");
    }
}
