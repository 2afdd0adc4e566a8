//! Attribute records produced by extraction

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Open mapping of attribute name to JSON value
///
/// Records are parsed from provider output and then validated per category.
/// Integral floating-point numbers (`32.0`) are rewritten as integers when a
/// record is parsed, so downstream code sees one representation for whole
/// numbers. Numeric reads go through [`AttributeRecord::number`], which accepts
/// both representations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRecord(Map<String, Value>);

/// Failure to turn provider text into an attribute record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    /// Text is not well-formed JSON
    #[error("malformed JSON: {0}")]
    Malformed(String),

    /// Well-formed JSON, but not an object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl AttributeRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parse a JSON object, normalizing integral numbers to integers
    pub fn from_json_str(text: &str) -> Result<Self, RecordParseError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| RecordParseError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wrap an already-decoded JSON value, normalizing integral numbers
    pub fn from_value(value: Value) -> Result<Self, RecordParseError> {
        match normalize_numbers(value) {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RecordParseError::NotAnObject(json_kind(&other))),
        }
    }

    /// Get a raw field value; `null` counts as absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Get a string field
    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Get a numeric field as f64, whether stored as integer or float
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    /// Get a boolean field
    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Whether the field exists with a non-null value
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Remove a field, returning its previous value
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Number of fields, including null-valued ones
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into the underlying JSON object
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for AttributeRecord {
    fn from(map: Map<String, Value>) -> Self {
        match normalize_numbers(Value::Object(map)) {
            Value::Object(map) => Self(map),
            _ => unreachable!("normalizing an object yields an object"),
        }
    }
}

impl From<AttributeRecord> for Value {
    fn from(record: AttributeRecord) -> Self {
        Value::Object(record.0)
    }
}

/// Rewrite floats with no fractional part as integers, recursively
fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or_default();
            if f.fract() == 0.0 && f.abs() < 9.0e15 {
                Value::Number(Number::from(f as i64))
            } else {
                Value::Number(n)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integral_floats_become_integers() {
        let record = AttributeRecord::from_json_str(
            r#"{"capacity_gb": 32.0, "confidence": 0.9, "nested": [4.0, {"x": 2.0}]}"#,
        )
        .unwrap();

        assert_eq!(record.get("capacity_gb"), Some(&json!(32)));
        assert!(record.get("capacity_gb").unwrap().is_i64());
        assert_eq!(record.get("confidence"), Some(&json!(0.9)));
        assert_eq!(record.get("nested"), Some(&json!([4, {"x": 2}])));
    }

    #[test]
    fn test_numbers_read_interchangeably() {
        let record = AttributeRecord::from_value(json!({"a": 3, "b": 3.5})).unwrap();
        assert_eq!(record.number("a"), Some(3.0));
        assert_eq!(record.number("b"), Some(3.5));
        assert_eq!(record.number("missing"), None);
    }

    #[test]
    fn test_null_counts_as_absent() {
        let record = AttributeRecord::from_value(json!({"speed_mhz": null})).unwrap();
        assert!(!record.contains("speed_mhz"));
        assert_eq!(record.get("speed_mhz"), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_typed_accessors_reject_wrong_types() {
        let record =
            AttributeRecord::from_value(json!({"ecc": "yes", "model": 720, "rpm": "7200"}))
                .unwrap();
        assert_eq!(record.bool("ecc"), None);
        assert_eq!(record.str("model"), None);
        assert_eq!(record.number("rpm"), None);
    }

    #[test]
    fn test_malformed_and_non_object_input() {
        assert!(matches!(
            AttributeRecord::from_json_str("{not json"),
            Err(RecordParseError::Malformed(_))
        ));
        assert_eq!(
            AttributeRecord::from_json_str("[1, 2]"),
            Err(RecordParseError::NotAnObject("array"))
        );
        assert_eq!(
            AttributeRecord::from_json_str("\"ram\""),
            Err(RecordParseError::NotAnObject("string"))
        );
    }

    #[test]
    fn test_parse_error_messages() {
        let err: Box<dyn std::error::Error> =
            Box::new(AttributeRecord::from_json_str("[1]").unwrap_err());
        assert_eq!(err.to_string(), "expected a JSON object, got array");

        let err = AttributeRecord::from_json_str("{oops").unwrap_err();
        assert!(err.to_string().starts_with("malformed JSON: "));
    }

    #[test]
    fn test_from_map_normalizes() {
        let mut map = Map::new();
        map.insert("port_count".to_string(), json!(2.0));
        let record = AttributeRecord::from(map);
        assert!(record.get("port_count").unwrap().is_i64());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut record = AttributeRecord::new();
        assert!(record.is_empty());
        record.insert("condition", "new");
        assert_eq!(record.str("condition"), Some("new"));
        assert_eq!(record.remove("condition"), Some(json!("new")));
        assert!(record.is_empty());
    }
}
