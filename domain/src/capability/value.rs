//! Neutral value type for capability input.
//!
//! Raw arguments arrive as loosely-typed JSON. They are decoded exactly once,
//! at the boundary, into the [`Value`] union. The validator and the handlers
//! then pattern-match on that union instead of probing JSON ad hoc, so a value
//! of the wrong shape can never be silently read as "absent".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::CapabilityError;

/// A single input value.
///
/// Integers that do not fit in an `i64` are decoded as [`Value::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the value's shape, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Canonical string form used for enum membership checks.
    ///
    /// Strings are rendered verbatim, booleans as `true`/`false`, numbers in
    /// their shortest decimal form (`3.0` renders as `3`), `null` as `null`,
    /// arrays and objects as compact JSON.
    pub fn canonical_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Object(_) => self.to_json().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view. Whole finite floats (e.g. `5.0`) are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if is_whole(*f) && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert back to JSON for transport.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self.clone())
    }
}

/// True for finite floats without a fractional component.
pub(crate) fn is_whole(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}

impl fmt::Display for Value {
    /// JSON rendering (strings are quoted), used when echoing rejected values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

/// The string-keyed argument map handed to a capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(BTreeMap<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Decode a JSON value. `null` is treated as an empty map; any other
    /// non-object input is rejected.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CapabilityError> {
        match Value::from(value) {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(CapabilityError::InvalidArguments(format!(
                "arguments must be a JSON object, got {}",
                other.kind_name()
            ))),
        }
    }

    /// Parse a JSON document. Blank input yields an empty map.
    pub fn parse_json(text: &str) -> Result<Self, CapabilityError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            CapabilityError::InvalidArguments(format!("failed to parse arguments JSON: {}", e))
        })?;
        Self::from_json(value)
    }

    pub fn to_json(&self) -> serde_json::Value {
        Value::Object(self.0.clone()).to_json()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_array(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn get_object(&self, key: &str) -> Option<&BTreeMap<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// Get a string argument or fail with an invalid-argument error.
    pub fn require_str(&self, key: &str) -> Result<&str, CapabilityError> {
        self.get_str(key).ok_or_else(|| {
            CapabilityError::InvalidArguments(format!("missing string argument: {}", key))
        })
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_numbers() {
        assert_eq!(Value::from(json!(8080)), Value::Integer(8080));
        assert_eq!(Value::from(json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from(json!(u64::MAX)), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn test_canonical_string() {
        assert_eq!(Value::from("fast").canonical_string(), "fast");
        assert_eq!(Value::Bool(true).canonical_string(), "true");
        assert_eq!(Value::Integer(-4).canonical_string(), "-4");
        assert_eq!(Value::Float(3.0).canonical_string(), "3");
        assert_eq!(Value::Float(2.5).canonical_string(), "2.5");
        assert_eq!(Value::Null.canonical_string(), "null");
        assert_eq!(
            Value::from(json!({"a": [1, "x"]})).canonical_string(),
            r#"{"a":[1,"x"]}"#
        );
    }

    #[test]
    fn test_as_i64_accepts_whole_floats_only() {
        assert_eq!(Value::Float(5.0).as_i64(), Some(5));
        assert_eq!(Value::Float(5.5).as_i64(), None);
        assert_eq!(Value::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(Value::from("5").as_i64(), None);
    }

    #[test]
    fn test_arguments_from_json() {
        let args = Arguments::from_json(json!({"name": "svc", "port": 80})).unwrap();
        assert_eq!(args.get_str("name"), Some("svc"));
        assert_eq!(args.get_i64("port"), Some(80));
        assert!(args.require_str("missing").is_err());

        assert!(Arguments::from_json(json!(null)).unwrap().is_empty());
        let err = Arguments::from_json(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_parse_json() {
        assert!(Arguments::parse_json("  ").unwrap().is_empty());
        assert!(Arguments::parse_json("{not json").is_err());
        let args = Arguments::parse_json(r#"{"flag": true}"#).unwrap();
        assert_eq!(args.get_bool("flag"), Some(true));
    }

    #[test]
    fn test_json_round_trip_preserves_shape() {
        let original = json!({"list": [1, 2.5, null], "nested": {"ok": false}});
        let args = Arguments::from_json(original.clone()).unwrap();
        assert_eq!(args.to_json(), original);
    }
}
