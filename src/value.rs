//! The runtime value model that schemas validate.
//!
//! [`Value`] is a closed model of dynamically-typed data: the JSON values plus
//! `undefined`, non-finite numbers, big integers, dates, maps and sets. Object
//! keys keep insertion order, and a key that is present with
//! [`Value::Undefined`] is distinct from an absent key.

use std::fmt::{self, Display};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;

/// A dynamically-typed runtime value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    /// A double-precision number; `NaN` and the infinities are representable.
    Number(f64),
    BigInt(i128),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    /// Key/value pairs in insertion order. Keys may be any value.
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
}

impl Value {
    /// Builds an object from `(key, value)` pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the type label used in `invalid_type` issues.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Looks up an object property. Non-objects have no properties.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Reads a property the way a dynamic language does: absent keys and
    /// non-objects read as `undefined`.
    pub fn property(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or(Value::Undefined)
    }

    /// Converts to JSON. `undefined` object entries are dropped, maps become
    /// arrays of `[key, value]` pairs, sets become arrays, dates become
    /// RFC 3339 strings and non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Undefined | Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::BigInt(i) => match i64::try_from(*i) {
                Ok(small) => Json::from(small),
                Err(_) => Json::String(i.to_string()),
            },
            Value::String(s) => Json::String(s.clone()),
            Value::Date(d) => Json::String(d.to_rfc3339()),
            Value::Array(items) | Value::Set(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => Json::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Map(entries) => Json::Array(
                entries
                    .iter()
                    .map(|(k, v)| Json::Array(vec![k.to_json(), v.to_json()]))
                    .collect(),
            ),
        }
    }

    /// `String(value)`.
    pub fn coerce_string(&self) -> Option<String> {
        Some(match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::BigInt(i) => i.to_string(),
            Value::String(s) => s.clone(),
            Value::Date(d) => d.to_rfc3339(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => Some(String::new()),
                    other => other.coerce_string(),
                })
                .collect::<Option<Vec<_>>>()?
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Map(_) => "[object Map]".to_string(),
            Value::Set(_) => "[object Set]".to_string(),
        })
    }

    /// `Number(value)`. Never fails; unconvertible input yields `NaN`.
    pub fn coerce_number(&self) -> Option<f64> {
        Some(match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::BigInt(i) => *i as f64,
            Value::String(s) => parse_js_number(s),
            Value::Date(d) => d.timestamp_millis() as f64,
            Value::Array(_) => parse_js_number(&self.coerce_string()?),
            Value::Object(_) | Value::Map(_) | Value::Set(_) => f64::NAN,
        })
    }

    /// `Boolean(value)`: truthiness.
    pub fn coerce_boolean(&self) -> Option<bool> {
        Some(match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(*n == 0.0 || n.is_nan()),
            Value::BigInt(i) => *i != 0,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
    }

    /// `BigInt(value)`. Returns `None` where the conversion would throw.
    pub fn coerce_bigint(&self) -> Option<i128> {
        match self {
            Value::Bool(b) => Some(i128::from(*b)),
            Value::BigInt(i) => Some(*i),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i128),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0)
                } else {
                    trimmed.parse::<i128>().ok()
                }
            }
            _ => None,
        }
    }

    /// `new Date(value)`. Returns `None` for an invalid date.
    pub fn coerce_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Null => DateTime::<Utc>::from_timestamp_millis(0),
            Value::Bool(b) => DateTime::<Utc>::from_timestamp_millis(i64::from(*b)),
            Value::Number(n) if n.is_finite() => DateTime::<Utc>::from_timestamp_millis(*n as i64),
            Value::BigInt(i) => i64::try_from(*i)
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            Value::String(s) => parse_date(s.trim()),
            _ => None,
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Formats a number the way `String(n)` does for the common cases.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

fn parse_js_number(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => {
            if let Some(hex) = trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
            {
                return i64::from_str_radix(hex, 16)
                    .map(|v| v as f64)
                    .unwrap_or(f64::NAN);
            }
            let plausible = trimmed
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
            if plausible {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            } else {
                f64::NAN
            }
        }
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(d.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Number(n) => write!(f, "{}", number_to_string(*n)),
            Value::BigInt(i) => write!(f, "{}n", i),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::Map(entries) => write!(f, "Map({})", entries.len()),
            Value::Set(items) => write!(f, "Set({})", items.len()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
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

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_key_order() {
        let value = Value::from(json!({"z": 1, "a": 2}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_to_json_drops_undefined_entries() {
        let value = Value::object([("a", Value::Undefined), ("b", Value::from(1))]);
        assert_eq!(value.to_json(), json!({"b": 1}));
    }

    #[test]
    fn test_integral_numbers_round_trip_as_integers() {
        assert_eq!(Value::Number(3.0).to_json(), json!(3));
        assert_eq!(Value::Number(1.5).to_json(), json!(1.5));
        assert_eq!(Value::Number(f64::NAN).to_json(), json!(null));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Undefined.type_name(), "undefined");
        assert_eq!(Value::BigInt(1).type_name(), "bigint");
        assert_eq!(Value::Set(vec![]).type_name(), "set");
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(Value::from("42").coerce_number(), Some(42.0));
        assert_eq!(Value::from("  ").coerce_number(), Some(0.0));
        assert!(Value::from("abc").coerce_number().unwrap().is_nan());
        assert!(Value::from("inf").coerce_number().unwrap().is_nan());
        assert_eq!(Value::Bool(true).coerce_number(), Some(1.0));
        assert!(Value::Undefined.coerce_number().unwrap().is_nan());
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(Value::from(12).coerce_string().unwrap(), "12");
        assert_eq!(Value::Number(0.5).coerce_string().unwrap(), "0.5");
        assert_eq!(Value::Null.coerce_string().unwrap(), "null");
        assert_eq!(
            Value::Array(vec![Value::from(1), Value::Null, Value::from("x")])
                .coerce_string()
                .unwrap(),
            "1,,x"
        );
    }

    #[test]
    fn test_coerce_bigint_rejects_fractions() {
        assert_eq!(Value::Number(3.0).coerce_bigint(), Some(3));
        assert_eq!(Value::Number(3.5).coerce_bigint(), None);
        assert_eq!(Value::from("12").coerce_bigint(), Some(12));
        assert_eq!(Value::Undefined.coerce_bigint(), None);
    }

    #[test]
    fn test_coerce_date() {
        let d = Value::from("2024-01-02").coerce_date().unwrap();
        assert_eq!(d.to_rfc3339(), "2024-01-02T00:00:00+00:00");
        assert!(Value::from("not a date").coerce_date().is_none());
        assert_eq!(
            Value::from(0).coerce_date(),
            DateTime::<Utc>::from_timestamp_millis(0)
        );
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(Value::from("").coerce_boolean(), Some(false));
        assert_eq!(Value::Number(f64::NAN).coerce_boolean(), Some(false));
        assert_eq!(Value::Object(IndexMap::new()).coerce_boolean(), Some(true));
    }
}
