//! The PackStream value model.
//!
//! [`Value`] is a closed sum over the five variants the codec can carry.
//! Maps are keyed by `String`, so a non-text key cannot be constructed on the
//! encode side; the decoder rejects non-text keys it finds on the wire.
//!
//! # Example
//!
//! ```
//! use packstream_client::Value;
//!
//! let v = Value::map([("name", Value::from("Alice")), ("age", Value::Integer(33))]);
//! assert_eq!(v.type_name(), "Map");
//! assert_eq!(v.as_map().unwrap()["age"], Value::Integer(33));
//! ```

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::PackStreamError;

/// A PackStream value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// `true` or `false`.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 text.
    Text(String),
    /// Text-keyed map. Entry order carries no meaning.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Build a map value from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Text(_) => "Text",
            Value::Map(_) => "Map",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
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

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = PackStreamError;

    /// Convert a JSON document into a PackStream value.
    ///
    /// Floats, integers outside `i64` and arrays have no PackStream
    /// representation here and fail with `UnsupportedValueType`.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
            serde_json::Value::Number(n) => n.as_i64().map(Value::Integer).ok_or_else(|| {
                PackStreamError::UnsupportedValueType(format!("non-integer number {}", n))
            }),
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Array(_) => Err(PackStreamError::UnsupportedValueType(
                "array".to_string(),
            )),
            serde_json::Value::Object(obj) => obj
                .into_iter()
                .map(|(k, v)| Value::try_from(v).map(|v| (k, v)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Value::Map),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Text(s) => serde_json::Value::String(s),
            Value::Map(m) => serde_json::Value::Object(
                m.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
