use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalError;

/// A structured value as seen by the canonicalizer.
///
/// Unlike [`serde_json::Value`] this can hold non-finite floats and
/// timestamps, which canonicalization normalizes away.
#[derive(Clone, Debug, PartialEq)]
pub enum CanonicalValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<CanonicalValue>),
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    /// Convert any serializable value via its JSON representation.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CanonicalError> {
        Ok(serde_json::to_value(value)?.into())
    }

    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, CanonicalValue)>,
        K: Into<String>,
    {
        CanonicalValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        match self {
            CanonicalValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CanonicalValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_non_finite(&self) -> bool {
        matches!(self, CanonicalValue::Float(f) if !f.is_finite())
    }
}

impl From<Value> for CanonicalValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CanonicalValue::Null,
            Value::Bool(b) => CanonicalValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CanonicalValue::Int(i),
                None => CanonicalValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => CanonicalValue::String(s),
            Value::Array(items) => {
                CanonicalValue::Array(items.into_iter().map(CanonicalValue::from).collect())
            }
            Value::Object(map) => CanonicalValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, CanonicalValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for CanonicalValue {
    fn from(value: &str) -> Self {
        CanonicalValue::String(value.to_owned())
    }
}

impl From<String> for CanonicalValue {
    fn from(value: String) -> Self {
        CanonicalValue::String(value)
    }
}

impl From<f64> for CanonicalValue {
    fn from(value: f64) -> Self {
        CanonicalValue::Float(value)
    }
}

impl From<i64> for CanonicalValue {
    fn from(value: i64) -> Self {
        CanonicalValue::Int(value)
    }
}

impl From<bool> for CanonicalValue {
    fn from(value: bool) -> Self {
        CanonicalValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for CanonicalValue {
    fn from(value: DateTime<Utc>) -> Self {
        CanonicalValue::Timestamp(value)
    }
}

impl From<Vec<CanonicalValue>> for CanonicalValue {
    fn from(items: Vec<CanonicalValue>) -> Self {
        CanonicalValue::Array(items)
    }
}
