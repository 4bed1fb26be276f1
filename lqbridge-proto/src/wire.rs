//! Dynamic wire documents exchanged with the host application.
//!
//! A [`WireValue`] carries no schema of its own. It is what the host hands
//! across the boundary (nested maps, lists and scalars) and what the codec
//! hands back. Conversion to and from [`serde_json::Value`] gives every wire
//! document a canonical JSON view for logging, the CLI and tests.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// String-keyed map of wire values.
pub type WireMap = BTreeMap<String, WireValue>;

/// A loosely-typed value as it crosses the host boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WireValue {
    /// Explicit null. Treated the same as an absent key by the validator.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Signed integer scalar.
    Int(i64),
    /// Unsigned integer too large for [`WireValue::Int`].
    UInt64(u64),
    /// Double-precision float. Unsigned 64-bit quantities travel as this.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Raw byte sequence.
    ByteList(Vec<u8>),
    /// Ordered list of values.
    List(Vec<Self>),
    /// String-keyed map.
    Map(WireMap),
}

impl WireValue {
    /// Returns the name of this value's wire tag, as reported in
    /// `UnexpectedType` failures.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::UInt64(_) => "UInt64",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::ByteList(_) => "ByteList",
            Self::List(_) => "List",
            Self::Map(_) => "Map",
        }
    }

    /// Returns `true` for [`WireValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the inner map, if this is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&WireMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the inner string, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Builds a map value from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<serde_json::Value> for WireValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt64(u)
                } else {
                    Self::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

impl From<WireValue> for serde_json::Value {
    fn from(value: WireValue) -> Self {
        match value {
            WireValue::Null => Self::Null,
            WireValue::Bool(b) => Self::Bool(b),
            WireValue::Int(i) => Self::from(i),
            WireValue::UInt64(u) => Self::from(u),
            // Non-finite doubles have no JSON form.
            WireValue::Double(d) => serde_json::Number::from_f64(d).map_or(Self::Null, Self::Number),
            WireValue::String(s) => Self::String(s),
            WireValue::ByteList(bytes) => Self::Array(bytes.into_iter().map(Self::from).collect()),
            WireValue::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            WireValue::Map(map) => Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl Serialize for WireValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::UInt64(u) => serializer.serialize_u64(*u),
            Self::Double(d) => serializer.serialize_f64(*d),
            Self::String(s) => serializer.serialize_str(s),
            Self::ByteList(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
