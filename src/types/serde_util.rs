//! Custom serde helpers for the gateway's loose wire formats.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Timestamp layout used throughout the API, e.g. `2014-11-19 15:19:48`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a gateway timestamp. Returns `None` for anything that does not match [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()
}

fn value_to_string<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(E::custom(format!("expected string or number, got {}", other))),
    }
}

/// Identifiers such as order ids arrive either as JSON strings or as bare numbers.
pub mod string_or_number {
    use super::*;

    /// Serialize as a string
    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value)
    }

    /// Accept a string or a number
    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        value_to_string(value)?.ok_or_else(|| serde::de::Error::custom("expected string or number, got null"))
    }
}

/// Nullable variant of [`string_or_number`]. Use with `#[serde(default)]`.
pub mod opt_string_or_number {
    use super::*;

    /// Serialize as a string or null
    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(value),
            None => serializer.serialize_none(),
        }
    }

    /// Accept a string, a number or null
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        value_to_string(value)
    }
}

/// Lists of identifiers, e.g. `dp_ids: [002178]`.
pub mod vec_string_or_number {
    use super::*;

    /// Serialize as a list of strings
    pub fn serialize<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values)
    }

    /// Accept a list of strings and numbers; null is an empty list
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
        values
            .into_iter()
            .filter_map(|v| value_to_string(v).transpose())
            .collect()
    }
}
