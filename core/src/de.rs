//! Lenient field decoders for scan source payloads.
//!
//! The scan source is loose about JSON types: plugin ids arrive as numbers or
//! strings, CVSS scores as strings or floats, operating systems as a string or
//! a list, and optional collections as `null`.

use serde::de::{Deserialize, Deserializer, Error};
use serde_json::Value;

/// Treat an explicit `null` like a missing value.
pub fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Scalar or list of scalars rendered as text; lists are joined by newline.
pub fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(d)?))
}

fn value_to_text(v: Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_to_text).collect();
            if parts.is_empty() { None } else { Some(parts.join("\n")) }
        }
        Value::Object(_) => None,
    }
}

/// Integer that may be encoded as a JSON string.
pub fn lenient_i64<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    value_to_i64(&v).ok_or_else(|| D::Error::custom(format!("expected integer, got {v}")))
}

pub fn opt_lenient_i64<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    if v.is_null() {
        return Ok(None);
    }
    value_to_i64(&v)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected integer, got {v}")))
}

fn value_to_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A list of strings, a single string (one-element list) or null.
pub fn opt_string_seq<'de, D>(d: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(vec![s])),
        Value::Array(items) => Ok(Some(items.into_iter().filter_map(value_to_text).collect())),
        other => Err(D::Error::custom(format!("expected string list, got {other}"))),
    }
}
