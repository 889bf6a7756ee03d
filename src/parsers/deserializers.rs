use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::ContentBlock;

/// Timestamp as a lexicographically sortable ISO-8601 string.
///
/// Strings are kept verbatim; numbers are read as Unix milliseconds (fractions truncated)
/// and rendered as RFC 3339 with millisecond precision. `null` becomes an empty string.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => {
            let ms = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or_else(|| serde::de::Error::custom("invalid timestamp"))?;
            DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
                .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
        }
        Value::Null => Ok(String::new()),
        _ => Err(serde::de::Error::custom("timestamp must be a number or string")),
    }
}

/// Optional string field that may also be `null` or a non-string scalar.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    })
}

/// Flag that may arrive as a bool, a `"true"`/`"false"` string, or junk (read as `None`).
pub fn deserialize_lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().to_ascii_lowercase().parse().ok(),
        _ => None,
    })
}

/// Content block array; blocks that are not well-formed objects are dropped.
pub fn deserialize_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw.into_iter().filter_map(|value| serde_json::from_value(value).ok()).collect())
}
