//! Timestamp helpers shared by the data model and the persistence layer.
//!
//! Timestamps are stored as ISO-8601 strings with millisecond precision
//! (`2024-05-01T09:30:00.123Z`). Revival is lenient: a missing or unparsable
//! value becomes "now" instead of an error.

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Current time truncated to whole milliseconds.
///
/// Truncating at creation keeps the persisted form lossless.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp the way it is persisted.
#[must_use]
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Revive a timestamp from an arbitrary JSON value.
///
/// Accepts RFC 3339 strings and integer epoch milliseconds. Anything else,
/// including `null` and absent fields, yields [`now`].
#[must_use]
pub fn revive(value: Option<&Value>) -> DateTime<Utc> {
    let parsed = match value {
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    parsed.unwrap_or_else(now)
}

/// Serde `serialize_with` target.
///
/// # Errors
/// Propagates serializer errors.
pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

/// Serde `deserialize_with` target that never fails on a bad timestamp.
///
/// # Errors
/// Only fails if the underlying input is not valid JSON-like data at all.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(revive(value.as_ref()))
}
