//! Coercion rules shared by the raw records.
//!
//! The remote is loosely typed: flags show up as booleans or numbers, and timestamps as unix
//! seconds or date strings. Everything else is parsed strictly, so a negative id or count is a
//! deserialization error rather than being clamped.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::{self, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(f64),
}

/// Accepts `true`/`false` or a number, where any positive number is `true`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(value) => value,
        RawFlag::Number(value) => value > 0.0,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Seconds(u64),
    Date(String),
}

/// Accepts unix seconds or an RFC 3339 date string.
pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Seconds(secs) => i64::try_from(secs)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| de::Error::custom(format_args!("timestamp {secs} is out of range"))),
        RawTimestamp::Date(date) => DateTime::parse_from_rfc3339(&date)
            .map(|date| date.with_timezone(&Utc))
            .map_err(|e| de::Error::custom(format_args!("invalid date `{date}`: {e}"))),
    }
}
