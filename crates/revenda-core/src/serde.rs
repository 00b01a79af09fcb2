// Module name shadows the `serde` crate — use `::serde` for the external crate.
use ::serde::Serializer;
use chrono::{DateTime, SecondsFormat, Utc};

/// Format a `DateTime<Utc>` as RFC 3339 with 3-digit fractional seconds.
/// This is the timestamp format of every external surface (API responses and
/// outbound webhook payloads).
pub fn rfc3339_ms(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde serializer wrapper around [`rfc3339_ms`], for
/// `#[serde(serialize_with = ...)]` on response structs.
pub fn to_rfc3339_ms<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&rfc3339_ms(dt))
}
