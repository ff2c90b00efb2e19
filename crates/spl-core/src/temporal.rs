//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, the issuance instant stored in every signed record.
//!
//! The timestamp is part of the signed payload, so its textual form must be
//! unique: always `YYYY-MM-DDTHH:MM:SSZ`, no sub-seconds, no `+00:00`.
//! Any other spelling of the same instant (offsets, sub-seconds, a lowercase
//! `t` or space separator) is rejected at construction and on
//! deserialization, so a bundle whose timestamp was rewritten fails to parse
//! instead of verifying against different bytes.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SplError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`]: from the canonical string form only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from its canonical `YYYY-MM-DDTHH:MM:SSZ` form.
    ///
    /// Only the exact form produced by [`Timestamp::to_iso8601()`] is
    /// accepted. Explicit offsets (`+00:00` included), sub-seconds, a
    /// lowercase `t` or a space separator are all rejected, so a parsed
    /// timestamp always re-serializes to the input bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SplError::Validation`] if the string is not RFC 3339 or is
    /// not in canonical form.
    pub fn parse(s: &str) -> Result<Self, SplError> {
        if !s.ends_with('Z') {
            return Err(SplError::Validation(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            SplError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        let ts = Self(dt.with_timezone(&Utc));
        if ts.to_iso8601() != s {
            return Err(SplError::Validation(format!(
                "timestamp must be YYYY-MM-DDTHH:MM:SSZ, got: {s:?}"
            )));
        }
        Ok(ts)
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO8601 with Z suffix (e.g., `2025-01-01T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 45).unwrap();
        let dt_with_nanos = dt.with_nanosecond(123_456_789).unwrap();
        let ts = Timestamp::from_utc(dt_with_nanos);
        assert_eq!(ts.to_iso8601(), "2025-01-01T09:30:45Z");
    }

    #[test]
    fn test_display_matches_iso8601() {
        let ts = Timestamp::from_utc(Utc.with_ymd_and_hms(2035, 12, 31, 23, 59, 59).unwrap());
        assert_eq!(format!("{ts}"), "2035-12-31T23:59:59Z");
    }

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2025-01-01T12:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2025-01-01T12:00:00Z");
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2025-01-01T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2025-01-01T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("2025-01-01T08:00:00-04:00").is_err());
    }

    #[test]
    fn test_parse_subseconds_rejected() {
        assert!(Timestamp::parse("2025-01-01T12:00:00.987Z").is_err());
        assert!(Timestamp::parse("2025-01-01T12:00:00.000Z").is_err());
    }

    #[test]
    fn test_parse_non_canonical_separators_rejected() {
        assert!(Timestamp::parse("2025-01-01t12:00:00Z").is_err());
        assert!(Timestamp::parse("2025-01-01 12:00:00Z").is_err());
        assert!(Timestamp::parse("2025-01-01T12:00:00z").is_err());
    }

    #[test]
    fn test_deserialize_requires_canonical_form() {
        let ok: Timestamp = serde_json::from_str(r#""2025-06-01T08:30:00Z""#).unwrap();
        assert_eq!(ok.to_iso8601(), "2025-06-01T08:30:00Z");
        for bad in [
            r#""2025-06-01 08:30:00Z""#,
            r#""2025-06-01t08:30:00Z""#,
            r#""2025-06-01T08:30:00.999Z""#,
        ] {
            assert!(serde_json::from_str::<Timestamp>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("2025-01-01").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_serde_is_plain_string() {
        let ts = Timestamp::parse("2025-01-01T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, r#""2025-01-01T12:00:00Z""#);
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn test_deserialize_rejects_offset() {
        let result: Result<Timestamp, _> = serde_json::from_str(r#""2025-01-01T12:00:00+00:00""#);
        assert!(result.is_err());
    }
}
