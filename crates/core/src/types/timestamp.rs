//! Backend timestamps.
//!
//! The backend serializes naive datetimes (`2025-03-01T10:15:00.123456`)
//! for some records and offset-qualified ones for others. Naive values are
//! UTC.

use core::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A UTC instant that accepts both naive and RFC 3339 encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a UTC datetime.
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// The wrapped instant.
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Parse either encoding.
    ///
    /// # Errors
    ///
    /// Returns the naive-parse error when neither format matches.
    pub fn parse(input: &str) -> Result<Self, chrono::ParseError> {
        if let Ok(at) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self(at.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Self(naive.and_utc()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_naive_as_utc() {
        let ts = Timestamp::parse("2025-03-01T10:15:00.123456").unwrap();
        assert_eq!(ts.to_string(), "2025-03-01 10:15");
    }

    #[test]
    fn test_parses_offset() {
        let ts = Timestamp::parse("2025-03-01T10:15:00+07:00").unwrap();
        assert_eq!(ts.to_string(), "2025-03-01 03:15");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let ts: Timestamp = serde_json::from_str(r#""2024-12-31T23:59:59""#).unwrap();
        assert_eq!(ts.as_datetime().timestamp(), 1_735_689_599);
    }
}
