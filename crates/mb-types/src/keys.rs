//! Ledger key types: station, calendar date, and billing period.
//!
//! Keys are exact-match strings. Construction validates shape once; after
//! that the rest of the system treats them as opaque identifiers.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Longest accepted station identifier.
pub const MAX_STATION_ID_LEN: usize = 64;

/// Identifier of a physical generation station, e.g. `"STATION-001"`.
///
/// Must be 1 to 64 characters with no control characters. Equality is
/// exact string match.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(String);

impl StationId {
    /// Validate and wrap a station identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.is_empty() {
            return Err(TypeError::InvalidStationId(
                "station id must not be empty".into(),
            ));
        }
        if s.len() > MAX_STATION_ID_LEN {
            return Err(TypeError::InvalidStationId(format!(
                "station id exceeds {MAX_STATION_ID_LEN} characters"
            )));
        }
        if s.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidStationId(format!(
                "station id contains control characters: {s:?}"
            )));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Calendar date key in canonical `YYYY-MM-DD` form, e.g. `"2025-01-15"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(String);

impl DateKey {
    /// Validate and wrap a date key. Only the canonical zero-padded form
    /// is accepted so that equal dates are equal strings.
    pub fn new(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        let parsed = NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| TypeError::InvalidDateKey(format!("{s:?}: {e}")))?;
        if parsed.format("%Y-%m-%d").to_string() != s {
            return Err(TypeError::InvalidDateKey(format!(
                "{s:?}: not in canonical zero-padded form"
            )));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Billing period key in canonical `YYYY-MM` form, e.g. `"2025-01"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Validate and wrap a period key.
    pub fn new(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.len() != 7 {
            return Err(TypeError::InvalidPeriodKey(format!(
                "{s:?}: expected 7 characters"
            )));
        }
        // Anchor to the first of the month to reuse calendar validation.
        let first = format!("{s}-01");
        NaiveDate::parse_from_str(&first, "%Y-%m-%d")
            .map_err(|e| TypeError::InvalidPeriodKey(format!("{s:?}: {e}")))?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_key_impls {
    ($ty:ident) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($ty), "({})"), self.0)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $ty {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::new(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

string_key_impls!(StationId);
string_key_impls!(DateKey);
string_key_impls!(PeriodKey);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_id_accepts_typical_names() {
        assert!(StationId::new("STATION-001").is_ok());
        assert!(StationId::new("pv/rooftop-7").is_ok());
        assert!(StationId::new("X").is_ok());
    }

    #[test]
    fn station_id_rejects_empty() {
        assert!(matches!(
            StationId::new(""),
            Err(TypeError::InvalidStationId(_))
        ));
    }

    #[test]
    fn station_id_rejects_control_chars() {
        assert!(StationId::new("bad\nname").is_err());
        assert!(StationId::new("bad\tname").is_err());
    }

    #[test]
    fn station_id_rejects_overlong() {
        let long = "s".repeat(MAX_STATION_ID_LEN + 1);
        assert!(StationId::new(long).is_err());
        assert!(StationId::new("s".repeat(MAX_STATION_ID_LEN)).is_ok());
    }

    #[test]
    fn date_key_accepts_canonical() {
        assert!(DateKey::new("2025-01-15").is_ok());
        assert!(DateKey::new("2024-02-29").is_ok()); // leap day
    }

    #[test]
    fn date_key_rejects_invalid_calendar_dates() {
        assert!(DateKey::new("2025-02-30").is_err());
        assert!(DateKey::new("2025-13-01").is_err());
        assert!(DateKey::new("2025-00-10").is_err());
    }

    #[test]
    fn date_key_rejects_non_canonical_form() {
        assert!(DateKey::new("2025-1-15").is_err());
        assert!(DateKey::new("25-01-15").is_err());
        assert!(DateKey::new("2025/01/15").is_err());
    }

    #[test]
    fn period_key_accepts_canonical() {
        assert!(PeriodKey::new("2025-01").is_ok());
        assert!(PeriodKey::new("1999-12").is_ok());
    }

    #[test]
    fn period_key_rejects_bad_shapes() {
        assert!(PeriodKey::new("2025-13").is_err());
        assert!(PeriodKey::new("2025-1").is_err());
        assert!(PeriodKey::new("2025-01-15").is_err());
        assert!(PeriodKey::new("").is_err());
    }

    #[test]
    fn equality_is_exact_string_match() {
        let a = PeriodKey::new("2025-01").unwrap();
        let b = PeriodKey::new("2025-01").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "2025-01");
    }

    #[test]
    fn serde_roundtrip() {
        let station = StationId::new("STATION-001").unwrap();
        let json = serde_json::to_string(&station).unwrap();
        assert_eq!(json, "\"STATION-001\"");
        let parsed: StationId = serde_json::from_str(&json).unwrap();
        assert_eq!(station, parsed);
    }

    #[test]
    fn serde_rejects_invalid_values() {
        assert!(serde_json::from_str::<DateKey>("\"2025-1-5\"").is_err());
        assert!(serde_json::from_str::<StationId>("\"\"").is_err());
    }
}
