//! Date and time primitives.
//!
//! Each type keeps the exact lexical form it was read from, so partial dates and
//! fractional seconds survive a round-trip unchanged. Conversions to `chrono`
//! values are offered where the precision allows.

use chrono::{FixedOffset, NaiveDate, NaiveTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::codec::{DecodeContext, EncodeContext, FhirValue, json_kind};
use crate::error::{FhirCodecError, Result};

const YEAR: &str = r"([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)";
const MONTH: &str = r"(0[1-9]|1[0-2])";
const DAY: &str = r"(0[1-9]|[1-2][0-9]|3[0-1])";
const CLOCK: &str = r"([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]{1,9})?";
const ZONE: &str = r"(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00))";

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{YEAR}(-{MONTH}(-{DAY})?)?$")).unwrap());

static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{YEAR}(-{MONTH}(-{DAY}(T{CLOCK}{ZONE}?)?)?)?$")).unwrap()
});

static INSTANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{YEAR}-{MONTH}-{DAY}T{CLOCK}{ZONE}$")).unwrap());

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!("^{CLOCK}$")).unwrap());

/// How much of a date or dateTime was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    Year,
    Month,
    Day,
    Time,
}

fn date_precision(value: &str) -> Precision {
    if value.contains('T') {
        Precision::Time
    } else {
        match value.len() {
            4 => Precision::Year,
            7 => Precision::Month,
            _ => Precision::Day,
        }
    }
}

/// The first day covered by a date prefix (`2024` -> 2024-01-01).
fn first_day(value: &str) -> Option<NaiveDate> {
    let date = value.split('T').next()?;
    let mut parts = date.split('-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next().map_or(Some(1), |m| m.parse().ok())?;
    let day = parts.next().map_or(Some(1), |d| d.parse().ok())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn invalid(kind: &str, value: &str) -> FhirCodecError {
    FhirCodecError::malformed("", format!("`{value}` is not a valid {kind}"))
}

macro_rules! lexical_primitive {
    ($(#[$meta:meta])* $name:ident, $type_name:literal, $check:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Parses and validates the lexical form.
            pub fn parse(value: &str) -> Result<Self> {
                let check: fn(&str) -> bool = $check;
                if check(value) {
                    Ok(Self(value.to_string()))
                } else {
                    Err(invalid($type_name, value))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = FhirCodecError;

            fn from_str(value: &str) -> Result<Self> {
                Self::parse(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FhirValue for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self> {
                let raw = match value {
                    Value::String(raw) => raw,
                    other => {
                        return Err(ctx.malformed(format!(
                            "expected a {} string, found {}",
                            $type_name,
                            json_kind(&other)
                        )));
                    }
                };

                if ctx.config().validate_primitives {
                    let check: fn(&str) -> bool = $check;
                    if !check(&raw) {
                        return Err(ctx.malformed(format!(
                            "`{raw}` is not a valid {}",
                            $type_name
                        )));
                    }
                }
                Ok(Self(raw))
            }

            fn encode_value(&self, _ctx: &mut EncodeContext<'_>) -> Result<Value> {
                Ok(Value::String(self.0.clone()))
            }

            fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }
    };
}

lexical_primitive!(
    /// A calendar date: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    Date,
    "date",
    |value| DATE_RE.is_match(value) && first_day(value).is_some()
);

lexical_primitive!(
    /// A date, or a date and time with optional fractional seconds and zone.
    DateTime,
    "dateTime",
    |value| DATE_TIME_RE.is_match(value) && first_day(value).is_some()
);

lexical_primitive!(
    /// A full timestamp with a mandatory zone.
    Instant,
    "instant",
    |value| INSTANT_RE.is_match(value) && first_day(value).is_some()
);

lexical_primitive!(
    /// A time of day: `hh:mm:ss[.fff]`.
    Time,
    "time",
    |value| TIME_RE.is_match(value)
);

impl Date {
    pub fn precision(&self) -> Precision {
        date_precision(&self.0)
    }

    /// The first day of the period this date names.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        first_day(&self.0)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }
}

impl DateTime {
    pub fn precision(&self) -> Precision {
        date_precision(&self.0)
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        first_day(&self.0)
    }

    /// The full timestamp, when both a time and a zone are present.
    pub fn to_chrono(&self) -> Option<chrono::DateTime<FixedOffset>> {
        chrono::DateTime::parse_from_rfc3339(&self.0).ok()
    }
}

impl From<NaiveDate> for DateTime {
    fn from(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }
}

impl From<chrono::DateTime<Utc>> for DateTime {
    fn from(timestamp: chrono::DateTime<Utc>) -> Self {
        Self(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Instant {
    pub fn now() -> Self {
        Utc::now().into()
    }

    pub fn to_chrono(&self) -> Option<chrono::DateTime<FixedOffset>> {
        chrono::DateTime::parse_from_rfc3339(&self.0).ok()
    }

    pub fn to_utc(&self) -> Option<chrono::DateTime<Utc>> {
        self.to_chrono().map(|timestamp| timestamp.with_timezone(&Utc))
    }
}

impl From<chrono::DateTime<Utc>> for Instant {
    fn from(timestamp: chrono::DateTime<Utc>) -> Self {
        Self(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Time {
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.0, "%H:%M:%S%.f").ok()
    }
}

impl From<NaiveTime> for Time {
    fn from(time: NaiveTime) -> Self {
        Self(time.format("%H:%M:%S%.f").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_forms() {
        assert_eq!(Date::parse("2024").unwrap().precision(), Precision::Year);
        assert_eq!(Date::parse("2024-03").unwrap().precision(), Precision::Month);
        assert_eq!(Date::parse("2024-03-15").unwrap().precision(), Precision::Day);

        assert!(Date::parse("2024-13").is_err());
        assert!(Date::parse("2023-02-30").is_err());
        assert!(Date::parse("24-03-15").is_err());
        assert!(Date::parse("2024-03-15T10:00:00Z").is_err());
    }

    #[test]
    fn test_partial_date_first_day() {
        let date = Date::parse("2024-03").unwrap();
        assert_eq!(date.to_naive_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_date_time_forms() {
        for value in [
            "2024",
            "2024-03-15",
            "2024-03-15T10:30:00",
            "2024-03-15T10:30:00Z",
            "2024-03-15T10:30:00.123+05:30",
        ] {
            assert!(DateTime::parse(value).is_ok(), "{value} should parse");
        }

        assert!(DateTime::parse("2024-03-15T25:00:00Z").is_err());
        assert!(DateTime::parse("2024-03-15T10:30").is_err());

        let timestamp = DateTime::parse("2024-03-15T10:30:00+02:00").unwrap();
        assert_eq!(timestamp.precision(), Precision::Time);
        assert!(timestamp.to_chrono().is_some());
        assert!(DateTime::parse("2024-03-15").unwrap().to_chrono().is_none());
    }

    #[test]
    fn test_instant_requires_zone() {
        assert!(Instant::parse("2024-03-15T10:30:00Z").is_ok());
        assert!(Instant::parse("2024-03-15T10:30:00").is_err());
        assert!(Instant::parse("2024-03-15").is_err());

        let now = Instant::now();
        assert!(Instant::parse(now.as_str()).is_ok());
        assert!(now.to_utc().is_some());
    }

    #[test]
    fn test_time_keeps_fraction() {
        let time = Time::parse("09:15:30.250").unwrap();
        assert_eq!(time.as_str(), "09:15:30.250");
        assert!(time.to_naive_time().is_some());
        assert!(Time::parse("24:00:00").is_err());
        assert!(Time::parse("9:15:30").is_err());
    }
}
