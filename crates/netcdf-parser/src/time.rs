//! Decoding profile time from the two supported encodings.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;

use crate::catalog::{ProfileFile, Variable};
use crate::resolver::{EPOCH_DAYS_TIME, UNITS_SINCE_TIME};

/// 1950-01-01T00:00:00Z as a Unix timestamp.
const JULD_EPOCH_SECS: i64 = -631_152_000;

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;

const UNITS_SINCE_PATTERN: &str =
    r"(?i)(seconds|days|hours) since\s*(\d{4}-\d{2}-\d{2})(?:[ t]?(\d{2}:\d{2}:\d{2})z?)?";

/// Unit keyword of a "<unit> since <date>" string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Hours,
    Days,
}

impl TimeUnit {
    fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "seconds" => Some(TimeUnit::Seconds),
            "hours" => Some(TimeUnit::Hours),
            "days" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    fn millis(self) -> f64 {
        match self {
            TimeUnit::Seconds => MS_PER_SECOND,
            TimeUnit::Hours => MS_PER_HOUR,
            TimeUnit::Days => MS_PER_DAY,
        }
    }
}

/// The time variable chosen for a file, tagged with its encoding.
#[derive(Debug, Clone, Copy)]
pub enum TimeSource<'a> {
    EpochDays(&'a Variable),
    UnitsSince(&'a Variable),
}

impl<'a> TimeSource<'a> {
    /// Pick the encoding. A present epoch-days variable wins even if its value is unusable.
    pub fn select(file: &'a ProfileFile) -> Option<Self> {
        if let Some(resolved) = EPOCH_DAYS_TIME.resolve(file) {
            return Some(TimeSource::EpochDays(resolved.variable));
        }
        UNITS_SINCE_TIME
            .resolve(file)
            .map(|resolved| TimeSource::UnitsSince(resolved.variable))
    }

    pub fn variable(&self) -> &'a Variable {
        match self {
            TimeSource::EpochDays(v) | TimeSource::UnitsSince(v) => v,
        }
    }

    pub fn decode(&self) -> Option<DateTime<Utc>> {
        match self {
            TimeSource::EpochDays(var) => decode_epoch_days(var.first_valid()?),
            TimeSource::UnitsSince(var) => decode_units_since(var.first_valid()?, var.units()?),
        }
    }
}

/// Canonical time of a file, or `None` when absent or undecodable.
pub fn decode_profile_time(file: &ProfileFile) -> Option<DateTime<Utc>> {
    TimeSource::select(file)?.decode()
}

/// Days since 1950-01-01T00:00:00Z.
pub fn decode_epoch_days(days: f64) -> Option<DateTime<Utc>> {
    let epoch = DateTime::from_timestamp(JULD_EPOCH_SECS, 0)?;
    offset_by_millis(epoch, days * MS_PER_DAY)
}

/// `value` interpreted through a "<seconds|hours|days> since <date>[ <time>][Z]" string.
pub fn decode_units_since(value: f64, units: &str) -> Option<DateTime<Utc>> {
    let (unit, reference) = parse_units_since(units)?;
    offset_by_millis(reference, value * unit.millis())
}

/// Parse the unit and reference instant of a units string.
///
/// Case-insensitive and unanchored: the first "<unit> since <date>" match
/// is used and trailing text is ignored.
pub fn parse_units_since(units: &str) -> Option<(TimeUnit, DateTime<Utc>)> {
    let caps = units_since_regex()?.captures(units)?;
    let unit = TimeUnit::from_keyword(caps.get(1)?.as_str())?;
    let date = caps.get(2)?.as_str();
    let time = caps.get(3).map(|m| m.as_str());
    build_reference(date, time).map(|reference| (unit, reference))
}

fn units_since_regex() -> Option<&'static Regex> {
    static UNITS_SINCE: OnceLock<Option<Regex>> = OnceLock::new();
    UNITS_SINCE
        .get_or_init(|| Regex::new(UNITS_SINCE_PATTERN).ok())
        .as_ref()
}

fn build_reference(date: &str, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = match time {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S").ok()?,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };
    Some(date.and_time(time).and_utc())
}

fn offset_by_millis(base: DateTime<Utc>, millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let delta = Duration::try_milliseconds(millis.trunc() as i64)?;
    base.checked_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iso(dt: DateTime<Utc>) -> String {
        dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    #[test]
    fn test_epoch_days_zero() {
        assert_eq!(iso(decode_epoch_days(0.0).unwrap()), "1950-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_epoch_days_fractional() {
        assert_eq!(
            iso(decode_epoch_days(26291.5).unwrap()),
            "2021-12-25T12:00:00.000Z"
        );
        assert_eq!(
            iso(decode_epoch_days(26297.5).unwrap()),
            "2021-12-31T12:00:00.000Z"
        );
    }

    #[test]
    fn test_epoch_days_non_finite() {
        assert!(decode_epoch_days(f64::NAN).is_none());
        assert!(decode_epoch_days(f64::INFINITY).is_none());
        assert!(decode_epoch_days(1e300).is_none());
    }

    #[test]
    fn test_units_since_seconds() {
        let dt = decode_units_since(3600.0, "seconds since 2020-01-01 00:00:00").unwrap();
        assert_eq!(iso(dt), "2020-01-01T01:00:00.000Z");
    }

    #[test]
    fn test_units_since_hours_with_t_and_z() {
        let dt = decode_units_since(36.0, "Hours Since 2000-06-15T06:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2000, 6, 16, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_units_since_days_date_only() {
        let dt = decode_units_since(1.5, "DAYS SINCE 1970-01-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(1970, 1, 2, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_units_since_trailing_text() {
        let dt = decode_units_since(0.0, "days since 1950-01-01 00:00:00 UTC").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(1950, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_units_since_no_space_before_date() {
        let dt = decode_units_since(60.0, "seconds since2020-01-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 1, 0, 1, 0).unwrap());
    }

    #[test]
    fn test_units_since_malformed() {
        assert!(decode_units_since(1.0, "minutes since 2020-01-01").is_none());
        assert!(decode_units_since(1.0, "seconds after 2020-01-01").is_none());
        assert!(decode_units_since(1.0, "seconds since yesterday").is_none());
        assert!(decode_units_since(1.0, "").is_none());
    }

    #[test]
    fn test_units_since_invalid_date() {
        assert!(decode_units_since(1.0, "days since 2020-13-45").is_none());
        assert!(decode_units_since(1.0, "days since 2020-01-01 25:61:00").is_none());
    }

    #[test]
    fn test_select_prefers_epoch_days_even_when_unusable() {
        let file = ProfileFile::new(
            "f.nc",
            vec![
                Variable::numeric("JULD", vec![f64::NAN]),
                Variable::numeric("time", vec![10.0]).with_attr("units", "days since 2000-01-01"),
            ],
        );
        assert!(matches!(TimeSource::select(&file), Some(TimeSource::EpochDays(_))));
        assert!(decode_profile_time(&file).is_none());
    }

    #[test]
    fn test_units_since_by_standard_name() {
        let file = ProfileFile::new(
            "f.nc",
            vec![Variable::numeric("obs_t", vec![f64::NAN, 2.0])
                .with_attr("standard_name", "time")
                .with_attr("units", "hours since 2010-01-01 00:00:00")],
        );
        assert_eq!(
            decode_profile_time(&file),
            Some(Utc.with_ymd_and_hms(2010, 1, 1, 2, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_epoch_days_fill_value_is_absent() {
        let file = ProfileFile::new(
            "f.nc",
            vec![Variable::numeric("JULD", vec![999999.0]).with_attr("_FillValue", 999999.0)],
        );
        assert!(decode_profile_time(&file).is_none());
    }

    #[test]
    fn test_units_since_pattern_compiles() {
        assert!(units_since_regex().is_some());
    }

    #[test]
    fn test_units_since_without_units_is_absent() {
        let file = ProfileFile::new("f.nc", vec![Variable::numeric("time", vec![10.0])]);
        assert!(decode_profile_time(&file).is_none());
    }
}
