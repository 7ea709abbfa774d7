// --- File: crates/relatify_common/src/civil.rs ---
//! Civil-date handling for the calendar engine.
//!
//! A `CivilDate` is a calendar day with no time component and no timezone.
//! It is the merge key of the whole aggregation pipeline: every event is
//! bucketed by the calendar day its *creator* intended, which means the day
//! must always be read off wall-clock fields, never recovered by truncating
//! a UTC instant. Truncating instants is the classic off-by-one-day bug this
//! module exists to prevent.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar day identified by year/month/day only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDate {
    year: i32,
    month: u32,
    day: u32,
}

/// Error returned when a string or component triple is not a valid calendar day.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid calendar date: {0}")]
pub struct InvalidDate(pub String);

impl CivilDate {
    /// Construct from components, rejecting dates that do not exist on the
    /// calendar (e.g. 2023-02-29).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, InvalidDate> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(|_| CivilDate { year, month, day })
            .ok_or_else(|| InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
    }

    /// Strict `YYYY-MM-DD` parse.
    pub fn parse(input: &str) -> Result<Self, InvalidDate> {
        let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map_err(|_| InvalidDate(input.to_string()))?;
        Ok(date.into())
    }

    /// The calendar day of an offset-carrying instant, read from the
    /// instant's own wall clock. `2024-03-01T23:30:00-08:00` is March 1st
    /// here no matter what timezone the host process runs in.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        dt.date_naive().into()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Zero-padded `YYYY-MM-DD`, the merge key shared by all event sources.
    pub fn date_key(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn to_naive(self) -> NaiveDate {
        // Components were validated on construction.
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .expect("CivilDate holds a validated calendar day")
    }

    /// The 00:00:00.000 and 23:59:59.999 instants of this day in `tz`.
    ///
    /// Used only when expanding a calendar day into a provider query window.
    /// A midnight erased by a DST spring-forward resolves to the first
    /// representable wall-clock instant of the same day, so the window never
    /// leaks into a neighboring day.
    pub fn day_bounds<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Tz>, DateTime<Tz>) {
        let date = self.to_naive();
        let start = resolve_local(tz, date.and_hms_opt(0, 0, 0).unwrap());
        let end = resolve_local(tz, date.and_hms_milli_opt(23, 59, 59, 999).unwrap());
        (start, end)
    }
}

/// Map a wall-clock datetime into `tz`, keeping the calendar day stable
/// across DST transitions: ambiguous times take the earlier instant, times
/// erased by a forward jump probe later the same day.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let mut probe = naive + Duration::hours(1);
            loop {
                if let LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) =
                    tz.from_local_datetime(&probe)
                {
                    return dt;
                }
                probe += Duration::hours(1);
            }
        }
    }
}

impl From<NaiveDate> for CivilDate {
    fn from(date: NaiveDate) -> Self {
        CivilDate {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date_key())
    }
}

impl FromStr for CivilDate {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CivilDate::parse(s)
    }
}

// On the wire a civil date is always its `YYYY-MM-DD` key.
impl Serialize for CivilDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.date_key())
    }
}

impl<'de> Deserialize<'de> for CivilDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CivilDate::parse(&raw).map_err(de::Error::custom)
    }
}
