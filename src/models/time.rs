//! Weekly time model.
//!
//! Work is placed on a repeating week: a [`Weekday`] plus a half-open
//! [`TimeWindow`] of [`ClockTime`]s within that day.
//!
//! # Time Model
//! Clock times are minutes since midnight (0..=1440). They serialize as
//! `"HH:MM"` strings so records stay readable in JSON.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Monday through Friday, in order.
    pub const WORK_WEEK: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Parses a day name case-insensitively ("monday", "Mon", "MONDAY").
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let day = match lower.get(..3)? {
            "mon" => Self::Monday,
            "tue" => Self::Tuesday,
            "wed" => Self::Wednesday,
            "thu" => Self::Thursday,
            "fri" => Self::Friday,
            "sat" => Self::Saturday,
            "sun" => Self::Sunday,
            _ => return None,
        };
        Some(day)
    }

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Time of day in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Midnight at the end of the day; the largest representable time.
    pub const END_OF_DAY: ClockTime = ClockTime(24 * 60);

    /// Creates a time from hours and minutes. Returns `None` past 24:00.
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        let total = hour.checked_mul(60)?.checked_add(minute)?;
        (total <= 24 * 60).then_some(Self(total))
    }

    /// Creates a time on the hour.
    pub fn from_hour(hour: u16) -> Option<Self> {
        Self::new(hour, 0)
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Hour component.
    #[inline]
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Adds whole minutes, returning `None` past 24:00.
    pub fn add_minutes(self, minutes: u16) -> Option<Self> {
        let total = self.0.checked_add(minutes)?;
        (total <= 24 * 60).then_some(Self(total))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Error parsing an `"HH:MM"` clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time '{0}', expected HH:MM")]
pub struct ParseClockTimeError(pub String);

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseClockTimeError(s.to_string());
        let trimmed = s.trim();
        let (h, m) = match trimmed.split_once(':') {
            Some((h, m)) => (h, m),
            None => (trimmed, "0"),
        };
        // Tolerate trailing seconds ("09:00:00").
        let m = m.split(':').next().unwrap_or(m);
        let hour: u16 = h.trim().parse().map_err(|_| err())?;
        let minute: u16 = m.trim().parse().map_err(|_| err())?;
        Self::new(hour, minute).ok_or_else(err)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A time interval [start, end) within one day.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: ClockTime,
    /// Interval end (exclusive).
    pub end: ClockTime,
}

impl TimeWindow {
    /// Creates a new window. Returns `None` unless `start < end`.
    pub fn new(start: ClockTime, end: ClockTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.end.minutes() - self.start.minutes())
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes from the end of `self` to the start of `later`.
    ///
    /// Negative when the windows overlap.
    pub fn gap_minutes_until(&self, later: &Self) -> i32 {
        i32::from(later.start.minutes()) - i32::from(self.end.minutes())
    }
}
