//! Departure time handling for timetable cells.
//!
//! Timetable pages print departures as "H:MM" or "HH:MM", sometimes with a
//! trailing departure marker ("7:05발"). This module turns that cell text
//! into a validated 24-hour time of day. There is no date and no timezone:
//! a departure is a plain local wall-clock value.

use std::fmt;
use std::sync::OnceLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;
use serde::{Serialize, Serializer};

/// Marker character some pages append to departure headers and cells.
pub const DEPARTURE_MARKER: char = '발';

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A validated departure time of day.
///
/// Always displays as zero-padded "HH:MM".
///
/// # Examples
///
/// ```
/// use bus_timetable::domain::DepartureTime;
///
/// let time = DepartureTime::parse("7:05발").unwrap();
/// assert_eq!(time.to_string(), "07:05");
/// assert_eq!(time.hour(), 7);
///
/// assert!(DepartureTime::parse("24:00").is_err());
/// assert!(DepartureTime::parse("105:00").is_err());
/// assert!(DepartureTime::parse("막차").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepartureTime(NaiveTime);

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{2})발?$").expect("time pattern is a valid regex")
    })
}

impl DepartureTime {
    /// Parse cell text as a departure time.
    ///
    /// Accepts `H:MM` and `HH:MM` with an optional trailing departure
    /// marker. The text must already be trimmed.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let caps = time_pattern()
            .captures(s)
            .ok_or_else(|| TimeError::new("expected H:MM or HH:MM"))?;

        let hour: u32 = caps[1]
            .parse()
            .map_err(|_| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute: u32 = caps[2]
            .parse()
            .map_err(|_| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| TimeError::new("invalid time"))?;

        Ok(Self(time))
    }

    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Returns the minute as the two-digit string used in merged schedules.
    pub fn minute_str(&self) -> String {
        format!("{:02}", self.minute())
    }
}

impl fmt::Debug for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepartureTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for DepartureTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
