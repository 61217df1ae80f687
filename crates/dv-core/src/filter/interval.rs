use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::FilterError;

const SECOND: f64 = 1000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// Histogram interval of a time filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeInterval {
    OneSecond,
    OneMinute,
    FiveMinute,
    FifteenMinute,
    ThirtyMinute,
    OneHour,
    TwelveHour,
    OneDay,
    OneWeek,
    OneMonth,
    OneYear,
}

impl TimeInterval {
    /// All intervals from finest to coarsest
    pub const ALL: [TimeInterval; 11] = [
        TimeInterval::OneSecond,
        TimeInterval::OneMinute,
        TimeInterval::FiveMinute,
        TimeInterval::FifteenMinute,
        TimeInterval::ThirtyMinute,
        TimeInterval::OneHour,
        TimeInterval::TwelveHour,
        TimeInterval::OneDay,
        TimeInterval::OneWeek,
        TimeInterval::OneMonth,
        TimeInterval::OneYear,
    ];

    pub fn id(self) -> &'static str {
        match self {
            TimeInterval::OneSecond => "1-second",
            TimeInterval::OneMinute => "1-minute",
            TimeInterval::FiveMinute => "5-minute",
            TimeInterval::FifteenMinute => "15-minute",
            TimeInterval::ThirtyMinute => "30-minute",
            TimeInterval::OneHour => "1-hour",
            TimeInterval::TwelveHour => "12-hour",
            TimeInterval::OneDay => "1-day",
            TimeInterval::OneWeek => "1-week",
            TimeInterval::OneMonth => "1-month",
            TimeInterval::OneYear => "1-year",
        }
    }

    /// Nominal length in milliseconds; months and years are approximate
    pub fn nominal_ms(self) -> f64 {
        match self {
            TimeInterval::OneSecond => SECOND,
            TimeInterval::OneMinute => MINUTE,
            TimeInterval::FiveMinute => 5.0 * MINUTE,
            TimeInterval::FifteenMinute => 15.0 * MINUTE,
            TimeInterval::ThirtyMinute => 30.0 * MINUTE,
            TimeInterval::OneHour => HOUR,
            TimeInterval::TwelveHour => 12.0 * HOUR,
            TimeInterval::OneDay => DAY,
            TimeInterval::OneWeek => 7.0 * DAY,
            TimeInterval::OneMonth => 30.0 * DAY,
            TimeInterval::OneYear => 365.0 * DAY,
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TimeInterval {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeInterval::ALL
            .into_iter()
            .find(|interval| interval.id() == s)
            .ok_or_else(|| FilterError::UnknownInterval(s.to_string()))
    }
}

impl TryFrom<String> for TimeInterval {
    type Error = FilterError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeInterval> for String {
    fn from(interval: TimeInterval) -> Self {
        interval.id().to_string()
    }
}
