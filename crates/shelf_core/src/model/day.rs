//! Calendar day value used as a date-shelf placement head.
//!
//! # Invariants
//! - Wire form is exactly `YYYY-MM-DD` and always names a real calendar day.
//! - Ordering follows the calendar.

use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid calendar day regex"));

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Immutable calendar date (no time, no zone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Builds a day from year/month/day parts, `None` when the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses the strict `YYYY-MM-DD` wire form.
    pub fn parse(value: &str) -> Option<Self> {
        if !DAY_RE.is_match(value) {
            return None;
        }
        NaiveDate::parse_from_str(value, DAY_FORMAT).ok().map(Self)
    }

    /// Next calendar day, `None` past the representable range.
    pub fn succ(self) -> Option<Self> {
        self.0.checked_add_days(Days::new(1)).map(Self)
    }

    /// Previous calendar day, `None` before the representable range.
    pub fn pred(self) -> Option<Self> {
        self.0.checked_sub_days(Days::new(1)).map(Self)
    }

    /// Number of days in the inclusive span `self..=to`; zero when `to < self`.
    pub fn days_through(self, to: CalendarDay) -> usize {
        let span = (to.0 - self.0).num_days();
        if span < 0 {
            0
        } else {
            span as usize + 1
        }
    }

    /// Iterates `self..=to` in ascending order.
    pub fn iter_through(self, to: CalendarDay) -> impl Iterator<Item = CalendarDay> {
        self.0
            .iter_days()
            .take_while(move |day| *day <= to.0)
            .map(CalendarDay)
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Display for CalendarDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

/// Error returned by [`CalendarDay::from_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCalendarDay(pub String);

impl Display for InvalidCalendarDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid calendar day `{}`; expected YYYY-MM-DD", self.0)
    }
}

impl std::error::Error for InvalidCalendarDay {}

impl FromStr for CalendarDay {
    type Err = InvalidCalendarDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidCalendarDay(s.to_string()))
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
