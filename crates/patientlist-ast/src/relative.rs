//! Named relative date ranges

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A date range named relative to the evaluation day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelativeDate {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
}

impl RelativeDate {
    pub const ALL: [RelativeDate; 8] = [
        Self::Today,
        Self::Yesterday,
        Self::ThisWeek,
        Self::LastWeek,
        Self::ThisMonth,
        Self::LastMonth,
        Self::ThisYear,
        Self::LastYear,
    ];

    /// Parse a range name such as `TODAY`, `this week` or `last-month`
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|range| range.name() == normalized)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Today => "TODAY",
            Self::Yesterday => "YESTERDAY",
            Self::ThisWeek => "THIS_WEEK",
            Self::LastWeek => "LAST_WEEK",
            Self::ThisMonth => "THIS_MONTH",
            Self::LastMonth => "LAST_MONTH",
            Self::ThisYear => "THIS_YEAR",
            Self::LastYear => "LAST_YEAR",
        }
    }

    /// Resolve to the first and last day of the range, both inclusive.
    ///
    /// Weeks start on Monday.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let (start, next) = self.half_open(today);
        (start, sub_days(next, 1).max(start))
    }

    /// `(start, end)` where `end` is the first day after the range
    fn half_open(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let week_start = today.week(Weekday::Mon).first_day();
        let month_start = sub_days(today, u64::from(today.day0()));
        let year_start = sub_days(today, u64::from(today.ordinal0()));

        match self {
            Self::Today => (today, add_days(today, 1)),
            Self::Yesterday => (sub_days(today, 1), today),
            Self::ThisWeek => (week_start, add_days(week_start, 7)),
            Self::LastWeek => (sub_days(week_start, 7), week_start),
            Self::ThisMonth => (month_start, add_months(month_start, 1)),
            Self::LastMonth => (sub_months(month_start, 1), month_start),
            Self::ThisYear => (year_start, add_months(year_start, 12)),
            Self::LastYear => (sub_months(year_start, 12), year_start),
        }
    }
}

impl fmt::Display for RelativeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn sub_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}
