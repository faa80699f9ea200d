//! Calendar types used to describe request ranges and aggregation buckets.

use crate::config::ConfigError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(pub i32, pub u32);
impl Month {
    pub fn year(self) -> i32 {
        self.0
    }
    pub fn month(self) -> u32 {
        self.1
    }
    pub fn new(year: i32, month: u32) -> Self {
        Self(year, month)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date.year(), date.month())
    }

    /// The month directly after this one, rolling over into January of the next year.
    pub fn succ(self) -> Self {
        if self.1 >= 12 {
            Self(self.0 + 1, 1)
        } else {
            Self(self.0, self.1 + 1)
        }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

/// The bucket size used when resampling observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Calendar month, keyed by `year` and `month` columns.
    #[default]
    Month,
    /// Calendar day, keyed by a `date` column.
    Day,
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month => write!(f, "month"),
            Period::Day => write!(f, "day"),
        }
    }
}

/// A closed range of calendar days, `start <= end`.
///
/// # Examples
///
/// ```
/// use kma_weather::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
/// ).unwrap();
/// assert_eq!(range.months().len(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Every month touched by the range, oldest first.
    pub fn months(&self) -> Vec<Month> {
        let last = Month::of(self.end);
        let mut current = Month::of(self.start);
        let mut months = Vec::new();
        while current <= last {
            months.push(current);
            current = current.succ();
        }
        months
    }

    /// Every day in the range, oldest first.
    pub fn days(&self) -> Vec<NaiveDate> {
        let count = (self.end - self.start).num_days();
        (0..=count)
            .map(|offset| self.start + Duration::days(offset))
            .collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub(crate) fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - 719_163
}
