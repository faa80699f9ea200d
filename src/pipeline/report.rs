use crate::fetch::error::FetchError;
use crate::pipeline::Grouping;
use crate::types::period::Period;
use polars::prelude::DataFrame;
use std::fmt;

/// A station whose request failed, and why.
#[derive(Debug)]
pub struct StationFailure {
    pub station: String,
    pub error: FetchError,
}

impl fmt::Display for StationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.station, self.error)
    }
}

/// Outcome of a batch that produced at least one station's observations.
///
/// `frame` has one row per (key, period) over the whole requested range: the key
/// column (`station` or `region`), the period columns (`year`, `month` or `date`)
/// and one column per measured field. Periods without valid data hold nulls.
#[derive(Debug)]
pub struct BatchReport {
    pub frame: DataFrame,
    pub period: Period,
    pub grouping: Grouping,
    /// Stations whose request failed. They do not appear in `frame`.
    pub failed: Vec<StationFailure>,
    /// Stations the service answered for, but without any record.
    pub empty: Vec<String>,
}

impl BatchReport {
    pub fn failed_stations(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.station.as_str()).collect()
    }

    /// True when every requested station returned observations.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.empty.is_empty()
    }
}
