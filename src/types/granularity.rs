//! Defines the time granularity of KMA surface observations and everything that
//! differs between the daily and hourly services: endpoint, time token format,
//! missing-value sentinels and the default column layout.

use crate::types::field_map::{Aggregation, FieldMap, FieldSpec};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fmt;

/// Sentinel codes the service writes in place of a measurement.
pub const DEFAULT_SENTINELS: [f64; 3] = [-9.0, -99.0, -99.9];

/// Represents the time granularity of the KMA ASOS data.
///
/// # Examples
///
/// ```
/// use kma_weather::Granularity;
///
/// assert_eq!(Granularity::Daily.endpoint(), "kma_sfcdd3.php");
/// assert_eq!(Granularity::Hourly.to_string(), "hourly");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One record per station per calendar day (`kma_sfcdd3`).
    #[default]
    Daily,
    /// One record per station per hour (`kma_sfctm3`).
    Hourly,
}

impl Granularity {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Granularity::Daily => "kma_sfcdd3.php",
            Granularity::Hourly => "kma_sfctm3.php",
        }
    }

    /// The `tm1` query value for the first day of a request.
    pub(crate) fn format_start(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Daily => date.format("%Y%m%d").to_string(),
            Granularity::Hourly => format!("{}0000", date.format("%Y%m%d")),
        }
    }

    /// The `tm2` query value for the last day of a request.
    pub(crate) fn format_end(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Daily => date.format("%Y%m%d").to_string(),
            Granularity::Hourly => format!("{}2300", date.format("%Y%m%d")),
        }
    }

    /// Parses the record time token. Returns the calendar day and, for hourly
    /// records, the hour of day.
    pub(crate) fn parse_time(&self, token: &str) -> Option<(NaiveDate, Option<u32>)> {
        match self {
            Granularity::Daily => NaiveDate::parse_from_str(token, "%Y%m%d")
                .ok()
                .map(|d| (d, None)),
            Granularity::Hourly => NaiveDateTime::parse_from_str(token, "%Y%m%d%H%M")
                .ok()
                .map(|dt| {
                    use chrono::Timelike;
                    (dt.date(), Some(dt.hour()))
                }),
        }
    }

    pub fn sentinels(&self) -> &'static [f64] {
        match self {
            Granularity::Daily | Granularity::Hourly => &DEFAULT_SENTINELS,
        }
    }

    pub fn default_field_map(&self) -> FieldMap {
        use Aggregation::*;
        match self {
            Granularity::Daily => FieldMap::new(
                0,
                vec![
                    FieldSpec::new(2, "wind_speed", Mean),
                    FieldSpec::new(10, "temperature", Mean),
                    FieldSpec::new(18, "humidity", Mean),
                    FieldSpec::new(38, "precipitation", Sum),
                    FieldSpec::new(32, "sunshine", Sum),
                    FieldSpec::new(35, "irradiance", Mean),
                ],
            ),
            Granularity::Hourly => FieldMap::new(
                0,
                vec![
                    FieldSpec::new(2, "wind_direction", First),
                    FieldSpec::new(3, "wind_speed", Mean),
                    FieldSpec::new(11, "temperature", Mean),
                    FieldSpec::new(13, "humidity", Mean),
                    FieldSpec::new(15, "precipitation", Sum),
                    FieldSpec::new(33, "sunshine", Sum),
                    FieldSpec::new(34, "irradiance", Mean),
                ],
            ),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Hourly => write!(f, "hourly"),
        }
    }
}
