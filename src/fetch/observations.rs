//! Row storage for parsed station responses and conversion into polars frames.

use crate::types::field_map::FieldMap;
use crate::types::granularity::Granularity;
use crate::types::period::epoch_days;
use crate::types::station::{StationId, UNASSIGNED_REGION};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

/// One parsed record. `values` is aligned with the field map the table was parsed with;
/// a position missing from the record or a cell that is not a number is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub date: NaiveDate,
    pub hour: Option<u32>,
    pub values: Vec<Option<f64>>,
}

/// The observations returned for one station and date range.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    station: StationId,
    granularity: Granularity,
    field_map: FieldMap,
    present: Vec<bool>,
    rows: Vec<ObservationRow>,
}

/// Result of a successful request: either rows, or the service confirming it has none.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Observations(ObservationTable),
    NoData,
}

impl FetchOutcome {
    pub fn into_table(self) -> Option<ObservationTable> {
        match self {
            FetchOutcome::Observations(table) => Some(table),
            FetchOutcome::NoData => None,
        }
    }
}

impl ObservationTable {
    pub(crate) fn new(
        station: StationId,
        granularity: Granularity,
        field_map: FieldMap,
        present: Vec<bool>,
        rows: Vec<ObservationRow>,
    ) -> Self {
        Self {
            station,
            granularity,
            field_map,
            present,
            rows,
        }
    }

    pub fn station(&self) -> &StationId {
        &self.station
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Names of the mapped fields that at least one record actually reached.
    pub fn present_fields(&self) -> Vec<&str> {
        self.field_map
            .names()
            .zip(&self.present)
            .filter(|(_, present)| **present)
            .map(|(name, _)| name)
            .collect()
    }

    /// Values of a named field in row order.
    pub fn values(&self, field: &str) -> Option<Vec<Option<f64>>> {
        let index = self.field_map.names().position(|name| name == field)?;
        Some(self.rows.iter().map(|row| row.values[index]).collect())
    }

    /// The table as a frame: `date`, (`hour`,) `station`, then every present field.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let frame = stack_tables(std::slice::from_ref(self), &self.field_map, None)?;
        let mut keep: Vec<&str> = vec!["date"];
        if self.granularity == Granularity::Hourly {
            keep.push("hour");
        }
        keep.push("station");
        keep.extend(self.present_fields());
        frame.select(keep)
    }
}

/// Concatenates tables into one frame with a column for every field in `field_map`.
/// Fields a table never reached are filled with nulls. With a station → region
/// map a `region` column follows `station`.
pub(crate) fn stack_tables(
    tables: &[ObservationTable],
    field_map: &FieldMap,
    regions: Option<&BTreeMap<String, String>>,
) -> PolarsResult<DataFrame> {
    let height: usize = tables.iter().map(ObservationTable::len).sum();
    let hourly = tables
        .iter()
        .any(|t| t.granularity == Granularity::Hourly);

    let mut dates: Vec<i32> = Vec::with_capacity(height);
    let mut hours: Vec<Option<i32>> = Vec::with_capacity(height);
    let mut stations: Vec<&str> = Vec::with_capacity(height);
    let mut station_regions: Vec<&str> = Vec::with_capacity(height);
    let mut fields: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(height); field_map.len()];

    for table in tables {
        let indices: Vec<Option<usize>> = field_map
            .names()
            .map(|name| table.field_map.names().position(|n| n == name))
            .collect();
        let region = regions
            .and_then(|map| map.get(table.station.as_str()))
            .map(String::as_str)
            .unwrap_or(UNASSIGNED_REGION);
        for row in &table.rows {
            dates.push(epoch_days(row.date));
            hours.push(row.hour.map(|h| h as i32));
            stations.push(table.station.as_str());
            station_regions.push(region);
            for (column, index) in fields.iter_mut().zip(&indices) {
                column.push(index.and_then(|i| row.values[i]));
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(field_map.len() + 4);
    columns.push(Series::new("date".into(), dates).cast(&DataType::Date)?.into());
    if hourly {
        columns.push(Series::new("hour".into(), hours).into());
    }
    columns.push(Series::new("station".into(), stations).into());
    if regions.is_some() {
        columns.push(Series::new("region".into(), station_regions).into());
    }
    for (name, values) in field_map.names().zip(fields) {
        columns.push(Series::new(name.into(), values).into());
    }
    DataFrame::new(columns)
}
