//! Parses the positional text records returned by the KMA surface observation service.
//!
//! Lines starting with `#` carry headers and the end marker and are dropped.
//! Every other line is a record whose fields are separated by whitespace
//! (`disp=0`) or by commas (`disp=1`).

use crate::fetch::error::FetchError;
use crate::fetch::observations::{FetchOutcome, ObservationRow, ObservationTable};
use crate::types::field_map::FieldMap;
use crate::types::granularity::Granularity;
use crate::types::station::StationId;
use log::debug;

const COMMENT_MARKER: char = '#';

fn split_record(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn parse_value(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Turns a response body into observations for `station`.
///
/// A body with no record lines is [`FetchOutcome::NoData`]. A body whose record
/// lines all lack a parseable time token is treated as malformed.
pub fn parse_response(
    body: &str,
    station: &StationId,
    granularity: Granularity,
    field_map: &FieldMap,
) -> Result<FetchOutcome, FetchError> {
    let records: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .collect();

    if records.is_empty() {
        return Ok(FetchOutcome::NoData);
    }

    let mut present = vec![false; field_map.len()];
    let mut rows = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for line in &records {
        let tokens = split_record(line);
        let Some((date, hour)) = tokens
            .get(field_map.time_position)
            .and_then(|token| granularity.parse_time(token))
        else {
            dropped += 1;
            continue;
        };

        let values = field_map
            .fields
            .iter()
            .zip(present.iter_mut())
            .map(|(field, seen)| {
                let token = tokens.get(field.position)?;
                *seen = true;
                parse_value(token)
            })
            .collect();

        rows.push(ObservationRow { date, hour, values });
    }

    if rows.is_empty() {
        return Err(FetchError::Malformed {
            station: station.to_string(),
            lines: records.len(),
        });
    }

    debug!(
        "Parsed {} {} records for station {} ({} dropped, {} of {} fields present)",
        rows.len(),
        granularity,
        station,
        dropped,
        present.iter().filter(|p| **p).count(),
        field_map.len()
    );

    Ok(FetchOutcome::Observations(ObservationTable::new(
        station.clone(),
        granularity,
        field_map.clone(),
        present,
        rows,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::field_map::{Aggregation, FieldSpec};
    use chrono::NaiveDate;

    fn station() -> StationId {
        StationId::new("108").unwrap()
    }

    fn sunshine_map() -> FieldMap {
        FieldMap::new(
            0,
            vec![
                FieldSpec::new(2, "temperature", Aggregation::Mean),
                FieldSpec::new(4, "sunshine", Aggregation::Sum),
            ],
        )
    }

    fn table(outcome: FetchOutcome) -> ObservationTable {
        outcome.into_table().expect("expected observations")
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let body = "#START7777\n# TM STN TA X SS\n\n20200101 108 -1.5 0 6.2\n20200102 108 0.5 0 -9.0\n#7777END\n";
        let table = table(parse_response(body, &station(), Granularity::Daily, &sunshine_map()).unwrap());

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(table.values("temperature").unwrap(), vec![Some(-1.5), Some(0.5)]);
        // Sentinels survive parsing untouched; they are cleaned by the pipeline.
        assert_eq!(table.values("sunshine").unwrap(), vec![Some(6.2), Some(-9.0)]);
    }

    #[test]
    fn missing_positions_are_left_out() {
        let body = "20200101 108 3.0\n20200102 108 4.0\n";
        let table = table(parse_response(body, &station(), Granularity::Daily, &sunshine_map()).unwrap());

        assert_eq!(table.present_fields(), vec!["temperature"]);
        assert_eq!(table.values("sunshine").unwrap(), vec![None, None]);

        let df = table.to_dataframe().unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, ["date", "station", "temperature"]);
    }

    #[test]
    fn ragged_rows_keep_a_column_any_row_reaches() {
        let body = "20200101 108 3.0\n20200102 108 4.0 x 1.5\n";
        let table = table(parse_response(body, &station(), Granularity::Daily, &sunshine_map()).unwrap());

        assert_eq!(table.present_fields(), vec!["temperature", "sunshine"]);
        assert_eq!(table.values("sunshine").unwrap(), vec![None, Some(1.5)]);
    }

    #[test]
    fn unparseable_dates_are_dropped_and_bad_cells_are_missing() {
        let body = "2020XX01 108 1.0 0 1.0\n20200102 108 abc 0 2.0\n";
        let table = table(parse_response(body, &station(), Granularity::Daily, &sunshine_map()).unwrap());

        assert_eq!(table.len(), 1);
        assert_eq!(table.values("temperature").unwrap(), vec![None]);
        assert_eq!(table.values("sunshine").unwrap(), vec![Some(2.0)]);
    }

    #[test]
    fn comment_only_body_is_no_data() {
        let body = "#START7777\n#7777END\n";
        let outcome = parse_response(body, &station(), Granularity::Daily, &sunshine_map()).unwrap();
        assert!(matches!(outcome, FetchOutcome::NoData));

        let outcome = parse_response("  \n", &station(), Granularity::Daily, &sunshine_map()).unwrap();
        assert!(matches!(outcome, FetchOutcome::NoData));
    }

    #[test]
    fn body_without_any_valid_record_is_malformed() {
        let body = "<html><body>Service Unavailable</body></html>\n";
        let err = parse_response(body, &station(), Granularity::Daily, &sunshine_map()).unwrap_err();
        assert!(matches!(err, FetchError::Malformed { lines: 1, .. }));
        assert_eq!(err.station(), "108");
    }

    #[test]
    fn comma_separated_records() {
        let body = "20200101,108,2.5,,7.0\n";
        let table = table(parse_response(body, &station(), Granularity::Daily, &sunshine_map()).unwrap());
        assert_eq!(table.values("temperature").unwrap(), vec![Some(2.5)]);
        assert_eq!(table.values("sunshine").unwrap(), vec![Some(7.0)]);
    }

    #[test]
    fn station_first_layout_needs_its_own_time_position() {
        // `disp=1` rows: station, time, then the measurements.
        let body = "108,20200101,-1.5,3.0\n108,20200102,0.5,4.5\n";
        let default_layout = parse_response(body, &station(), Granularity::Daily, &sunshine_map());
        assert!(matches!(default_layout, Err(FetchError::Malformed { lines: 2, .. })));

        let station_first = FieldMap::new(
            1,
            vec![
                FieldSpec::new(2, "temperature", Aggregation::Mean),
                FieldSpec::new(3, "sunshine", Aggregation::Sum),
            ],
        );
        let table = table(parse_response(body, &station(), Granularity::Daily, &station_first).unwrap());
        assert_eq!(table.rows()[1].date, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(table.values("sunshine").unwrap(), vec![Some(3.0), Some(4.5)]);
    }

    #[test]
    fn hourly_records_carry_the_hour() {
        let body = "201901010900 108 5.0 0 0.4\n201901011000 108 6.0 0 0.8\n";
        let table = table(parse_response(body, &station(), Granularity::Hourly, &sunshine_map()).unwrap());

        assert_eq!(table.rows()[1].hour, Some(10));
        let df = table.to_dataframe().unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, ["date", "hour", "station", "temperature", "sunshine"]);
    }
}
