//! Drives an [`ObservationSource`] over a list of stations and turns the
//! collected observations into one cleaned, resampled report.

use crate::fetch::fetcher::ObservationSource;
use crate::fetch::observations::{stack_tables, FetchOutcome, ObservationTable};
use crate::pipeline::aggregate::{reindex, resample};
use crate::pipeline::clean::clean;
use crate::pipeline::error::PipelineError;
use crate::pipeline::report::{BatchReport, StationFailure};
use crate::pipeline::Grouping;
use crate::types::period::{DateRange, Period};
use crate::types::station::{StationId, UNASSIGNED_REGION};
use log::{info, warn};
use polars::prelude::IntoLazy;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Sequential multi-station acquisition and aggregation.
///
/// Stations are requested one at a time with `delay` between consecutive
/// requests; the pause is the only admission control the upstream service gets.
pub struct AggregationPipeline<S> {
    source: S,
    delay: Duration,
}

struct Collected {
    tables: Vec<ObservationTable>,
    failed: Vec<StationFailure>,
    empty: Vec<String>,
}

impl<S: ObservationSource> AggregationPipeline<S> {
    pub fn new(source: S, delay: Duration) -> Self {
        Self { source, delay }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches every station and builds the report.
    ///
    /// One station failing never stops the batch: it is listed in
    /// [`BatchReport::failed`] and left out of the frame. Only when no station
    /// produced a single observation does the run fail with
    /// [`PipelineError::AllStationsFailed`].
    pub async fn run(
        &self,
        stations: &[String],
        range: &DateRange,
        period: Period,
        regions: Option<&BTreeMap<String, String>>,
    ) -> Result<BatchReport, PipelineError> {
        if stations.is_empty() {
            return Err(PipelineError::EmptyStationList);
        }

        let Collected {
            tables,
            failed,
            empty,
        } = self.collect(stations, range).await;

        info!(
            "Fetched {} of {} stations ({} failed, {} without data)",
            tables.len(),
            stations.len(),
            failed.len(),
            empty.len()
        );
        if !failed.is_empty() {
            let ids: Vec<&str> = failed.iter().map(|f| f.station.as_str()).collect();
            warn!("Failed stations: {}", ids.join(", "));
        }

        if tables.is_empty() {
            return Err(PipelineError::AllStationsFailed { failed, empty });
        }

        let grouping = if regions.is_some() {
            Grouping::Region
        } else {
            Grouping::Station
        };
        let keys = group_keys(&tables, regions);
        let field_map = self.source.field_map();

        let raw = stack_tables(&tables, field_map, regions)?;
        let hourly = raw.column("hour").is_ok();
        let cleaned = clean(raw.lazy(), field_map, self.source.sentinels(), grouping, hourly);
        let aggregated = resample(cleaned, field_map, period, grouping);
        let frame = reindex(aggregated, &keys, range, period, grouping, field_map)?.collect()?;

        info!(
            "Aggregated {} {} rows over {} {} keys",
            frame.height(),
            period,
            keys.len(),
            grouping
        );

        Ok(BatchReport {
            frame,
            period,
            grouping,
            failed,
            empty,
        })
    }

    async fn collect(&self, stations: &[String], range: &DateRange) -> Collected {
        let mut collected = Collected {
            tables: Vec::new(),
            failed: Vec::new(),
            empty: Vec::new(),
        };
        let mut seen = HashSet::new();
        let mut requested_before = false;

        for code in stations {
            let station = match StationId::new(code) {
                Ok(station) => station,
                Err(error) => {
                    warn!("{}", error);
                    collected.failed.push(StationFailure {
                        station: code.trim().to_string(),
                        error,
                    });
                    continue;
                }
            };

            if !seen.insert(station.clone()) {
                warn!("Station {} listed twice, skipping the repeat", station);
                continue;
            }

            if requested_before && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            requested_before = true;

            match self.source.fetch(&station, range).await {
                Ok(FetchOutcome::Observations(table)) if !table.is_empty() => {
                    info!("Station {}: {} records", station, table.len());
                    collected.tables.push(table);
                }
                Ok(_) => {
                    info!("Station {}: no data in range", station);
                    collected.empty.push(station.to_string());
                }
                Err(error) => {
                    warn!("Station {} failed: {}", station, error);
                    collected.failed.push(StationFailure {
                        station: station.to_string(),
                        error,
                    });
                }
            }
        }
        collected
    }
}

/// Keys that produced data, in first-seen order without repeats.
fn group_keys(tables: &[ObservationTable], regions: Option<&BTreeMap<String, String>>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for table in tables {
        let key = match regions {
            Some(map) => map
                .get(table.station().as_str())
                .cloned()
                .unwrap_or_else(|| UNASSIGNED_REGION.to_string()),
            None => table.station().to_string(),
        };
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
