//! This module provides the main entry point for fetching KMA surface observations
//! and building station or regional reports from them.

use crate::config::{KmaConfig, RunConfig};
use crate::error::KmaError;
use crate::fetch::fetcher::{ObservationSource, StationFetcher};
use crate::fetch::observations::FetchOutcome;
use crate::output::write_csv;
use crate::pipeline::driver::AggregationPipeline;
use crate::pipeline::report::BatchReport;
use crate::types::period::{DateRange, Period};
use crate::types::station::StationId;
use bon::bon;
use log::warn;
use std::collections::BTreeMap;

/// The main client for the KMA API hub.
///
/// Holds one HTTP client configured from a [`KmaConfig`] for the lifetime of a run.
///
/// # Examples
///
/// ```no_run
/// # use kma_weather::{DateRange, Kma, KmaConfig, KmaError, Period};
/// # use chrono::NaiveDate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), KmaError> {
/// let kma = Kma::new(KmaConfig::builder().auth_key("my-key").build())?;
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
/// )?;
///
/// let stations = vec!["108".to_string(), "119".to_string()];
/// let report = kma
///     .aggregate()
///     .stations(&stations)
///     .range(range)
///     .period(Period::Month)
///     .call()
///     .await?;
/// println!("{}", report.frame);
/// println!("failed: {:?}", report.failed_stations());
/// # Ok(())
/// # }
/// ```
pub struct Kma {
    config: KmaConfig,
    pipeline: AggregationPipeline<StationFetcher>,
}

#[bon]
impl Kma {
    pub fn new(config: KmaConfig) -> Result<Self, KmaError> {
        let fetcher = StationFetcher::new(&config).map_err(KmaError::ClientBuild)?;
        Ok(Self {
            pipeline: AggregationPipeline::new(fetcher, config.request_delay()),
            config,
        })
    }

    pub fn config(&self) -> &KmaConfig {
        &self.config
    }

    /// Fetches the raw observations of a single station.
    ///
    /// An empty answer from the service is [`FetchOutcome::NoData`], not an error.
    ///
    /// ```no_run
    /// # use kma_weather::{DateRange, Kma, KmaConfig, KmaError};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), KmaError> {
    /// let kma = Kma::new(KmaConfig::builder().auth_key("my-key").build())?;
    /// let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    /// let outcome = kma.observations("108").range(DateRange::new(day, day)?).call().await?;
    /// if let Some(table) = outcome.into_table() {
    ///     println!("{}", table.to_dataframe()?);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = observations)]
    #[doc(hidden)]
    pub async fn build_observations(
        &self,
        #[builder(start_fn)] station: &str,
        range: DateRange,
    ) -> Result<FetchOutcome, KmaError> {
        let station = StationId::new(station)?;
        Ok(self.pipeline.source().fetch(&station, &range).await?)
    }

    /// Fetches every station in turn and aggregates the result.
    ///
    /// `period` defaults to [`Period::Month`]. Supplying `regions` groups the
    /// report by region instead of by station.
    #[builder]
    pub async fn aggregate(
        &self,
        stations: &[String],
        range: DateRange,
        period: Option<Period>,
        regions: Option<&BTreeMap<String, String>>,
    ) -> Result<BatchReport, KmaError> {
        let report = self
            .pipeline
            .run(stations, &range, period.unwrap_or_default(), regions)
            .await?;
        Ok(report)
    }

    /// Runs a whole configured batch and writes its report to `config.output`.
    pub async fn run(config: &RunConfig) -> Result<BatchReport, KmaError> {
        let range = config.batch.date_range()?;
        let kma = Kma::new(config.kma.clone())?;
        let mut report = kma
            .aggregate()
            .stations(&config.batch.stations)
            .range(range)
            .period(config.batch.period)
            .maybe_regions(config.batch.regions.as_ref())
            .call()
            .await?;

        write_csv(&mut report.frame, &config.output)?;
        if !report.failed.is_empty() {
            warn!(
                "Report written without stations {}; rerun them separately",
                report.failed_stations().join(", ")
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::fetch::error::FetchError;
    use crate::pipeline::error::PipelineError;
    use chrono::NaiveDate;

    fn offline_config() -> KmaConfig {
        KmaConfig::builder()
            .auth_key("test-key")
            .base_url("http://127.0.0.1:9")
            .timeout_secs(2)
            .request_delay_ms(0)
            .build()
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn invalid_station_is_rejected_before_any_request() -> Result<(), KmaError> {
        let kma = Kma::new(offline_config())?;
        let result = kma.observations("seoul").range(january()).call().await;
        assert!(matches!(
            result,
            Err(KmaError::Fetch(FetchError::InvalidStation(_)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_service_fails_the_whole_batch() -> Result<(), KmaError> {
        let kma = Kma::new(offline_config())?;
        let stations = vec!["108".to_string(), "119".to_string()];
        let result = kma
            .aggregate()
            .stations(&stations)
            .range(january())
            .call()
            .await;

        match result {
            Err(KmaError::Pipeline(PipelineError::AllStationsFailed { failed, .. })) => {
                assert_eq!(failed.len(), 2);
                assert!(failed
                    .iter()
                    .all(|f| matches!(f.error, FetchError::NetworkRequest { .. })));
            }
            Err(other) => panic!("expected AllStationsFailed, got {other}"),
            Ok(_) => panic!("expected AllStationsFailed, got a report"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn failed_run_writes_no_output() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("report.csv");
        let config = RunConfig {
            kma: offline_config(),
            batch: serde_json::from_str(
                r#"{ "stations": ["108"], "start": "2020-01-01", "end": "2020-01-31" }"#,
            )?,
            output: output.clone(),
        };

        assert!(Kma::run(&config).await.is_err());
        assert!(!output.exists());
        Ok(())
    }

    #[tokio::test]
    async fn inverted_range_is_a_config_error() -> Result<(), Box<dyn std::error::Error>> {
        let config = RunConfig {
            kma: offline_config(),
            batch: serde_json::from_str(
                r#"{ "stations": ["108"], "start": "2020-02-01", "end": "2020-01-31" }"#,
            )?,
            output: "unused.csv".into(),
        };
        let result = Kma::run(&config).await;
        assert!(matches!(
            result,
            Err(KmaError::Config(ConfigError::InvalidDateRange { .. }))
        ));
        Ok(())
    }
}
