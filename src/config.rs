//! Configuration for the upstream service and for a batch run.
//!
//! Nothing about the integration (endpoint, credential, column layout, rate limit)
//! is hardcoded in the fetcher or the pipeline; it all arrives through these
//! structs, usually deserialized from a JSON file.

use crate::types::field_map::FieldMap;
use crate::types::granularity::Granularity;
use crate::types::period::{DateRange, Period};
use bon::Builder;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://apihub.kma.go.kr/api/typ01/url";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
pub const DEFAULT_ENCODING: &str = "euc-kr";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Date range start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_request_delay_ms() -> u64 {
    DEFAULT_REQUEST_DELAY_MS
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_format_params() -> BTreeMap<String, String> {
    BTreeMap::from([("help".to_string(), "1".to_string())])
}

/// Connection settings for the KMA API hub, scoped to one run.
///
/// # Examples
///
/// ```
/// use kma_weather::{Granularity, KmaConfig};
///
/// let config = KmaConfig::builder()
///     .auth_key("my-key")
///     .granularity(Granularity::Hourly)
///     .request_delay_ms(0)
///     .build();
/// assert!(config.endpoint_url().ends_with("/kma_sfctm3.php"));
/// assert_eq!(config.timeout().as_secs(), 30);
/// ```
#[derive(Debug, Clone, Deserialize, Builder)]
pub struct KmaConfig {
    /// Access credential sent as the `authKey` query parameter.
    #[builder(into)]
    pub auth_key: String,
    #[serde(default = "default_base_url")]
    #[builder(into, default = default_base_url())]
    pub base_url: String,
    #[serde(default)]
    #[builder(default)]
    pub granularity: Granularity,
    #[serde(default = "default_timeout_secs")]
    #[builder(default = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
    /// Pause between two consecutive station requests.
    #[serde(default = "default_request_delay_ms")]
    #[builder(default = DEFAULT_REQUEST_DELAY_MS)]
    pub request_delay_ms: u64,
    /// Charset used to decode response bodies when the server does not declare one.
    #[serde(default = "default_encoding")]
    #[builder(into, default = default_encoding())]
    pub encoding: String,
    /// Output format flags passed through verbatim (`help`, `disp`, ...).
    ///
    /// `disp=1` switches to comma separated rows that lead with the station code
    /// and put the record time second, so it needs a `field_map` with
    /// `time_position: 1` and shifted field positions.
    #[serde(default = "default_format_params")]
    #[builder(default = default_format_params())]
    pub format_params: BTreeMap<String, String>,
    /// Replaces the granularity's default column layout.
    pub field_map: Option<FieldMap>,
    /// Replaces the granularity's default missing-value codes.
    pub sentinels: Option<Vec<f64>>,
}

impl KmaConfig {
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.granularity.endpoint()
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn field_map(&self) -> FieldMap {
        self.field_map
            .clone()
            .unwrap_or_else(|| self.granularity.default_field_map())
    }

    pub fn sentinels(&self) -> Vec<f64> {
        self.sentinels
            .clone()
            .unwrap_or_else(|| self.granularity.sentinels().to_vec())
    }
}

/// Which stations to fetch, over which days, and how to bucket the result.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub stations: Vec<String>,
    /// Station → region map. When present the report is grouped by region.
    #[serde(default)]
    pub regions: Option<BTreeMap<String, String>>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub period: Period,
}

impl BatchConfig {
    pub fn date_range(&self) -> Result<DateRange, ConfigError> {
        DateRange::new(self.start, self.end)
    }
}

/// A complete run: service settings, the batch, and where the caller writes the report.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub kma: KmaConfig,
    pub batch: BatchConfig,
    pub output: PathBuf,
}

impl RunConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_json_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::field_map::Aggregation;
    use std::io::Write;

    const RUN_JSON: &str = r#"{
        "kma": { "auth_key": "secret", "granularity": "daily", "request_delay_ms": 0 },
        "batch": {
            "stations": ["98", "239"],
            "regions": { "98": "경기", "239": "세종" },
            "start": "2022-01-01",
            "end": "2022-12-31",
            "period": "day"
        },
        "output": "out/region_daily.csv"
    }"#;

    #[test]
    fn parses_run_config_with_defaults() {
        let config = RunConfig::from_json_str(RUN_JSON).unwrap();

        assert_eq!(config.kma.auth_key, "secret");
        assert_eq!(config.kma.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.kma.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.kma.request_delay(), Duration::ZERO);
        assert_eq!(config.kma.encoding, "euc-kr");
        assert_eq!(config.kma.format_params.get("help").map(String::as_str), Some("1"));
        assert_eq!(config.kma.sentinels(), vec![-9.0, -99.0, -99.9]);

        assert_eq!(config.batch.period, Period::Day);
        assert_eq!(config.batch.stations, ["98", "239"]);
        assert_eq!(config.batch.date_range().unwrap().months().len(), 12);
        assert_eq!(config.output, PathBuf::from("out/region_daily.csv"));
    }

    #[test]
    fn field_map_override() {
        let json = r#"{
            "auth_key": "k",
            "field_map": { "fields": [ { "position": 32, "name": "sunshine", "aggregation": "sum" } ] }
        }"#;
        let config: KmaConfig = serde_json::from_str(json).unwrap();
        let map = config.field_map();
        assert_eq!(map.time_position, 0);
        assert_eq!(map.fields.len(), 1);
        assert_eq!(map.fields[0].aggregation, Aggregation::Sum);
    }

    #[test]
    fn inverted_batch_range_is_rejected() {
        let mut config = RunConfig::from_json_str(RUN_JSON).unwrap();
        config.batch.start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(matches!(
            config.batch.date_range(),
            Err(ConfigError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn reads_config_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(RUN_JSON.as_bytes())?;
        let config = RunConfig::from_json_file(file.path())?;
        assert_eq!(config.batch.stations.len(), 2);

        let missing = RunConfig::from_json_file(Path::new("/nonexistent/run.json"));
        assert!(matches!(missing, Err(ConfigError::Read(..))));
        Ok(())
    }
}
