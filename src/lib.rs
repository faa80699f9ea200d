mod config;
mod error;
mod fetch;
mod kma;
mod output;
mod pipeline;
mod types;

pub use config::{BatchConfig, ConfigError, KmaConfig, RunConfig};
pub use error::KmaError;
pub use kma::Kma;
pub use output::{write_csv, OutputError};

pub use fetch::error::FetchError;
pub use fetch::fetcher::{ObservationSource, StationFetcher};
pub use fetch::observations::{FetchOutcome, ObservationRow, ObservationTable};
pub use fetch::parser::parse_response;

pub use pipeline::driver::AggregationPipeline;
pub use pipeline::error::PipelineError;
pub use pipeline::report::{BatchReport, StationFailure};
pub use pipeline::Grouping;

pub use types::field_map::{Aggregation, FieldMap, FieldSpec};
pub use types::granularity::{Granularity, DEFAULT_SENTINELS};
pub use types::period::{DateRange, Month, Period};
pub use types::station::{
    gyeonggi_sejong_regions, representative_regions, representative_station_codes, Station,
    StationId, REPRESENTATIVE_STATIONS, UNASSIGNED_REGION,
};
