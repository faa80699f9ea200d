use crate::pipeline::report::StationFailure;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No stations were given to the pipeline")]
    EmptyStationList,

    /// Not a single station produced observations. Carries every failure so the
    /// operator can retry exactly those stations.
    #[error("No station produced observations ({} failed, {} without data)", .failed.len(), .empty.len())]
    AllStationsFailed {
        failed: Vec<StationFailure>,
        empty: Vec<String>,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrame(#[from] PolarsError),
}
