use crate::config::ConfigError;
use crate::fetch::error::FetchError;
use crate::output::OutputError;
use crate::pipeline::error::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KmaError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Failed processing DataFrame: {0}")]
    DataFrame(#[from] polars::error::PolarsError),
}
