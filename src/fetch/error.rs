use thiserror::Error;

/// Why a single station could not be fetched. Every variant names the station
/// so the batch driver can report it without extra bookkeeping.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid station code '{0}'")]
    InvalidStation(String),

    #[error("Network request failed for station {station} ({url})")]
    NetworkRequest {
        station: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed for station {station} with status {status}")]
    HttpStatus {
        station: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response body for station {station}")]
    BodyDecode {
        station: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response for station {station} has {lines} data lines but no parseable record time")]
    Malformed { station: String, lines: usize },
}

impl FetchError {
    pub fn station(&self) -> &str {
        match self {
            FetchError::InvalidStation(station) => station,
            FetchError::NetworkRequest { station, .. }
            | FetchError::HttpStatus { station, .. }
            | FetchError::BodyDecode { station, .. }
            | FetchError::Malformed { station, .. } => station,
        }
    }
}
