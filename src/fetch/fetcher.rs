use crate::config::KmaConfig;
use crate::fetch::error::FetchError;
use crate::fetch::observations::FetchOutcome;
use crate::fetch::parser::parse_response;
use crate::types::field_map::FieldMap;
use crate::types::granularity::Granularity;
use crate::types::period::DateRange;
use crate::types::station::StationId;
use log::{info, warn};
use reqwest::Client;
use std::collections::BTreeMap;
use std::future::Future;

/// Anything that can produce the observations of one station over a date range.
///
/// [`StationFetcher`] is the HTTP implementation. The batch pipeline only depends
/// on this trait, so a run can be driven from recorded responses as well.
pub trait ObservationSource {
    fn fetch(
        &self,
        station: &StationId,
        range: &DateRange,
    ) -> impl Future<Output = Result<FetchOutcome, FetchError>> + Send;

    /// The column layout every returned table is parsed with.
    fn field_map(&self) -> &FieldMap;

    /// Codes that stand for a missing measurement in this source's data.
    fn sentinels(&self) -> &[f64];
}

/// Issues one request per station against the KMA API hub and parses the reply.
pub struct StationFetcher {
    client: Client,
    endpoint: String,
    auth_key: String,
    encoding: String,
    format_params: BTreeMap<String, String>,
    granularity: Granularity,
    field_map: FieldMap,
    sentinels: Vec<f64>,
}

impl StationFetcher {
    pub fn new(config: &KmaConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint_url(),
            auth_key: config.auth_key.clone(),
            encoding: config.encoding.clone(),
            format_params: config.format_params.clone(),
            granularity: config.granularity,
            field_map: config.field_map(),
            sentinels: config.sentinels(),
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    fn query(&self, station: &StationId, range: &DateRange) -> Vec<(String, String)> {
        let mut params = vec![
            ("stn".to_string(), station.to_string()),
            (
                "tm1".to_string(),
                self.granularity.format_start(range.start()),
            ),
            ("tm2".to_string(), self.granularity.format_end(range.end())),
        ];
        params.extend(
            self.format_params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        params.push(("authKey".to_string(), self.auth_key.clone()));
        params
    }

    /// Downloads the raw response text for a station.
    async fn download(&self, station: &StationId, range: &DateRange) -> Result<String, FetchError> {
        // The credential is a query parameter, so only the bare endpoint is ever logged.
        info!(
            "Requesting {} data for station {} ({} to {}) from {}",
            self.granularity,
            station,
            range.start(),
            range.end(),
            self.endpoint
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(station, range))
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest {
                station: station.to_string(),
                url: self.endpoint.clone(),
                source: e,
            })?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for station {}: {:?}", station, e.status());
                return Err(match e.status() {
                    Some(status) => FetchError::HttpStatus {
                        station: station.to_string(),
                        status,
                        source: e,
                    },
                    None => FetchError::NetworkRequest {
                        station: station.to_string(),
                        url: self.endpoint.clone(),
                        source: e,
                    },
                });
            }
        };

        response
            .text_with_charset(&self.encoding)
            .await
            .map_err(|e| FetchError::BodyDecode {
                station: station.to_string(),
                source: e,
            })
    }
}

impl ObservationSource for StationFetcher {
    async fn fetch(
        &self,
        station: &StationId,
        range: &DateRange,
    ) -> Result<FetchOutcome, FetchError> {
        let body = self.download(station, range).await?;
        parse_response(&body, station, self.granularity, &self.field_map)
    }

    fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    fn sentinels(&self) -> &[f64] {
        &self.sentinels
    }
}
