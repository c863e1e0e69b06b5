use crate::config::EtlConfig;
use crate::error::FetchError;
use crate::models::{QueryRequest, RawPayload};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Retrieves season averages from the balldontlie API
pub struct SeasonAveragesFetcher {
    endpoint: String,
    client: Client,
}

impl SeasonAveragesFetcher {
    /// Create a new fetcher instance
    pub fn new(config: &EtlConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        Ok(Self { endpoint: config.season_averages_url(), client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one GET for the request and parse the body as JSON.
    ///
    /// The payload is returned unchanged; a non-2xx status is an error and the body is
    /// not read.
    pub async fn fetch(&self, request: &QueryRequest) -> Result<RawPayload, FetchError> {
        info!(
            "Fetching season {} averages for {} players from: {}",
            request.season,
            request.player_ids.len(),
            self.endpoint
        );

        let response =
            self.client.get(&self.endpoint).query(&request.query_pairs()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status, url: response.url().to_string() });
        }

        let body = response.text().await?;
        debug!("Received {} bytes with status {}", body.len(), status);

        let payload: RawPayload = serde_json::from_str(&body)?;
        Ok(payload)
    }
}
