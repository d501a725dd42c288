pub mod error;
pub mod types;

pub use error::{Result, SerpApiError};
pub use types::{EventsResponse, FlexField, RawEventRecord};

use std::time::Duration;

const BASE_URL: &str = "https://serpapi.com/search";

/// One provider call never returns more than this many records, no matter
/// how many the caller asked for.
const MAX_RESULTS_PER_CALL: usize = 10;

/// Timeout for a single search call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("http client");
        Self { client, api_key }
    }

    /// Search the google_events engine for one query. Returns at most
    /// `min(limit, MAX_RESULTS_PER_CALL)` raw records.
    pub async fn search_events(&self, query: &str, limit: usize) -> Result<Vec<RawEventRecord>> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("q", query),
                ("engine", "google_events"),
                ("api_key", self.api_key.as_str()),
                ("hl", "en"),
                ("gl", "us"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SerpApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: EventsResponse = resp.json().await?;
        let mut records = parsed.events_results;
        records.truncate(limit.min(MAX_RESULTS_PER_CALL));
        tracing::debug!(query, count = records.len(), "Fetched event records");
        Ok(records)
    }
}
