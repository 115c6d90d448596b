//! Retrieves published series files.

use std::time::Duration;

use crate::error::FetchError;

/// Root of the Met Office climate series datasets.
pub const DEFAULT_BASE_URL: &str = "https://www.metoffice.gov.uk/pub/data/weather/uk/climate/datasets";

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Returns the URL of the series file for a region and parameter.
pub fn data_url(base_url: &str, region: &str, parameter: &str) -> String {
    format!(
        "{}/{}/date/{}.txt",
        base_url.trim_end_matches('/'),
        parameter,
        region
    )
}

/// A source of raw series text.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Fetches the body at `url`. A single attempt is made.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches over HTTP(S).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| FetchError::new(url, e))?;

        response.text().await.map_err(|e| FetchError::new(url, e))
    }
}

// -- Tests -------------------------------------------------------------------
