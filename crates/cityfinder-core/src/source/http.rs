// crates/cityfinder-core/src/source/http.rs
#![cfg(feature = "fetch")]

use super::{decode_records, CitySource};
use crate::error::FetchError;
use crate::model::City;
use std::time::Duration;

/// Downloads the dataset with a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: reqwest::Url,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme {:?}",
                url.scheme()
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}

impl CitySource for HttpSource {
    fn fetch(&self) -> Result<Vec<City>, FetchError> {
        tracing::info!(url = %self.url, "downloading dataset");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {status} from {}", self.url)));
        }

        let body = response.bytes().map_err(map_reqwest)?;
        let cities = decode_records(&body)?;
        tracing::info!(count = cities.len(), "dataset downloaded");
        Ok(cities)
    }
}
