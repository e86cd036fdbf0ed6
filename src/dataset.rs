use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::SyncError;

pub trait DatasetClient: Send + Sync {
    /// Fetch the full tabular content behind a descriptor's download URL.
    fn fetch_table(&self, url: &str) -> Result<Vec<u8>, SyncError>;
}

#[derive(Clone)]
pub struct DatasetHttpClient {
    client: Client,
}

impl DatasetHttpClient {
    pub fn new() -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("cms-sync/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SyncError::Filesystem(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| SyncError::DatasetHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl DatasetClient for DatasetHttpClient {
    fn fetch_table(&self, url: &str) -> Result<Vec<u8>, SyncError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| SyncError::DatasetHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "dataset request failed".to_string());
            return Err(SyncError::DatasetStatus { status, message });
        }
        let bytes = response
            .bytes()
            .map_err(|err| SyncError::DatasetHttp(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}
