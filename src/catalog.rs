use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::DatasetDescriptor;
use crate::error::SyncError;

pub trait CatalogClient: Send + Sync {
    /// One request to the catalog endpoint, decoded as a JSON array and
    /// filtered down to descriptors matching `theme`. No pagination, no
    /// retry; a failed or undecodable response aborts the run.
    fn fetch_datasets(&self, theme: &str) -> Result<Vec<DatasetDescriptor>, SyncError>;
}

#[derive(Clone)]
pub struct CatalogHttpClient {
    client: Client,
    catalog_url: String,
}

impl CatalogHttpClient {
    pub fn new(catalog_url: impl Into<String>) -> Result<Self, SyncError> {
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
            .map_err(|err| SyncError::CatalogHttp(err.to_string()))?;
        Ok(Self {
            client,
            catalog_url: catalog_url.into(),
        })
    }
}

impl CatalogClient for CatalogHttpClient {
    fn fetch_datasets(&self, theme: &str) -> Result<Vec<DatasetDescriptor>, SyncError> {
        let response = self
            .client
            .get(&self.catalog_url)
            .send()
            .map_err(|err| SyncError::CatalogHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "catalog request failed".to_string());
            return Err(SyncError::CatalogStatus { status, message });
        }
        let descriptors: Vec<DatasetDescriptor> = response
            .json()
            .map_err(|err| SyncError::CatalogParse(err.to_string()))?;
        Ok(filter_by_theme(descriptors, theme))
    }
}

pub fn filter_by_theme(descriptors: Vec<DatasetDescriptor>, theme: &str) -> Vec<DatasetDescriptor> {
    descriptors
        .into_iter()
        .filter(|descriptor| descriptor.matches_theme(theme))
        .collect()
}
