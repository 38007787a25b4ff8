//! MythTV services API client.
//!
//! Talks to the backend's HTTP API (v2, MythTV >= 34) and asks for JSON.
//! Every request carries a timeout; there are no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{CatalogRecord, StorageMap};

use super::wire::{ProgramListResponse, StorageGroupDirResponse};
use super::CatalogSource;

/// Backend API address used when none is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:6544";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const STORAGE_GROUP_DIRS: &str = "Myth/GetStorageGroupDirs";
const RECORDED_LIST: &str = "Dvr/GetRecordedList";

/// Errors fetching from the backend; all of them abort the run
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// HTTP client for one MythTV backend
#[derive(Debug, Clone)]
pub struct MythApiClient {
    /// Base URL without trailing slash
    base_url: String,
    /// Per-request timeout
    timeout: Duration,
    /// HTTP client
    client: reqwest::Client,
}

impl MythApiClient {
    /// Create a client for `base_url` with a per-request `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    /// Build an endpoint URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let url = self.api_url(endpoint);
        debug!(%url, "Fetching");

        let request_error = |source: reqwest::Error| {
            if source.is_timeout() {
                FetchError::Timeout {
                    endpoint: url.clone(),
                    timeout: self.timeout,
                }
            } else {
                FetchError::Request {
                    endpoint: url.clone(),
                    source,
                }
            }
        };

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: url.clone(),
                status,
            });
        }

        let body = response.text().await.map_err(request_error)?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            endpoint: url.clone(),
            source,
        })
    }
}

#[async_trait]
impl CatalogSource for MythApiClient {
    fn name(&self) -> &str {
        "mythtv"
    }

    async fn storage_map(&self) -> Result<StorageMap, FetchError> {
        let response: StorageGroupDirResponse = self.fetch(STORAGE_GROUP_DIRS).await?;
        Ok(response.into_storage_map())
    }

    async fn recordings(&self) -> Result<Vec<CatalogRecord>, FetchError> {
        let response: ProgramListResponse = self.fetch(RECORDED_LIST).await?;

        let mut records = Vec::new();
        for program in &response.program_list.programs {
            if program.status().as_deref() != Some(crate::domain::STATUS_RECORDED) {
                continue;
            }
            match program.to_record() {
                Ok(record) => records.push(record),
                Err(missing) => warn!(
                    field = %missing,
                    "Skipping recording with missing or unparsable field"
                ),
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = MythApiClient::new("http://backend:6544/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.api_url(RECORDED_LIST),
            "http://backend:6544/Dvr/GetRecordedList"
        );
    }

    #[tokio::test]
    async fn test_source_name() {
        let client = MythApiClient::new(DEFAULT_API_URL, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.name(), "mythtv");
        assert_eq!(client.timeout(), Duration::from_secs(15));
    }
}
