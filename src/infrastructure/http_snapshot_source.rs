// HTTP snapshot source - Reads `/treasure/{HH}.json` from the balloon data host
use crate::application::snapshot_source::{SnapshotError, SnapshotSource};
use crate::domain::position::snapshot_file_name;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSnapshotSource {
    pub fn new(base_url: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build snapshot HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn snapshot_url(&self, hour: u8) -> String {
        format!("{}/treasure/{}", self.base_url, snapshot_file_name(hour))
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_hour(&self, hour: u8) -> Result<serde_json::Value, SnapshotError> {
        let url = self.snapshot_url(hour);
        tracing::debug!(hour, %url, "Fetching snapshot");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SnapshotError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SnapshotError::NotFound);
        }
        if !status.is_success() {
            return Err(SnapshotError::Unavailable(format!("status {}", status)));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SnapshotError::Malformed(e.to_string()))
    }
}
