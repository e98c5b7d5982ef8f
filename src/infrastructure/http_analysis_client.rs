// HTTP analysis client - POSTs the position collection to the analysis endpoint
use crate::application::analysis_client::{AnalysisClient, AnalysisError};
use crate::domain::insight::AnalysisResponse;
use crate::domain::position::PositionRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    url: String,
}

impl HttpAnalysisClient {
    pub fn new(url: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build analysis HTTP client")?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, positions: &[PositionRecord]) -> Result<AnalysisResponse, AnalysisError> {
        tracing::debug!(records = positions.len(), url = %self.url, "Requesting analysis");

        // `.json` sets Content-Type: application/json
        let response = self
            .client
            .post(&self.url)
            .json(positions)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        // Only a body that is not JSON at all is an error
        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        tracing::info!(%body, "AI Analysis received");
        Ok(AnalysisResponse::from_body(&body))
    }
}
