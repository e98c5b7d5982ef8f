// Client trait for the remote analysis endpoint
use crate::domain::insight::AnalysisResponse;
use crate::domain::position::PositionRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Transport(String),

    #[error("analysis endpoint returned status {0}")]
    Status(u16),

    #[error("analysis response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Submit the full position collection and return the decoded response
    async fn analyze(&self, positions: &[PositionRecord]) -> Result<AnalysisResponse, AnalysisError>;
}
