// Source trait for hourly position snapshots
use async_trait::async_trait;
use thiserror::Error;

/// Why an hourly snapshot could not be used.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot not found")]
    NotFound,

    /// Transport failure, timeout or a non-404 error status
    #[error("snapshot unavailable: {0}")]
    Unavailable(String),

    /// Body was not JSON, or not an array
    #[error("snapshot malformed: {0}")]
    Malformed(String),
}

impl SnapshotError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SnapshotError::NotFound)
    }
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the raw JSON payload of the snapshot for `hour`
    async fn fetch_hour(&self, hour: u8) -> Result<serde_json::Value, SnapshotError>;
}
