// Snapshot fetcher - Fan out over every hour, keep what parses, publish the result
use crate::application::position_store::PositionPublisher;
use crate::application::snapshot_source::{SnapshotError, SnapshotSource};
use crate::domain::position::{HourlySnapshot, PositionRecord};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

pub const DEFAULT_HOURS: u8 = 24;

pub struct SnapshotFetcher {
    source: Arc<dyn SnapshotSource>,
    hours: u8,
    publisher: Mutex<PositionPublisher>,
}

impl SnapshotFetcher {
    pub fn new(source: Arc<dyn SnapshotSource>, hours: u8, publisher: PositionPublisher) -> Self {
        Self {
            source,
            hours,
            publisher: Mutex::new(publisher),
        }
    }

    /// Fetch every hour and replace the shared position collection.
    /// Overlapping refreshes run one after another.
    pub async fn refresh(&self) -> (u64, usize) {
        let publisher = self.publisher.lock().await;
        let records = self.fetch_all().await;
        let count = records.len();
        let revision = publisher.publish(records);

        tracing::info!(revision, records = count, "Published balloon positions");
        (revision, count)
    }

    /// Issue one request per hour and wait for all of them to settle.
    /// Records come back in hour order regardless of completion order.
    pub async fn fetch_all(&self) -> Vec<PositionRecord> {
        let start = Instant::now();

        let requests = (0..self.hours).map(|hour| {
            let source = self.source.clone();
            async move { (hour, load_snapshot(source.as_ref(), hour).await) }
        });
        let results = join_all(requests).await;

        let mut records = Vec::new();
        let mut failed_hours = 0;
        for (hour, result) in results {
            match result {
                Ok(snapshot) => {
                    let (hour_records, skipped) = snapshot.into_records();
                    if skipped > 0 {
                        tracing::debug!(hour, skipped, "Skipped entries that are not numeric triples");
                    }
                    records.extend(hour_records);
                }
                Err(e) if e.is_not_found() => {
                    failed_hours += 1;
                    tracing::warn!("Hour {}: returned 404", hour);
                }
                Err(e) => {
                    failed_hours += 1;
                    tracing::warn!(error = %e, "Hour {}: corrupted", hour);
                }
            }
        }

        tracing::debug!(
            "Fetched {} records from {} of {} hours in {} ms",
            records.len(),
            self.hours as usize - failed_hours,
            self.hours,
            start.elapsed().as_millis()
        );

        records
    }
}

async fn load_snapshot(source: &dyn SnapshotSource, hour: u8) -> Result<HourlySnapshot, SnapshotError> {
    let payload = source.fetch_hour(hour).await?;
    HourlySnapshot::from_payload(hour, payload)
        .ok_or_else(|| SnapshotError::Malformed("payload is not an array".to_string()))
}
