// Shared position data store - single writer, many observers
use crate::domain::position::PositionRecord;
use std::sync::Arc;
use tokio::sync::watch;

/// One published position collection.
#[derive(Debug, Clone, Default)]
pub struct PositionSet {
    /// Zero until the first publish, then strictly increasing
    pub revision: u64,
    pub fetched_at_ms: Option<i64>,
    pub records: Arc<[PositionRecord]>,
}

impl PositionSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Create the store, returning the writer and a reader.
pub fn position_store() -> (PositionPublisher, PositionReader) {
    let (tx, rx) = watch::channel(Arc::new(PositionSet::default()));
    (PositionPublisher { tx }, PositionReader { rx })
}

/// Write handle. Owned by the snapshot fetcher only.
#[derive(Debug)]
pub struct PositionPublisher {
    tx: watch::Sender<Arc<PositionSet>>,
}

impl PositionPublisher {
    /// Replace the whole collection and notify observers.
    /// Returns the revision assigned to the new collection.
    pub fn publish(&self, records: Vec<PositionRecord>) -> u64 {
        let fetched_at_ms = chrono::Utc::now().timestamp_millis();
        let mut revision = 0;
        self.tx.send_modify(|current| {
            revision = current.revision + 1;
            *current = Arc::new(PositionSet {
                revision,
                fetched_at_ms: Some(fetched_at_ms),
                records: records.into(),
            });
        });
        revision
    }
}

/// Read handle for observers of the position collection.
#[derive(Debug, Clone)]
pub struct PositionReader {
    rx: watch::Receiver<Arc<PositionSet>>,
}

impl PositionReader {
    pub fn current(&self) -> Arc<PositionSet> {
        self.rx.borrow().clone()
    }

    /// A fresh receiver; its first `changed()` fires on the next publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PositionSet>> {
        let mut rx = self.rx.clone();
        rx.mark_unchanged();
        rx
    }
}
