// Streaming dashboard service - Skeleton first, then updates as each node changes
use crate::application::dashboard_service::{DashboardService, markers_of};
use crate::domain::dashboard::StreamMessage;
use crate::domain::position::mean_altitude;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

const STREAM_BUFFER: usize = 100;

#[derive(Clone)]
pub struct StreamingDashboardService {
    dashboard: DashboardService,
}

impl StreamingDashboardService {
    pub fn new(dashboard: DashboardService) -> Self {
        Self { dashboard }
    }

    /// Stream dashboard messages until the receiver is dropped.
    pub async fn stream_dashboard(&self) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        // Subscribe before taking the skeleton so no change falls in between
        let positions = self.dashboard.subscribe_positions();
        let history = self.dashboard.subscribe_history();
        let insight = self.dashboard.subscribe_insight();
        let marker_limit = self.dashboard.marker_limit();

        let skeleton = StreamMessage::Skeleton {
            dashboard: self.dashboard.dashboard(),
        };
        if tx.send(skeleton).await.is_err() {
            return rx;
        }

        let positions = WatchStream::from_changes(positions).map(move |set| {
            StreamMessage::PositionsUpdate {
                revision: set.revision,
                fetched_at_ms: set.fetched_at_ms,
                position_count: set.len(),
                mean_altitude: mean_altitude(&set.records),
                markers: markers_of(&set, marker_limit),
            }
        });
        let history = WatchStream::from_changes(history).map(|history| {
            StreamMessage::HistoryUpdate {
                altitude_history: history.samples.clone(),
            }
        });
        let insight = WatchStream::from_changes(insight).map(|state| {
            StreamMessage::InsightUpdate {
                revision: state.revision,
                insight: state.text,
            }
        });

        tokio::spawn(async move {
            let updates = positions.merge(history).merge(insight);
            tokio::pin!(updates);

            while let Some(msg) = updates.next().await {
                if tx.send(msg).await.is_err() {
                    tracing::debug!("Dashboard stream closed by client");
                    break;
                }
            }
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analysis_client::{AnalysisClient, AnalysisError};
    use crate::application::insight_service::InsightRequester;
    use crate::application::position_store::position_store;
    use crate::domain::insight::AnalysisResponse;
    use crate::domain::position::PositionRecord;
    use crate::infrastructure::config::settings_from_toml;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedClient;

    #[async_trait]
    impl AnalysisClient for FixedClient {
        async fn analyze(&self, _: &[PositionRecord]) -> Result<AnalysisResponse, AnalysisError> {
            Ok(AnalysisResponse {
                ai_summary: Some("Calm winds detected".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_skeleton_then_updates() {
        let (publisher, reader) = position_store();
        let insight = Arc::new(InsightRequester::new(Arc::new(FixedClient), "Loading".to_string()));
        let settings = settings_from_toml("").unwrap().dashboard;
        let service = StreamingDashboardService::new(DashboardService::start(settings, reader, insight));

        let mut rx = service.stream_dashboard().await;
        match rx.recv().await {
            Some(StreamMessage::Skeleton { dashboard }) => assert_eq!(dashboard.position_count, 0),
            other => panic!("expected skeleton, got {:?}", other),
        }

        publisher.publish(vec![PositionRecord::new(1.0, 2.0, 300.0, 4); 25]);

        let mut saw_positions = false;
        let mut saw_history = false;
        let mut saw_insight = false;
        while !(saw_positions && saw_history && saw_insight) {
            let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("stream stalled")
                .expect("stream ended");
            match msg {
                StreamMessage::PositionsUpdate { position_count, mean_altitude, .. } => {
                    assert_eq!(position_count, 25);
                    assert_eq!(mean_altitude, Some(300.0));
                    saw_positions = true;
                }
                StreamMessage::HistoryUpdate { altitude_history } => {
                    assert_eq!(altitude_history.len(), 3);
                    saw_history = true;
                }
                StreamMessage::InsightUpdate { insight, revision } => {
                    assert_eq!(insight.display(), "Calm winds detected");
                    assert_eq!(revision, Some(1));
                    saw_insight = true;
                }
                StreamMessage::Skeleton { .. } => panic!("skeleton sent twice"),
            }
        }
    }
}
