// Insight requester - Forwards each new position collection to the analysis endpoint
use crate::application::analysis_client::AnalysisClient;
use crate::application::position_store::PositionSet;
use crate::domain::insight::InsightText;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Displayed insight plus the position revision it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightState {
    pub text: InsightText,
    /// `None` while the placeholder is shown
    pub revision: Option<u64>,
}

pub struct InsightRequester {
    client: Arc<dyn AnalysisClient>,
    board: watch::Sender<InsightState>,
}

impl InsightRequester {
    pub fn new(client: Arc<dyn AnalysisClient>, placeholder: String) -> Self {
        let (board, _) = watch::channel(InsightState {
            text: InsightText::Placeholder(placeholder),
            revision: None,
        });
        Self { client, board }
    }

    pub fn current(&self) -> InsightState {
        self.board.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<InsightState> {
        self.board.subscribe()
    }

    /// Analyze one collection. Empty collections are never sent.
    /// Returns whether the displayed text was replaced.
    pub async fn request(&self, positions: &PositionSet) -> bool {
        if positions.is_empty() {
            return false;
        }

        match self.client.analyze(&positions.records).await {
            Ok(response) => {
                tracing::debug!(revision = positions.revision, "Received analysis response");
                self.apply(positions.revision, response.into_insight())
            }
            Err(e) => {
                tracing::error!(revision = positions.revision, "Error fetching AI insights: {}", e);
                false
            }
        }
    }

    /// Replace the displayed text unless a newer revision is already shown.
    pub fn apply(&self, revision: u64, text: InsightText) -> bool {
        self.board.send_if_modified(|state| {
            if state.revision.is_some_and(|shown| shown >= revision) {
                tracing::debug!(revision, "Discarding superseded analysis response");
                return false;
            }
            state.text = text;
            state.revision = Some(revision);
            true
        })
    }

    /// Observe the position collection until its publisher goes away.
    /// A new collection aborts the request still running for the previous one.
    pub fn spawn(
        self: Arc<Self>,
        mut positions: watch::Receiver<Arc<PositionSet>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut in_flight: Option<JoinHandle<()>> = None;

            while positions.changed().await.is_ok() {
                let set = positions.borrow_and_update().clone();
                if set.is_empty() {
                    continue;
                }

                if let Some(previous) = in_flight.take() {
                    if !previous.is_finished() {
                        tracing::debug!(revision = set.revision, "Superseding in-flight analysis request");
                    }
                    previous.abort();
                }

                let requester = self.clone();
                in_flight = Some(tokio::spawn(async move {
                    requester.request(&set).await;
                }));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analysis_client::AnalysisError;
    use crate::application::position_store::position_store;
    use crate::domain::insight::{AnalysisResponse, DEFAULT_PLACEHOLDER};
    use crate::domain::position::PositionRecord;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Reply {
        Summary(&'static str),
        Status(u16),
        Hang,
    }

    /// Replies are keyed by the size of the submitted collection.
    struct FakeClient {
        replies: HashMap<usize, Reply>,
        calls: AtomicUsize,
    }

    impl FakeClient {
        fn new(replies: Vec<(usize, Reply)>) -> Arc<Self> {
            Arc::new(Self {
                replies: replies.into_iter().collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AnalysisClient for FakeClient {
        async fn analyze(
            &self,
            positions: &[PositionRecord],
        ) -> Result<AnalysisResponse, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.replies.get(&positions.len()) {
                Some(Reply::Summary(text)) => Ok(AnalysisResponse {
                    ai_summary: Some(text.to_string()),
                }),
                Some(Reply::Status(code)) => Err(AnalysisError::Status(*code)),
                Some(Reply::Hang) => std::future::pending().await,
                None => Err(AnalysisError::Decode("unexpected request".to_string())),
            }
        }
    }

    fn positions(revision: u64, count: usize) -> PositionSet {
        let records: Vec<PositionRecord> = (0..count)
            .map(|i| PositionRecord::new(1.0, 2.0, i as f64, 0))
            .collect();
        PositionSet {
            revision,
            fetched_at_ms: None,
            records: records.into(),
        }
    }

    fn requester(client: Arc<FakeClient>) -> Arc<InsightRequester> {
        Arc::new(InsightRequester::new(client, DEFAULT_PLACEHOLDER.to_string()))
    }

    #[tokio::test]
    async fn test_successful_response_replaces_text() {
        let requester = requester(FakeClient::new(vec![(3, Reply::Summary("Calm winds detected"))]));

        assert!(requester.request(&positions(1, 3)).await);
        assert_eq!(requester.current().text.display(), "Calm winds detected");
        assert_eq!(requester.current().revision, Some(1));
    }

    #[tokio::test]
    async fn test_server_error_leaves_text_unchanged() {
        let requester = requester(FakeClient::new(vec![
            (2, Reply::Summary("Strong jet stream")),
            (4, Reply::Status(500)),
        ]));

        assert!(!requester.request(&positions(1, 4)).await);
        assert_eq!(
            requester.current().text,
            InsightText::Placeholder(DEFAULT_PLACEHOLDER.to_string())
        );

        assert!(requester.request(&positions(2, 2)).await);
        assert!(!requester.request(&positions(3, 4)).await);
        assert_eq!(requester.current().text.display(), "Strong jet stream");
    }

    #[tokio::test]
    async fn test_empty_collection_is_not_sent() {
        let client = FakeClient::new(vec![]);
        let requester = requester(client.clone());

        assert!(!requester.request(&positions(1, 0)).await);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert_eq!(requester.current().text.display(), DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let requester = requester(FakeClient::new(vec![]));

        assert!(requester.apply(2, InsightText::Summary("newer".into())));
        assert!(!requester.apply(1, InsightText::Summary("older".into())));
        assert_eq!(requester.current().text.display(), "newer");
    }

    #[tokio::test]
    async fn test_observer_skips_empty_publish() {
        let client = FakeClient::new(vec![]);
        let requester = requester(client.clone());
        let (publisher, reader) = position_store();
        requester.clone().spawn(reader.subscribe());

        publisher.publish(Vec::new());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert_eq!(requester.current().revision, None);
    }

    #[tokio::test]
    async fn test_newer_collection_supersedes_in_flight_request() {
        let client = FakeClient::new(vec![(1, Reply::Hang), (2, Reply::Summary("second"))]);
        let requester = requester(client.clone());
        let (publisher, reader) = position_store();
        let mut board = requester.subscribe();
        requester.clone().spawn(reader.subscribe());

        publisher.publish(vec![PositionRecord::new(0.0, 0.0, 1.0, 0)]);
        tokio::time::sleep(Duration::from_millis(20)).await;
        publisher.publish(vec![
            PositionRecord::new(0.0, 0.0, 1.0, 0),
            PositionRecord::new(0.0, 0.0, 2.0, 1),
        ]);

        tokio::time::timeout(Duration::from_secs(2), board.changed())
            .await
            .expect("insight was not updated")
            .unwrap();

        let state = requester.current();
        assert_eq!(state.text.display(), "second");
        assert_eq!(state.revision, Some(2));
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }
}
