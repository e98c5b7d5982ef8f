// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::snapshot_fetcher::SnapshotFetcher;
use crate::application::streaming_service::StreamingDashboardService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub streaming_service: StreamingDashboardService,
    pub fetcher: Arc<SnapshotFetcher>,
}
