// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::insight_service::InsightRequester;
use crate::application::position_store::position_store;
use crate::application::snapshot_fetcher::SnapshotFetcher;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::http_analysis_client::HttpAnalysisClient;
use crate::infrastructure::http_snapshot_source::HttpSnapshotSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Create adapters (infrastructure layer)
    let source = Arc::new(HttpSnapshotSource::new(
        settings.source.base_url.clone(),
        settings.source.request_timeout(),
    )?);
    let analysis_client = Arc::new(HttpAnalysisClient::new(
        settings.analysis.url.clone(),
        settings.analysis.request_timeout(),
    )?);

    // Create services (application layer); only the fetcher can publish positions
    let (publisher, reader) = position_store();
    let fetcher = Arc::new(SnapshotFetcher::new(source, settings.source.hours, publisher));
    let insight = Arc::new(InsightRequester::new(
        analysis_client,
        settings.dashboard.placeholder.clone(),
    ));
    let refresh_interval = settings.dashboard.refresh_interval();
    let dashboard_service = DashboardService::start(settings.dashboard, reader, insight);
    let streaming_service = StreamingDashboardService::new(dashboard_service.clone());

    spawn_refresh_loop(fetcher.clone(), refresh_interval);

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        streaming_service,
        fetcher,
    });

    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = settings
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", settings.server.bind_addr))?;
    tracing::info!("Starting balloon-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

/// Fetch once at startup, then again every `interval` if one is configured
fn spawn_refresh_loop(fetcher: Arc<SnapshotFetcher>, interval: Option<std::time::Duration>) {
    tokio::spawn(async move {
        loop {
            let run = tokio::spawn({
                let fetcher = fetcher.clone();
                async move { fetcher.refresh().await }
            });
            if let Err(e) = run.await {
                tracing::error!("Error fetching balloon data: {}", e);
            }

            match interval {
                Some(period) => tokio::time::sleep(period).await,
                None => break,
            }
        }
    });
}
