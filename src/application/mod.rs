// Application layer - Use cases over the position store
pub mod analysis_client;
pub mod dashboard_service;
pub mod history_sampler;
pub mod insight_service;
pub mod position_store;
pub mod snapshot_fetcher;
pub mod snapshot_source;
pub mod streaming_service;
