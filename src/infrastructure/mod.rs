// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod http_analysis_client;
pub mod http_response;
pub mod http_snapshot_source;
