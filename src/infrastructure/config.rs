use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

use crate::application::history_sampler::DEFAULT_STRIDE;
use crate::application::snapshot_fetcher::DEFAULT_HOURS;
use crate::domain::insight::DEFAULT_PLACEHOLDER;

const CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "BALLOON";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub source: SourceSettings,
    pub analysis: AnalysisSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub base_url: String,
    pub hours: u8,
    /// Unset means the transport never gives up on a slow hour
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisSettings {
    pub url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub title: String,
    pub sample_stride: usize,
    pub marker_limit: usize,
    pub placeholder: String,
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
}

impl SourceSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl AnalysisSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl DashboardSettings {
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn builder_with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("source.base_url", "https://a.windbornesystems.com")?
        .set_default("source.hours", DEFAULT_HOURS as i64)?
        .set_default("analysis.url", "http://127.0.0.1:5000/analyze")?
        .set_default("dashboard.title", "Live Balloon Flight & Weather Dashboard")?
        .set_default("dashboard.sample_stride", DEFAULT_STRIDE as i64)?
        .set_default("dashboard.marker_limit", 500_i64)?
        .set_default("dashboard.placeholder", DEFAULT_PLACEHOLDER)
}

/// Defaults, then `config/dashboard.{toml,...}` if present, then `BALLOON__*` variables
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .context("Failed to build dashboard configuration")?;

    settings
        .try_deserialize()
        .context("Invalid dashboard configuration")
}

/// Defaults overlaid with an inline TOML document
#[cfg(test)]
pub fn settings_from_toml(contents: &str) -> anyhow::Result<Settings> {
    let settings = builder_with_defaults()?
        .add_source(config::File::from_str(contents, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = settings_from_toml("").unwrap();

        assert_eq!(settings.source.hours, 24);
        assert_eq!(settings.source.request_timeout(), None);
        assert_eq!(settings.analysis.url, "http://127.0.0.1:5000/analyze");
        assert_eq!(settings.dashboard.sample_stride, 10);
        assert_eq!(settings.dashboard.marker_limit, 500);
        assert_eq!(settings.dashboard.placeholder, "Loading AI insights...");
        assert_eq!(settings.dashboard.refresh_interval(), None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let settings = settings_from_toml(
            r#"
            [source]
            base_url = "http://localhost:9000"
            request_timeout_secs = 15

            [dashboard]
            marker_limit = 50
            refresh_interval_secs = 600
            "#,
        )
        .unwrap();

        assert_eq!(settings.source.base_url, "http://localhost:9000");
        assert_eq!(settings.source.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(settings.dashboard.marker_limit, 50);
        assert_eq!(settings.dashboard.refresh_interval(), Some(Duration::from_secs(600)));
        assert_eq!(settings.server.bind_addr, "0.0.0.0:8080");
    }
}
