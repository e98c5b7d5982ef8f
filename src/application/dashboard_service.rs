// Dashboard service - Derives the chart series and insight from the position store
use crate::application::history_sampler::sample_altitude_history;
use crate::application::insight_service::{InsightRequester, InsightState};
use crate::application::position_store::{PositionReader, PositionSet};
use crate::domain::dashboard::Dashboard;
use crate::domain::position::{AltitudeSample, PositionRecord, mean_altitude};
use crate::infrastructure::config::DashboardSettings;
use std::sync::Arc;
use tokio::sync::watch;

/// Altitude series tagged with the position revision it was sampled from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledHistory {
    pub revision: u64,
    pub samples: Vec<AltitudeSample>,
}

impl SampledHistory {
    pub fn sample(positions: &PositionSet, stride: usize) -> Self {
        Self {
            revision: positions.revision,
            samples: sample_altitude_history(&positions.records, stride),
        }
    }
}

pub type AltitudeHistory = Arc<SampledHistory>;

#[derive(Clone)]
pub struct DashboardService {
    settings: DashboardSettings,
    positions: PositionReader,
    history: watch::Receiver<AltitudeHistory>,
    insight: Arc<InsightRequester>,
}

impl DashboardService {
    /// Start both derived nodes. Neither waits on the other.
    pub fn start(
        settings: DashboardSettings,
        positions: PositionReader,
        insight: Arc<InsightRequester>,
    ) -> Self {
        let history = spawn_history_sampler(&positions, settings.sample_stride);
        insight.clone().spawn(positions.subscribe());

        Self {
            settings,
            positions,
            history,
            insight,
        }
    }

    /// Records shown on the map, capped at `marker_limit`
    pub fn markers(&self) -> Vec<PositionRecord> {
        markers_of(&self.positions.current(), self.settings.marker_limit)
    }

    pub fn altitude_history(&self) -> AltitudeHistory {
        self.history_for(&self.positions.current())
    }

    /// The sampler's latest output if it matches `positions`, otherwise a fresh sample.
    /// The sampler task may still be catching up with a publish.
    pub fn history_for(&self, positions: &PositionSet) -> AltitudeHistory {
        let sampled = self.history.borrow().clone();
        if sampled.revision == positions.revision {
            return sampled;
        }
        Arc::new(SampledHistory::sample(positions, self.settings.sample_stride))
    }

    pub fn insight(&self) -> InsightState {
        self.insight.current()
    }

    pub fn dashboard(&self) -> Dashboard {
        let positions = self.positions.current();
        let history = self.history_for(&positions);
        self.build_dashboard(&positions, &history.samples, &self.insight())
    }

    pub fn build_dashboard(
        &self,
        positions: &PositionSet,
        history: &[AltitudeSample],
        insight: &InsightState,
    ) -> Dashboard {
        Dashboard::new(
            self.settings.title.clone(),
            positions.revision,
            positions.fetched_at_ms,
            positions.len(),
            mean_altitude(&positions.records),
            markers_of(positions, self.settings.marker_limit),
            history.to_vec(),
            insight.text.clone(),
        )
    }

    pub fn subscribe_positions(&self) -> watch::Receiver<Arc<PositionSet>> {
        self.positions.subscribe()
    }

    pub fn subscribe_history(&self) -> watch::Receiver<AltitudeHistory> {
        let mut rx = self.history.clone();
        rx.mark_unchanged();
        rx
    }

    pub fn subscribe_insight(&self) -> watch::Receiver<InsightState> {
        self.insight.subscribe()
    }

    pub fn marker_limit(&self) -> usize {
        self.settings.marker_limit
    }
}

pub fn markers_of(positions: &PositionSet, limit: usize) -> Vec<PositionRecord> {
    positions.records.iter().take(limit).copied().collect()
}

/// Recompute the altitude series on every publish, replacing the previous one.
fn spawn_history_sampler(positions: &PositionReader, stride: usize) -> watch::Receiver<AltitudeHistory> {
    let mut updates = positions.subscribe();
    let initial = SampledHistory::sample(&updates.borrow_and_update(), stride);
    let (tx, rx) = watch::channel(Arc::new(initial));

    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let set = updates.borrow_and_update().clone();
            let history = SampledHistory::sample(&set, stride);
            tracing::debug!(
                revision = set.revision,
                samples = history.samples.len(),
                "Resampled altitude history"
            );
            tx.send_replace(Arc::new(history));
        }
    });

    rx
}
