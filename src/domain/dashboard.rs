// Dashboard domain model
use super::insight::InsightText;
use super::position::{AltitudeSample, PositionRecord};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub revision: u64,
    pub fetched_at_ms: Option<i64>,
    pub position_count: usize,
    pub mean_altitude: Option<f64>,
    pub markers: Vec<PositionRecord>,
    pub altitude_history: Vec<AltitudeSample>,
    pub insight: InsightText,
}

impl Dashboard {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        revision: u64,
        fetched_at_ms: Option<i64>,
        position_count: usize,
        mean_altitude: Option<f64>,
        markers: Vec<PositionRecord>,
        altitude_history: Vec<AltitudeSample>,
        insight: InsightText,
    ) -> Self {
        Self {
            title,
            revision,
            fetched_at_ms,
            position_count,
            mean_altitude,
            markers,
            altitude_history,
            insight,
        }
    }
}

/// Messages of the progressive dashboard stream.
/// A `Skeleton` always comes first, then one update per changed node.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton {
        dashboard: Dashboard,
    },
    PositionsUpdate {
        revision: u64,
        fetched_at_ms: Option<i64>,
        position_count: usize,
        mean_altitude: Option<f64>,
        markers: Vec<PositionRecord>,
    },
    HistoryUpdate {
        altitude_history: Vec<AltitudeSample>,
    },
    InsightUpdate {
        revision: Option<u64>,
        insight: InsightText,
    },
}
