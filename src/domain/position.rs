// Balloon position domain models
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the per-hour snapshot resource, e.g. `05.json`
pub fn snapshot_file_name(hour: u8) -> String {
    format!("{:02}.json", hour)
}

/// A normalized, hour-tagged balloon position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub hour: u8,
}

impl PositionRecord {
    pub fn new(lat: f64, lon: f64, altitude: f64, hour: u8) -> Self {
        Self {
            lat,
            lon,
            altitude,
            hour,
        }
    }

    /// Build a record from a raw `[lat, lon, altitude]` triple.
    /// Extra trailing elements are ignored.
    pub fn from_triple(entry: &Value, hour: u8) -> Option<Self> {
        let values = entry.as_array()?;
        if values.len() < 3 {
            return None;
        }

        let lat = values[0].as_f64()?;
        let lon = values[1].as_f64()?;
        let altitude = values[2].as_f64()?;
        Some(Self::new(lat, lon, altitude, hour))
    }
}

/// Raw entries of one hourly snapshot file.
#[derive(Debug, Clone)]
pub struct HourlySnapshot {
    pub hour: u8,
    pub entries: Vec<Value>,
}

impl HourlySnapshot {
    /// Accepts the payload only when it is a JSON array.
    pub fn from_payload(hour: u8, payload: Value) -> Option<Self> {
        match payload {
            Value::Array(entries) => Some(Self { hour, entries }),
            _ => None,
        }
    }

    /// Convert entries to records, returning the records and the number of
    /// entries that were not numeric triples.
    pub fn into_records(self) -> (Vec<PositionRecord>, usize) {
        let total = self.entries.len();
        let records: Vec<PositionRecord> = self
            .entries
            .iter()
            .filter_map(|entry| PositionRecord::from_triple(entry, self.hour))
            .collect();
        let skipped = total - records.len();
        (records, skipped)
    }
}

/// One point of the altitude chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeSample {
    pub hour: u8,
    pub altitude: f64,
}

impl From<&PositionRecord> for AltitudeSample {
    fn from(record: &PositionRecord) -> Self {
        Self {
            hour: record.hour,
            altitude: record.altitude,
        }
    }
}

/// Arithmetic mean of all altitudes, `None` for an empty collection
pub fn mean_altitude(records: &[PositionRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let sum: f64 = records.iter().map(|r| r.altitude).sum();
    Some(sum / records.len() as f64)
}
