use itertools::multiunzip;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::precision::Tier;
use crate::telemetry::TelemetrySnapshot;
use crate::utils::errors::GovernorError;

/// One precision decision, recorded at selection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringRecord {
    /// Milliseconds since UNIX epoch
    pub timestamp: i64,
    pub complexity: f64,
    pub tier: Tier,
    pub power_saved_percent: f64,
    pub memory_saved_percent: f64,
    /// Cumulative joules at decision time
    pub energy_saved: f64,
    /// GPU state at decision time, when a telemetry source was reachable
    pub telemetry: Option<TelemetrySnapshot>,
}

/// Append-only decision log owned by a single governor.
/// Insertion order is chronological; records are never reordered or
/// removed within a session.
#[derive(Debug, Default)]
pub struct MonitoringHistory {
    records: Vec<MonitoringRecord>,
}

impl MonitoringHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: MonitoringRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MonitoringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&MonitoringRecord> {
        self.records.last()
    }

    /// Export the history for an external CSV/log collaborator.
    /// Columns: timestamp | complexity | tier | power_saved_percent |
    /// memory_saved_percent | energy_saved
    pub fn to_dataframe(&self) -> Result<DataFrame, GovernorError> {
        let (timestamps, complexities, tiers, power, memory, energy): (
            Vec<i64>,
            Vec<f64>,
            Vec<String>,
            Vec<f64>,
            Vec<f64>,
            Vec<f64>,
        ) = multiunzip(self.records.iter().map(|r| {
            (
                r.timestamp,
                r.complexity,
                r.tier.to_string(),
                r.power_saved_percent,
                r.memory_saved_percent,
                r.energy_saved,
            )
        }));

        df![
            "timestamp" => timestamps,
            "complexity" => complexities,
            "tier" => tiers,
            "power_saved_percent" => power,
            "memory_saved_percent" => memory,
            "energy_saved" => energy,
        ]
        .map_err(|e| GovernorError::HistoryError(format!("Failed to create DataFrame: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: i64, complexity: f64, tier: Tier) -> MonitoringRecord {
        MonitoringRecord {
            timestamp: ts,
            complexity,
            tier,
            power_saved_percent: 45.0,
            memory_saved_percent: 50.0,
            energy_saved: 0.0,
            telemetry: None,
        }
    }

    #[test]
    fn test_history_preserves_insertion_order() {
        let mut history = MonitoringHistory::new();
        history.push(record(1, 0.1, Tier::Fp8));
        history.push(record(2, 0.5, Tier::Fp16));
        history.push(record(3, 0.9, Tier::Fp32));

        let timestamps: Vec<i64> = history.records().iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![1, 2, 3]);
        assert_eq!(history.last().unwrap().tier, Tier::Fp32);
    }

    #[test]
    fn test_empty_history_dataframe() {
        let history = MonitoringHistory::new();
        let df = history.to_dataframe().unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 6);
    }

    #[test]
    fn test_dataframe_columns() {
        let mut history = MonitoringHistory::new();
        history.push(record(10, 0.3, Tier::Fp16));
        let df = history.to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        let tiers = df.column("tier").unwrap().str().unwrap();
        assert_eq!(tiers.get(0), Some("fp16"));
        let complexity = df.column("complexity").unwrap().f64().unwrap();
        assert_eq!(complexity.get(0), Some(0.3));
    }
}
