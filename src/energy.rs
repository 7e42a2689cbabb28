use serde::{Deserialize, Serialize};

use crate::history::MonitoringHistory;
use crate::precision::EnergyMetrics;

/// Assumed fp32 power draw when no measurement is available, in watts.
pub const DEFAULT_BASELINE_POWER: f64 = 100.0;

/// Aggregate over a full monitoring history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergySummary {
    pub avg_power_saved_percent: f64,
    pub avg_memory_saved_percent: f64,
    pub total_joules_saved: f64,
}

/// Turns workload durations and power figures into joules saved.
#[derive(Debug, Clone)]
pub struct EnergyAccountant {
    baseline_power: f64,
}

impl EnergyAccountant {
    /// Baseline power must be a positive finite wattage; anything else
    /// falls back to [`DEFAULT_BASELINE_POWER`].
    pub fn new(baseline_power: f64) -> Self {
        let baseline_power = if baseline_power.is_finite() && baseline_power > 0.0 {
            baseline_power
        } else {
            DEFAULT_BASELINE_POWER
        };
        Self { baseline_power }
    }

    pub fn baseline_power(&self) -> f64 {
        self.baseline_power
    }

    /// Joules saved over a workload of `duration` seconds.
    ///
    /// Measured power is preferred when present; otherwise power is
    /// estimated from the tier's savings percentage. The result is never
    /// negative, a non-positive duration yields zero, and the amount is
    /// accumulated into the metrics.
    pub fn compute_saved(
        &self,
        duration: f64,
        measured_power: Option<f64>,
        metrics: &mut EnergyMetrics,
    ) -> f64 {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };

        let power_used = match measured_power.filter(|p| p.is_finite() && *p >= 0.0) {
            Some(measured) => measured,
            None => self.baseline_power * (1.0 - metrics.power_saved_percent / 100.0),
        };

        let baseline_joules = self.baseline_power * duration;
        let actual_joules = power_used * duration;
        let joules_saved = (baseline_joules - actual_joules).max(0.0);

        metrics.add_energy_saved(joules_saved);
        joules_saved
    }

    /// Arithmetic-mean summary over the full history.
    /// An empty history yields the all-zero summary.
    pub fn summarize(&self, history: &MonitoringHistory) -> EnergySummary {
        let records = history.records();
        if records.is_empty() {
            return EnergySummary::default();
        }
        let n = records.len() as f64;
        EnergySummary {
            avg_power_saved_percent: records.iter().map(|r| r.power_saved_percent).sum::<f64>() / n,
            avg_memory_saved_percent: records.iter().map(|r| r.memory_saved_percent).sum::<f64>()
                / n,
            total_joules_saved: records.iter().map(|r| r.energy_saved).sum(),
        }
    }
}

impl Default for EnergyAccountant {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_POWER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MonitoringRecord;
    use crate::precision::{PrecisionPolicy, Tier};

    #[test]
    fn test_estimated_path_fp16() {
        // 2s under fp16 at 100W baseline: 100*2 - 55*2 = 90J
        let accountant = EnergyAccountant::new(100.0);
        let (tier, mut metrics) = PrecisionPolicy::select(0.5);
        assert_eq!(tier, Tier::Fp16);
        let saved = accountant.compute_saved(2.0, None, &mut metrics);
        assert!((saved - 90.0).abs() < 1e-9);
        assert!((metrics.cumulative_energy_saved() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_measured_power_preferred() {
        let accountant = EnergyAccountant::new(100.0);
        let (_, mut metrics) = PrecisionPolicy::select(0.5);
        let saved = accountant.compute_saved(2.0, Some(40.0), &mut metrics);
        assert!((saved - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_saves_nothing() {
        let accountant = EnergyAccountant::default();
        let (_, mut metrics) = PrecisionPolicy::select(0.1);
        assert_eq!(accountant.compute_saved(0.0, None, &mut metrics), 0.0);
        assert_eq!(accountant.compute_saved(-5.0, None, &mut metrics), 0.0);
        assert_eq!(accountant.compute_saved(f64::NAN, None, &mut metrics), 0.0);
        assert_eq!(metrics.cumulative_energy_saved(), 0.0);
    }

    #[test]
    fn test_never_negative() {
        // Measured power above baseline means nothing was saved.
        let accountant = EnergyAccountant::new(100.0);
        let (_, mut metrics) = PrecisionPolicy::select(0.5);
        let saved = accountant.compute_saved(10.0, Some(300.0), &mut metrics);
        assert_eq!(saved, 0.0);
        assert_eq!(metrics.cumulative_energy_saved(), 0.0);
    }

    #[test]
    fn test_cumulative_across_runs() {
        let accountant = EnergyAccountant::new(100.0);
        let (_, mut metrics) = PrecisionPolicy::select(0.5);
        let mut previous = 0.0;
        for duration in [1.0, 0.0, 2.0, -1.0, 0.5] {
            accountant.compute_saved(duration, None, &mut metrics);
            assert!(metrics.cumulative_energy_saved() >= previous);
            previous = metrics.cumulative_energy_saved();
        }
    }

    #[test]
    fn test_invalid_baseline_falls_back() {
        assert_eq!(EnergyAccountant::new(-10.0).baseline_power(), DEFAULT_BASELINE_POWER);
        assert_eq!(EnergyAccountant::new(f64::NAN).baseline_power(), DEFAULT_BASELINE_POWER);
        assert_eq!(EnergyAccountant::new(0.0).baseline_power(), DEFAULT_BASELINE_POWER);
    }

    #[test]
    fn test_empty_history_summary_is_zero() {
        let accountant = EnergyAccountant::default();
        let summary = accountant.summarize(&MonitoringHistory::new());
        assert_eq!(summary, EnergySummary::default());
    }

    #[test]
    fn test_summary_means() {
        let accountant = EnergyAccountant::default();
        let mut history = MonitoringHistory::new();
        for (power, memory, energy) in [(45.0, 50.0, 90.0), (55.0, 60.0, 110.0)] {
            history.push(MonitoringRecord {
                timestamp: 0,
                complexity: 0.1,
                tier: Tier::Fp16,
                power_saved_percent: power,
                memory_saved_percent: memory,
                energy_saved: energy,
                telemetry: None,
            });
        }
        let summary = accountant.summarize(&history);
        assert!((summary.avg_power_saved_percent - 50.0).abs() < 1e-9);
        assert!((summary.avg_memory_saved_percent - 55.0).abs() < 1e-9);
        assert!((summary.total_joules_saved - 200.0).abs() < 1e-9);
    }
}
