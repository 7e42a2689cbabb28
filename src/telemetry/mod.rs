pub mod mock;
pub mod nvml;
pub mod null;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use mock::MockTelemetry;
pub use nvml::NvidiaSmiTelemetry;
pub use null::NullTelemetry;

/// Point-in-time reading of GPU operating state.
///
/// Optional fields are `None` when the source does not support that
/// metric; a missing reading is never reported as a sentinel zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Milliseconds since UNIX epoch
    pub timestamp: i64,
    /// GPU utilization in percent, 0-100
    pub utilization: f64,
    /// Used device memory in MB
    pub memory_used: f64,
    /// Total device memory in MB
    pub memory_total: f64,
    /// Instantaneous power draw in watts
    pub power_draw: Option<f64>,
    /// Device temperature in Celsius
    pub temperature: Option<f64>,
    /// Graphics clock in MHz
    pub clock_speed: Option<u32>,
}

impl TelemetrySnapshot {
    /// Build a snapshot with all value-domain invariants enforced:
    /// utilization clamped to [0,100], memory non-negative with
    /// `used <= total`, non-finite optionals dropped.
    pub fn new(
        timestamp: i64,
        utilization: f64,
        memory_used: f64,
        memory_total: f64,
        power_draw: Option<f64>,
        temperature: Option<f64>,
        clock_speed: Option<u32>,
    ) -> Self {
        let utilization = if utilization.is_finite() {
            utilization.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let memory_total = if memory_total.is_finite() {
            memory_total.max(0.0)
        } else {
            0.0
        };
        let memory_used = if memory_used.is_finite() {
            memory_used.clamp(0.0, memory_total)
        } else {
            0.0
        };
        Self {
            timestamp,
            utilization,
            memory_used,
            memory_total,
            power_draw: power_draw.filter(|p| p.is_finite() && *p >= 0.0),
            temperature: temperature.filter(|t| t.is_finite()),
            clock_speed,
        }
    }

    /// Memory utilization in percent.
    pub fn memory_percent(&self) -> f64 {
        if self.memory_total <= 0.0 {
            return 0.0;
        }
        self.memory_used / self.memory_total * 100.0
    }
}

/// Capability contract for instantaneous GPU state.
///
/// The governor works with this collaborator entirely absent; a failed
/// query degrades energy accounting to the estimated-power path.
#[async_trait]
pub trait TelemetrySource: Send + Sync + 'static {
    /// Query the current GPU state. Adapters keep this bounded-latency;
    /// the governor additionally applies its own timeout.
    async fn get_snapshot(&self) -> Result<TelemetrySnapshot, String>;

    /// Check if this telemetry source is available on the system
    fn is_available() -> bool
    where
        Self: Sized,
    {
        unimplemented!()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_clamps_utilization() {
        let snap = TelemetrySnapshot::new(0, 150.0, 100.0, 1000.0, None, None, None);
        assert_eq!(snap.utilization, 100.0);
        let snap = TelemetrySnapshot::new(0, -3.0, 100.0, 1000.0, None, None, None);
        assert_eq!(snap.utilization, 0.0);
    }

    #[test]
    fn test_snapshot_memory_invariant() {
        let snap = TelemetrySnapshot::new(0, 50.0, 2000.0, 1000.0, None, None, None);
        assert!(snap.memory_used <= snap.memory_total);
        let snap = TelemetrySnapshot::new(0, 50.0, -5.0, 1000.0, None, None, None);
        assert_eq!(snap.memory_used, 0.0);
    }

    #[test]
    fn test_snapshot_drops_bogus_power() {
        let snap = TelemetrySnapshot::new(0, 50.0, 0.0, 0.0, Some(f64::NAN), None, None);
        assert_eq!(snap.power_draw, None);
        let snap = TelemetrySnapshot::new(0, 50.0, 0.0, 0.0, Some(-10.0), None, None);
        assert_eq!(snap.power_draw, None);
    }

    #[test]
    fn test_memory_percent() {
        let snap = TelemetrySnapshot::new(0, 0.0, 4096.0, 8192.0, None, None, None);
        assert_eq!(snap.memory_percent(), 50.0);
        let empty = TelemetrySnapshot::new(0, 0.0, 0.0, 0.0, None, None, None);
        assert_eq!(empty.memory_percent(), 0.0);
    }
}
