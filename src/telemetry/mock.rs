use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::telemetry::{TelemetrySnapshot, TelemetrySource};

/// Synthetic telemetry adapter for tests and demos.
///
/// Reports a configurable base snapshot, optionally with uniform jitter
/// on utilization and power to imitate a live device.
#[derive(Debug, Clone)]
pub struct MockTelemetry {
    pub utilization: f64,
    pub memory_used: f64,
    pub memory_total: f64,
    pub power_draw: Option<f64>,
    pub temperature: Option<f64>,
    pub clock_speed: Option<u32>,
    jitter: f64,
}

impl MockTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed power reading, useful for measured-power accounting tests.
    pub fn with_power(mut self, watts: f64) -> Self {
        self.power_draw = Some(watts);
        self
    }

    /// No optional metrics at all, like a minimal driver.
    pub fn bare(mut self) -> Self {
        self.power_draw = None;
        self.temperature = None;
        self.clock_speed = None;
        self
    }

    /// Uniform jitter amplitude applied to utilization and power.
    pub fn with_jitter(mut self, amplitude: f64) -> Self {
        self.jitter = amplitude.max(0.0);
        self
    }

    fn jittered(&self, value: f64) -> f64 {
        if self.jitter > 0.0 {
            value + rand::thread_rng().gen_range(-self.jitter..=self.jitter)
        } else {
            value
        }
    }
}

impl Default for MockTelemetry {
    fn default() -> Self {
        Self {
            utilization: 75.0,
            memory_used: 8192.0,
            memory_total: 24576.0,
            power_draw: Some(250.0),
            temperature: Some(65.0),
            clock_speed: Some(2100),
            jitter: 0.0,
        }
    }
}

#[async_trait]
impl TelemetrySource for MockTelemetry {
    async fn get_snapshot(&self) -> Result<TelemetrySnapshot, String> {
        Ok(TelemetrySnapshot::new(
            Utc::now().timestamp_millis(),
            self.jittered(self.utilization),
            self.memory_used,
            self.memory_total,
            self.power_draw.map(|p| self.jittered(p)),
            self.temperature,
            self.clock_speed,
        ))
    }

    fn is_available() -> bool {
        true // Mock is always available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_snapshot_defaults() {
        let snap = MockTelemetry::new().get_snapshot().await.unwrap();
        assert_eq!(snap.utilization, 75.0);
        assert_eq!(snap.power_draw, Some(250.0));
        assert!(snap.memory_used <= snap.memory_total);
    }

    #[tokio::test]
    async fn test_bare_mock_has_no_optionals() {
        let snap = MockTelemetry::new().bare().get_snapshot().await.unwrap();
        assert_eq!(snap.power_draw, None);
        assert_eq!(snap.temperature, None);
        assert_eq!(snap.clock_speed, None);
    }

    #[tokio::test]
    async fn test_jitter_stays_in_domain() {
        let mock = MockTelemetry::new().with_jitter(500.0);
        for _ in 0..20 {
            let snap = mock.get_snapshot().await.unwrap();
            assert!((0.0..=100.0).contains(&snap.utilization));
        }
    }
}
