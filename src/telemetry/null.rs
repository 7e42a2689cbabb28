use async_trait::async_trait;

use crate::telemetry::{TelemetrySnapshot, TelemetrySource};

/// No-op telemetry adapter for systems without GPU monitoring.
///
/// Every query reports "unavailable", which pushes the governor onto
/// the estimated-power accounting path.
#[derive(Debug, Default)]
pub struct NullTelemetry;

impl NullTelemetry {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TelemetrySource for NullTelemetry {
    async fn get_snapshot(&self) -> Result<TelemetrySnapshot, String> {
        Err("Telemetry unavailable".to_string())
    }

    fn is_available() -> bool {
        false
    }
}
