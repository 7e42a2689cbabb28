use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use tokio::process::Command;

use crate::telemetry::{TelemetrySnapshot, TelemetrySource};

const QUERY_FIELDS: &str =
    "utilization.gpu,memory.used,memory.total,power.draw,temperature.gpu,clocks.gr";

/// Real telemetry adapter backed by the NVIDIA driver tooling.
///
/// Queries `nvidia-smi` in CSV mode; fields the driver cannot report
/// come back as `[N/A]` and map to `None` in the snapshot.
pub struct NvidiaSmiTelemetry {
    pub device_id: u32,
}

impl NvidiaSmiTelemetry {
    pub fn new(device_id: u32) -> Self {
        Self { device_id }
    }
}

impl Default for NvidiaSmiTelemetry {
    fn default() -> Self {
        Self { device_id: 0 } // Default to GPU 0
    }
}

fn parse_field(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok()
}

fn parse_snapshot(line: &str) -> Result<TelemetrySnapshot, String> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    if fields.len() != 6 {
        return Err(format!("Unexpected nvidia-smi output: {line:?}"));
    }
    let utilization = parse_field(fields[0]).ok_or("Missing utilization field")?;
    let memory_used = parse_field(fields[1]).ok_or("Missing memory.used field")?;
    let memory_total = parse_field(fields[2]).ok_or("Missing memory.total field")?;
    Ok(TelemetrySnapshot::new(
        Utc::now().timestamp_millis(),
        utilization,
        memory_used,
        memory_total,
        parse_field(fields[3]),
        parse_field(fields[4]),
        parse_field(fields[5]).map(|c| c as u32),
    ))
}

#[async_trait]
impl TelemetrySource for NvidiaSmiTelemetry {
    async fn get_snapshot(&self) -> Result<TelemetrySnapshot, String> {
        let output = Command::new("nvidia-smi")
            .arg(format!("--query-gpu={QUERY_FIELDS}"))
            .arg("--format=csv,noheader,nounits")
            .arg(format!("--id={}", self.device_id))
            .output()
            .await
            .map_err(|e| format!("Failed to run nvidia-smi: {e}"))?;

        if !output.status.success() {
            return Err(format!("nvidia-smi exited with {}", output.status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .next()
            .ok_or("nvidia-smi produced no output")?;
        debug!("nvidia-smi device {}: {}", self.device_id, line.trim());
        parse_snapshot(line)
    }

    fn is_available() -> bool {
        // Check if nvidia-smi command exists or NVIDIA drivers are loaded
        std::process::Command::new("nvidia-smi")
            .arg("--query-gpu=count")
            .arg("--format=csv,noheader,nounits")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let snap = parse_snapshot("87, 6144, 24576, 250.32, 71, 1980").unwrap();
        assert_eq!(snap.utilization, 87.0);
        assert_eq!(snap.memory_used, 6144.0);
        assert_eq!(snap.memory_total, 24576.0);
        assert_eq!(snap.power_draw, Some(250.32));
        assert_eq!(snap.temperature, Some(71.0));
        assert_eq!(snap.clock_speed, Some(1980));
    }

    #[test]
    fn test_parse_unsupported_fields() {
        let snap = parse_snapshot("12, 512, 8192, [N/A], [N/A], [N/A]").unwrap();
        assert_eq!(snap.power_draw, None);
        assert_eq!(snap.temperature, None);
        assert_eq!(snap.clock_speed, None);
    }

    #[test]
    fn test_parse_malformed_line() {
        assert!(parse_snapshot("garbage").is_err());
        assert!(parse_snapshot("1, 2, 3, 4, 5, 6, 7").is_err());
        assert!(parse_snapshot("[N/A], 1, 2, 3, 4, 5").is_err());
    }
}
