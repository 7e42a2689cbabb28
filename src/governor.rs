use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;

use crate::complexity::{self, WorkloadDescriptor};
use crate::energy::{DEFAULT_BASELINE_POWER, EnergyAccountant, EnergySummary};
use crate::history::{MonitoringHistory, MonitoringRecord};
use crate::precision::{EnergyMetrics, PrecisionPolicy, Tier};
use crate::runtime::{ExecutionContext, PrecisionRuntime};
use crate::telemetry::{TelemetrySnapshot, TelemetrySource};
use crate::utils::errors::GovernorError;
use crate::utils::metrics::format_watts;

const DEFAULT_TELEMETRY_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of one optimization decision.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeReport {
    pub complexity_score: f64,
    pub tier: Tier,
    pub power_saved_percent: f64,
    pub memory_saved_percent: f64,
    pub speed_multiplier: f64,
    /// Energy handle for this decision; pass to `report_duration` after
    /// the workload completes.
    pub metrics: EnergyMetrics,
}

/// Aggregate over all decisions made by one governor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_optimizations: usize,
    pub average_complexity: f64,
    pub total_energy_saved: f64,
}

/// Current governor state for display.
#[derive(Debug, Clone, Serialize)]
pub struct GovernorStatus {
    pub current_tier: Tier,
    pub history_len: usize,
    pub total_energy_saved: f64,
    pub telemetry: Option<TelemetrySnapshot>,
}

/// Adaptive precision governor.
///
/// Orchestrates complexity estimation, tier selection, telemetry-aware
/// energy accounting and the monitoring history. The telemetry source
/// and precision runtime are injected at construction; there is no
/// global instance.
///
/// All decision paths are synchronous; `&mut self` on `optimize` and
/// `report_duration` gives the "select tier, update metrics, append
/// record" section exclusive access, so a governor shared across
/// threads behind a `Mutex` keeps records in timestamp order.
pub struct Governor<T: TelemetrySource, R: PrecisionRuntime> {
    telemetry: T,
    runtime: R,
    accountant: EnergyAccountant,
    history: MonitoringHistory,
    current_tier: Tier,
    total_energy_saved: f64,
    telemetry_timeout: Duration,
    /// Tokio runtime for async telemetry queries
    rt: tokio::runtime::Runtime,
}

impl<T: TelemetrySource, R: PrecisionRuntime> Governor<T, R> {
    pub fn new(telemetry: T, runtime: R) -> Result<Self, GovernorError> {
        Ok(Self {
            telemetry,
            runtime,
            accountant: EnergyAccountant::new(DEFAULT_BASELINE_POWER),
            history: MonitoringHistory::new(),
            current_tier: Tier::Fp32,
            total_energy_saved: 0.0,
            telemetry_timeout: DEFAULT_TELEMETRY_TIMEOUT,
            rt: tokio::runtime::Runtime::new()
                .map_err(|e| GovernorError::Other(format!("Failed to create Tokio runtime: {e}")))?,
        })
    }

    /// Override the assumed fp32 baseline power draw in watts.
    pub fn with_baseline_power(mut self, watts: f64) -> Self {
        self.accountant = EnergyAccountant::new(watts);
        self
    }

    /// Override the per-query telemetry timeout.
    pub fn with_telemetry_timeout(mut self, timeout: Duration) -> Self {
        self.telemetry_timeout = timeout;
        self
    }

    /// Check if the underlying telemetry source is available on the system
    pub fn telemetry_available() -> bool {
        T::is_available()
    }

    /// Bounded-latency telemetry poll. Failures and timeouts degrade to
    /// `None` instead of propagating; the governor never blocks on a
    /// stuck monitoring interface.
    fn poll_telemetry(&self) -> Option<TelemetrySnapshot> {
        let result = self.rt.block_on(async {
            tokio::time::timeout(self.telemetry_timeout, self.telemetry.get_snapshot()).await
        });
        match result {
            Ok(Ok(snapshot)) => Some(snapshot),
            Ok(Err(e)) => {
                debug!("Telemetry unavailable: {e}");
                None
            }
            Err(_) => {
                debug!("Telemetry query timed out after {:?}", self.telemetry_timeout);
                None
            }
        }
    }

    /// Entry point for per-workload optimization: estimate complexity,
    /// select a tier, merge telemetry and append a monitoring record.
    pub fn optimize(&mut self, descriptor: &WorkloadDescriptor) -> (Tier, OptimizeReport) {
        let score = complexity::estimate(descriptor);
        let (tier, metrics) = PrecisionPolicy::select(score);
        let snapshot = self.poll_telemetry();

        self.history.push(MonitoringRecord {
            timestamp: Utc::now().timestamp_millis(),
            complexity: score,
            tier,
            power_saved_percent: metrics.power_saved_percent,
            memory_saved_percent: metrics.memory_saved_percent,
            energy_saved: metrics.cumulative_energy_saved(),
            telemetry: snapshot,
        });
        self.current_tier = tier;

        info!(
            "Selected {tier} for complexity={score:.2}, estimated power savings: {:.1}%",
            metrics.power_saved_percent
        );

        let report = OptimizeReport {
            complexity_score: score,
            tier,
            power_saved_percent: metrics.power_saved_percent,
            memory_saved_percent: metrics.memory_saved_percent,
            speed_multiplier: metrics.relative_speed,
            metrics,
        };
        (tier, report)
    }

    fn resolve_execution_mode(&self, nominal: Tier) -> Tier {
        if self.runtime.supports(nominal) {
            return nominal;
        }
        let degraded = PrecisionPolicy::degrade(nominal);
        if degraded != nominal && self.runtime.supports(degraded) {
            warn!(
                "Requested {nominal} execution, but low-bit precision lacks runtime support; \
                 running at {degraded}. Reported savings remain nominal."
            );
            return degraded;
        }
        if nominal != Tier::Fp32 {
            warn!("Runtime does not support {nominal}; running at the fp32 baseline");
        }
        Tier::Fp32
    }

    /// Scoped execution-mode handle for the given tier (defaults to the
    /// last selected one). The prior mode is restored when the handle
    /// drops, on every exit path.
    pub fn execution_context(&mut self, tier: Option<Tier>) -> ExecutionContext<'_, R> {
        let nominal = tier.unwrap_or(self.current_tier);
        let mode = self.resolve_execution_mode(nominal);
        ExecutionContext::enter(&mut self.runtime, nominal, mode)
    }

    /// Report the observed wall-clock duration of a workload executed
    /// under the decision that produced `metrics`. Uses measured power
    /// from telemetry when available, the tier estimate otherwise.
    pub fn report_duration(&mut self, duration: f64, metrics: &mut EnergyMetrics) -> f64 {
        let measured = self.poll_telemetry().and_then(|s| s.power_draw);
        let saved = self.accountant.compute_saved(duration, measured, metrics);
        self.total_energy_saved += saved;
        info!(
            "Workload of {duration:.2}s under {}: {saved:.1}J saved",
            metrics.tier
        );
        saved
    }

    pub fn history(&self) -> &MonitoringHistory {
        &self.history
    }

    pub fn current_tier(&self) -> Tier {
        self.current_tier
    }

    pub fn baseline_power(&self) -> f64 {
        self.accountant.baseline_power()
    }

    /// Aggregate over all decisions: count, mean complexity and the
    /// joules accumulated through `report_duration`.
    pub fn history_summary(&self) -> HistorySummary {
        let records = self.history.records();
        let average_complexity = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.complexity).sum::<f64>() / records.len() as f64
        };
        HistorySummary {
            total_optimizations: records.len(),
            average_complexity,
            total_energy_saved: self.total_energy_saved,
        }
    }

    /// Savings aggregate over the recorded history.
    pub fn energy_summary(&self) -> EnergySummary {
        self.accountant.summarize(&self.history)
    }

    /// Current state and totals.
    pub fn status(&self) -> GovernorStatus {
        GovernorStatus {
            current_tier: self.current_tier,
            history_len: self.history.len(),
            total_energy_saved: self.total_energy_saved,
            telemetry: self.poll_telemetry(),
        }
    }

    /// Live GPU state formatted for display. Empty when the telemetry
    /// source is unreachable.
    pub fn formatted_metrics(&self) -> HashMap<String, String> {
        let mut out = HashMap::new();
        let Some(snap) = self.poll_telemetry() else {
            return out;
        };
        out.insert("utilization".into(), format!("{:.1}%", snap.utilization));
        out.insert(
            "memory_used".into(),
            format!("{:.0}MB / {:.0}MB", snap.memory_used, snap.memory_total),
        );
        out.insert(
            "memory_utilization".into(),
            format!("{:.1}%", snap.memory_percent()),
        );
        if let Some(power) = snap.power_draw {
            out.insert("power".into(), format_watts(power, 1));
        }
        if let Some(temp) = snap.temperature {
            out.insert("temperature".into(), format!("{temp:.1}C"));
        }
        if let Some(clock) = snap.clock_speed {
            out.insert("clock".into(), format!("{clock}MHz"));
        }
        out
    }

    /// Free cached runtime allocations. The monitoring history persists
    /// for the governor's lifetime.
    pub fn release_resources(&mut self) {
        self.runtime.release();
        info!("Runtime resources released");
    }

    /// Release resources and return to the fp32 baseline tier.
    /// Does not clear the monitoring history.
    pub fn reset(&mut self) {
        self.release_resources();
        self.current_tier = Tier::Fp32;
    }
}

/// Run a workload under governor control: optimize for the descriptor,
/// execute inside the selected execution context, and account the
/// observed duration. Returns the workload output and the joules saved.
///
/// This is the explicit-injection replacement for an "auto-optimize"
/// wrapper: the governor is a parameter, never module state.
pub fn run_governed<T, R, F, O>(
    governor: &mut Governor<T, R>,
    descriptor: &WorkloadDescriptor,
    workload: F,
) -> (O, f64)
where
    T: TelemetrySource,
    R: PrecisionRuntime,
    F: FnOnce() -> O,
{
    let (_tier, mut report) = governor.optimize(descriptor);
    let start = Instant::now();
    let output = {
        let _ctx = governor.execution_context(None);
        workload()
    };
    let saved = governor.report_duration(start.elapsed().as_secs_f64(), &mut report.metrics);
    (output, saved)
}
