pub mod utils {
    pub mod errors;
    pub mod logger;
    pub mod metrics;
}

pub mod complexity;
pub mod energy;
pub mod governor;
pub mod history;
pub mod precision;
pub mod runtime;
pub mod telemetry;

pub use complexity::{ComplexityLevel, ComplexityScore, WorkloadDescriptor};
pub use energy::{EnergyAccountant, EnergySummary};
pub use governor::{Governor, GovernorStatus, HistorySummary, OptimizeReport, run_governed};
pub use history::{MonitoringHistory, MonitoringRecord};
pub use precision::{EnergyMetrics, PrecisionPolicy, Tier, TierCharacteristics};
pub use runtime::{ExecutionContext, NullRuntime, PrecisionRuntime, SoftwareRuntime};
pub use telemetry::{
    MockTelemetry, NvidiaSmiTelemetry, NullTelemetry, TelemetrySnapshot, TelemetrySource,
};
pub use utils::errors::GovernorError;
