use thiserror::Error;

#[derive(Error, Debug)]
pub enum GovernorError {
    #[error("Telemetry error: {0}")]
    TelemetryError(String),
    #[error("Runtime error: {0}")]
    RuntimeError(String),
    #[error("History error: {0}")]
    HistoryError(String),
    #[error("Other error: {0}")]
    Other(String),
}
