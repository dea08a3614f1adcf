use nearby_core::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    /// Settings or provider readiness rejected before anything was armed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    /// The scheduler task has stopped.
    #[error("scheduler is no longer running")]
    Closed,
}
