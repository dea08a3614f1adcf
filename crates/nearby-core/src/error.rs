use std::time::Duration;

use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// A scheduler setting that cannot be used.
///
/// Raised synchronously by configure/enable before anything is armed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error(
        "unknown type of place: {0}. See \
         https://developers.google.com/maps/documentation/places/web-service/supported_types \
         for a list of supported types."
    )]
    UnknownPlaceType(String),

    #[error("expecting the following format for location: (<latitude> <longitude>), got \"{0}\"")]
    MalformedTestLocation(String),

    #[error("minimum location change must be a non-negative number of meters, got {0}")]
    InvalidMinimumLocationChange(f64),

    #[error("good-enough accuracy must be between 0 and 100, got {0}")]
    InvalidAccuracy(u8),

    #[error("search radius must be a positive number of meters")]
    InvalidRadius,

    #[error("sampling interval must be at least one second")]
    InvalidInterval,

    #[error("search provider is not ready: {0}")]
    ProviderNotReady(String),
}

/// A failed nearby search, as surfaced to the result sink.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("{0}")]
    Failed(String),

    #[error("search timed out after {0:?}")]
    TimedOut(Duration),

    #[error("search task ended without a result: {0}")]
    Aborted(String),
}
