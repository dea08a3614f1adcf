use nearby_core::SearchError;
use thiserror::Error;

/// Errors returned by the Google Places client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response envelope carried a status other than `OK` or `ZERO_RESULTS`.
    #[error("Places API error {status}: {message}")]
    Api { status: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// An opening-hours period used a day outside `0..=6`.
    #[error("opening-hours day out of range: {0}")]
    InvalidDay(u8),

    #[error("GOOGLE_PLACES_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl From<PlacesError> for SearchError {
    fn from(err: PlacesError) -> Self {
        SearchError::Failed(err.to_string())
    }
}
