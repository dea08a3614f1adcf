//! The search capability the scheduler calls once a sample passes the gate.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::location::LocationSample;
use crate::place_type::PlaceType;
use crate::places::RawSearchResponse;

pub const DEFAULT_RADIUS_METERS: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub place_type: Option<PlaceType>,
}

impl SearchRequest {
    #[must_use]
    pub fn at(sample: &LocationSample, radius_meters: u32, place_type: Option<PlaceType>) -> Self {
        Self {
            latitude: sample.latitude,
            longitude: sample.longitude,
            radius_meters,
            place_type,
        }
    }
}

/// A nearby-places backend.
///
/// Implementations own their network resources; the scheduler only awaits
/// [`search`](SearchProvider::search) on a task of its own.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one nearby search. Only the first page of results is returned.
    async fn search(&self, request: &SearchRequest) -> Result<RawSearchResponse, SearchError>;

    /// Check that the provider can be called at all (credentials present and so on).
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the provider is not usable.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
