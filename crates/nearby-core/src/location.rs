//! Location samples and the fixed test-location override.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::geo;

/// Provider tag stamped on samples synthesized from a [`TestLocation`].
pub const TEST_LOCATION_PROVIDER: &str = "test";

/// One location fix reported by a location source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy as reported by the source. Not interpreted by the gate.
    #[serde(default)]
    pub accuracy: f32,
    /// Which sensor produced the fix, e.g. `"gps"` or `"network"`.
    #[serde(default)]
    pub provider: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl LocationSample {
    #[must_use]
    pub fn new(
        latitude: f64,
        longitude: f64,
        accuracy: f32,
        provider: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            provider: provider.into(),
            timestamp,
        }
    }

    /// Great-circle distance to `other` in metres.
    #[must_use]
    pub fn distance_to(&self, other: &LocationSample) -> f64 {
        geo::distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// A fixed `(latitude, longitude)` used instead of the live location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl TestLocation {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Synthesize a sample at this location, stamped with the current time.
    #[must_use]
    pub fn to_sample(&self) -> LocationSample {
        LocationSample::new(
            self.latitude,
            self.longitude,
            0.0,
            TEST_LOCATION_PROVIDER,
            Utc::now().timestamp_millis(),
        )
    }
}

impl FromStr for TestLocation {
    type Err = ConfigurationError;

    /// Accepts `"lat,lon"`, `"lat lon"` or `"(lat lon)"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigurationError::MalformedTestLocation(s.to_string());

        let inner = s
            .trim()
            .trim_start_matches(['(', '['])
            .trim_end_matches([')', ']']);
        let parts: Vec<&str> = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        let [lat, lon] = parts.as_slice() else {
            return Err(malformed());
        };
        let latitude = lat.parse::<f64>().map_err(|_| malformed())?;
        let longitude = lon.parse::<f64>().map_err(|_| malformed())?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(malformed());
        }

        Ok(Self::new(latitude, longitude))
    }
}
