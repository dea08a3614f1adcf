//! Movement gating for location samples.
//!
//! The gate only looks at how far a sample is from the last accepted one.
//! Accuracy filtering happens in the location source, which receives
//! `good_enough_accuracy` when it is armed.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::location::LocationSample;

pub const DEFAULT_GOOD_ENOUGH_ACCURACY: u8 = 80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingPolicy {
    /// Metres the device must move before another search is issued. `0` disables the check.
    pub minimum_location_change: f64,
    /// Forwarded to the location source; 0–100.
    pub good_enough_accuracy: u8,
    pub use_gps: bool,
    pub use_network: bool,
}

impl Default for GatingPolicy {
    fn default() -> Self {
        Self {
            minimum_location_change: 0.0,
            good_enough_accuracy: DEFAULT_GOOD_ENOUGH_ACCURACY,
            use_gps: true,
            use_network: true,
        }
    }
}

impl GatingPolicy {
    /// Decide whether `sample` is worth a search given the last accepted sample.
    ///
    /// Ties are accepted: a sample exactly `minimum_location_change` metres away passes.
    #[must_use]
    pub fn accept(&self, sample: &LocationSample, prior: Option<&LocationSample>) -> bool {
        let Some(prior) = prior else {
            return true;
        };
        if self.minimum_location_change <= 0.0 {
            return true;
        }

        let moved = prior.distance_to(sample);
        if moved >= self.minimum_location_change {
            true
        } else {
            tracing::debug!(
                moved_meters = moved,
                minimum_meters = self.minimum_location_change,
                "location change below threshold; ignoring sample"
            );
            false
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidMinimumLocationChange`] for a negative
    /// or non-finite threshold and [`ConfigurationError::InvalidAccuracy`] above 100.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.minimum_location_change.is_finite() || self.minimum_location_change < 0.0 {
            return Err(ConfigurationError::InvalidMinimumLocationChange(
                self.minimum_location_change,
            ));
        }
        if self.good_enough_accuracy > 100 {
            return Err(ConfigurationError::InvalidAccuracy(
                self.good_enough_accuracy,
            ));
        }
        Ok(())
    }
}
