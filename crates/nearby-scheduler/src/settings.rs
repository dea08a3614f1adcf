use std::time::Duration;

use nearby_core::provider::DEFAULT_RADIUS_METERS;
use nearby_core::{AppConfig, ConfigurationError, GatingPolicy, PlaceType, TestLocation};

use crate::ports::ArmRequest;

pub const DEFAULT_INTERVAL_SECS: u64 = 180;
pub const DEFAULT_DURATION_SECS: u64 = 10;

/// Everything `configure` accepts. `place_type` and `test_location` stay raw
/// strings until validation so a bad value can be reported by name.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    pub policy: GatingPolicy,
    pub radius_meters: u32,
    pub place_type: Option<String>,
    pub interval_secs: u64,
    pub duration_secs: u64,
    pub test_location: Option<String>,
    /// `None` waits on the provider indefinitely.
    pub search_timeout: Option<Duration>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            policy: GatingPolicy::default(),
            radius_meters: DEFAULT_RADIUS_METERS,
            place_type: None,
            interval_secs: DEFAULT_INTERVAL_SECS,
            duration_secs: DEFAULT_DURATION_SECS,
            test_location: None,
            search_timeout: None,
        }
    }
}

impl SchedulerSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            policy: GatingPolicy {
                minimum_location_change: config.minimum_location_change_meters,
                good_enough_accuracy: config.good_enough_accuracy,
                use_gps: config.use_gps,
                use_network: config.use_network,
            },
            radius_meters: config.radius_meters,
            place_type: config.place_type.clone(),
            interval_secs: config.default_interval_secs,
            duration_secs: config.default_duration_secs,
            test_location: config.test_location.clone(),
            search_timeout: config.search_timeout_secs.map(Duration::from_secs),
        }
    }

    pub(crate) fn validate(&self) -> Result<ActiveSettings, ConfigurationError> {
        self.policy.validate()?;
        if self.radius_meters == 0 {
            return Err(ConfigurationError::InvalidRadius);
        }
        if self.interval_secs == 0 {
            return Err(ConfigurationError::InvalidInterval);
        }
        let place_type = PlaceType::parse_optional(self.place_type.as_deref())?;
        let test_location = match self.test_location.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<TestLocation>()?),
        };

        Ok(ActiveSettings {
            policy: self.policy.clone(),
            radius_meters: self.radius_meters,
            place_type,
            interval_secs: self.interval_secs,
            duration_secs: self.duration_secs,
            test_location,
            search_timeout: self.search_timeout,
        })
    }
}

/// Validated settings the scheduler runs with.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ActiveSettings {
    pub policy: GatingPolicy,
    pub radius_meters: u32,
    pub place_type: Option<PlaceType>,
    pub interval_secs: u64,
    pub duration_secs: u64,
    pub test_location: Option<TestLocation>,
    pub search_timeout: Option<Duration>,
}

impl ActiveSettings {
    pub fn arm_request(&self, one_shot: bool) -> ArmRequest {
        ArmRequest {
            one_shot,
            interval_secs: self.interval_secs,
            duration_secs: self.duration_secs,
            use_gps: self.policy.use_gps,
            use_network: self.policy.use_network,
            good_enough_accuracy: self.policy.good_enough_accuracy,
        }
    }
}

impl Default for ActiveSettings {
    fn default() -> Self {
        Self {
            policy: GatingPolicy::default(),
            radius_meters: DEFAULT_RADIUS_METERS,
            place_type: None,
            interval_secs: DEFAULT_INTERVAL_SECS,
            duration_secs: DEFAULT_DURATION_SECS,
            test_location: None,
            search_timeout: None,
        }
    }
}
