//! Core types for the nearby-places scheduler: geodesic distance, location
//! samples, movement gating, the place-type vocabulary, result mapping and
//! environment configuration.

pub mod app_config;
pub mod config;
pub mod error;
pub mod gating;
pub mod geo;
pub mod location;
pub mod place_type;
pub mod places;
pub mod provider;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ConfigurationError, SearchError};
pub use gating::GatingPolicy;
pub use location::{LocationSample, TestLocation};
pub use place_type::{PlaceType, PLACE_TYPES};
pub use places::{
    map_place, map_response, OpeningPeriod, PlaceRecord, RawDayTime, RawOpeningHours, RawPeriod,
    RawPlace, RawSearchResponse,
};
pub use provider::{SearchProvider, SearchRequest};
