use std::str::FromStr;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let raw = |var: &str, default: &str| -> (String, String) {
        (var.to_string(), or_default(var, default))
    };

    let minimum_location_change_meters: f64 =
        parse_value(raw("NEARBY_MIN_LOCATION_CHANGE_METERS", "0"))?;
    if !minimum_location_change_meters.is_finite() || minimum_location_change_meters < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NEARBY_MIN_LOCATION_CHANGE_METERS".to_string(),
            reason: "must be a non-negative number of meters".to_string(),
        });
    }

    let good_enough_accuracy: u8 = parse_value(raw("NEARBY_GOOD_ENOUGH_ACCURACY", "80"))?;
    if good_enough_accuracy > 100 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NEARBY_GOOD_ENOUGH_ACCURACY".to_string(),
            reason: "must be between 0 and 100".to_string(),
        });
    }

    let default_interval_secs = parse_value(raw("NEARBY_DEFAULT_INTERVAL_SECS", "180"))?;
    let default_duration_secs = parse_value(raw("NEARBY_DEFAULT_DURATION_SECS", "10"))?;
    let use_gps = parse_bool(raw("NEARBY_USE_GPS", "true"))?;
    let use_network = parse_bool(raw("NEARBY_USE_NETWORK", "true"))?;
    let radius_meters = parse_value(raw("NEARBY_RADIUS_METERS", "100"))?;

    let search_timeout_secs = match optional("NEARBY_SEARCH_TIMEOUT_SECS") {
        Some(value) => Some(parse_value((
            "NEARBY_SEARCH_TIMEOUT_SECS".to_string(),
            value,
        ))?),
        None => None,
    };

    let places_base_url = or_default("NEARBY_PLACES_BASE_URL", "https://maps.googleapis.com/");
    let http_timeout_secs = parse_value(raw("NEARBY_HTTP_TIMEOUT_SECS", "30"))?;
    let places_max_retries = parse_value(raw("NEARBY_PLACES_MAX_RETRIES", "0"))?;
    let places_retry_backoff_base_ms =
        parse_value(raw("NEARBY_PLACES_RETRY_BACKOFF_BASE_MS", "1000"))?;

    Ok(AppConfig {
        log_level: or_default("NEARBY_LOG_LEVEL", "info"),
        minimum_location_change_meters,
        good_enough_accuracy,
        default_interval_secs,
        default_duration_secs,
        use_gps,
        use_network,
        radius_meters,
        place_type: optional("NEARBY_PLACE_TYPE"),
        test_location: optional("NEARBY_TEST_LOCATION"),
        search_timeout_secs,
        google_places_api_key: optional("GOOGLE_PLACES_API_KEY"),
        places_base_url,
        http_timeout_secs,
        places_max_retries,
        places_retry_backoff_base_ms,
    })
}

fn parse_value<T>((var, raw): (String, String)) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var,
            reason: e.to_string(),
        })
}

fn parse_bool((var, raw): (String, String)) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var,
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
