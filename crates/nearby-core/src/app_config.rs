#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub minimum_location_change_meters: f64,
    pub good_enough_accuracy: u8,
    pub default_interval_secs: u64,
    pub default_duration_secs: u64,
    pub use_gps: bool,
    pub use_network: bool,
    pub radius_meters: u32,
    /// Raw value; validated against the place-type vocabulary at configure time.
    pub place_type: Option<String>,
    /// Raw value; parsed at configure time.
    pub test_location: Option<String>,
    pub search_timeout_secs: Option<u64>,
    pub google_places_api_key: Option<String>,
    pub places_base_url: String,
    pub http_timeout_secs: u64,
    pub places_max_retries: u32,
    pub places_retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "minimum_location_change_meters",
                &self.minimum_location_change_meters,
            )
            .field("good_enough_accuracy", &self.good_enough_accuracy)
            .field("default_interval_secs", &self.default_interval_secs)
            .field("default_duration_secs", &self.default_duration_secs)
            .field("use_gps", &self.use_gps)
            .field("use_network", &self.use_network)
            .field("radius_meters", &self.radius_meters)
            .field("place_type", &self.place_type)
            .field("test_location", &self.test_location)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field(
                "google_places_api_key",
                &self.google_places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_base_url", &self.places_base_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("places_max_retries", &self.places_max_retries)
            .field(
                "places_retry_backoff_base_ms",
                &self.places_retry_backoff_base_ms,
            )
            .finish()
    }
}
