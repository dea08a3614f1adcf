//! HTTP client for the Google Places Nearby Search endpoint.
//!
//! Wraps `reqwest` with envelope status checking, API key handling and
//! conversion into [`RawSearchResponse`]. Only the first page of results is
//! fetched; a `next_page_token` is passed through untouched.

use std::time::Duration;

use async_trait::async_trait;
use nearby_core::{AppConfig, RawSearchResponse, SearchError, SearchProvider, SearchRequest};
use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::normalize::to_raw_response;
use crate::retry::retry_with_backoff;
use crate::types::NearbySearchResponse;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const NEARBY_SEARCH_PATH: &str = "maps/api/place/nearbysearch/json";

/// Client for Google Places Nearby Search.
///
/// Use [`GooglePlacesClient::new`] for production or
/// [`GooglePlacesClient::with_base_url`] to point at a mock server in tests.
pub struct GooglePlacesClient {
    client: Client,
    api_key: Option<String>,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GooglePlacesClient {
    /// Creates a client pointed at the production Google API.
    ///
    /// A missing or blank `api_key` is allowed here; it surfaces through
    /// [`SearchProvider::validate`] and as [`PlacesError::MissingApiKey`] on search.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<&str>, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("nearby/0.1")
            .build()?;

        // Exactly one trailing slash so `join` appends rather than replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(NEARBY_SEARCH_PATH))
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_owned),
            endpoint,
            max_retries: 0,
            backoff_base_ms: 1_000,
        })
    }

    /// Builds a client from the `NEARBY_PLACES_*` / `GOOGLE_PLACES_API_KEY` settings.
    ///
    /// # Errors
    ///
    /// See [`GooglePlacesClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, PlacesError> {
        Ok(Self::with_base_url(
            config.google_places_api_key.as_deref(),
            config.http_timeout_secs,
            &config.places_base_url,
        )?
        .with_retry(
            config.places_max_retries,
            config.places_retry_backoff_base_ms,
        ))
    }

    /// Retry transient failures up to `max_retries` extra times.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Runs one Nearby Search around the request's coordinates.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::MissingApiKey`] if no API key was configured.
    /// - [`PlacesError::Api`] if the envelope status is not `OK`/`ZERO_RESULTS`.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] / [`PlacesError::InvalidDay`] if the
    ///   response does not match the expected shape.
    pub async fn nearby_search(
        &self,
        request: &SearchRequest,
    ) -> Result<RawSearchResponse, PlacesError> {
        let api_key = self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)?;
        let url = self.build_url(request, api_key);

        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_page(&url)
        })
        .await?;

        tracing::debug!(
            results = response.places.len(),
            has_next_page = response.next_page_token.is_some(),
            "places: nearby search returned"
        );
        Ok(response)
    }

    async fn fetch_page(&self, url: &Url) -> Result<RawSearchResponse, PlacesError> {
        let body = self.request_json(url).await?;
        Self::check_status(&body)?;

        let envelope: NearbySearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: "nearbysearch response".to_owned(),
                source: e,
            })?;

        to_raw_response(envelope)
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, request: &SearchRequest, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(
                "location",
                &format!("{},{}", request.latitude, request.longitude),
            );
            pairs.append_pair("radius", &request.radius_meters.to_string());
            if let Some(place_type) = request.place_type {
                pairs.append_pair("type", place_type.as_str());
            }
            pairs.append_pair("key", api_key);
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body as JSON.
    ///
    /// The URL is stripped from HTTP errors since it carries the API key.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let body = async {
            self.client
                .get(url.clone())
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        }
        .await
        .map_err(|e| PlacesError::Http(e.without_url()))?;

        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: "nearbysearch response".to_owned(),
            source: e,
        })
    }

    /// Checks the envelope `"status"`; `OK` and `ZERO_RESULTS` are success.
    fn check_status(body: &serde_json::Value) -> Result<(), PlacesError> {
        let status = body
            .get("status")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("MISSING_STATUS");
        if matches!(status, "OK" | "ZERO_RESULTS") {
            return Ok(());
        }
        let message = body
            .get("error_message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("no error message")
            .to_owned();
        Err(PlacesError::Api {
            status: status.to_owned(),
            message,
        })
    }
}

#[async_trait]
impl SearchProvider for GooglePlacesClient {
    async fn search(&self, request: &SearchRequest) -> Result<RawSearchResponse, SearchError> {
        self.nearby_search(request).await.map_err(SearchError::from)
    }

    fn validate(&self) -> Result<(), String> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(PlacesError::MissingApiKey.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
