//! Google Places Nearby Search response types.
//!
//! Only the fields the scheduler maps are modeled; everything else in the
//! payload is ignored by serde.

use serde::Deserialize;

/// Top-level envelope: `{"status": "OK", "results": [...], ...}`.
#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    /// Deprecated by Google in favour of `business_status`, still sent.
    #[serde(default)]
    pub permanently_closed: Option<bool>,
    #[serde(default)]
    pub business_status: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub periods: Option<Vec<Period>>,
}

#[derive(Debug, Deserialize)]
pub struct Period {
    pub open: DayTime,
    #[serde(default)]
    pub close: Option<DayTime>,
}

/// `day` is Sunday-first (`0` = Sunday); `time` is 24-hour `"HHMM"`.
#[derive(Debug, Deserialize)]
pub struct DayTime {
    pub day: u8,
    #[serde(default)]
    pub time: String,
}
