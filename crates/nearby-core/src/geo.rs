//! Great-circle distance between two coordinates.
//!
//! Uses the haversine formula on a spherical Earth. Elevation is ignored, which
//! is fine for movement gating at the scale of a few metres to a few kilometres.

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Distance in metres between `(lat1, lon1)` and `(lat2, lon2)`, in degrees.
///
/// NaN in any input yields NaN.
#[must_use]
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lon2 - lon1).to_radians();
    let sin_d_lat = (d_lat / 2.0).sin();
    let sin_d_lng = (d_lng / 2.0).sin();

    let a = sin_d_lat.powi(2)
        + sin_d_lng.powi(2) * lat1.to_radians().cos() * lat2.to_radians().cos();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
