//! Conversion from the Google wire types to provider-agnostic raw results.

use nearby_core::places::weekday_from_index;
use nearby_core::{RawDayTime, RawOpeningHours, RawPeriod, RawPlace, RawSearchResponse};

use crate::error::PlacesError;
use crate::types::{DayTime, NearbySearchResponse, OpeningHours, PlaceResult};

const CLOSED_PERMANENTLY: &str = "CLOSED_PERMANENTLY";

pub(crate) fn to_raw_response(
    envelope: NearbySearchResponse,
) -> Result<RawSearchResponse, PlacesError> {
    let places = envelope
        .results
        .into_iter()
        .map(to_raw_place)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawSearchResponse {
        places,
        next_page_token: envelope.next_page_token.filter(|t| !t.is_empty()),
    })
}

fn to_raw_place(result: PlaceResult) -> Result<RawPlace, PlacesError> {
    let permanently_closed = result.permanently_closed.unwrap_or(false)
        || result.business_status.as_deref() == Some(CLOSED_PERMANENTLY);

    Ok(RawPlace {
        latitude: result.geometry.location.lat,
        longitude: result.geometry.location.lng,
        name: result.name,
        place_id: result.place_id,
        types: result.types,
        permanently_closed,
        opening_hours: result.opening_hours.map(to_raw_hours).transpose()?,
    })
}

fn to_raw_hours(hours: OpeningHours) -> Result<RawOpeningHours, PlacesError> {
    let periods = match hours.periods {
        Some(periods) => Some(
            periods
                .into_iter()
                .map(|p| {
                    Ok(RawPeriod {
                        open: to_raw_day_time(p.open)?,
                        close: p.close.map(to_raw_day_time).transpose()?,
                    })
                })
                .collect::<Result<Vec<_>, PlacesError>>()?,
        ),
        None => None,
    };

    Ok(RawOpeningHours {
        open_now: hours.open_now,
        periods,
    })
}

fn to_raw_day_time(value: DayTime) -> Result<RawDayTime, PlacesError> {
    let day = weekday_from_index(value.day).ok_or(PlacesError::InvalidDay(value.day))?;
    Ok(RawDayTime {
        day,
        time: value.time,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn parse(json: serde_json::Value) -> NearbySearchResponse {
        serde_json::from_value(json).expect("valid envelope")
    }

    #[test]
    fn maps_geometry_and_identity() {
        let envelope = parse(serde_json::json!({
            "status": "OK",
            "results": [{
                "geometry": { "location": { "lat": 44.637, "lng": -63.574 } },
                "name": "Harbour Cafe",
                "place_id": "ChIJ123",
                "types": ["cafe", "food"]
            }]
        }));

        let raw = to_raw_response(envelope).unwrap();
        let place = &raw.places[0];
        assert!((place.latitude - 44.637).abs() < f64::EPSILON);
        assert!((place.longitude - -63.574).abs() < f64::EPSILON);
        assert_eq!(place.name.as_deref(), Some("Harbour Cafe"));
        assert_eq!(place.place_id.as_deref(), Some("ChIJ123"));
        assert_eq!(place.types, vec!["cafe", "food"]);
        assert!(!place.permanently_closed);
        assert!(place.opening_hours.is_none());
    }

    #[test]
    fn business_status_marks_place_closed() {
        let envelope = parse(serde_json::json!({
            "status": "OK",
            "results": [
                {
                    "geometry": { "location": { "lat": 1.0, "lng": 2.0 } },
                    "business_status": "CLOSED_PERMANENTLY"
                },
                {
                    "geometry": { "location": { "lat": 1.0, "lng": 2.0 } },
                    "business_status": "CLOSED_TEMPORARILY"
                },
                {
                    "geometry": { "location": { "lat": 1.0, "lng": 2.0 } },
                    "permanently_closed": true
                }
            ]
        }));

        let closed: Vec<bool> = to_raw_response(envelope)
            .unwrap()
            .places
            .iter()
            .map(|p| p.permanently_closed)
            .collect();
        assert_eq!(closed, vec![true, false, true]);
    }

    #[test]
    fn periods_keep_order_and_missing_close() {
        let envelope = parse(serde_json::json!({
            "status": "OK",
            "results": [{
                "geometry": { "location": { "lat": 1.0, "lng": 2.0 } },
                "opening_hours": {
                    "open_now": true,
                    "periods": [
                        { "open": { "day": 1, "time": "0900" }, "close": { "day": 1, "time": "1700" } },
                        { "open": { "day": 0, "time": "0000" } }
                    ]
                }
            }]
        }));

        let raw = to_raw_response(envelope).unwrap();
        let hours = raw.places[0].opening_hours.as_ref().unwrap();
        assert_eq!(hours.open_now, Some(true));
        let periods = hours.periods.as_ref().unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].open.day, Weekday::Mon);
        assert_eq!(periods[0].open.time, "0900");
        assert_eq!(periods[0].close.as_ref().map(|c| c.time.as_str()), Some("1700"));
        assert_eq!(periods[1].open.day, Weekday::Sun);
        assert!(periods[1].close.is_none());
    }

    #[test]
    fn hours_without_periods_keep_open_now_only() {
        let envelope = parse(serde_json::json!({
            "status": "OK",
            "results": [{
                "geometry": { "location": { "lat": 1.0, "lng": 2.0 } },
                "opening_hours": { "open_now": false }
            }]
        }));

        let raw = to_raw_response(envelope).unwrap();
        let hours = raw.places[0].opening_hours.as_ref().unwrap();
        assert_eq!(hours.open_now, Some(false));
        assert!(hours.periods.is_none());
    }

    #[test]
    fn day_out_of_range_is_rejected() {
        let envelope = parse(serde_json::json!({
            "status": "OK",
            "results": [{
                "geometry": { "location": { "lat": 1.0, "lng": 2.0 } },
                "opening_hours": {
                    "periods": [{ "open": { "day": 7, "time": "0900" } }]
                }
            }]
        }));

        assert!(matches!(
            to_raw_response(envelope),
            Err(PlacesError::InvalidDay(7))
        ));
    }

    #[test]
    fn empty_page_token_is_dropped() {
        let envelope = parse(serde_json::json!({
            "status": "ZERO_RESULTS",
            "results": [],
            "next_page_token": ""
        }));

        let raw = to_raw_response(envelope).unwrap();
        assert!(raw.places.is_empty());
        assert!(raw.next_page_token.is_none());
    }
}
