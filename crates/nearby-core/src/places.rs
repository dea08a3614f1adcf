//! Raw search results and the place records delivered to listeners.
//!
//! A [`SearchProvider`](crate::SearchProvider) turns its wire response into a
//! [`RawSearchResponse`]; [`map_response`] turns that into [`PlaceRecord`]s.
//!
//! ## Opening hours
//! Providers report weekly opening periods as `open`/`close` day + `"HHMM"`
//! pairs. Days are encoded as an index into a Sunday-first week
//! (`0` = Sunday … `6` = Saturday). A place that never closes is reported with
//! a single period that has no `close` half; that shape is preserved.
//!
//! `open_now` and `hours` are omitted entirely when the provider sent no
//! opening-hours block, rather than serialized as `null` or `[]`.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// One page of results from a nearby search, in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSearchResponse {
    pub places: Vec<RawPlace>,
    /// Continuation token for the next page. Not followed.
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub place_id: Option<String>,
    pub types: Vec<String>,
    pub permanently_closed: bool,
    pub opening_hours: Option<RawOpeningHours>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOpeningHours {
    pub open_now: Option<bool>,
    /// `None` when the provider sent an hours block without periods.
    pub periods: Option<Vec<RawPeriod>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPeriod {
    pub open: RawDayTime,
    pub close: Option<RawDayTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDayTime {
    pub day: Weekday,
    /// 24-hour `"HHMM"`, passed through verbatim.
    pub time: String,
}

/// Provider-agnostic description of one nearby place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    /// `(latitude, longitude)`.
    pub location: (f64, f64),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub types: Vec<String>,
    pub permanently_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Vec<OpeningPeriod>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningPeriod {
    pub open_day: u8,
    pub open_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<String>,
}

/// Index of `day` in the Sunday-first week used by place providers.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // num_days_from_sunday is always 0..=6
pub fn day_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Inverse of [`day_index`]; `None` outside `0..=6`.
#[must_use]
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Map one raw place into a [`PlaceRecord`].
#[must_use]
pub fn map_place(raw: &RawPlace) -> PlaceRecord {
    let (open_now, hours) = match &raw.opening_hours {
        Some(oh) => (
            oh.open_now,
            oh.periods
                .as_ref()
                .map(|periods| periods.iter().map(map_period).collect()),
        ),
        None => (None, None),
    };

    PlaceRecord {
        location: (raw.latitude, raw.longitude),
        name: raw.name.clone(),
        place_id: raw.place_id.clone(),
        types: raw.types.clone(),
        permanently_closed: raw.permanently_closed,
        open_now,
        hours,
    }
}

/// Map a whole page, preserving provider order.
#[must_use]
pub fn map_response(raw: &RawSearchResponse) -> Vec<PlaceRecord> {
    if let Some(token) = &raw.next_page_token {
        tracing::debug!(
            token_len = token.len(),
            "search response has more pages; only the first page is used"
        );
    }
    raw.places.iter().map(map_place).collect()
}

fn map_period(period: &RawPeriod) -> OpeningPeriod {
    OpeningPeriod {
        open_day: day_index(period.open.day),
        open_time: period.open.time.clone(),
        close_day: period.close.as_ref().map(|c| day_index(c.day)),
        close_time: period.close.as_ref().map(|c| c.time.clone()),
    }
}

#[cfg(test)]
#[path = "places_test.rs"]
mod tests;
