//! Google Places Nearby Search client, usable as a
//! [`SearchProvider`](nearby_core::SearchProvider).

mod client;
mod error;
mod normalize;
mod retry;
pub mod types;

pub use client::GooglePlacesClient;
pub use error::PlacesError;
