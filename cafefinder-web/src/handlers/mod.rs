//! HTTP request handlers

pub mod api;

// Re-export handler functions
pub use api::{
    GeocodeResponse, LocationBody, PlacesResponse, api_geocode, api_health, api_places,
    api_reverse_geocode,
};
