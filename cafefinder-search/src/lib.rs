//! CafeFinder Search - Café discovery and geocoding
//!
//! Aggregates cafés from Google Places, OpenStreetMap and a synthetic
//! generator behind one fallback chain, and resolves addresses through
//! Google Geocoding and Nominatim.

#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]

pub mod errors;
pub mod geocoding;
pub mod osm;
pub mod providers;
pub mod regions;
pub mod service;
pub mod types;

// Re-export main types
pub use errors::{GeocodingError, PlaceSearchError};
pub use geocoding::GeocodingService;
pub use providers::CafeProvider;
pub use service::CafeSearchService;
pub use types::{Cafe, DataSource, Review, SearchOutcome, SearchQuery, SortOrder, UserLocation};

/// Convenience type alias for Results with PlaceSearchError.
pub type Result<T> = std::result::Result<T, PlaceSearchError>;
