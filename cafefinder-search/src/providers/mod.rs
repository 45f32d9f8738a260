//! Café sources consulted by the search service.

use async_trait::async_trait;
use cafefinder_core::Coordinates;

use crate::errors::PlaceSearchError;
use crate::types::{Cafe, DataSource};

pub mod google;
pub mod mock;
pub mod overpass;
pub mod synthetic;

pub use google::GooglePlacesProvider;
#[cfg(test)]
pub use mock::MockProvider;
pub use overpass::OverpassProvider;
pub use synthetic::SyntheticProvider;

/// Trait for café sources.
///
/// Implementations provide nearby-café lookups through different backends
/// (commercial API, OpenStreetMap, generated data, test doubles).
#[async_trait]
pub trait CafeProvider: Send + Sync + std::fmt::Debug {
    /// Label reported to clients when this source supplied the results.
    fn source(&self) -> DataSource;

    /// Cafés within `radius_m` metres of `centre`, distances filled in.
    ///
    /// # Errors
    /// - `PlaceSearchError::SearchFailed` - Upstream answered with an HTTP error
    /// - `PlaceSearchError::NetworkError` - Network connectivity issues
    /// - `PlaceSearchError::ParseError` - Unreadable response body
    /// - `PlaceSearchError::ProviderError` - Upstream reported an error status
    /// - `PlaceSearchError::MissingApiKey` - Source needs credentials
    async fn nearby_cafes(
        &self,
        centre: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<Cafe>, PlaceSearchError>;
}
