//! Error types for café search and geocoding.

use thiserror::Error;

/// Errors that can occur while querying a café source.
#[derive(Debug, Error)]
pub enum PlaceSearchError {
    /// Upstream answered with a non-success HTTP status.
    #[error("{provider} search failed: {reason}")]
    SearchFailed {
        /// Name of the source that failed
        provider: String,
        /// The reason for the failure
        reason: String,
    },

    /// Network communication error occurred during search.
    #[error("Network error: {reason}")]
    NetworkError {
        /// The reason for the network error
        reason: String,
    },

    /// Failed to parse the upstream response body.
    #[error("Parse error: {reason}")]
    ParseError {
        /// The reason for the parse error
        reason: String,
    },

    /// Upstream answered successfully but reported an error status in the body.
    #[error("{provider} returned status {status}")]
    ProviderError {
        /// Name of the source that failed
        provider: String,
        /// Status string reported by the upstream
        status: String,
    },

    /// The source needs credentials that are not configured.
    #[error("{provider} API key not configured")]
    MissingApiKey {
        /// Name of the source lacking a key
        provider: String,
    },
}

/// Errors that can occur while resolving addresses or coordinates.
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// No result matched the query.
    #[error("Location not found: {query}")]
    NotFound {
        /// The address that had no match
        query: String,
    },

    /// The geocoding service answered with a non-success status.
    #[error("Geocoding service unavailable: {reason}")]
    Unavailable {
        /// The reason for the outage
        reason: String,
    },

    /// Network communication error occurred during lookup.
    #[error("Network error: {reason}")]
    NetworkError {
        /// The reason for the network error
        reason: String,
    },

    /// Failed to parse the geocoder response.
    #[error("Parse error: {reason}")]
    ParseError {
        /// The reason for the parse error
        reason: String,
    },
}

impl GeocodingError {
    /// True when the lookup succeeded but matched nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeocodingError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PlaceSearchError::ProviderError {
            provider: "Google Places".to_string(),
            status: "REQUEST_DENIED".to_string(),
        };
        assert_eq!(error.to_string(), "Google Places returned status REQUEST_DENIED");

        let error = GeocodingError::NotFound {
            query: "Atlantis".to_string(),
        };
        assert!(error.is_not_found());
        assert!(error.to_string().contains("Atlantis"));
    }
}
