//! Centralized configuration for CafeFinder.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

use url::Url;

use crate::CafeFinderError;

/// Central configuration for all CafeFinder components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct CafeFinderConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub search: SearchConfig,
    pub synthetic: SyntheticConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Third-party geodata services.
///
/// Base URLs are configurable so tests and self-hosted mirrors can stand in
/// for the public endpoints.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Key for Google Places nearby search and details
    pub google_places_api_key: Option<String>,
    /// Key for Google Geocoding
    pub google_maps_api_key: Option<String>,
    /// Base URL shared by the Google Maps web services
    pub google_base_url: String,
    /// Base URL of the Overpass API
    pub overpass_url: String,
    /// Base URL of the Nominatim geocoder
    pub nominatim_url: String,
    /// Per-request timeout for every upstream call
    pub request_timeout: Duration,
    /// User agent sent to OpenStreetMap services, which require one
    pub user_agent: String,
    /// Overpass query evaluation timeout in seconds
    pub overpass_query_timeout_secs: u32,
    /// Whether the Overpass source is consulted at all
    pub overpass_enabled: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            google_places_api_key: None,
            google_maps_api_key: None,
            google_base_url: "https://maps.googleapis.com".to_string(),
            overpass_url: "https://overpass-api.de".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            request_timeout: Duration::from_secs(25),
            user_agent: "CafeFinder/1.0 (contact@example.com)".to_string(),
            overpass_query_timeout_secs: 20,
            overpass_enabled: true,
        }
    }
}

/// Aggregation and paging limits for the places search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Radius used when the request does not name one, in metres
    pub default_radius_m: u32,
    /// Largest accepted radius, in metres
    pub max_radius_m: u32,
    /// Below this many upstream results the list is topped up
    pub min_results: usize,
    /// Size the list is topped up to with synthetic cafés
    pub top_up_target: usize,
    /// Number of Google results that get a details lookup
    pub detail_fetch_limit: usize,
    /// Reviews kept per café
    pub max_reviews: usize,
    /// Photos kept per café
    pub max_photos: usize,
    /// Largest accepted page size
    pub max_per_page: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_m: 1000,
            max_radius_m: 50_000,
            min_results: 5,
            top_up_target: 8,
            detail_fetch_limit: 10,
            max_reviews: 3,
            max_photos: 1,
            max_per_page: 50,
        }
    }
}

/// Synthetic café generator configuration.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Deterministic seed for reproducible output
    pub seed: Option<u64>,
    /// Candidate points generated per request
    pub attempts: usize,
    /// Maximum offset from the centre on each axis, in degrees
    pub max_offset_deg: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: None,
            attempts: 15,
            max_offset_deg: 0.004, // ~400 m
        }
    }
}

impl CafeFinderConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Applies overrides read through `lookup` on top of the defaults.
    ///
    /// Blank values and values that fail to parse leave the default in place.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        config.upstream.google_places_api_key = var("GOOGLE_PLACES_API_KEY");
        config.upstream.google_maps_api_key = var("GOOGLE_MAPS_API_KEY");

        if let Some(url) = var("CAFEFINDER_GOOGLE_BASE_URL") {
            config.upstream.google_base_url = url;
        }
        if let Some(url) = var("CAFEFINDER_OVERPASS_URL") {
            config.upstream.overpass_url = url;
        }
        if let Some(url) = var("CAFEFINDER_NOMINATIM_URL") {
            config.upstream.nominatim_url = url;
        }

        if let Some(seconds) = var("CAFEFINDER_REQUEST_TIMEOUT").and_then(|v| v.parse::<u64>().ok()) {
            config.upstream.request_timeout = Duration::from_secs(seconds);
        }
        if let Some(metres) = var("CAFEFINDER_DEFAULT_RADIUS").and_then(|v| v.parse::<u32>().ok()) {
            config.search.default_radius_m = metres;
        }
        if let Some(seed) = var("CAFEFINDER_SEED").and_then(|v| v.parse::<u64>().ok()) {
            config.synthetic.seed = Some(seed);
        }

        if let Some(host) = var("CAFEFINDER_HOST") {
            config.server.host = host;
        }
        if let Some(port) = var("CAFEFINDER_PORT").and_then(|v| v.parse::<u16>().ok()) {
            config.server.port = port;
        }

        config
    }

    /// Creates a configuration for offline development.
    ///
    /// Every upstream source is switched off so requests are served from
    /// seeded synthetic data.
    pub fn for_development() -> Self {
        let mut config = Self::default();
        config.upstream.overpass_enabled = false;
        config.synthetic.seed = Some(42);
        config
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        let mut config = Self::default();
        config.upstream.request_timeout = Duration::from_secs(5);
        config.synthetic.seed = Some(42);
        config
    }

    /// Checks that upstream base URLs parse and limits are coherent.
    ///
    /// # Errors
    ///
    /// - `CafeFinderError::Configuration` - A base URL is malformed or a limit is zero
    pub fn validate(&self) -> Result<(), CafeFinderError> {
        for (name, value) in [
            ("google_base_url", &self.upstream.google_base_url),
            ("overpass_url", &self.upstream.overpass_url),
            ("nominatim_url", &self.upstream.nominatim_url),
        ] {
            Url::parse(value).map_err(|e| CafeFinderError::Configuration {
                reason: format!("{name} '{value}' is not a valid URL: {e}"),
            })?;
        }

        if self.search.default_radius_m == 0
            || self.search.default_radius_m > self.search.max_radius_m
        {
            return Err(CafeFinderError::Configuration {
                reason: format!(
                    "default radius {} must be within 1..={}",
                    self.search.default_radius_m, self.search.max_radius_m
                ),
            });
        }

        if self.search.max_per_page == 0 {
            return Err(CafeFinderError::Configuration {
                reason: "max_per_page must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = CafeFinderConfig::default();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.search.default_radius_m, 1000);
        assert_eq!(config.search.min_results, 5);
        assert_eq!(config.search.top_up_target, 8);
        assert_eq!(config.search.detail_fetch_limit, 10);
        assert_eq!(config.synthetic.attempts, 15);
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(25));
        assert!(config.upstream.google_places_api_key.is_none());
        assert!(config.upstream.overpass_enabled);
        assert!(config.synthetic.seed.is_none());
    }

    #[test]
    fn test_config_presets() {
        let dev_config = CafeFinderConfig::for_development();
        assert!(!dev_config.upstream.overpass_enabled);
        assert_eq!(dev_config.synthetic.seed, Some(42));

        let testing_config = CafeFinderConfig::for_testing();
        assert!(testing_config.upstream.overpass_enabled);
        assert_eq!(testing_config.synthetic.seed, Some(42));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = CafeFinderConfig::default();
        assert!(config.validate().is_ok());

        config.upstream.overpass_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overpass_url"));
    }

    #[test]
    fn test_validate_rejects_oversized_default_radius() {
        let mut config = CafeFinderConfig::default();
        config.search.default_radius_m = 60_000;
        assert!(config.validate().is_err());
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_env_override() {
        let config = CafeFinderConfig::from_lookup(lookup(&[
            ("CAFEFINDER_REQUEST_TIMEOUT", "7"),
            ("CAFEFINDER_DEFAULT_RADIUS", "2500"),
            ("CAFEFINDER_SEED", "12345"),
            ("CAFEFINDER_OVERPASS_URL", "http://127.0.0.1:9999"),
            ("CAFEFINDER_PORT", "8080"),
            ("GOOGLE_PLACES_API_KEY", "places-key"),
        ]));

        assert_eq!(config.upstream.request_timeout, Duration::from_secs(7));
        assert_eq!(config.search.default_radius_m, 2500);
        assert_eq!(config.synthetic.seed, Some(12345));
        assert_eq!(config.upstream.overpass_url, "http://127.0.0.1:9999");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.upstream.google_places_api_key.as_deref(), Some("places-key"));
        assert!(config.upstream.google_maps_api_key.is_none());
    }

    #[test]
    fn test_blank_and_malformed_overrides_keep_defaults() {
        let config = CafeFinderConfig::from_lookup(lookup(&[
            ("GOOGLE_PLACES_API_KEY", "   "),
            ("CAFEFINDER_REQUEST_TIMEOUT", "soon"),
            ("CAFEFINDER_PORT", "99999"),
            ("CAFEFINDER_NOMINATIM_URL", ""),
        ]));
        let defaults = CafeFinderConfig::default();

        assert!(config.upstream.google_places_api_key.is_none());
        assert_eq!(config.upstream.request_timeout, defaults.upstream.request_timeout);
        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.upstream.nominatim_url, defaults.upstream.nominatim_url);
    }
}
