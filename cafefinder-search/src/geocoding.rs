//! Address and coordinate resolution.
//!
//! Google Geocoding is tried first when `GOOGLE_MAPS_API_KEY` is configured;
//! Nominatim answers everything Google does not.

use cafefinder_core::config::UpstreamConfig;
use cafefinder_core::{CafeFinderConfig, Coordinates};
use serde::Deserialize;

use crate::errors::GeocodingError;
use crate::types::UserLocation;

/// Address reported when Nominatim knows nothing about a point.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Forward and reverse geocoder.
#[derive(Debug, Clone)]
pub struct GeocodingService {
    client: reqwest::Client,
    google_base_url: String,
    google_api_key: Option<String>,
    nominatim_url: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleGeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResult {
    formatted_address: String,
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLatLng,
}

#[derive(Debug, Deserialize)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

/// Nominatim search hit; coordinates arrive as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}

impl NominatimPlace {
    fn into_location(self) -> Result<UserLocation, GeocodingError> {
        let parse = |value: &str, axis: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| GeocodingError::ParseError {
                    reason: format!("Invalid {axis} '{value}' from Nominatim: {e}"),
                })
        };

        Ok(UserLocation {
            lat: parse(&self.lat, "latitude")?,
            lng: parse(&self.lon, "longitude")?,
            address: Some(self.display_name),
        })
    }
}

impl GeocodingService {
    /// Create geocoder sharing `client` with the rest of the application.
    pub fn new(client: reqwest::Client, upstream: &UpstreamConfig) -> Self {
        Self {
            client,
            google_base_url: upstream.google_base_url.trim_end_matches('/').to_string(),
            google_api_key: upstream.google_maps_api_key.clone(),
            nominatim_url: upstream.nominatim_url.trim_end_matches('/').to_string(),
            user_agent: upstream.user_agent.clone(),
        }
    }

    /// Create geocoder with its own HTTP client.
    ///
    /// # Errors
    /// - `GeocodingError::NetworkError` - The HTTP client could not be built
    pub fn from_config(config: &CafeFinderConfig) -> Result<Self, GeocodingError> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream.request_timeout)
            .build()
            .map_err(|e| GeocodingError::NetworkError {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self::new(client, &config.upstream))
    }

    /// Resolves a free-form address to coordinates.
    ///
    /// # Errors
    /// - `GeocodingError::NotFound` - Neither geocoder matched the address
    /// - `GeocodingError::Unavailable` - Nominatim answered with an error status
    /// - `GeocodingError::NetworkError` - Nominatim could not be reached
    /// - `GeocodingError::ParseError` - Nominatim returned malformed data
    pub async fn geocode(&self, address: &str) -> Result<UserLocation, GeocodingError> {
        if let Some(key) = &self.google_api_key {
            match self.google_lookup(&[("address", address), ("key", key)]).await {
                Ok(Some(hit)) => {
                    return Ok(UserLocation {
                        lat: hit.geometry.location.lat,
                        lng: hit.geometry.location.lng,
                        address: Some(hit.formatted_address),
                    });
                }
                Ok(None) => tracing::debug!("Google found nothing for '{address}', trying Nominatim"),
                Err(e) => tracing::warn!("Google geocoding failed, trying Nominatim: {e}"),
            }
        }

        let url = format!("{}/search", self.nominatim_url);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "json"),
                ("q", address),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .map_err(|e| GeocodingError::NetworkError {
                reason: format!("Nominatim request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(GeocodingError::Unavailable {
                reason: format!("Nominatim HTTP {}", response.status()),
            });
        }

        let places: Vec<NominatimPlace> =
            response
                .json()
                .await
                .map_err(|e| GeocodingError::ParseError {
                    reason: format!("Nominatim JSON parsing failed: {e}"),
                })?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodingError::NotFound {
                query: address.to_string(),
            })?;

        place.into_location()
    }

    /// Resolves coordinates to a human-readable address.
    ///
    /// # Errors
    /// - `GeocodingError::Unavailable` - Nominatim answered with an error status
    /// - `GeocodingError::NetworkError` - Nominatim could not be reached
    /// - `GeocodingError::ParseError` - Nominatim returned malformed data
    pub async fn reverse_geocode(&self, at: Coordinates) -> Result<String, GeocodingError> {
        if let Some(key) = &self.google_api_key {
            let latlng = at.to_string();
            match self.google_lookup(&[("latlng", &latlng), ("key", key)]).await {
                Ok(Some(hit)) => return Ok(hit.formatted_address),
                Ok(None) => tracing::debug!("Google found no address at {at}, trying Nominatim"),
                Err(e) => tracing::warn!("Google reverse geocoding failed, trying Nominatim: {e}"),
            }
        }

        let url = format!("{}/reverse", self.nominatim_url);
        let lat = at.lat.to_string();
        let lon = at.lng.to_string();
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .map_err(|e| GeocodingError::NetworkError {
                reason: format!("Nominatim request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(GeocodingError::Unavailable {
                reason: format!("Nominatim HTTP {}", response.status()),
            });
        }

        let reverse: NominatimReverse =
            response
                .json()
                .await
                .map_err(|e| GeocodingError::ParseError {
                    reason: format!("Nominatim JSON parsing failed: {e}"),
                })?;

        Ok(reverse
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()))
    }

    /// First Google result, or `None` unless the status is `OK`.
    async fn google_lookup(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Option<GoogleGeocodeResult>, GeocodingError> {
        let url = format!("{}/maps/api/geocode/json", self.google_base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| GeocodingError::NetworkError {
                reason: format!("Google geocoding request failed: {e}"),
            })?;

        let body: GoogleGeocodeResponse =
            response
                .json()
                .await
                .map_err(|e| GeocodingError::ParseError {
                    reason: format!("Google geocoding JSON parsing failed: {e}"),
                })?;

        if body.status != "OK" {
            tracing::debug!("Google geocoding status {}", body.status);
            return Ok(None);
        }
        Ok(body.results.into_iter().next())
    }
}
