//! Google Places nearby search with per-place detail enrichment.

use async_trait::async_trait;
use cafefinder_core::Coordinates;
use cafefinder_core::config::{SearchConfig, UpstreamConfig};
use futures::future::join_all;
use serde::Deserialize;

use super::CafeProvider;
use crate::errors::PlaceSearchError;
use crate::osm::ADDRESS_NOT_AVAILABLE;
use crate::types::{Cafe, DataSource, Review};

const PROVIDER_NAME: &str = "Google Places";
const DETAIL_FIELDS: &str = "formatted_phone_number,website,reviews";

/// Google Places provider.
///
/// Runs a nearby search, then fetches phone, website and reviews for the
/// first results concurrently. A failed detail lookup leaves that café with
/// its nearby-search fields only.
#[derive(Debug, Clone)]
pub struct GooglePlacesProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    detail_fetch_limit: usize,
    max_reviews: usize,
    max_photos: usize,
}

/// Response from the Nearby Search endpoint.
#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<GooglePlace>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GooglePlace {
    place_id: String,
    name: String,
    geometry: Geometry,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    rating: Option<f32>,
    price_level: Option<u8>,
    opening_hours: Option<OpeningHours>,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

/// Response from the Place Details endpoint.
#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    result: PlaceDetails,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceDetails {
    formatted_phone_number: Option<String>,
    website: Option<String>,
    #[serde(default)]
    reviews: Vec<GoogleReview>,
}

#[derive(Debug, Deserialize)]
struct GoogleReview {
    author_name: String,
    rating: f32,
    #[serde(default)]
    text: String,
    time: i64,
}

impl GooglePlacesProvider {
    /// Create provider from configuration; without a key every search fails.
    pub fn new(client: reqwest::Client, upstream: &UpstreamConfig, search: &SearchConfig) -> Self {
        Self {
            client,
            base_url: upstream.google_base_url.trim_end_matches('/').to_string(),
            api_key: upstream.google_places_api_key.clone(),
            detail_fetch_limit: search.detail_fetch_limit,
            max_reviews: search.max_reviews,
            max_photos: search.max_photos,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn base_cafe(&self, place: GooglePlace, centre: Coordinates) -> Cafe {
        let position = Coordinates::new(place.geometry.location.lat, place.geometry.location.lng);
        let address = place
            .vicinity
            .or(place.formatted_address)
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| ADDRESS_NOT_AVAILABLE.to_string());

        let mut cafe = Cafe::new(place.place_id.clone(), place.name, position, address, centre);
        cafe.rating = place.rating;
        cafe.price_level = place.price_level;
        cafe.open_now = place.opening_hours.and_then(|h| h.open_now);
        cafe.place_id = Some(place.place_id);
        cafe.photos = place
            .photos
            .into_iter()
            .take(self.max_photos)
            .map(|p| p.photo_reference)
            .collect();
        cafe
    }

    fn apply_details(&self, cafe: &mut Cafe, details: PlaceDetails) {
        cafe.phone_number = details.formatted_phone_number;
        cafe.website = details.website;
        cafe.reviews = details
            .reviews
            .into_iter()
            .take(self.max_reviews)
            .map(|r| Review {
                author: r.author_name,
                rating: r.rating,
                text: r.text,
                time: r.time,
            })
            .collect();
    }

    async fn fetch_details(
        &self,
        place_id: &str,
        api_key: &str,
    ) -> Result<PlaceDetails, PlaceSearchError> {
        let url = format!("{}/maps/api/place/details/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| PlaceSearchError::NetworkError {
                reason: format!("Place details request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(PlaceSearchError::SearchFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("details HTTP {}", response.status()),
            });
        }

        let details: DetailsResponse =
            response
                .json()
                .await
                .map_err(|e| PlaceSearchError::ParseError {
                    reason: format!("Place details JSON parsing failed: {e}"),
                })?;
        Ok(details.result)
    }

    async fn enrich(&self, place: GooglePlace, centre: Coordinates, api_key: &str) -> Cafe {
        let place_id = place.place_id.clone();
        let mut cafe = self.base_cafe(place, centre);
        match self.fetch_details(&place_id, api_key).await {
            Ok(details) => self.apply_details(&mut cafe, details),
            Err(e) => tracing::warn!("Error fetching details for place {place_id}: {e}"),
        }
        cafe
    }
}

#[async_trait]
impl CafeProvider for GooglePlacesProvider {
    fn source(&self) -> DataSource {
        DataSource::GooglePlaces
    }

    async fn nearby_cafes(
        &self,
        centre: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<Cafe>, PlaceSearchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(PlaceSearchError::MissingApiKey {
                provider: PROVIDER_NAME.to_string(),
            });
        };

        let url = format!("{}/maps/api/place/nearbysearch/json", self.base_url);
        let location = centre.to_string();
        let radius = radius_m.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", "cafe"),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| PlaceSearchError::NetworkError {
                reason: format!("Nearby search request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(PlaceSearchError::SearchFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let nearby: NearbyResponse =
            response
                .json()
                .await
                .map_err(|e| PlaceSearchError::ParseError {
                    reason: format!("Nearby search JSON parsing failed: {e}"),
                })?;

        if nearby.status != "OK" && nearby.status != "ZERO_RESULTS" {
            if let Some(message) = &nearby.error_message {
                tracing::warn!("Google Places error message: {message}");
            }
            return Err(PlaceSearchError::ProviderError {
                provider: PROVIDER_NAME.to_string(),
                status: nearby.status,
            });
        }

        let lookups = nearby
            .results
            .into_iter()
            .take(self.detail_fetch_limit)
            .map(|place| self.enrich(place, centre, api_key));

        Ok(join_all(lookups).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GooglePlacesProvider {
        GooglePlacesProvider::new(
            reqwest::Client::new(),
            &UpstreamConfig::default(),
            &SearchConfig::default(),
        )
    }

    fn place(json: &str) -> GooglePlace {
        serde_json::from_str(json).unwrap()
    }

    const CENTRE: Coordinates = Coordinates::new(40.7128, -74.0060);

    #[test]
    fn test_base_cafe_prefers_vicinity() {
        let cafe = provider().base_cafe(
            place(
                r#"{"place_id": "abc", "name": "Joe", "geometry": {"location": {"lat": 40.713, "lng": -74.0}},
                    "vicinity": "9 Broadway", "formatted_address": "9 Broadway, New York",
                    "rating": 4.4, "price_level": 2, "opening_hours": {"open_now": false},
                    "photos": [{"photo_reference": "p1"}, {"photo_reference": "p2"}]}"#,
            ),
            CENTRE,
        );

        assert_eq!(cafe.id, "abc");
        assert_eq!(cafe.place_id.as_deref(), Some("abc"));
        assert_eq!(cafe.address, "9 Broadway");
        assert_eq!(cafe.rating, Some(4.4));
        assert_eq!(cafe.price_level, Some(2));
        assert_eq!(cafe.open_now, Some(false));
        assert_eq!(cafe.photos, vec!["p1".to_string()]);
        assert!(cafe.distance > 0.0);
    }

    #[test]
    fn test_base_cafe_address_fallbacks() {
        let p = provider();
        let cafe = p.base_cafe(
            place(
                r#"{"place_id": "a", "name": "A", "geometry": {"location": {"lat": 1.0, "lng": 1.0}},
                    "formatted_address": "1 Main St"}"#,
            ),
            CENTRE,
        );
        assert_eq!(cafe.address, "1 Main St");

        let cafe = p.base_cafe(
            place(r#"{"place_id": "b", "name": "B", "geometry": {"location": {"lat": 1.0, "lng": 1.0}}}"#),
            CENTRE,
        );
        assert_eq!(cafe.address, ADDRESS_NOT_AVAILABLE);
        assert!(cafe.open_now.is_none());
    }

    #[test]
    fn test_apply_details_truncates_reviews() {
        let p = provider();
        let mut cafe = Cafe::new("x", "X", CENTRE, "here", CENTRE);
        let details: PlaceDetails = serde_json::from_str(
            r#"{"formatted_phone_number": "(212) 555-0100", "website": "https://joe.example",
                "reviews": [
                  {"author_name": "a", "rating": 5, "text": "great", "time": 1},
                  {"author_name": "b", "rating": 4, "text": "good", "time": 2},
                  {"author_name": "c", "rating": 3, "time": 3},
                  {"author_name": "d", "rating": 2, "text": "meh", "time": 4}
                ]}"#,
        )
        .unwrap();

        p.apply_details(&mut cafe, details);

        assert_eq!(cafe.phone_number.as_deref(), Some("(212) 555-0100"));
        assert_eq!(cafe.reviews.len(), 3);
        assert_eq!(cafe.reviews[2].author, "c");
        assert_eq!(cafe.reviews[2].text, "");
    }

    #[tokio::test]
    async fn test_missing_key_fails() {
        let err = provider().nearby_cafes(CENTRE, 500).await.unwrap_err();
        assert!(matches!(err, PlaceSearchError::MissingApiKey { .. }));
    }
}
