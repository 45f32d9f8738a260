//! OpenStreetMap café lookup through the Overpass API.

use async_trait::async_trait;
use cafefinder_core::Coordinates;
use cafefinder_core::config::UpstreamConfig;
use chrono::Timelike;
use rand::Rng;
use serde::Deserialize;

use super::{CafeProvider, SyntheticProvider};
use crate::errors::PlaceSearchError;
use crate::osm::{self, Tags};
use crate::types::{Cafe, DataSource};

const PROVIDER_NAME: &str = "Overpass";

/// Overpass provider for crowd-sourced café data.
///
/// OSM elements carry no ratings and rarely carry prices, so those fields are
/// filled with the heuristics in [`crate::osm`]. An answer with no elements at
/// all is replaced by generated cafés.
#[derive(Debug, Clone)]
pub struct OverpassProvider {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    query_timeout_secs: u32,
    generator: SyntheticProvider,
}

/// Response from the Overpass interpreter.
#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub(crate) elements: Vec<OverpassElement>,
}

/// Single node or way.
#[derive(Debug, Deserialize)]
pub(crate) struct OverpassElement {
    pub(crate) id: i64,
    pub(crate) lat: Option<f64>,
    pub(crate) lon: Option<f64>,
    pub(crate) center: Option<OverpassCenter>,
    #[serde(default)]
    pub(crate) tags: Tags,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassCenter {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
}

impl OverpassElement {
    fn coordinates(&self) -> Option<Coordinates> {
        let (lat, lng) = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => self.center.as_ref().map(|c| (c.lat, c.lon))?,
        };
        (lat.is_finite() && lng.is_finite()).then(|| Coordinates::new(lat, lng))
    }
}

impl OverpassProvider {
    /// Create provider from upstream configuration.
    ///
    /// `generator` fills in for empty answers and seeds the OSM heuristics.
    pub fn new(
        client: reqwest::Client,
        upstream: &UpstreamConfig,
        generator: SyntheticProvider,
    ) -> Self {
        Self {
            client,
            base_url: upstream.overpass_url.trim_end_matches('/').to_string(),
            user_agent: upstream.user_agent.clone(),
            query_timeout_secs: upstream.overpass_query_timeout_secs,
            generator,
        }
    }

    /// Overpass QL for cafés, coffee restaurants and coffee shops around `centre`.
    pub fn build_query(centre: Coordinates, radius_m: u32, timeout_secs: u32) -> String {
        let around = format!("around:{radius_m},{},{}", centre.lat, centre.lng);
        format!(
            "[out:json][timeout:{timeout_secs}];\n\
             (\n  \
               node[\"amenity\"=\"cafe\"]({around});\n  \
               way[\"amenity\"=\"cafe\"]({around});\n  \
               node[\"amenity\"=\"restaurant\"][\"cuisine\"~\"coffee\"]({around});\n  \
               node[\"shop\"=\"coffee\"]({around});\n\
             );\n\
             out center meta;"
        )
    }

    /// Maps elements to cafés, dropping those without coordinates.
    pub(crate) fn map_elements<R: Rng>(
        elements: Vec<OverpassElement>,
        centre: Coordinates,
        hour: u32,
        rng: &mut R,
    ) -> Vec<Cafe> {
        elements
            .into_iter()
            .filter_map(|element| {
                let Some(position) = element.coordinates() else {
                    tracing::trace!("Skipping OSM element {} without coordinates", element.id);
                    return None;
                };
                let tags = &element.tags;

                let name = osm::first_tag(tags, &["name"])
                    .map(str::to_string)
                    .unwrap_or_else(|| osm::cafe_name(rng));
                let address = osm::format_address(tags, position, rng);

                let mut cafe = Cafe::new(
                    format!("osm_{}", element.id),
                    name,
                    position,
                    address,
                    centre,
                );
                cafe.rating = Some(osm::realistic_rating(rng));
                cafe.price_level = Some(osm::price_level(tags, rng));
                cafe.open_now = Some(osm::open_status(tags, hour, rng));
                cafe.phone_number =
                    osm::first_tag(tags, &["phone", "contact:phone"]).map(str::to_string);
                cafe.website =
                    osm::first_tag(tags, &["website", "contact:website"]).map(str::to_string);
                cafe.cuisine = osm::first_tag(tags, &["cuisine"]).map(str::to_string);
                Some(cafe)
            })
            .collect()
    }
}

#[async_trait]
impl CafeProvider for OverpassProvider {
    fn source(&self) -> DataSource {
        DataSource::OpenStreetMap
    }

    async fn nearby_cafes(
        &self,
        centre: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<Cafe>, PlaceSearchError> {
        let url = format!("{}/api/interpreter", self.base_url);
        let query = Self::build_query(centre, radius_m, self.query_timeout_secs);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .body(query)
            .send()
            .await
            .map_err(|e| PlaceSearchError::NetworkError {
                reason: format!("Overpass request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(PlaceSearchError::SearchFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let overpass: OverpassResponse =
            response
                .json()
                .await
                .map_err(|e| PlaceSearchError::ParseError {
                    reason: format!("Overpass JSON parsing failed: {e}"),
                })?;

        tracing::debug!(
            "Overpass returned {} elements around {}",
            overpass.elements.len(),
            centre
        );

        if overpass.elements.is_empty() {
            tracing::info!("No OSM cafés around {centre}, serving generated cafés");
            return Ok(self.generator.generate(centre, radius_m));
        }

        // Elements without coordinates are dropped here; a short list is
        // topped up by the search service.
        let hour = chrono::Local::now().hour();
        let mut rng = self.generator.request_rng(centre);
        Ok(Self::map_elements(overpass.elements, centre, hour, &mut rng))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    const CENTRE: Coordinates = Coordinates::new(48.8566, 2.3522);

    fn parse(json: &str) -> Vec<OverpassElement> {
        serde_json::from_str::<OverpassResponse>(json).unwrap().elements
    }

    #[test]
    fn test_build_query() {
        let query = OverpassProvider::build_query(CENTRE, 750, 20);
        assert!(query.starts_with("[out:json][timeout:20];"));
        assert!(query.contains("node[\"amenity\"=\"cafe\"](around:750,48.8566,2.3522);"));
        assert!(query.contains("way[\"amenity\"=\"cafe\"]"));
        assert!(query.contains("[\"cuisine\"~\"coffee\"]"));
        assert!(query.contains("node[\"shop\"=\"coffee\"]"));
        assert!(query.ends_with("out center meta;"));
    }

    #[test]
    fn test_map_elements() {
        let elements = parse(
            r#"{"elements": [
                {"type": "node", "id": 1, "lat": 48.857, "lon": 2.353,
                 "tags": {"name": "Café Kitsuné", "addr:street": "Rue de Rivoli",
                          "contact:phone": "+33 1 23 45 67 89", "cuisine": "coffee_shop"}},
                {"type": "way", "id": 2, "center": {"lat": 48.858, "lon": 2.354},
                 "tags": {"website": "https://example.fr"}},
                {"type": "node", "id": 3, "tags": {"name": "Nowhere"}}
            ]}"#,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let cafes = OverpassProvider::map_elements(elements, CENTRE, 12, &mut rng);

        assert_eq!(cafes.len(), 2);
        assert_eq!(cafes[0].id, "osm_1");
        assert_eq!(cafes[0].name, "Café Kitsuné");
        assert_eq!(cafes[0].address, "Rue de Rivoli");
        assert_eq!(cafes[0].phone_number.as_deref(), Some("+33 1 23 45 67 89"));
        assert_eq!(cafes[0].cuisine.as_deref(), Some("coffee_shop"));
        assert_eq!(cafes[0].open_now, Some(true));
        assert!(cafes[0].distance > 0.0);

        assert_eq!(cafes[1].id, "osm_2");
        assert_eq!(cafes[1].lat, 48.858);
        assert!(!cafes[1].name.is_empty());
        assert_eq!(cafes[1].website.as_deref(), Some("https://example.fr"));
        assert!(cafes[1].address.ends_with("Paris, France"));
    }

    #[test]
    fn test_missing_elements_field_is_empty() {
        assert!(parse("{}").is_empty());
    }
}
