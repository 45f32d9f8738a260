//! Data types for café search.

use std::cmp::Ordering;

use cafefinder_core::{Bounds, Coordinates};
use serde::{Deserialize, Serialize};

/// A coffee shop near the search centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cafe {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    /// Metres from the search centre.
    pub distance: f64,
}

impl Cafe {
    /// Minimal record at `position`, with distance measured from `centre`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Coordinates,
        address: impl Into<String>,
        centre: Coordinates,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat: position.lat,
            lng: position.lng,
            address: address.into(),
            rating: None,
            price_level: None,
            open_now: None,
            phone_number: None,
            website: None,
            cuisine: None,
            place_id: None,
            reviews: Vec::new(),
            photos: Vec::new(),
            distance: centre.distance_to(&position),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    /// Ascending by distance; NaN distances compare equal.
    pub fn cmp_distance(a: &Cafe, b: &Cafe) -> Ordering {
        a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
    }

    /// Descending by rating, unrated cafés treated as 0.
    pub fn cmp_rating_desc(a: &Cafe, b: &Cafe) -> Ordering {
        let ra = a.rating.unwrap_or(0.0);
        let rb = b.rating.unwrap_or(0.0);
        rb.partial_cmp(&ra).unwrap_or(Ordering::Equal)
    }
}

/// Customer review attached to a Google result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub rating: f32,
    pub text: String,
    /// Unix timestamp in seconds
    pub time: i64,
}

/// A resolved user location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Where the returned cafés came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    GooglePlaces,
    #[serde(rename = "openstreetmap")]
    OpenStreetMap,
    EnhancedMock,
    Mock,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::GooglePlaces => "google_places",
            DataSource::OpenStreetMap => "openstreetmap",
            DataSource::EnhancedMock => "enhanced_mock",
            DataSource::Mock => "mock",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result ordering requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Distance,
    Rating,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "rating" => Ok(Self::Rating),
            _ => Err(format!(
                "Invalid sort order: '{s}'. Valid options are: distance, rating"
            )),
        }
    }
}

/// Parameters of a nearby-café search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub centre: Coordinates,
    pub radius_m: u32,
    /// 1-based page number
    pub page: Option<usize>,
    /// Page size; `None` returns everything on one page
    pub per_page: Option<usize>,
    pub sort: SortOrder,
    pub min_rating: Option<f32>,
    pub open_now: Option<bool>,
    /// Visible map area; cafés outside it are dropped
    pub bounds: Option<Bounds>,
}

impl SearchQuery {
    pub fn new(centre: Coordinates, radius_m: u32) -> Self {
        Self {
            centre,
            radius_m,
            page: None,
            per_page: None,
            sort: SortOrder::Distance,
            min_rating: None,
            open_now: None,
            bounds: None,
        }
    }

    pub fn with_page(mut self, page: usize, per_page: usize) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_min_rating(mut self, min_rating: f32) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    pub fn with_open_now(mut self, open_now: bool) -> Self {
        self.open_now = Some(open_now);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// One page of ranked cafés plus provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub cafes: Vec<Cafe>,
    /// Matches across all pages, after filtering
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub source: DataSource,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cafe_serializes_camel_case_and_skips_empty() {
        let centre = Coordinates::new(48.8566, 2.3522);
        let mut cafe = Cafe::new("osm_1", "Bean There", centre, "1 Rue", centre);
        cafe.price_level = Some(2);
        cafe.open_now = Some(true);

        let json = serde_json::to_value(&cafe).unwrap();
        assert_eq!(json["priceLevel"], 2);
        assert_eq!(json["openNow"], true);
        assert_eq!(json["distance"], 0.0);
        assert!(json.get("rating").is_none());
        assert!(json.get("reviews").is_none());
    }

    #[test]
    fn test_data_source_wire_names() {
        assert_eq!(
            serde_json::to_value(DataSource::OpenStreetMap).unwrap(),
            "openstreetmap"
        );
        assert_eq!(
            serde_json::to_value(DataSource::EnhancedMock).unwrap(),
            "enhanced_mock"
        );
        assert_eq!(DataSource::GooglePlaces.to_string(), "google_places");
    }

    #[test]
    fn test_rating_order_puts_unrated_last() {
        let centre = Coordinates::new(0.0, 0.0);
        let mut rated = Cafe::new("a", "A", centre, "", centre);
        rated.rating = Some(4.2);
        let unrated = Cafe::new("b", "B", centre, "", centre);

        assert_eq!(Cafe::cmp_rating_desc(&rated, &unrated), Ordering::Less);
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!("Rating".parse::<SortOrder>(), Ok(SortOrder::Rating));
        assert!("price".parse::<SortOrder>().is_err());
    }
}
