//! Café discovery across unreliable sources
//!
//! Combines a commercial places API, OpenStreetMap and a synthetic generator
//! into one ranked, filtered, paginated list. Upstream failures never surface
//! to the caller: each one degrades to the next source and ultimately to
//! generated data.

use std::sync::Arc;

use cafefinder_core::config::SearchConfig;
use cafefinder_core::{CafeFinderConfig, Coordinates, RuntimeMode};

use crate::errors::PlaceSearchError;
use crate::providers::{CafeProvider, GooglePlacesProvider, OverpassProvider, SyntheticProvider};
use crate::types::{Cafe, DataSource, SearchOutcome, SearchQuery, SortOrder};

/// Message attached when no upstream source was consulted.
pub const SAMPLE_DATA_MESSAGE: &str = "Using sample data - API services unavailable";
/// Message attached when OpenStreetMap failed and generated cafés were served.
pub const MAP_DATA_UNAVAILABLE_MESSAGE: &str = "Using sample data - map data service unavailable";

/// Café search service shared by all request handlers.
#[derive(Debug, Clone)]
pub struct CafeSearchService {
    primary: Option<Arc<dyn CafeProvider>>,
    crowd_sourced: Option<Arc<dyn CafeProvider>>,
    synthetic: SyntheticProvider,
    config: SearchConfig,
}

/// Cafés gathered from the source chain, before ranking.
struct Gathered {
    cafes: Vec<Cafe>,
    source: DataSource,
    message: Option<String>,
}

impl CafeSearchService {
    /// Creates the service from configuration.
    ///
    /// Google Places is consulted only when its API key is set; Overpass only
    /// when enabled.
    ///
    /// # Errors
    /// - `PlaceSearchError::NetworkError` - The HTTP client could not be built
    pub fn from_config(config: &CafeFinderConfig) -> Result<Self, PlaceSearchError> {
        let client = build_http_client(config)?;

        let google = GooglePlacesProvider::new(client.clone(), &config.upstream, &config.search);
        let primary: Option<Arc<dyn CafeProvider>> = if google.is_configured() {
            Some(Arc::new(google))
        } else {
            None
        };

        let crowd_sourced: Option<Arc<dyn CafeProvider>> = if config.upstream.overpass_enabled {
            Some(Arc::new(OverpassProvider::new(
                client,
                &config.upstream,
                SyntheticProvider::new(config.synthetic.clone()),
            )))
        } else {
            None
        };

        Ok(Self {
            primary,
            crowd_sourced,
            synthetic: SyntheticProvider::new(config.synthetic.clone()),
            config: config.search.clone(),
        })
    }

    /// Creates the service appropriate for `mode`.
    ///
    /// # Errors
    /// - `PlaceSearchError::NetworkError` - The HTTP client could not be built
    pub fn from_runtime_mode(mode: RuntimeMode) -> Result<Self, PlaceSearchError> {
        Self::from_config(&mode.config())
    }

    /// Creates the service with explicit sources.
    pub fn with_providers(
        primary: Option<Arc<dyn CafeProvider>>,
        crowd_sourced: Option<Arc<dyn CafeProvider>>,
        synthetic: SyntheticProvider,
        config: SearchConfig,
    ) -> Self {
        Self {
            primary,
            crowd_sourced,
            synthetic,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Clamps a requested radius to the accepted range.
    pub fn effective_radius(&self, radius_m: u32) -> u32 {
        radius_m.clamp(1, self.config.max_radius_m)
    }

    /// Searches for cafés around `query.centre` and returns one page of results.
    pub async fn search(&self, query: &SearchQuery) -> SearchOutcome {
        let radius = self.effective_radius(query.radius_m);
        let Gathered {
            mut cafes,
            source,
            message,
        } = self.gather(query.centre, radius).await;

        tracing::info!(
            "Found {} cafés from {} for location {}",
            cafes.len(),
            source,
            query.centre
        );

        cafes.sort_by(Cafe::cmp_distance);

        for cafe in cafes.iter().take(3) {
            tracing::debug!(
                name = %cafe.name,
                lat = cafe.lat,
                lng = cafe.lng,
                distance = cafe.distance,
                "Nearest café"
            );
        }

        let mut matching = apply_filters(cafes, query);
        if query.sort == SortOrder::Rating {
            matching.sort_by(Cafe::cmp_rating_desc);
        }

        let page = paginate(matching, query.page, query.per_page, self.config.max_per_page);

        SearchOutcome {
            cafes: page.cafes,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
            source,
            message,
        }
    }

    async fn gather(&self, centre: Coordinates, radius_m: u32) -> Gathered {
        if let Some(primary) = &self.primary {
            match primary.nearby_cafes(centre, radius_m).await {
                Ok(cafes) if !cafes.is_empty() => {
                    return Gathered {
                        cafes,
                        source: primary.source(),
                        message: None,
                    };
                }
                Ok(_) => tracing::info!("{} returned no cafés, falling back", primary.source()),
                Err(e) => tracing::warn!("{} failed, falling back: {e}", primary.source()),
            }
        }

        let Some(crowd_sourced) = &self.crowd_sourced else {
            return Gathered {
                cafes: self.synthetic.generate(centre, radius_m),
                source: DataSource::Mock,
                message: Some(SAMPLE_DATA_MESSAGE.to_string()),
            };
        };

        match crowd_sourced.nearby_cafes(centre, radius_m).await {
            Err(e) => {
                tracing::warn!(
                    "{} failed, using synthetic cafés: {e}",
                    crowd_sourced.source()
                );
                Gathered {
                    cafes: self.synthetic.generate(centre, radius_m),
                    source: DataSource::EnhancedMock,
                    message: Some(MAP_DATA_UNAVAILABLE_MESSAGE.to_string()),
                }
            }
            Ok(mut cafes) => {
                if cafes.len() < self.config.min_results {
                    let needed = self.config.top_up_target.saturating_sub(cafes.len());
                    let extra = self.synthetic.generate(centre, radius_m);
                    tracing::debug!(
                        "Only {} cafés found, adding up to {needed} synthetic ones",
                        cafes.len()
                    );
                    cafes.extend(extra.into_iter().take(needed));
                }
                Gathered {
                    cafes,
                    source: crowd_sourced.source(),
                    message: None,
                }
            }
        }
    }
}

fn build_http_client(config: &CafeFinderConfig) -> Result<reqwest::Client, PlaceSearchError> {
    reqwest::Client::builder()
        .timeout(config.upstream.request_timeout)
        .build()
        .map_err(|e| PlaceSearchError::NetworkError {
            reason: format!("Failed to build HTTP client: {e}"),
        })
}

/// Drops cafés failing the rating, open-now or visible-area filters.
pub fn apply_filters(cafes: Vec<Cafe>, query: &SearchQuery) -> Vec<Cafe> {
    cafes
        .into_iter()
        .filter(|cafe| match query.min_rating {
            Some(min) if min > 0.0 => cafe.rating.is_some_and(|r| r >= min),
            _ => true,
        })
        .filter(|cafe| query.open_now != Some(true) || cafe.open_now == Some(true))
        .filter(|cafe| query.bounds.is_none_or(|b| b.contains(cafe.coordinates())))
        .collect()
}

/// One page cut from a ranked list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub cafes: Vec<Cafe>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Cuts `cafes` into pages.
///
/// Without `per_page` everything lands on a single page. Pages are 1-based;
/// a page past the end falls back to the first page.
pub fn paginate(
    cafes: Vec<Cafe>,
    page: Option<usize>,
    per_page: Option<usize>,
    max_per_page: usize,
) -> Page {
    let total = cafes.len();

    let Some(per_page) = per_page.map(|p| p.clamp(1, max_per_page.max(1))) else {
        return Page {
            cafes,
            total,
            page: 1,
            per_page: total,
            total_pages: usize::from(total > 0),
        };
    };

    let total_pages = total.div_ceil(per_page);
    let mut page = page.unwrap_or(1).max(1);
    if page > total_pages {
        page = 1;
    }

    let cafes = cafes
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        cafes,
        total,
        page,
        per_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use cafefinder_core::Bounds;
    use cafefinder_core::config::SyntheticConfig;

    use super::*;
    use crate::providers::MockProvider;

    const CENTRE: Coordinates = Coordinates::new(48.8566, 2.3522);

    fn synthetic() -> SyntheticProvider {
        SyntheticProvider::new(SyntheticConfig {
            seed: Some(7),
            ..SyntheticConfig::default()
        })
    }

    fn service(
        primary: Option<MockProvider>,
        crowd_sourced: Option<MockProvider>,
    ) -> CafeSearchService {
        CafeSearchService::with_providers(
            primary.map(|p| Arc::new(p) as Arc<dyn CafeProvider>),
            crowd_sourced.map(|p| Arc::new(p) as Arc<dyn CafeProvider>),
            synthetic(),
            SearchConfig::default(),
        )
    }

    fn query() -> SearchQuery {
        SearchQuery::new(CENTRE, 1000)
    }

    #[tokio::test]
    async fn test_primary_results_win() {
        let google = MockProvider::new(DataSource::GooglePlaces, 4);
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 9);
        let svc = service(Some(google.clone()), Some(overpass.clone()));

        let outcome = svc.search(&query()).await;

        assert_eq!(outcome.source, DataSource::GooglePlaces);
        assert_eq!(outcome.total, 4);
        assert_eq!(overpass.calls(), 0);
        assert!(outcome.message.is_none());
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_overpass() {
        let google = MockProvider::failing(DataSource::GooglePlaces);
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 6);
        let svc = service(Some(google.clone()), Some(overpass.clone()));

        let outcome = svc.search(&query()).await;

        assert_eq!(google.calls(), 1);
        assert_eq!(overpass.calls(), 1);
        assert_eq!(outcome.source, DataSource::OpenStreetMap);
        assert_eq!(outcome.total, 6);
        assert!(outcome.cafes.iter().all(|c| c.id.starts_with("mock_")));
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back() {
        let google = MockProvider::new(DataSource::GooglePlaces, 0);
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 5);
        let outcome = service(Some(google), Some(overpass)).search(&query()).await;
        assert_eq!(outcome.source, DataSource::OpenStreetMap);
    }

    #[tokio::test]
    async fn test_sparse_overpass_is_topped_up_to_eight() {
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 2);
        let outcome = service(None, Some(overpass)).search(&query()).await;

        assert_eq!(outcome.source, DataSource::OpenStreetMap);
        assert_eq!(outcome.total, 8);
        let real = outcome.cafes.iter().filter(|c| c.id.starts_with("mock_")).count();
        let generated = outcome
            .cafes
            .iter()
            .filter(|c| c.id.starts_with("enhanced_mock_"))
            .count();
        assert_eq!(real, 2);
        assert_eq!(generated, 6);
    }

    #[tokio::test]
    async fn test_five_results_are_not_topped_up() {
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 5);
        let outcome = service(None, Some(overpass)).search(&query()).await;
        assert_eq!(outcome.total, 5);
    }

    #[tokio::test]
    async fn test_empty_overpass_list_is_topped_up_under_osm_label() {
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 0);
        let outcome = service(None, Some(overpass)).search(&query()).await;

        assert_eq!(outcome.source, DataSource::OpenStreetMap);
        assert_eq!(outcome.total, 8);
        assert!(outcome.cafes.iter().all(|c| c.id.starts_with("enhanced_mock_")));
    }

    #[tokio::test]
    async fn test_overpass_failure_uses_enhanced_mock() {
        let overpass = MockProvider::failing(DataSource::OpenStreetMap);
        let outcome = service(None, Some(overpass)).search(&query()).await;

        assert_eq!(outcome.source, DataSource::EnhancedMock);
        assert_eq!(outcome.message.as_deref(), Some(MAP_DATA_UNAVAILABLE_MESSAGE));
        assert!(outcome.total > 0);
    }

    #[tokio::test]
    async fn test_no_sources_uses_mock_with_message() {
        let outcome = service(None, None).search(&query()).await;

        assert_eq!(outcome.source, DataSource::Mock);
        assert_eq!(outcome.message.as_deref(), Some(SAMPLE_DATA_MESSAGE));
    }

    #[tokio::test]
    async fn test_results_sorted_by_distance() {
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 7);
        let outcome = service(None, Some(overpass)).search(&query()).await;

        let distances: Vec<f64> = outcome.cafes.iter().map(|c| c.distance).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(outcome.cafes[0].id, "mock_0");
    }

    #[tokio::test]
    async fn test_rating_sort_and_filters() {
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 9);
        let svc = service(None, Some(overpass));

        let outcome = svc
            .search(&query().with_sort(SortOrder::Rating).with_min_rating(3.5))
            .await;
        assert!(outcome.cafes.iter().all(|c| c.rating.unwrap() >= 3.5));
        let ratings: Vec<f32> = outcome.cafes.iter().map(|c| c.rating.unwrap()).collect();
        assert!(ratings.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(outcome.total, 6);

        let open = svc.search(&query().with_open_now(true)).await;
        assert!(open.cafes.iter().all(|c| c.open_now == Some(true)));
        assert_eq!(open.total, 5);
    }

    #[tokio::test]
    async fn test_bounds_filter() {
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 9);
        let bounds = Bounds {
            north: CENTRE.lat + 0.0025,
            south: CENTRE.lat,
            east: CENTRE.lng + 0.01,
            west: CENTRE.lng - 0.01,
        };
        let outcome = service(None, Some(overpass))
            .search(&query().with_bounds(bounds))
            .await;

        // Steps of 0.0009° north: only the first two fit under +0.0025°.
        assert_eq!(outcome.total, 2);
    }

    #[tokio::test]
    async fn test_pagination_through_search() {
        let overpass = MockProvider::new(DataSource::OpenStreetMap, 9);
        let outcome = service(None, Some(overpass))
            .search(&query().with_page(2, 4))
            .await;

        assert_eq!(outcome.total, 9);
        assert_eq!(outcome.total_pages, 3);
        assert_eq!(outcome.page, 2);
        assert_eq!(outcome.cafes.len(), 4);
        assert_eq!(outcome.cafes[0].id, "mock_4");
    }

    fn cafes(n: usize) -> Vec<Cafe> {
        (0..n)
            .map(|i| Cafe::new(format!("c{i}"), "C", CENTRE, "", CENTRE))
            .collect()
    }

    #[test]
    fn test_paginate_without_page_size_returns_everything() {
        let page = paginate(cafes(12), Some(3), None, 50);
        assert_eq!(page.cafes.len(), 12);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);

        let empty = paginate(Vec::new(), None, None, 50);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let page = paginate(cafes(12), Some(3), Some(5), 50);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.cafes.len(), 2);
        assert_eq!(page.cafes[0].id, "c10");
    }

    #[test]
    fn test_paginate_out_of_range_resets_to_first() {
        let page = paginate(cafes(12), Some(9), Some(5), 50);
        assert_eq!(page.page, 1);
        assert_eq!(page.cafes[0].id, "c0");

        let page = paginate(cafes(12), Some(0), Some(5), 50);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_paginate_clamps_page_size() {
        let page = paginate(cafes(120), None, Some(500), 50);
        assert_eq!(page.per_page, 50);
        assert_eq!(page.cafes.len(), 50);

        let page = paginate(cafes(3), None, Some(0), 50);
        assert_eq!(page.per_page, 1);
    }

    #[test]
    fn test_effective_radius_clamped() {
        let svc = service(None, None);
        assert_eq!(svc.effective_radius(0), 1);
        assert_eq!(svc.effective_radius(80_000), 50_000);
        assert_eq!(svc.effective_radius(1500), 1500);
    }
}
