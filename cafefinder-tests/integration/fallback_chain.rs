//! Integration tests for the café source fallback chain

use axum::http::StatusCode;
use cafefinder_search::{CafeSearchService, DataSource, SearchQuery};

use crate::stubs::{self, PARIS, Recorder, UNREACHABLE};

fn query() -> SearchQuery {
    SearchQuery::new(PARIS, 1000)
}

#[tokio::test]
async fn test_google_results_are_enriched_and_win() {
    let nearby = Recorder::default();
    let interpreter = Recorder::default();
    let google = stubs::spawn(stubs::google("OK", 12, nearby.clone())).await;
    let overpass = stubs::spawn(stubs::overpass(9, interpreter.clone())).await;

    let config = stubs::config(Some(&google), Some(&overpass), UNREACHABLE);
    let service = CafeSearchService::from_config(&config).unwrap();
    let outcome = service.search(&query()).await;

    assert_eq!(outcome.source, DataSource::GooglePlaces);
    assert_eq!(interpreter.hits(), 0);
    assert_eq!(nearby.last(), "48.8566,2.3522|cafe|test-key");

    // Only the first ten nearby results get a details lookup.
    assert_eq!(outcome.total, 10);
    let first = &outcome.cafes[0];
    assert_eq!(first.id, "gp_0");
    assert_eq!(first.place_id.as_deref(), Some("gp_0"));
    assert_eq!(first.phone_number.as_deref(), Some("+33 1 42 60 00 00"));
    assert_eq!(first.website.as_deref(), Some("https://gp_0.example"));
    assert_eq!(first.reviews.len(), 3);
    assert_eq!(first.photos, vec!["photo_0_a".to_string()]);
    assert!(outcome.cafes.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn test_failed_details_keep_the_nearby_record() {
    let details = Recorder::default();
    let interpreter = Recorder::default();
    let google = stubs::spawn(stubs::google_details_down(2, details.clone())).await;
    let overpass = stubs::spawn(stubs::overpass(9, interpreter.clone())).await;

    let config = stubs::config(Some(&google), Some(&overpass), UNREACHABLE);
    let outcome = CafeSearchService::from_config(&config)
        .unwrap()
        .search(&query())
        .await;

    assert_eq!(details.hits(), 2);
    assert_eq!(interpreter.hits(), 0);
    assert_eq!(outcome.source, DataSource::GooglePlaces);
    assert_eq!(outcome.total, 2);
    for cafe in &outcome.cafes {
        assert!(cafe.id.starts_with("gp_"));
        assert!(cafe.phone_number.is_none());
        assert!(cafe.website.is_none());
        assert!(cafe.reviews.is_empty());
        assert_eq!(cafe.photos.len(), 1);
    }
}

#[tokio::test]
async fn test_google_error_status_falls_back_to_overpass() {
    let interpreter = Recorder::default();
    let google = stubs::spawn(stubs::google("REQUEST_DENIED", 0, Recorder::default())).await;
    let overpass = stubs::spawn(stubs::overpass(6, interpreter.clone())).await;

    let config = stubs::config(Some(&google), Some(&overpass), UNREACHABLE);
    let outcome = CafeSearchService::from_config(&config)
        .unwrap()
        .search(&query())
        .await;

    assert_eq!(outcome.source, DataSource::OpenStreetMap);
    assert_eq!(interpreter.hits(), 1);
    assert_eq!(outcome.total, 6);
    assert_eq!(outcome.cafes[0].id, "osm_1000");
    assert_eq!(outcome.cafes[0].name, "OSM Café 0");
    assert_eq!(outcome.cafes[0].address, "1, Rue Saint-Honoré, Paris");
}

#[tokio::test]
async fn test_overpass_query_targets_search_area() {
    let interpreter = Recorder::default();
    let overpass = stubs::spawn(stubs::overpass(5, interpreter.clone())).await;

    let config = stubs::config(None, Some(&overpass), UNREACHABLE);
    CafeSearchService::from_config(&config)
        .unwrap()
        .search(&SearchQuery::new(PARIS, 750))
        .await;

    let body = interpreter.last();
    assert!(body.starts_with("[out:json]"));
    assert!(body.contains("node[\"amenity\"=\"cafe\"](around:750,48.8566,2.3522);"));
}

#[tokio::test]
async fn test_sparse_overpass_results_are_topped_up() {
    let overpass = stubs::spawn(stubs::overpass(3, Recorder::default())).await;

    let config = stubs::config(None, Some(&overpass), UNREACHABLE);
    let outcome = CafeSearchService::from_config(&config)
        .unwrap()
        .search(&query())
        .await;

    assert_eq!(outcome.source, DataSource::OpenStreetMap);
    assert_eq!(outcome.total, 8);
    let real = outcome
        .cafes
        .iter()
        .filter(|c| c.id.starts_with("osm_"))
        .count();
    assert_eq!(real, 3);
}

#[tokio::test]
async fn test_empty_overpass_serves_synthetic_cafes() {
    let overpass = stubs::spawn(stubs::overpass(0, Recorder::default())).await;

    let config = stubs::config(None, Some(&overpass), UNREACHABLE);
    let outcome = CafeSearchService::from_config(&config)
        .unwrap()
        .search(&query())
        .await;

    // Every generated café fits in 1 km here, so the whole list is served.
    assert_eq!(outcome.source, DataSource::OpenStreetMap);
    assert_eq!(outcome.total, 15);
    assert!(outcome.cafes.iter().all(|c| c.id.starts_with("enhanced_mock_")));
    assert!(outcome.cafes.iter().all(|c| c.address.ends_with("Paris, France")));
}

#[tokio::test]
async fn test_overpass_elements_without_coordinates_are_topped_up() {
    let interpreter = Recorder::default();
    let overpass =
        stubs::spawn(stubs::overpass_without_coordinates(3, interpreter.clone())).await;

    let mut config = stubs::config(None, Some(&overpass), UNREACHABLE);
    config.synthetic.seed = Some(7);
    let outcome = CafeSearchService::from_config(&config)
        .unwrap()
        .search(&SearchQuery::new(PARIS, 5000))
        .await;

    assert_eq!(interpreter.hits(), 1);
    assert_eq!(outcome.source, DataSource::OpenStreetMap);
    assert!(outcome.message.is_none());
    assert_eq!(outcome.total, 8);
    assert!(outcome.cafes.iter().all(|c| c.id.starts_with("enhanced_mock_")));
}

#[tokio::test]
async fn test_overpass_outage_serves_enhanced_mock() {
    let interpreter = Recorder::default();
    let overpass = stubs::spawn(stubs::overpass_status(
        StatusCode::GATEWAY_TIMEOUT,
        interpreter.clone(),
    ))
    .await;

    let config = stubs::config(None, Some(&overpass), UNREACHABLE);
    let outcome = CafeSearchService::from_config(&config)
        .unwrap()
        .search(&query())
        .await;

    assert_eq!(interpreter.hits(), 1);
    assert_eq!(outcome.source, DataSource::EnhancedMock);
    assert!(outcome.message.is_some());
    assert!(outcome.total > 0);
}

#[tokio::test]
async fn test_unreachable_upstreams_never_fail_the_search() {
    let config = stubs::config(Some(UNREACHABLE), Some(UNREACHABLE), UNREACHABLE);
    let outcome = CafeSearchService::from_config(&config)
        .unwrap()
        .search(&query())
        .await;

    assert_eq!(outcome.source, DataSource::EnhancedMock);
    assert!(outcome.cafes.iter().all(|c| c.distance <= 1000.0));
}

#[tokio::test]
async fn test_seeded_synthetic_data_is_stable() {
    let config = stubs::config(None, None, UNREACHABLE);
    let service = CafeSearchService::from_config(&config).unwrap();

    let first = service.search(&query()).await;
    let second = service.search(&query()).await;

    assert_eq!(first.source, DataSource::Mock);
    assert_eq!(first.cafes, second.cafes);
}
