//! End-to-end tests for the JSON API
//!
//! The real router is served on a local port with every upstream replaced by
//! a stub, and driven through reqwest like the browser front end would.

use cafefinder_core::RuntimeMode;
use cafefinder_web::{AppState, router};
use reqwest::StatusCode;
use serde_json::Value;

use crate::stubs::{self, Recorder, UNKNOWN_ADDRESS, UNREACHABLE};

/// API backed by Overpass returning `elements` cafés and a working Nominatim.
async fn api(elements: usize) -> String {
    let overpass = stubs::spawn(stubs::overpass(elements, Recorder::default())).await;
    let nominatim = stubs::spawn(stubs::nominatim(Recorder::default())).await;
    let config = stubs::config(None, Some(&overpass), &nominatim);

    let state = AppState::from_config(&config, RuntimeMode::Production).unwrap();
    stubs::spawn(router(state)).await
}

async fn get(url: String) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_geocode_endpoint() {
    let base = api(0).await;

    let (status, body) = get(format!("{base}/api/geocode?address=Eiffel%20Tower")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lat"], 48.8584);
    assert_eq!(body["lng"], 2.2945);

    let (status, body) = get(format!("{base}/api/geocode?address={UNKNOWN_ADDRESS}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Location not found");

    let (status, body) = get(format!("{base}/api/geocode?address=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Address parameter is required");
}

#[tokio::test]
async fn test_reverse_geocode_endpoint() {
    let base = api(0).await;

    let (status, body) = get(format!("{base}/api/reverse-geocode?lat=48.86&lng=2.34")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "Rue de Rivoli, 75001 Paris, France");

    let (status, body) = get(format!("{base}/api/reverse-geocode?lng=2.34")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Latitude and longitude parameters are required");
}

#[tokio::test]
async fn test_reverse_geocode_outage_reports_current_location() {
    let config = stubs::config(None, None, UNREACHABLE);
    let state = AppState::from_config(&config, RuntimeMode::Production).unwrap();
    let base = stubs::spawn(router(state)).await;

    let (status, body) = get(format!("{base}/api/reverse-geocode?lat=48.86&lng=2.34")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "Current Location");
}

#[tokio::test]
async fn test_places_endpoint_with_openstreetmap_data() {
    let base = api(7).await;

    let (status, body) = get(format!("{base}/api/places?lat=48.8566&lng=2.3522")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataSource"], "openstreetmap");
    assert_eq!(body["count"], 7);
    assert_eq!(body["total"], 7);
    assert_eq!(body["searchRadius"], 1000);
    assert!(body.get("message").is_none());

    let first = &body["cafes"][0];
    assert_eq!(first["id"], "osm_1000");
    assert!(first["distance"].as_f64().unwrap() > 0.0);
    assert!(first["priceLevel"].is_u64());
    assert!(first["openNow"].is_boolean());
}

#[tokio::test]
async fn test_places_endpoint_filters_and_pages() {
    let base = api(7).await;

    let (_, body) = get(format!(
        "{base}/api/places?lat=48.8566&lng=2.3522&per_page=3&page=3"
    ))
    .await;
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["page"], 3);
    assert_eq!(body["count"], 1);
    assert_eq!(body["cafes"][0]["id"], "osm_1006");

    // Cafés sit every 0.0012° north of the centre; keep the first two.
    let (_, body) = get(format!(
        "{base}/api/places?lat=48.8566&lng=2.3522&north=48.8595&south=48.8566&east=2.36&west=2.35"
    ))
    .await;
    assert_eq!(body["total"], 2);

    // Partial bounds are ignored.
    let (_, body) = get(format!(
        "{base}/api/places?lat=48.8566&lng=2.3522&north=48.8595&south=48.8566"
    ))
    .await;
    assert_eq!(body["total"], 7);
}

#[tokio::test]
async fn test_places_endpoint_rejects_bad_coordinates() {
    let base = api(0).await;

    let (status, body) = get(format!("{base}/api/places?lat=48.8566")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Latitude and longitude parameters are required");

    let (status, body) = get(format!("{base}/api/places?lat=48.8566&lng=200")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Latitude and longitude must be valid coordinates");
}

#[tokio::test]
async fn test_cors_headers_present() {
    let base = api(0).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/api/health"))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "production");
}
