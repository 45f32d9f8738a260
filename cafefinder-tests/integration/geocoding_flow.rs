//! Integration tests for forward and reverse geocoding

use cafefinder_core::Coordinates;
use cafefinder_search::{GeocodingError, GeocodingService};

use crate::stubs::{self, Recorder, UNKNOWN_ADDRESS, UNREACHABLE};

#[tokio::test]
async fn test_nominatim_geocode_sends_user_agent() {
    let requests = Recorder::default();
    let nominatim = stubs::spawn(stubs::nominatim(requests.clone())).await;

    let geocoding = GeocodingService::from_config(&stubs::config(None, None, &nominatim)).unwrap();
    let location = geocoding.geocode("Eiffel Tower").await.unwrap();

    assert_eq!(location.lat, 48.8584);
    assert_eq!(location.lng, 2.2945);
    assert_eq!(
        location.address.as_deref(),
        Some("Tour Eiffel, Avenue Anatole France, Paris, France")
    );
    assert_eq!(requests.hits(), 1);
    assert!(requests.last().starts_with("CafeFinder/1.0"));
}

#[tokio::test]
async fn test_unknown_address_is_not_found() {
    let nominatim = stubs::spawn(stubs::nominatim(Recorder::default())).await;
    let geocoding = GeocodingService::from_config(&stubs::config(None, None, &nominatim)).unwrap();

    let err = geocoding.geocode(UNKNOWN_ADDRESS).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_nominatim_outage_is_unavailable() {
    let nominatim = stubs::spawn(stubs::nominatim_down()).await;
    let geocoding = GeocodingService::from_config(&stubs::config(None, None, &nominatim)).unwrap();

    let err = geocoding.geocode("Paris").await.unwrap_err();
    assert!(matches!(err, GeocodingError::Unavailable { .. }));

    let err = geocoding
        .reverse_geocode(Coordinates::new(48.86, 2.34))
        .await
        .unwrap_err();
    assert!(matches!(err, GeocodingError::Unavailable { .. }));
}

#[tokio::test]
async fn test_google_geocoding_preferred_when_keyed() {
    let requests = Recorder::default();
    let google = stubs::spawn(stubs::google("OK", 0, Recorder::default())).await;
    let nominatim = stubs::spawn(stubs::nominatim(requests.clone())).await;

    let geocoding =
        GeocodingService::from_config(&stubs::config(Some(&google), None, &nominatim)).unwrap();
    let location = geocoding.geocode("Arc de Triomphe").await.unwrap();

    assert_eq!(location.lat, 48.8738);
    assert_eq!(
        location.address.as_deref(),
        Some("Place Charles de Gaulle, 75008 Paris, France")
    );
    assert_eq!(requests.hits(), 0);
}

#[tokio::test]
async fn test_google_miss_falls_back_to_nominatim() {
    let requests = Recorder::default();
    let google = stubs::spawn(stubs::google("OK", 0, Recorder::default())).await;
    let nominatim = stubs::spawn(stubs::nominatim(requests.clone())).await;

    let geocoding =
        GeocodingService::from_config(&stubs::config(Some(&google), None, &nominatim)).unwrap();
    let err = geocoding.geocode(UNKNOWN_ADDRESS).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(requests.hits(), 1);
}

#[tokio::test]
async fn test_unreachable_google_falls_back_to_nominatim() {
    let nominatim = stubs::spawn(stubs::nominatim(Recorder::default())).await;
    let geocoding =
        GeocodingService::from_config(&stubs::config(Some(UNREACHABLE), None, &nominatim)).unwrap();

    let address = geocoding
        .reverse_geocode(Coordinates::new(48.86, 2.34))
        .await
        .unwrap();
    assert_eq!(address, "Rue de Rivoli, 75001 Paris, France");
}

#[tokio::test]
async fn test_reverse_geocode_without_display_name() {
    let nominatim = stubs::spawn(stubs::nominatim(Recorder::default())).await;
    let geocoding = GeocodingService::from_config(&stubs::config(None, None, &nominatim)).unwrap();

    let address = geocoding
        .reverse_geocode(Coordinates::new(0.0, 12.5))
        .await
        .unwrap();
    assert_eq!(address, "Unknown location");
}
