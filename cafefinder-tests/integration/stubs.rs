//! Stub upstream services
//!
//! Minimal stand-ins for the Google Maps web services, the Overpass
//! interpreter and Nominatim, serving canned JSON around central Paris.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use cafefinder_core::{CafeFinderConfig, Coordinates};
use serde_json::{Value, json};

pub const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);

/// Address nobody can resolve.
pub const UNKNOWN_ADDRESS: &str = "Nowhere Land";

/// Nothing listens here; connections are refused.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub const API_KEY: &str = "test-key";

type Params = HashMap<String, String>;

/// Request counter plus the last body or header worth asserting on.
#[derive(Clone, Default)]
pub struct Recorder {
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<String>>,
}

impl Recorder {
    fn record(&self, value: impl Into<String>) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = value.into();
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> String {
        self.last.lock().unwrap().clone()
    }
}

/// Serves `app` on an ephemeral port and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Configuration pointing every client at the given stubs.
///
/// Google is keyed only when a base URL is given; Overpass is disabled when
/// `overpass` is `None`.
pub fn config(google: Option<&str>, overpass: Option<&str>, nominatim: &str) -> CafeFinderConfig {
    let mut config = CafeFinderConfig::for_testing();
    if let Some(base) = google {
        config.upstream.google_base_url = base.to_string();
        config.upstream.google_places_api_key = Some(API_KEY.to_string());
        config.upstream.google_maps_api_key = Some(API_KEY.to_string());
    }
    match overpass {
        Some(url) => config.upstream.overpass_url = url.to_string(),
        None => config.upstream.overpass_enabled = false,
    }
    config.upstream.nominatim_url = nominatim.to_string();
    config
}

fn google_place(i: usize) -> Value {
    json!({
        "place_id": format!("gp_{i}"),
        "name": format!("Google Café {i}"),
        "geometry": {"location": {"lat": PARIS.lat + (i as f64 + 1.0) * 0.001, "lng": PARIS.lng}},
        "vicinity": format!("{i} Rue de Rivoli, Paris"),
        "rating": 4.5 - (i % 3) as f64 * 0.5,
        "price_level": 2,
        "opening_hours": {"open_now": i % 2 == 0},
        "photos": [
            {"photo_reference": format!("photo_{i}_a")},
            {"photo_reference": format!("photo_{i}_b")}
        ]
    })
}

/// Google Places and Geocoding.
///
/// Nearby search answers `status` with `results` places; details carry a
/// phone number, a website and five reviews.
pub fn google(status: &'static str, results: usize, nearby: Recorder) -> Router {
    Router::new()
        .route(
            "/maps/api/place/nearbysearch/json",
            get(move |Query(params): Query<Params>| {
                let nearby = nearby.clone();
                async move {
                    nearby.record(format!(
                        "{}|{}|{}",
                        params.get("location").cloned().unwrap_or_default(),
                        params.get("type").cloned().unwrap_or_default(),
                        params.get("key").cloned().unwrap_or_default()
                    ));
                    let places: Vec<Value> = (0..results).map(google_place).collect();
                    Json(json!({"status": status, "results": places}))
                }
            }),
        )
        .route(
            "/maps/api/place/details/json",
            get(|Query(params): Query<Params>| async move {
                let id = params.get("place_id").cloned().unwrap_or_default();
                let reviews: Vec<Value> = (0..5)
                    .map(|r| json!({"author_name": format!("Reviewer {r}"), "rating": 5 - r, "text": "Lovely flat white", "time": 1_700_000_000 + r}))
                    .collect();
                Json(json!({
                    "status": "OK",
                    "result": {
                        "formatted_phone_number": "+33 1 42 60 00 00",
                        "website": format!("https://{id}.example"),
                        "reviews": reviews
                    }
                }))
            }),
        )
        .route(
            "/maps/api/geocode/json",
            get(|Query(params): Query<Params>| async move {
                if params.get("address").map(String::as_str) == Some(UNKNOWN_ADDRESS) {
                    return Json(json!({"status": "ZERO_RESULTS", "results": []}));
                }
                Json(json!({
                    "status": "OK",
                    "results": [{
                        "formatted_address": "Place Charles de Gaulle, 75008 Paris, France",
                        "geometry": {"location": {"lat": 48.8738, "lng": 2.2950}}
                    }]
                }))
            }),
        )
}

/// Google Places whose details endpoint fails with 500 while nearby search
/// answers `results` places.
pub fn google_details_down(results: usize, details: Recorder) -> Router {
    Router::new()
        .route(
            "/maps/api/place/nearbysearch/json",
            get(move || async move {
                let places: Vec<Value> = (0..results).map(google_place).collect();
                Json(json!({"status": "OK", "results": places}))
            }),
        )
        .route(
            "/maps/api/place/details/json",
            get(move |Query(params): Query<Params>| {
                let details = details.clone();
                async move {
                    details.record(params.get("place_id").cloned().unwrap_or_default());
                    (StatusCode::INTERNAL_SERVER_ERROR, "details backend exploded")
                }
            }),
        )
}

/// Overpass interpreter returning `elements` cafés north of [`PARIS`].
pub fn overpass(elements: usize, recorder: Recorder) -> Router {
    Router::new().route(
        "/api/interpreter",
        post(move |body: String| {
            let recorder = recorder.clone();
            async move {
                recorder.record(body);
                let elements: Vec<Value> = (0..elements)
                    .map(|i| {
                        json!({
                            "type": "node",
                            "id": 1000 + i,
                            "lat": PARIS.lat + (i as f64 + 1.0) * 0.0012,
                            "lon": PARIS.lng,
                            "tags": {
                                "amenity": "cafe",
                                "name": format!("OSM Café {i}"),
                                "addr:housenumber": format!("{}", i + 1),
                                "addr:street": "Rue Saint-Honoré",
                                "addr:city": "Paris"
                            }
                        })
                    })
                    .collect();
                Json(json!({"version": 0.6, "elements": elements}))
            }
        }),
    )
}

/// Overpass interpreter returning `elements` nodes that carry tags but no
/// position.
pub fn overpass_without_coordinates(elements: usize, recorder: Recorder) -> Router {
    Router::new().route(
        "/api/interpreter",
        post(move |body: String| {
            let recorder = recorder.clone();
            async move {
                recorder.record(body);
                let elements: Vec<Value> = (0..elements)
                    .map(|i| {
                        json!({
                            "type": "node",
                            "id": 2000 + i,
                            "tags": {"amenity": "cafe", "name": format!("Lost Café {i}")}
                        })
                    })
                    .collect();
                Json(json!({"version": 0.6, "elements": elements}))
            }
        }),
    )
}

/// Overpass interpreter that always answers `status`.
pub fn overpass_status(status: StatusCode, recorder: Recorder) -> Router {
    Router::new().route(
        "/api/interpreter",
        post(move || {
            let recorder = recorder.clone();
            async move {
                recorder.record("");
                (status, "Overpass is overloaded").into_response()
            }
        }),
    )
}

/// Nominatim search and reverse, recording the User-Agent of each call.
pub fn nominatim(recorder: Recorder) -> Router {
    let search_recorder = recorder.clone();
    Router::new()
        .route(
            "/search",
            get(move |headers: HeaderMap, Query(params): Query<Params>| {
                let recorder = search_recorder.clone();
                async move {
                    recorder.record(user_agent(&headers));
                    if params.get("q").map(String::as_str) == Some(UNKNOWN_ADDRESS) {
                        return Json(json!([]));
                    }
                    Json(json!([{
                        "place_id": 1,
                        "lat": "48.8584",
                        "lon": "2.2945",
                        "display_name": "Tour Eiffel, Avenue Anatole France, Paris, France"
                    }]))
                }
            }),
        )
        .route(
            "/reverse",
            get(move |headers: HeaderMap, Query(params): Query<Params>| {
                let recorder = recorder.clone();
                async move {
                    recorder.record(user_agent(&headers));
                    if params.get("lat").map(String::as_str) == Some("0") {
                        return Json(json!({"error": "Unable to geocode"}));
                    }
                    Json(json!({"display_name": "Rue de Rivoli, 75001 Paris, France"}))
                }
            }),
        )
}

/// Nominatim that rejects everything with 503.
pub fn nominatim_down() -> Router {
    Router::new()
        .route("/search", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/reverse", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
