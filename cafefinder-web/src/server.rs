//! API server for CafeFinder
//!
//! Wires the search and geocoding services into an axum router with
//! permissive CORS and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use cafefinder_core::config::CafeFinderConfig;
use cafefinder_core::RuntimeMode;
use cafefinder_search::{CafeSearchService, GeocodingService};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{api_geocode, api_health, api_places, api_reverse_geocode};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub search_service: Arc<CafeSearchService>,
    pub geocoding: Arc<GeocodingService>,
    pub mode: RuntimeMode,
}

impl AppState {
    pub fn new(
        search_service: CafeSearchService,
        geocoding: GeocodingService,
        mode: RuntimeMode,
    ) -> Self {
        Self {
            search_service: Arc::new(search_service),
            geocoding: Arc::new(geocoding),
            mode,
        }
    }

    /// Builds both services from configuration.
    ///
    /// # Errors
    /// Fails when an HTTP client cannot be constructed.
    pub fn from_config(
        config: &CafeFinderConfig,
        mode: RuntimeMode,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let search_service = CafeSearchService::from_config(config)?;
        let geocoding = GeocodingService::from_config(config)?;
        Ok(Self::new(search_service, geocoding, mode))
    }
}

/// API routes with CORS and tracing layers applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/geocode", get(api_geocode))
        .route("/api/reverse-geocode", get(api_reverse_geocode))
        .route("/api/places", get(api_places))
        .route("/api/health", get(api_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the API server until the listener fails.
///
/// # Errors
/// Fails when the configuration is invalid, the services cannot be built or
/// the address cannot be bound.
pub async fn run_server(
    config: CafeFinderConfig,
    mode: RuntimeMode,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let state = AppState::from_config(&config, mode)?;
    let app = router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("CafeFinder API running on http://{address} ({mode} mode)");
    axum::serve(listener, app).await?;
    Ok(())
}
