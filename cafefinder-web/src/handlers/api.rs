//! API handlers for geocoding and café search

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::Json;
use cafefinder_core::{Bounds, Coordinates};
use cafefinder_search::{Cafe, DataSource, SearchQuery, SortOrder};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{
    ApiError, GEOCODE_FAILED, INVALID_COORDINATES, LOCATION_NOT_FOUND, MISSING_ADDRESS,
    MISSING_COORDINATES,
};
use crate::server::AppState;

/// Address reported when reverse geocoding fails for any reason.
pub const FALLBACK_ADDRESS: &str = "Current Location";

type Params = HashMap<String, String>;

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct LocationBody {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacesResponse {
    pub cafes: Vec<Cafe>,
    /// Cafés on this page
    pub count: usize,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub search_radius: u32,
    pub location: LocationBody,
    pub data_source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Non-blank parameter value.
fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(params: &Params, name: &str) -> Option<T> {
    param(params, name).and_then(|v| v.parse().ok())
}

/// `lat` and `lng` as validated coordinates.
fn coordinates(params: &Params) -> Result<Coordinates, ApiError> {
    let (Some(lat), Some(lng)) = (param(params, "lat"), param(params, "lng")) else {
        return Err(ApiError::BadRequest {
            message: MISSING_COORDINATES,
        });
    };

    let invalid = || ApiError::BadRequest {
        message: INVALID_COORDINATES,
    };
    let lat: f64 = lat.parse().map_err(|_| invalid())?;
    let lng: f64 = lng.parse().map_err(|_| invalid())?;
    Coordinates::validated(lat, lng).map_err(|_| invalid())
}

/// Visible map area, only when all four edges are present.
fn bounds(params: &Params) -> Option<Bounds> {
    Some(Bounds {
        north: parsed(params, "north")?,
        south: parsed(params, "south")?,
        east: parsed(params, "east")?,
        west: parsed(params, "west")?,
    })
}

/// `true` in any letter case enables a flag; every other value disables it.
fn flag(params: &Params, name: &str) -> Option<bool> {
    param(params, name).map(|v| v.eq_ignore_ascii_case("true"))
}

pub async fn api_geocode(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let Some(address) = param(&params, "address") else {
        return Err(ApiError::BadRequest {
            message: MISSING_ADDRESS,
        });
    };

    match state.geocoding.geocode(address).await {
        Ok(location) => Ok(Json(GeocodeResponse {
            lat: location.lat,
            lng: location.lng,
            address: location.address.unwrap_or_else(|| address.to_string()),
        })),
        Err(e) if e.is_not_found() => {
            tracing::info!("No geocoding match for '{address}'");
            Err(ApiError::NotFound {
                message: LOCATION_NOT_FOUND,
            })
        }
        Err(e) => {
            tracing::error!("Geocoding error: {e}");
            Err(ApiError::Internal {
                message: GEOCODE_FAILED,
            })
        }
    }
}

pub async fn api_reverse_geocode(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, ApiError> {
    let at = coordinates(&params)?;

    let address = match state.geocoding.reverse_geocode(at).await {
        Ok(address) => address,
        Err(e) => {
            tracing::error!("Reverse geocoding error: {e}");
            FALLBACK_ADDRESS.to_string()
        }
    };

    Ok(Json(json!({ "address": address })))
}

pub async fn api_places(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<PlacesResponse>, ApiError> {
    let centre = coordinates(&params)?;
    let search = &state.search_service;

    let requested = param(&params, "radius")
        .and_then(|r| r.parse::<f64>().ok())
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(0.0, f64::from(u32::MAX)) as u32)
        .unwrap_or(search.config().default_radius_m);
    let radius = search.effective_radius(requested);

    let mut query = SearchQuery::new(centre, radius);
    query.page = parsed(&params, "page");
    query.per_page = parsed(&params, "per_page");
    query.min_rating = parsed(&params, "min_rating");
    query.open_now = flag(&params, "open_now");
    query.bounds = bounds(&params);
    if let Some(sort) = param(&params, "sort") {
        match sort.parse::<SortOrder>() {
            Ok(sort) => query.sort = sort,
            Err(e) => tracing::debug!("{e}; keeping distance order"),
        }
    }

    tracing::info!(
        lat = centre.lat,
        lng = centre.lng,
        radius,
        "Searching for cafés"
    );

    let outcome = search.search(&query).await;

    Ok(Json(PlacesResponse {
        count: outcome.cafes.len(),
        cafes: outcome.cafes,
        total: outcome.total,
        page: outcome.page,
        per_page: outcome.per_page,
        total_pages: outcome.total_pages,
        search_radius: radius,
        location: LocationBody {
            lat: centre.lat,
            lng: centre.lng,
        },
        data_source: outcome.source,
        message: outcome.message,
    }))
}

pub async fn api_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mode": state.mode.as_str(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_flag_only_accepts_true() {
        assert_eq!(flag(&params(&[("open_now", "true")]), "open_now"), Some(true));
        assert_eq!(flag(&params(&[("open_now", " TRUE ")]), "open_now"), Some(true));
        for other in ["1", "yes", "on", "false"] {
            assert_eq!(flag(&params(&[("open_now", other)]), "open_now"), Some(false));
        }
        assert_eq!(flag(&params(&[("open_now", "")]), "open_now"), None);
        assert_eq!(flag(&params(&[]), "open_now"), None);
    }

    #[test]
    fn test_bounds_need_all_edges() {
        let full = params(&[("north", "49"), ("south", "48"), ("east", "3"), ("west", "2")]);
        assert!(bounds(&full).is_some());

        let partial = params(&[("north", "49"), ("south", "48"), ("east", "3")]);
        assert!(bounds(&partial).is_none());
    }
}
