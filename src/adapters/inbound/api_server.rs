//! Vendor Discovery API Server
//!
//! HTTP API used by the directory pages: geocode a place name and search
//! for vendors around it with progressive radius widening.

use crate::application::{VendorSearchQuery, VendorSearchService};
use crate::domain::entities::Vendor;
use crate::domain::errors::ResolveError;
use crate::domain::services::ProximityFilter;
use crate::domain::value_objects::{Coordinate, RadiusTiers};
use crate::infrastructure::CancelHandle;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Query string for `/api/v1/geocode`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Query string for `/api/v1/vendors/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Comma-separated radius tiers in km, e.g. `10,25,50`
    #[serde(default)]
    pub tiers: Option<String>,
}

/// Geocode response.
#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub query: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A vendor in search results, with its distance from the search center.
#[derive(Debug, Serialize)]
pub struct VendorResult {
    #[serde(flatten)]
    pub vendor: Vendor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub location: Option<String>,
    pub center: Option<Coordinate>,
    pub radius_used_km: Option<u32>,
    pub total: usize,
    pub vendors: Vec<VendorResult>,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cached_locations: usize,
    pub listed_vendors: usize,
    pub directory_version: u64,
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub search: Arc<VendorSearchService>,
    /// Fired on shutdown; aborts in-flight geocoding
    pub shutdown: CancelHandle,
}

impl ApiState {
    pub fn new(search: Arc<VendorSearchService>, shutdown: CancelHandle) -> Self {
        Self { search, shutdown }
    }
}

/// Build the API router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(health_handler))
        // Place name -> coordinate
        .route("/api/v1/geocode", get(geocode_handler))
        // Vendors near a place
        .route("/api/v1/vendors/search", get(search_handler))
        .with_state(state)
}

/// API Server for vendor discovery.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, state: ApiState) -> Self {
        Self { listen_addr, state }
    }

    /// Get shared state for use by other components.
    pub fn state(&self) -> ApiState {
        self.state.clone()
    }

    /// Run the API server until the shutdown handle fires.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.state.clone())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("vendor discovery API listening on {}", self.listen_addr);

        let shutdown = self.state.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!("vendor discovery API stopped");
        Ok(())
    }
}

/// Map a resolver failure to a status code and JSON body.
///
/// "Not found" and "try again" must stay distinguishable for the client.
fn resolve_error_response(err: &ResolveError) -> (StatusCode, Json<serde_json::Value>) {
    let (status, code, message) = match err {
        ResolveError::EmptyInput => (
            StatusCode::BAD_REQUEST,
            "empty_location",
            "Please enter a location".to_string(),
        ),
        ResolveError::NoMatch => (
            StatusCode::NOT_FOUND,
            "location_not_found",
            "Location not found".to_string(),
        ),
        ResolveError::Service(e) => (
            StatusCode::BAD_GATEWAY,
            "geocoder_unavailable",
            format!("Location lookup failed ({}), please try again", e),
        ),
        ResolveError::Timeout(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            "geocoder_timeout",
            "Location lookup timed out, please try again".to_string(),
        ),
        ResolveError::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            "cancelled",
            "Server is shutting down, please try again".to_string(),
        ),
    };

    (
        status,
        Json(serde_json::json!({
            "error": code,
            "message": message,
        })),
    )
}

// Handler functions

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_locations: state.search.resolver().cached_locations(),
        listed_vendors: state.search.listed_count().await,
        directory_version: state.search.directory_version().await,
    };
    Json(response)
}

async fn geocode_handler(
    State(state): State<ApiState>,
    Query(params): Query<GeocodeParams>,
) -> Response {
    let query = params.q.unwrap_or_default();

    match state
        .search
        .resolver()
        .resolve_with_cancel(&query, &state.shutdown)
        .await
    {
        Ok(coordinate) => {
            let response = GeocodeResponse {
                query,
                latitude: coordinate.latitude(),
                longitude: coordinate.longitude(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => resolve_error_response(&e).into_response(),
    }
}

async fn search_handler(
    State(state): State<ApiState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let tiers = match params
        .tiers
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::parse::<RadiusTiers>)
    {
        Some(Ok(tiers)) => Some(tiers),
        Some(Err(e)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "invalid_tiers",
                    "message": e.to_string(),
                })),
            )
                .into_response();
        }
        None => None,
    };

    let query = VendorSearchQuery {
        location: params.location.clone(),
        category: params.category,
        tiers,
    };

    match state
        .search
        .search_with_cancel(&query, &state.shutdown)
        .await
    {
        Ok(outcome) => {
            let vendors: Vec<VendorResult> = outcome
                .vendors
                .into_iter()
                .map(|vendor| VendorResult {
                    distance_km: outcome
                        .center
                        .and_then(|c| ProximityFilter::distance_to(c, &vendor)),
                    vendor,
                })
                .collect();

            let response = SearchResponse {
                location: params.location,
                center: outcome.center,
                radius_used_km: outcome.radius_used_km,
                total: vendors.len(),
                vendors,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => resolve_error_response(&e).into_response(),
    }
}
