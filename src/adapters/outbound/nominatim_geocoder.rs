//! Nominatim Geocoder
//!
//! Implements Geocoder against a Nominatim-compatible search API
//! (OpenStreetMap's public instance by default).
//!
//! See: https://nominatim.org/release-docs/latest/api/Search/

use crate::domain::errors::GeocodeError;
use crate::domain::ports::Geocoder;
use crate::domain::value_objects::Coordinate;
use crate::infrastructure::Throttle;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Public OpenStreetMap Nominatim instance.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// One candidate from a Nominatim search response.
///
/// Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL, without the `/search` path
    pub base_url: String,
    /// Descriptive client identifier required by the usage policy
    pub user_agent: String,
    /// Per-request timeout enforced by the HTTP client
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: concat!("vendor-locator/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Nominatim-backed geocoder.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    throttle: Option<Arc<Throttle>>,
}

impl NominatimGeocoder {
    /// Build a client with the configured identifier and timeout.
    pub fn new(config: NominatimConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            throttle: None,
        })
    }

    /// Pace outbound requests through `throttle`.
    pub fn with_throttle(mut self, throttle: Arc<Throttle>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Issue the search request and decode the candidate list.
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status {
                status: response.status().as_u16(),
            });
        }

        response
            .json::<Vec<Place>>()
            .await
            .map_err(|e| GeocodeError::Malformed(e.to_string()))
    }

    /// Turn the first candidate into a validated coordinate.
    fn parse_place(place: &Place) -> Result<Coordinate, GeocodeError> {
        let lat: f64 = place
            .lat
            .trim()
            .parse()
            .map_err(|_| GeocodeError::Malformed(format!("latitude {:?}", place.lat)))?;
        let lon: f64 = place
            .lon
            .trim()
            .parse()
            .map_err(|_| GeocodeError::Malformed(format!("longitude {:?}", place.lon)))?;

        Coordinate::new(lat, lon).map_err(|e| GeocodeError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        if let Some(throttle) = &self.throttle {
            throttle.acquire().await;
        }

        let places = self.search(query).await?;

        match places.first() {
            Some(place) => Self::parse_place(place).map(Some),
            None => Ok(None),
        }
    }
}
