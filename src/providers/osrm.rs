//! OSRM directions client.

use std::time::Duration;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use rand::RngExt;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::config::WayfarerConfig;
use crate::error::{Result, TripError};
use crate::models::{GeoPoint, Route, TransportMode};
use crate::providers::{Routing, get_json, http_client};

/// Routing client backed by the OSRM HTTP API.
pub struct OsrmClient {
    client: reqwest::Client,
    base_url: String,
    cache: ResponseCache,
    max_retries: u32,
    route_ttl: Duration,
}

/// Profile string the provider expects for each transport mode.
fn profile(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Car => "car",
        TransportMode::Bike => "bike",
        TransportMode::Foot => "foot",
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Seconds
    duration: f64,
    /// Meters
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON positions, longitude first
    coordinates: Vec<[f64; 2]>,
}

/// Extract a [`Route`] from a decoded provider response.
///
/// Anything other than `code == "Ok"` with at least one route means the
/// provider could not connect the two points.
fn parse_response(response: OsrmResponse, mode: TransportMode) -> Result<Route> {
    if response.code != "Ok" {
        return Err(TripError::NoRouteFound);
    }
    let best = response
        .routes
        .into_iter()
        .next()
        .ok_or(TripError::NoRouteFound)?;

    let path: Vec<GeoPoint> = best
        .geometry
        .coordinates
        .iter()
        .filter_map(|&[lon, lat]| GeoPoint::new(lat, lon).ok())
        .collect();

    Ok(Route {
        path,
        duration_minutes: (best.duration / 60.0).round() as u32,
        distance_km: best.distance / 1000.0,
        mode,
    })
}

impl OsrmClient {
    /// Create a new client from configuration.
    pub fn new(config: &WayfarerConfig, cache: ResponseCache) -> AnyResult<Self> {
        let client = http_client(config.providers.timeout_seconds, &config.providers.user_agent)?;
        Ok(Self {
            client,
            base_url: config.providers.routing_base_url.clone(),
            cache,
            max_retries: config.providers.max_retries,
            route_ttl: Duration::from_secs(u64::from(config.cache.route_ttl_days) * 24 * 3600),
        })
    }
}

#[async_trait]
impl Routing for OsrmClient {
    async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<Route> {
        let key = format!(
            "route:{}:{:.5},{:.5}:{:.5},{:.5}",
            profile(mode),
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude
        );

        if let Ok(Some(cached)) = self.cache.get::<Route>(&key).await {
            debug!("Serving cached route for {key}");
            return Ok(cached);
        }

        // OSRM expects lon,lat pairs in the path
        let url = format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url,
            profile(mode),
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude
        );

        let response: OsrmResponse = get_json(&self.client, &url, self.max_retries).await?;
        let route = parse_response(response, mode)?;

        info!(
            "Computed {} route: {:.1}km, {} minutes",
            profile(mode),
            route.distance_km,
            route.duration_minutes
        );

        // Jitter the TTL so cached routes do not all expire at once
        let jitter: f32 = rand::rng().random_range(0.9..1.1);
        if let Err(e) = self
            .cache
            .put(&key, route.clone(), self.route_ttl.mul_f32(jitter))
            .await
        {
            debug!("Route cache write failed: {e}");
        }
        Ok(route)
    }
}
