//! Nominatim geocoding and point-of-interest search client.

use std::time::Duration;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::config::WayfarerConfig;
use crate::error::Result;
use crate::models::{GeoPoint, Place};
use crate::providers::{PlaceSearch, get_json, http_client};

/// Place search client backed by the Nominatim HTTP API.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    cache: ResponseCache,
    max_retries: u32,
    max_results: usize,
    response_ttl: Duration,
}

/// One record of a Nominatim search response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimRecord {
    place_id: u64,
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl NominatimRecord {
    /// Convert to a [`Place`], skipping records with unparseable or
    /// out-of-range coordinates.
    fn into_place(self) -> Option<Place> {
        let latitude: f64 = self.lat.parse().ok()?;
        let longitude: f64 = self.lon.parse().ok()?;
        let location = GeoPoint::new(latitude, longitude).ok()?;

        // Nominatim display names are full addresses; keep the leading
        // segment as the short name.
        let display_name = self
            .display_name
            .split(',')
            .next()
            .unwrap_or(&self.display_name)
            .trim()
            .to_string();

        Some(Place {
            id: self.place_id.to_string(),
            display_name,
            location,
            category: self.kind.unwrap_or_else(|| "attraction".to_string()),
        })
    }
}

impl NominatimClient {
    /// Create a new client from configuration.
    pub fn new(config: &WayfarerConfig, cache: ResponseCache) -> AnyResult<Self> {
        let client = http_client(config.providers.timeout_seconds, &config.providers.user_agent)?;
        Ok(Self {
            client,
            base_url: config.providers.geocode_base_url.clone(),
            cache,
            max_retries: config.providers.max_retries,
            max_results: config.defaults.max_search_results,
            response_ttl: Duration::from_secs(u64::from(config.cache.geocode_ttl_hours) * 3600),
        })
    }

    async fn fetch_places(&self, cache_key: &str, url: &str) -> Result<Vec<Place>> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<Place>>(cache_key).await {
            debug!("Serving cached places for {cache_key}");
            return Ok(cached);
        }

        let records: Vec<NominatimRecord> =
            get_json(&self.client, url, self.max_retries).await?;
        let places: Vec<Place> = records
            .into_iter()
            .filter_map(NominatimRecord::into_place)
            .collect();

        info!("Found {} places for {cache_key}", places.len());

        if let Err(e) = self
            .cache
            .put(cache_key, places.clone(), self.response_ttl)
            .await
        {
            debug!("Cache write failed for {cache_key}: {e}");
        }
        Ok(places)
    }
}

#[async_trait]
impl PlaceSearch for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        let cache_key = format!("search:{query}");
        let url = format!(
            "{}/search?format=json&limit={}&q={}",
            self.base_url,
            self.max_results,
            urlencoding::encode(query)
        );
        self.fetch_places(&cache_key, &url).await
    }

    async fn nearby(&self, center: GeoPoint, radius_m: u32, kind: &str) -> Result<Vec<Place>> {
        let cache_key = format!(
            "nearby:{:.3}:{:.3}:{}:{}",
            center.latitude, center.longitude, radius_m, kind
        );
        let url = format!(
            "{}/search?format=json&limit={}&q={}&lat={}&lon={}&radius={}",
            self.base_url,
            self.max_results,
            urlencoding::encode(kind),
            center.latitude,
            center.longitude,
            radius_m
        );
        self.fetch_places(&cache_key, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lat: &str, lon: &str, display_name: &str) -> NominatimRecord {
        NominatimRecord {
            place_id: 42,
            lat: lat.to_string(),
            lon: lon.to_string(),
            display_name: display_name.to_string(),
            kind: Some("museum".to_string()),
        }
    }

    #[test]
    fn test_record_conversion() {
        let place = record("48.8606", "2.3376", "Louvre Museum, 1st Arrondissement, Paris")
            .into_place()
            .unwrap();

        assert_eq!(place.id, "42");
        assert_eq!(place.display_name, "Louvre Museum");
        assert_eq!(place.category, "museum");
        assert!((place.location.latitude - 48.8606).abs() < 1e-9);
        assert!((place.location.longitude - 2.3376).abs() < 1e-9);
    }

    #[test]
    fn test_record_without_kind_defaults_to_attraction() {
        let mut raw = record("1.0", "2.0", "Somewhere");
        raw.kind = None;
        assert_eq!(raw.into_place().unwrap().category, "attraction");
    }

    #[test]
    fn test_unparseable_coordinates_are_skipped() {
        assert!(record("not-a-number", "2.0", "Bad").into_place().is_none());
    }

    #[test]
    fn test_out_of_range_coordinates_are_skipped() {
        assert!(record("91.0", "2.0", "Off the map").into_place().is_none());
        assert!(record("0.0", "181.0", "Off the map").into_place().is_none());
    }
}
