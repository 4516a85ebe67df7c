//! External provider interfaces and shared HTTP plumbing
//!
//! The orchestrator never computes routes or geocodes itself; it talks to
//! external providers through the narrow traits defined here. Concrete
//! clients live in submodules and map provider failures onto the core
//! error taxonomy.

pub mod nominatim;
pub mod osrm;

use std::time::Duration;

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Result, TripError};
use crate::models::{GeoPoint, Place, Route, TransportMode};

pub use nominatim::NominatimClient;
pub use osrm::OsrmClient;

/// Geocoding and point-of-interest lookup provider.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Free-text place search.
    async fn search(&self, query: &str) -> Result<Vec<Place>>;

    /// Points of interest of `kind` within `radius_m` of `center`.
    async fn nearby(&self, center: GeoPoint, radius_m: u32, kind: &str) -> Result<Vec<Place>>;
}

/// Turn-by-turn routing provider.
#[async_trait]
pub trait Routing: Send + Sync {
    /// Compute a route between two points for the given transport mode.
    async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<Route>;
}

/// Build the HTTP client shared by provider implementations. The timeout
/// bounds every external call so a silent provider cannot stall the session.
pub(crate) fn http_client(timeout_seconds: u32, user_agent: &str) -> AnyResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(user_agent)
        .build()
        .context("Failed to create HTTP client")
}

/// GET a JSON document with bounded retries and exponential backoff.
///
/// HTTP 429 maps to [`TripError::RateLimited`]; transport failures and
/// server errors map to [`TripError::ProviderUnavailable`] once retries are
/// exhausted. Client errors other than 429 are not retried.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    max_retries: u32,
) -> Result<T> {
    let max_attempts = max_retries + 1;
    let mut attempt = 0;

    loop {
        debug!(
            "HTTP request (attempt {}/{}): {}",
            attempt + 1,
            max_attempts,
            url
        );

        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.json::<T>().await.map_err(|e| {
                        TripError::ProviderUnavailable(format!("invalid response body: {e}"))
                    });
                }
                if status.as_u16() == 429 {
                    warn!("Rate limited by provider: {}", url);
                    return Err(TripError::RateLimited("HTTP 429 from provider".to_string()));
                }
                warn!("HTTP {} on attempt {}: {}", status, attempt + 1, url);
                if status.is_client_error() || attempt + 1 >= max_attempts {
                    return Err(TripError::ProviderUnavailable(format!(
                        "HTTP {status} after {} attempts",
                        attempt + 1
                    )));
                }
            }
            Err(e) => {
                warn!("Network error on attempt {}: {}", attempt + 1, e);
                if attempt + 1 >= max_attempts {
                    return Err(TripError::ProviderUnavailable(format!(
                        "network error after {} attempts: {e}",
                        attempt + 1
                    )));
                }
            }
        }

        let backoff = Duration::from_millis(500 * 2_u64.pow(attempt));
        tokio::time::sleep(backoff).await;
        attempt += 1;
    }
}
