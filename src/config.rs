//! Configuration management for the trip-planning service
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all settings.

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WayfarerConfig {
    /// External provider settings
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Default orchestration settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Periodic refresh settings
    #[serde(default)]
    pub timers: TimersConfig,
    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// External provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Base URL for the geocode / place search provider
    #[serde(default = "default_geocode_base_url")]
    pub geocode_base_url: String,
    /// Base URL for the routing provider
    #[serde(default = "default_routing_base_url")]
    pub routing_base_url: String,
    /// Request timeout in seconds, bounding every external call
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_provider_max_retries")]
    pub max_retries: u32,
    /// User agent sent to providers
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Default orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Radius for nearby-place lookups in meters
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius_m: u32,
    /// Place kind used for nearby-place lookups
    #[serde(default = "default_nearby_kind")]
    pub nearby_kind: String,
    /// Maximum recommendations kept per selection
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    /// Maximum free-text search results
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
}

/// Periodic refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersConfig {
    /// Ambient condition refresh period in seconds
    #[serde(default = "default_weather_refresh")]
    pub weather_refresh_seconds: u64,
    /// Incident polling period in seconds
    #[serde(default = "default_incident_poll")]
    pub incident_poll_seconds: u64,
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// TTL for geocode and nearby responses in hours
    #[serde(default = "default_geocode_ttl")]
    pub geocode_ttl_hours: u32,
    /// TTL for route responses in days
    #[serde(default = "default_route_ttl")]
    pub route_ttl_days: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the snapshot/intent API listens on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

// Default value functions
fn default_geocode_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_routing_base_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_provider_timeout() -> u32 {
    10
}

fn default_provider_max_retries() -> u32 {
    2
}

fn default_user_agent() -> String {
    "wayfarer/0.1.0".to_string()
}

fn default_nearby_radius() -> u32 {
    5000
}

fn default_nearby_kind() -> String {
    "tourist attraction".to_string()
}

fn default_max_recommendations() -> usize {
    5
}

fn default_max_search_results() -> usize {
    10
}

fn default_weather_refresh() -> u64 {
    300
}

fn default_incident_poll() -> u64 {
    60
}

fn default_cache_location() -> String {
    ".wayfarer-cache".to_string()
}

fn default_geocode_ttl() -> u32 {
    24
}

fn default_route_ttl() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            geocode_base_url: default_geocode_base_url(),
            routing_base_url: default_routing_base_url(),
            timeout_seconds: default_provider_timeout(),
            max_retries: default_provider_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            nearby_radius_m: default_nearby_radius(),
            nearby_kind: default_nearby_kind(),
            max_recommendations: default_max_recommendations(),
            max_search_results: default_max_search_results(),
        }
    }
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            weather_refresh_seconds: default_weather_refresh(),
            incident_poll_seconds: default_incident_poll(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
            geocode_ttl_hours: default_geocode_ttl(),
            route_ttl_days: default_route_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for WayfarerConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            defaults: DefaultsConfig::default(),
            timers: TimersConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl WayfarerConfig {
    /// Load configuration from `wayfarer.toml` (optional) layered with
    /// `WAYFARER_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("wayfarer").required(false))
            .add_source(Environment::with_prefix("WAYFARER").separator("__"))
            .build()
            .context("Failed to load configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate settings that would otherwise fail far from their source.
    pub fn validate(&self) -> Result<()> {
        if self.providers.timeout_seconds == 0 {
            bail!("providers.timeout_seconds must be greater than zero");
        }
        if self.defaults.nearby_radius_m == 0 {
            bail!("defaults.nearby_radius_m must be greater than zero");
        }
        if self.timers.weather_refresh_seconds == 0 || self.timers.incident_poll_seconds == 0 {
            bail!("timer periods must be greater than zero");
        }
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!("logging.level must be one of {valid_levels:?}");
        }
        Ok(())
    }
}
