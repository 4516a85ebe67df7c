use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use wayfarer::api::AppState;
use wayfarer::conditions::{AmbientConditions, RotationSource};
use wayfarer::config::{LoggingConfig, WayfarerConfig};
use wayfarer::planner::TripPlanner;
use wayfarer::providers::{NominatimClient, OsrmClient};
use wayfarer::ticker::Ticker;
use wayfarer::traffic::{IncidentFeed, SimulatedIncidentFeed, TrafficOverlay};
use wayfarer::{ResponseCache, web};

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = WayfarerConfig::load()?;
    init_tracing(&config.logging)?;

    let cache = ResponseCache::open(&config.cache.location)
        .with_context(|| format!("Failed to open cache at {}", config.cache.location))?;

    let place_search = Arc::new(NominatimClient::new(&config, cache.clone())?);
    let routing = Arc::new(OsrmClient::new(&config, cache)?);
    let planner = Arc::new(TripPlanner::new(place_search, routing, &config.defaults));

    let traffic = Arc::new(Mutex::new(TrafficOverlay::new()));
    let incident_feed: Arc<dyn IncidentFeed> = Arc::new(SimulatedIncidentFeed::new());
    let conditions = Arc::new(Mutex::new(AmbientConditions::new(Box::new(
        RotationSource::new(),
    ))));

    // Periodic refreshes; both tickers die with this scope on shutdown
    let _weather_ticker = Ticker::spawn(
        Duration::from_secs(config.timers.weather_refresh_seconds),
        {
            let conditions = conditions.clone();
            move || {
                let conditions = conditions.clone();
                async move {
                    conditions.lock().await.tick();
                }
            }
        },
    );
    let _incident_ticker = Ticker::spawn(
        Duration::from_secs(config.timers.incident_poll_seconds),
        {
            let traffic = traffic.clone();
            let feed = incident_feed.clone();
            move || {
                let traffic = traffic.clone();
                let feed = feed.clone();
                async move {
                    traffic.lock().await.tick(feed.as_ref()).await;
                }
            }
        },
    );

    let state = AppState {
        planner,
        traffic,
        incident_feed,
        conditions,
    };
    web::run(state, config.server.port).await
}
