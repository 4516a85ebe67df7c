//! Wayfarer - location-aware trip planning core
//!
//! This library provides the stateful trip coordinator: it turns map
//! interactions, geolocation updates and external lookups into a consistent
//! route, a ranked recommendation list and a dynamic itinerary. Map
//! rendering, panels and other presentation live outside and consume the
//! snapshots exposed here.

pub mod api;
pub mod cache;
pub mod conditions;
pub mod config;
pub mod error;
pub mod geo;
pub mod itinerary;
pub mod models;
pub mod planner;
pub mod providers;
pub mod recommend;
pub mod ticker;
pub mod traffic;
pub mod web;

// Re-export core types for public API
pub use cache::ResponseCache;
pub use conditions::{AmbientConditions, ConditionSource, RotationSource, WeatherReport};
pub use config::WayfarerConfig;
pub use error::{Result, TripError};
pub use models::{
    BoundingBox, GeoPoint, ItineraryItem, Place, Recommendation, Route, TrafficIncident,
    TransportMode, TripContext,
};
pub use planner::{TripPlanner, ViewUpdate};
pub use providers::{NominatimClient, OsrmClient, PlaceSearch, Routing};
pub use recommend::{PlaceEstimator, RotationEstimator};
pub use ticker::Ticker;
pub use traffic::{IncidentFeed, SimulatedIncidentFeed, TrafficOverlay};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
