//! Data models for trip orchestration
//!
//! This module contains the data structures shared across the planner,
//! ranking, itinerary and traffic components, plus the trip context that
//! ties them together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point. Latitude must lie in [-90, 90] and
    /// longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(TripError::InvalidCoordinate(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(TripError::InvalidCoordinate(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A geocoded point of interest. Immutable once produced by a search
/// provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Provider-assigned identifier
    pub id: String,
    /// Short display name
    pub display_name: String,
    /// Position of the place
    pub location: GeoPoint,
    /// Provider category (e.g. "attraction", "museum")
    pub category: String,
}

/// How the user is getting around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Car,
    Bike,
    Foot,
}

/// A computed route. Replaced wholesale on every directions request, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Path waypoints from origin to destination
    pub path: Vec<GeoPoint>,
    /// Expected travel time in whole minutes
    pub duration_minutes: u32,
    /// Path length in kilometers
    pub distance_km: f64,
    /// Mode the route was computed for
    pub mode: TransportMode,
}

/// Expected visitor volume at a place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrowdLevel {
    Low,
    Moderate,
    High,
}

/// Recommended time of day for a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BestTime {
    Morning,
    Afternoon,
    Evening,
}

/// A ranked nearby-place suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub place: Place,
    pub rating: f32,
    pub crowd_level: CrowdLevel,
    pub best_time: BestTime,
    /// Geodesic distance weighted by the transport mode, when the user
    /// position is known. Recomputed on every location or mode change.
    pub effective_distance_km: Option<f64>,
}

/// Kind of itinerary activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Dining,
    Sightseeing,
    Shopping,
    Tour,
}

impl ActivityType {
    /// Lowercase keyword used to match provider place categories.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Dining => "dining",
            Self::Sightseeing => "sightseeing",
            Self::Shopping => "shopping",
            Self::Tour => "tour",
        }
    }
}

/// One entry of the generated day plan. Produced fresh on every run of the
/// scheduler and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryItem {
    /// Display label for the start time (e.g. "08:00 AM")
    pub time_label: String,
    /// Activity description, extended with a place name when one matched
    pub activity: String,
    pub activity_type: ActivityType,
    /// Display label for the duration (e.g. "1.5 hours")
    pub duration_label: String,
    /// Nearby place matched to this activity, if any
    pub matched_place: Option<Place>,
    /// Scheduled start instant
    pub starts_at: DateTime<Utc>,
}

impl ItineraryItem {
    /// Whether the activity's start has passed. Derived at render time from
    /// the caller's clock; not part of the stored plan.
    #[must_use]
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.starts_at < now
    }
}

/// Severity of a traffic incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    /// Marker color for map rendering. Presentation only, never used for
    /// ranking.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::High => "#ef4444",
            Self::Moderate => "#f59e0b",
            Self::Low => "#22c55e",
        }
    }
}

/// A traffic or incident report. Lifecycle bound to the current map
/// viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficIncident {
    pub id: String,
    pub location: GeoPoint,
    pub severity: Severity,
    pub description: String,
}

/// Axis-aligned viewport bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl BoundingBox {
    /// Whether the point lies inside the bounds (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.south_west.latitude
            && point.latitude <= self.north_east.latitude
            && point.longitude >= self.south_west.longitude
            && point.longitude <= self.north_east.longitude
    }

    /// Center of the bounds.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            latitude: (self.south_west.latitude + self.north_east.latitude) / 2.0,
            longitude: (self.south_west.longitude + self.north_east.longitude) / 2.0,
        }
    }
}

/// The single authoritative record of the user's current position, selection
/// and route. Exactly one exists per session; all readers receive cloned
/// snapshots.
///
/// Invariant: `active_route`, when present, was computed for the current
/// `(user_location, selected_place, transport_mode)` triple. Any change to
/// one of the three clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripContext {
    pub user_location: Option<GeoPoint>,
    pub selected_place: Option<Place>,
    pub active_route: Option<Route>,
    pub transport_mode: TransportMode,
    pub search_results: Vec<Place>,
}
