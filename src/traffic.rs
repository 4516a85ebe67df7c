//! Viewport-scoped traffic incidents
//!
//! The overlay keeps the incident set visible within the current map
//! viewport. Every refresh replaces the whole set; incidents outside the new
//! bounds are dropped, not retained.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{BoundingBox, Severity, TrafficIncident};

/// Source of traffic and incident reports for a map viewport.
#[async_trait]
pub trait IncidentFeed: Send + Sync {
    async fn poll(&self, bounds: &BoundingBox) -> Result<Vec<TrafficIncident>>;
}

/// Incident set for the current viewport.
#[derive(Debug, Default)]
pub struct TrafficOverlay {
    incidents: Vec<TrafficIncident>,
    bounds: Option<BoundingBox>,
}

impl TrafficOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the incident set for a new viewport. On feed failure the
    /// previous set is kept and the failure is only logged.
    pub async fn update(
        &mut self,
        bounds: BoundingBox,
        feed: &dyn IncidentFeed,
    ) -> &[TrafficIncident] {
        self.bounds = Some(bounds);
        match feed.poll(&bounds).await {
            Ok(reported) => {
                let total = reported.len();
                self.incidents = reported
                    .into_iter()
                    .filter(|incident| bounds.contains(&incident.location))
                    .collect();
                debug!(
                    "Incident refresh: {} in view of {} reported",
                    self.incidents.len(),
                    total
                );
            }
            Err(e) => {
                warn!("Incident feed failed, keeping previous set: {e}");
            }
        }
        &self.incidents
    }

    /// Re-poll the current viewport. Idempotent; a no-op until a viewport is
    /// known.
    pub async fn tick(&mut self, feed: &dyn IncidentFeed) {
        if let Some(bounds) = self.bounds {
            self.update(bounds, feed).await;
        }
    }

    #[must_use]
    pub fn incidents(&self) -> &[TrafficIncident] {
        &self.incidents
    }
}

/// Deterministic stand-in feed until a live incident provider is wired up.
/// Emits the canned construction report on every third poll, centered on the
/// viewport, cycling through the severities.
#[derive(Debug, Default)]
pub struct SimulatedIncidentFeed {
    polls: AtomicU64,
}

impl SimulatedIncidentFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

const SEVERITY_CYCLE: [Severity; 3] = [Severity::High, Severity::Moderate, Severity::Low];

#[async_trait]
impl IncidentFeed for SimulatedIncidentFeed {
    async fn poll(&self, bounds: &BoundingBox) -> Result<Vec<TrafficIncident>> {
        let poll = self.polls.fetch_add(1, Ordering::Relaxed);
        if poll % 3 != 0 {
            return Ok(Vec::new());
        }

        let severity = SEVERITY_CYCLE[((poll / 3) % SEVERITY_CYCLE.len() as u64) as usize];
        Ok(vec![TrafficIncident {
            id: format!("sim-{poll}"),
            location: bounds.center(),
            severity,
            description: "Heavy traffic reported on Main Street due to construction work"
                .to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TripError;
    use crate::models::GeoPoint;

    fn bounds(south: f64, west: f64, north: f64, east: f64) -> BoundingBox {
        BoundingBox {
            south_west: GeoPoint {
                latitude: south,
                longitude: west,
            },
            north_east: GeoPoint {
                latitude: north,
                longitude: east,
            },
        }
    }

    fn incident(id: &str, latitude: f64, longitude: f64) -> TrafficIncident {
        TrafficIncident {
            id: id.to_string(),
            location: GeoPoint {
                latitude,
                longitude,
            },
            severity: Severity::Moderate,
            description: "test".to_string(),
        }
    }

    struct FixedFeed(Vec<TrafficIncident>);

    #[async_trait]
    impl IncidentFeed for FixedFeed {
        async fn poll(&self, _bounds: &BoundingBox) -> Result<Vec<TrafficIncident>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenFeed;

    #[async_trait]
    impl IncidentFeed for BrokenFeed {
        async fn poll(&self, _bounds: &BoundingBox) -> Result<Vec<TrafficIncident>> {
            Err(TripError::ProviderUnavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_update_replaces_set_and_drops_out_of_bounds() {
        let mut overlay = TrafficOverlay::new();
        let feed = FixedFeed(vec![
            incident("in-view", 10.5, 20.5),
            incident("outside", 50.0, 50.0),
        ]);

        let visible = overlay.update(bounds(10.0, 20.0, 11.0, 21.0), &feed).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "in-view");

        // A refresh over an empty area replaces, not merges
        let empty = FixedFeed(Vec::new());
        let visible = overlay.update(bounds(10.0, 20.0, 11.0, 21.0), &empty).await;
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn test_feed_failure_keeps_previous_set() {
        let mut overlay = TrafficOverlay::new();
        let feed = FixedFeed(vec![incident("kept", 10.5, 20.5)]);
        overlay.update(bounds(10.0, 20.0, 11.0, 21.0), &feed).await;

        overlay.update(bounds(10.0, 20.0, 11.0, 21.0), &BrokenFeed).await;
        assert_eq!(overlay.incidents().len(), 1);
        assert_eq!(overlay.incidents()[0].id, "kept");
    }

    #[tokio::test]
    async fn test_tick_is_a_noop_without_viewport() {
        let mut overlay = TrafficOverlay::new();
        overlay.tick(&FixedFeed(vec![incident("x", 0.0, 0.0)])).await;
        assert!(overlay.incidents().is_empty());
    }

    #[tokio::test]
    async fn test_simulated_feed_cycles_deterministically() {
        let feed = SimulatedIncidentFeed::new();
        let view = bounds(10.0, 20.0, 11.0, 21.0);

        let first = feed.poll(&view).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].severity, Severity::High);
        assert_eq!(first[0].location, view.center());

        // Two quiet polls between reports
        assert!(feed.poll(&view).await.unwrap().is_empty());
        assert!(feed.poll(&view).await.unwrap().is_empty());
        let second = feed.poll(&view).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].severity, Severity::Moderate);
    }
}
