//! End-to-end planner tests with scripted providers
//!
//! The gated providers below let a test hold one provider response in flight
//! while newer interactions complete, pinning down the stale-response
//! discard behavior deterministically.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use wayfarer::config::DefaultsConfig;
use wayfarer::planner::TripPlanner;
use wayfarer::providers::{PlaceSearch, Routing};
use wayfarer::{GeoPoint, Place, Result, Route, TransportMode, TripError};

fn place(id: &str, latitude: f64, longitude: f64) -> Place {
    Place {
        id: id.to_string(),
        display_name: id.to_string(),
        location: GeoPoint {
            latitude,
            longitude,
        },
        category: "attraction".to_string(),
    }
}

/// Search provider that parks nearby lookups around latitude 10 until
/// released; everything else answers immediately.
struct GatedSearch {
    in_flight: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl PlaceSearch for GatedSearch {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        if query == "slow" {
            self.in_flight.notify_one();
            self.release.notified().await;
            return Ok(vec![place("slow-hit", 10.1, 10.0)]);
        }
        Ok(vec![place("fast-hit", 20.1, 20.0)])
    }

    async fn nearby(&self, center: GeoPoint, _radius_m: u32, _kind: &str) -> Result<Vec<Place>> {
        if center.latitude == 10.0 {
            self.in_flight.notify_one();
            self.release.notified().await;
            return Ok(vec![place("near-a", 10.1, 10.0)]);
        }
        Ok(vec![place("near-b", 20.1, 20.0)])
    }
}

/// Routing provider that parks every call until released.
struct GatedRouting {
    in_flight: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Routing for GatedRouting {
    async fn route(
        &self,
        _origin: GeoPoint,
        _destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<Route> {
        self.in_flight.notify_one();
        self.release.notified().await;
        Ok(Route {
            path: Vec::new(),
            duration_minutes: 7,
            distance_km: 3.2,
            mode,
        })
    }
}

struct ImmediateRouting;

#[async_trait]
impl Routing for ImmediateRouting {
    async fn route(
        &self,
        _origin: GeoPoint,
        _destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<Route> {
        Ok(Route {
            path: Vec::new(),
            duration_minutes: 7,
            distance_km: 3.2,
            mode,
        })
    }
}

struct EmptySearch;

#[async_trait]
impl PlaceSearch for EmptySearch {
    async fn search(&self, _query: &str) -> Result<Vec<Place>> {
        Ok(Vec::new())
    }

    async fn nearby(&self, _center: GeoPoint, _radius_m: u32, _kind: &str) -> Result<Vec<Place>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn superseded_selection_never_overwrites_newer_state() {
    let in_flight = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let planner = Arc::new(TripPlanner::new(
        Arc::new(GatedSearch {
            in_flight: in_flight.clone(),
            release: release.clone(),
        }),
        Arc::new(ImmediateRouting),
        &DefaultsConfig::default(),
    ));

    // Selection A's nearby lookup stalls in flight
    let first = {
        let planner = planner.clone();
        tokio::spawn(async move { planner.select_place(place("a", 10.0, 10.0)).await })
    };
    in_flight.notified().await;

    // Selection B supersedes it and completes
    planner.select_place(place("b", 20.0, 20.0)).await.unwrap();

    // A's response finally arrives and must be dropped
    release.notify_one();
    first.await.unwrap().unwrap();

    let context = planner.context().await;
    assert_eq!(
        context.selected_place.as_ref().map(|p| p.id.as_str()),
        Some("b")
    );
    let recommendations = planner.recommendations().await;
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].place.id, "near-b");
}

#[tokio::test]
async fn superseded_search_never_overwrites_newer_results() {
    let in_flight = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let planner = Arc::new(TripPlanner::new(
        Arc::new(GatedSearch {
            in_flight: in_flight.clone(),
            release: release.clone(),
        }),
        Arc::new(ImmediateRouting),
        &DefaultsConfig::default(),
    ));

    let first = {
        let planner = planner.clone();
        tokio::spawn(async move { planner.search("slow").await })
    };
    in_flight.notified().await;

    planner.search("fast").await;

    release.notify_one();
    // The stalled call still hands its caller its own results...
    let stale = first.await.unwrap();
    assert_eq!(stale[0].id, "slow-hit");

    // ...but the context keeps the most recently issued search
    let context = planner.context().await;
    assert_eq!(context.search_results.len(), 1);
    assert_eq!(context.search_results[0].id, "fast-hit");
}

#[tokio::test]
async fn route_for_a_superseded_mode_is_not_stored() {
    let in_flight = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let planner = Arc::new(TripPlanner::new(
        Arc::new(EmptySearch),
        Arc::new(GatedRouting {
            in_flight: in_flight.clone(),
            release: release.clone(),
        }),
        &DefaultsConfig::default(),
    ));
    planner
        .set_user_location(GeoPoint {
            latitude: 0.0,
            longitude: 0.0,
        })
        .await
        .unwrap();
    planner.select_place(place("dest", 1.0, 1.0)).await.unwrap();

    let directions = {
        let planner = planner.clone();
        tokio::spawn(async move { planner.request_directions().await })
    };
    in_flight.notified().await;

    // The triple changes while the route is in flight
    planner.set_transport_mode(TransportMode::Foot).await;

    release.notify_one();
    let route = directions.await.unwrap().unwrap();
    assert_eq!(route.mode, TransportMode::Car);

    // The stale route must not be stored against the new mode
    let context = planner.context().await;
    assert!(context.active_route.is_none());
    assert_eq!(context.transport_mode, TransportMode::Foot);
}

#[tokio::test]
async fn directions_without_selection_fail_cleanly() {
    let planner = TripPlanner::new(
        Arc::new(EmptySearch),
        Arc::new(ImmediateRouting),
        &DefaultsConfig::default(),
    );

    let err = planner.request_directions().await.unwrap_err();
    assert!(matches!(err, TripError::NoLocationSelected));

    let context = planner.context().await;
    assert!(context.user_location.is_none());
    assert!(context.selected_place.is_none());
    assert!(context.active_route.is_none());
}

#[tokio::test]
async fn full_flow_keeps_route_consistent_with_triple() {
    let planner = TripPlanner::new(
        Arc::new(EmptySearch),
        Arc::new(ImmediateRouting),
        &DefaultsConfig::default(),
    );

    planner
        .set_user_location(GeoPoint {
            latitude: 0.0,
            longitude: 0.0,
        })
        .await
        .unwrap();
    planner.select_place(place("museum", 1.0, 1.0)).await.unwrap();
    planner.request_directions().await.unwrap();
    assert!(planner.context().await.active_route.is_some());

    // Selecting a new destination invalidates the stored route
    planner.select_place(place("park", 2.0, 2.0)).await.unwrap();
    assert!(planner.context().await.active_route.is_none());

    // As does a position update
    planner.request_directions().await.unwrap();
    planner
        .set_user_location(GeoPoint {
            latitude: 0.5,
            longitude: 0.5,
        })
        .await
        .unwrap();
    assert!(planner.context().await.active_route.is_none());
}
