//! Trip orchestration: the single owner of [`TripContext`]
//!
//! All state mutation goes through [`TripPlanner`]; every other component
//! reads cloned snapshots. Mutation is serialized behind one async mutex,
//! and provider calls run outside the lock. Each outstanding request carries
//! a generation number: a response whose generation no longer matches the
//! current one belongs to a superseded interaction and is discarded instead
//! of overwriting newer state.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::DefaultsConfig;
use crate::error::{Result, TripError};
use crate::models::{GeoPoint, Place, Recommendation, Route, TransportMode, TripContext};
use crate::providers::{PlaceSearch, Routing};
use crate::recommend::{self, PlaceEstimator, RotationEstimator};

/// Side effect reported to the rendering collaborator, never performed here.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum ViewUpdate {
    None,
    /// Recenter the map on the user position
    Recenter(GeoPoint),
}

#[derive(Default)]
struct PlannerState {
    context: TripContext,
    recommendations: Vec<Recommendation>,
    /// Bumped on every `select_place`; tags nearby lookups
    selection_generation: u64,
    /// Bumped on every `search`; tags free-text lookups
    search_generation: u64,
    /// Bumped whenever the (location, selection, mode) triple changes;
    /// tags directions requests
    route_generation: u64,
}

impl PlannerState {
    fn invalidate_route(&mut self) {
        self.context.active_route = None;
        self.route_generation += 1;
    }
}

/// Stateful coordinator turning user intents and provider responses into a
/// consistent trip context, recommendation list and route.
pub struct TripPlanner {
    place_search: Arc<dyn PlaceSearch>,
    routing: Arc<dyn Routing>,
    estimator: Box<dyn PlaceEstimator>,
    nearby_radius_m: u32,
    nearby_kind: String,
    max_recommendations: usize,
    state: Mutex<PlannerState>,
}

impl TripPlanner {
    pub fn new(
        place_search: Arc<dyn PlaceSearch>,
        routing: Arc<dyn Routing>,
        defaults: &DefaultsConfig,
    ) -> Self {
        Self {
            place_search,
            routing,
            estimator: Box::new(RotationEstimator),
            nearby_radius_m: defaults.nearby_radius_m,
            nearby_kind: defaults.nearby_kind.clone(),
            max_recommendations: defaults.max_recommendations,
            state: Mutex::new(PlannerState::default()),
        }
    }

    /// Swap the rating estimator (e.g. for a live scoring feed).
    #[must_use]
    pub fn with_estimator(mut self, estimator: Box<dyn PlaceEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Record a device position update.
    ///
    /// Out-of-range coordinates are rejected before any state change. A
    /// position change invalidates the active route and recomputes the
    /// recommendation distances locally. When no place is selected the
    /// caller is asked to recenter the view.
    pub async fn set_user_location(&self, point: GeoPoint) -> Result<ViewUpdate> {
        let point = GeoPoint::new(point.latitude, point.longitude)?;

        let mut state = self.state.lock().await;
        state.context.user_location = Some(point);
        state.invalidate_route();

        let origin = state.context.user_location;
        let mode = state.context.transport_mode;
        recommend::reweigh(&mut state.recommendations, origin, mode);

        if state.context.selected_place.is_none() {
            Ok(ViewUpdate::Recenter(point))
        } else {
            Ok(ViewUpdate::None)
        }
    }

    /// Select a destination and refresh the nearby recommendations around
    /// it.
    ///
    /// The refresh is tagged with the selection generation taken at call
    /// time; if another selection supersedes this one while the lookup is in
    /// flight, the late response is dropped. A provider failure degrades to
    /// an empty recommendation list for the new selection.
    pub async fn select_place(&self, place: Place) -> Result<()> {
        let generation = {
            let mut state = self.state.lock().await;
            state.selection_generation += 1;
            state.context.selected_place = Some(place.clone());
            state.invalidate_route();
            state.selection_generation
        };

        let nearby = match self
            .place_search
            .nearby(place.location, self.nearby_radius_m, &self.nearby_kind)
            .await
        {
            Ok(places) => places,
            Err(e) if e.is_provider_failure() => {
                warn!("Nearby lookup failed for {}: {}", place.display_name, e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut state = self.state.lock().await;
        if state.selection_generation != generation {
            debug!(
                "Dropping stale nearby response for {} (generation {} superseded by {})",
                place.display_name, generation, state.selection_generation
            );
            return Ok(());
        }

        let shortlist: Vec<Place> = nearby
            .into_iter()
            .take(self.max_recommendations)
            .collect();
        let origin = state.context.user_location;
        let mode = state.context.transport_mode;
        state.recommendations =
            recommend::rank(shortlist, origin, mode, self.estimator.as_ref());
        Ok(())
    }

    /// Free-text place search. Results land in the context under their own
    /// generation guard, so of two racing searches only the most recently
    /// issued one populates the context. Provider failures degrade to an
    /// empty result.
    pub async fn search(&self, query: &str) -> Vec<Place> {
        let generation = {
            let mut state = self.state.lock().await;
            state.search_generation += 1;
            state.search_generation
        };

        let results = match self.place_search.search(query).await {
            Ok(places) => places,
            Err(e) => {
                warn!("Place search failed for '{query}': {e}");
                Vec::new()
            }
        };

        let mut state = self.state.lock().await;
        if state.search_generation == generation {
            state.context.search_results = results.clone();
        } else {
            debug!("Dropping stale search response for '{query}'");
        }
        results
    }

    /// Change the transport mode. Invalidates the active route and
    /// recomputes every recommendation distance from the cached places; no
    /// network calls.
    pub async fn set_transport_mode(&self, mode: TransportMode) {
        let mut state = self.state.lock().await;
        if state.context.transport_mode == mode {
            return;
        }
        state.context.transport_mode = mode;
        state.invalidate_route();

        let origin = state.context.user_location;
        recommend::reweigh(&mut state.recommendations, origin, mode);
    }

    /// Request directions from the user position to the selected place.
    ///
    /// Requires both endpoints; fails with [`TripError::NoLocationSelected`]
    /// otherwise, leaving the context untouched. No retry happens here; the
    /// caller decides. The route is stored only if the (location, selection,
    /// mode) triple is still the one it was computed for.
    pub async fn request_directions(&self) -> Result<Route> {
        let (origin, destination, mode, generation) = {
            let state = self.state.lock().await;
            let origin = state
                .context
                .user_location
                .ok_or(TripError::NoLocationSelected)?;
            let destination = state
                .context
                .selected_place
                .as_ref()
                .ok_or(TripError::NoLocationSelected)?
                .location;
            (
                origin,
                destination,
                state.context.transport_mode,
                state.route_generation,
            )
        };

        let route = self.routing.route(origin, destination, mode).await?;

        let mut state = self.state.lock().await;
        if state.route_generation == generation {
            state.context.active_route = Some(route.clone());
        } else {
            debug!("Route response arrived for a superseded trip context; not stored");
        }
        Ok(route)
    }

    /// Read-only snapshot of the trip context.
    pub async fn context(&self) -> TripContext {
        self.state.lock().await.context.clone()
    }

    /// Read-only snapshot of the current recommendations.
    pub async fn recommendations(&self) -> Vec<Recommendation> {
        self.state.lock().await.recommendations.clone()
    }

    /// Places behind the current recommendations, for consumers that only
    /// need the raw candidates (e.g. itinerary annotation).
    pub async fn recommended_places(&self) -> Vec<Place> {
        self.state
            .lock()
            .await
            .recommendations
            .iter()
            .map(|r| r.place.clone())
            .collect()
    }
}
