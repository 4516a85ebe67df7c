//! JSON data contract for the rendering collaborator
//!
//! Read endpoints hand out read-only snapshots of the trip state; intent
//! endpoints forward user actions to the planner and overlay. This is the
//! narrow contract the map/panel front end consumes; no rendering happens
//! here.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::conditions::{AmbientConditions, WeatherReport};
use crate::error::TripError;
use crate::itinerary;
use crate::models::{
    BoundingBox, GeoPoint, ItineraryItem, Place, Recommendation, Route, TrafficIncident,
    TransportMode, TripContext,
};
use crate::planner::{TripPlanner, ViewUpdate};
use crate::traffic::{IncidentFeed, TrafficOverlay};

/// Shared handles behind the API surface.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
    pub traffic: Arc<Mutex<TrafficOverlay>>,
    pub incident_feed: Arc<dyn IncidentFeed>,
    pub conditions: Arc<Mutex<AmbientConditions>>,
}

/// Trip error mapped onto an HTTP status plus a display message.
pub struct ApiError(TripError);

impl From<TripError> for ApiError {
    fn from(err: TripError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TripError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            TripError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            TripError::NoRouteFound => StatusCode::NOT_FOUND,
            TripError::NoLocationSelected | TripError::InvalidCoordinate(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        let body = Json(serde_json::json!({
            "error": self.0.to_string(),
            "message": self.0.user_message(),
        }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
}

#[derive(Debug, Deserialize)]
struct ModeRequest {
    mode: TransportMode,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/context", get(get_context))
        .route("/recommendations", get(get_recommendations))
        .route("/itinerary", get(get_itinerary))
        .route("/traffic", get(get_traffic))
        .route("/conditions", get(get_conditions))
        .route("/search", post(post_search))
        .route("/select", post(post_select))
        .route("/mode", post(post_mode))
        .route("/location", post(post_location))
        .route("/directions", post(post_directions))
        .route("/viewport", post(post_viewport))
        .with_state(state)
}

async fn get_context(State(state): State<AppState>) -> Json<TripContext> {
    Json(state.planner.context().await)
}

async fn get_recommendations(State(state): State<AppState>) -> Json<Vec<Recommendation>> {
    Json(state.planner.recommendations().await)
}

async fn get_itinerary(State(state): State<AppState>) -> Json<Vec<ItineraryItem>> {
    let places = state.planner.recommended_places().await;
    let grouped = itinerary::group_by_activity(&places);
    Json(itinerary::generate(Utc::now(), Some(&grouped)))
}

async fn get_traffic(State(state): State<AppState>) -> Json<Vec<TrafficIncident>> {
    Json(state.traffic.lock().await.incidents().to_vec())
}

async fn get_conditions(State(state): State<AppState>) -> Json<WeatherReport> {
    Json(state.conditions.lock().await.report().clone())
}

async fn post_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<Vec<Place>> {
    Json(state.planner.search(&request.query).await)
}

async fn post_select(
    State(state): State<AppState>,
    Json(place): Json<Place>,
) -> Result<StatusCode, ApiError> {
    state.planner.select_place(place).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_mode(State(state): State<AppState>, Json(request): Json<ModeRequest>) -> StatusCode {
    state.planner.set_transport_mode(request.mode).await;
    StatusCode::NO_CONTENT
}

async fn post_location(
    State(state): State<AppState>,
    Json(point): Json<GeoPoint>,
) -> Result<Json<ViewUpdate>, ApiError> {
    Ok(Json(state.planner.set_user_location(point).await?))
}

async fn post_directions(State(state): State<AppState>) -> Result<Json<Route>, ApiError> {
    Ok(Json(state.planner.request_directions().await?))
}

async fn post_viewport(
    State(state): State<AppState>,
    Json(bounds): Json<BoundingBox>,
) -> Json<Vec<TrafficIncident>> {
    let mut overlay = state.traffic.lock().await;
    let visible = overlay
        .update(bounds, state.incident_feed.as_ref())
        .await
        .to_vec();
    Json(visible)
}
