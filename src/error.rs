//! Error types for the trip-orchestration core

use thiserror::Error;

/// Failure kinds surfaced by trip orchestration.
///
/// Provider-facing variants (`ProviderUnavailable`, `RateLimited`,
/// `NoRouteFound`) are degraded locally by the orchestrator: the last
/// known-good trip state is kept and only the failure kind is reported.
/// `NoLocationSelected` and `InvalidCoordinate` are caller-usage errors and
/// are reported immediately without retry.
#[derive(Error, Debug)]
pub enum TripError {
    /// External provider unreachable or answered unusably
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider asked us to back off
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Routing provider found no path between the requested points
    #[error("no route found")]
    NoRouteFound,

    /// Directions requested before both endpoints were known
    #[error("no location selected")]
    NoLocationSelected,

    /// Coordinate outside the valid latitude/longitude range
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripError>;

impl TripError {
    /// Get a user-friendly message for display surfaces.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ProviderUnavailable(_) => {
                "Unable to reach the map services. Please check your internet connection."
                    .to_string()
            }
            Self::RateLimited(_) => {
                "The map services are busy right now. Please try again in a moment.".to_string()
            }
            Self::NoRouteFound => {
                "No route could be found to the selected destination.".to_string()
            }
            Self::NoLocationSelected => {
                "Select a destination and allow location access before requesting directions."
                    .to_string()
            }
            Self::InvalidCoordinate(detail) => format!("Invalid coordinate: {detail}"),
        }
    }

    /// True for failures the orchestrator degrades on instead of treating as
    /// caller mistakes.
    #[must_use]
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::NoRouteFound
        )
    }
}
