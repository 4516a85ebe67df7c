//! Pure geodesic helpers: great-circle distance, transport-mode weighting
//! and display formatting. No I/O, no failure modes.

use crate::models::{GeoPoint, TransportMode};

/// Great-circle distance in kilometers (Earth radius 6371 km).
#[must_use]
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: a.latitude,
            longitude: a.longitude,
        },
        haversine::Location {
            latitude: b.latitude,
            longitude: b.longitude,
        },
        haversine::Units::Kilometers,
    )
}

/// Expected travel-time inflation per transport mode. Models travel burden,
/// not physical distance.
#[must_use]
pub fn mode_multiplier(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Car => 1.0,
        TransportMode::Bike => 1.2,
        TransportMode::Foot => 1.5,
    }
}

/// Geodesic distance weighted by the transport-mode multiplier.
#[must_use]
pub fn effective_distance_km(a: &GeoPoint, b: &GeoPoint, mode: TransportMode) -> f64 {
    haversine_km(a, b) * mode_multiplier(mode)
}

/// Sub-kilometer values render as whole meters, everything else as
/// one-decimal kilometers.
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1}km")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = point(46.8182, 8.2275);
        let b = point(50.7753, 6.0839);
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }

    #[test]
    fn test_haversine_zero_for_identical_points() {
        let a = point(12.34, 56.78);
        assert_eq!(haversine_km(&a, &a), 0.0);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let distance = haversine_km(&point(0.0, 0.0), &point(0.0, 1.0));
        assert!((distance - 111.19).abs() < 0.05, "got {distance}");
    }

    #[test]
    fn test_foot_mode_inflates_distance() {
        let a = point(0.0, 0.0);
        let b = point(0.0, 1.0);
        let weighted = effective_distance_km(&a, &b, TransportMode::Foot);
        assert_eq!(weighted, haversine_km(&a, &b) * 1.5);
    }

    #[rstest]
    #[case(TransportMode::Car, 1.0)]
    #[case(TransportMode::Bike, 1.2)]
    #[case(TransportMode::Foot, 1.5)]
    fn test_mode_multipliers(#[case] mode: TransportMode, #[case] expected: f64) {
        assert_eq!(mode_multiplier(mode), expected);
    }

    #[rstest]
    #[case(0.35, "350m")]
    #[case(0.9994, "999m")]
    #[case(2.345, "2.3km")]
    #[case(1.0, "1.0km")]
    fn test_format_distance(#[case] km: f64, #[case] expected: &str) {
        assert_eq!(format_distance(km), expected);
    }
}
