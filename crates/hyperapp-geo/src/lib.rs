//! Geodesic math primitives
//!
//! Pure distance and containment calculations shared by the clustering and
//! monitoring layers:
//! - Great-circle distance (Haversine)
//! - Point-in-circle containment for circular geofences
//!
//! No I/O, no failure modes.

/// Mean Earth radius in kilometers, as used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers.
///
/// Uses the Haversine formula in its `atan2` form, which stays numerically
/// stable for near-zero separations (returns ~0.0, never NaN).
#[inline]
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Check whether a point lies within `radius_meters` of a circle center.
#[inline]
#[must_use]
pub fn is_within_radius(
    point_lat: f64,
    point_lon: f64,
    center_lat: f64,
    center_lon: f64,
    radius_meters: f64,
) -> bool {
    distance_km(point_lat, point_lon, center_lat, center_lon) * 1000.0 <= radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let d = distance_km(30.0444, 31.2357, 30.0444, 31.2357);
        assert!(d.abs() < 1e-9);
        assert!(!d.is_nan());
    }

    #[test]
    fn known_distance_cairo_to_giza() {
        // Tahrir Square to the Giza pyramids, roughly 12 km.
        let d = distance_km(30.0444, 31.2357, 29.9792, 31.1342);
        assert!(d > 11.0 && d < 13.5, "got {d}");
    }

    #[test]
    fn within_radius_at_center() {
        assert!(is_within_radius(30.0444, 31.2357, 30.0444, 31.2357, 500.0));
    }

    #[test]
    fn outside_radius_600m_away() {
        // 0.0054 degrees of latitude is ~600 m.
        assert!(!is_within_radius(
            30.0444 + 0.0054,
            31.2357,
            30.0444,
            31.2357,
            500.0
        ));
    }

    #[test]
    fn inside_radius_440m_away() {
        // 0.004 degrees of latitude is ~445 m.
        assert!(is_within_radius(
            30.0444 + 0.004,
            31.2357,
            30.0444,
            31.2357,
            500.0
        ));
    }

    #[test]
    fn boundary_near_exact_radius() {
        let d_m = distance_km(30.0, 31.0, 30.0044, 31.0) * 1000.0;
        assert!(is_within_radius(30.0044, 31.0, 30.0, 31.0, d_m + 1.0));
        assert!(!is_within_radius(30.0044, 31.0, 30.0, 31.0, d_m - 1.0));
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -85.0f64..85.0,
            lon1 in -180.0f64..180.0,
            lat2 in -85.0f64..85.0,
            lon2 in -180.0f64..180.0,
        ) {
            let ab = distance_km(lat1, lon1, lat2, lon2);
            let ba = distance_km(lat2, lon2, lat1, lon1);
            prop_assert!((ab - ba).abs() < 1e-9);
        }

        #[test]
        fn prop_distance_is_non_negative_and_finite(
            lat1 in -90.0f64..90.0,
            lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0,
            lon2 in -180.0f64..180.0,
        ) {
            let d = distance_km(lat1, lon1, lat2, lon2);
            prop_assert!(d >= 0.0);
            prop_assert!(d.is_finite());
        }
    }
}
