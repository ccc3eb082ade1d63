// lib/src/geo.rs

//! Great-circle distance and travel-time estimation.

use models::errors::{AllocationResult, ValidationResult};
use models::GeoPoint;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Effective road speed used when no other speed is configured.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 50.0;

/// Haversine distance in kilometres. Inputs are not range-checked.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn distance_between(from: &GeoPoint, to: &GeoPoint) -> f64 {
    distance_km(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Rounds a distance to two decimals for presentation.
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}

/// Validates a latitude/longitude pair, mapping failures to `InvalidCoordinates`.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> AllocationResult<GeoPoint> {
    let point: ValidationResult<GeoPoint> = GeoPoint::new(latitude, longitude);
    Ok(point?)
}

/// Converts distances into whole minutes at a fixed effective speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TravelTimeEstimator {
    speed_kmh: f64,
}

impl TravelTimeEstimator {
    /// Non-positive or non-finite speeds fall back to the default.
    pub fn new(speed_kmh: f64) -> Self {
        if speed_kmh.is_finite() && speed_kmh > 0.0 {
            TravelTimeEstimator { speed_kmh }
        } else {
            TravelTimeEstimator::default()
        }
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Minutes, rounded up. Monotonic non-decreasing in `distance_km`.
    pub fn estimate_minutes(&self, distance_km: f64) -> u32 {
        if distance_km.is_nan() || distance_km == f64::INFINITY {
            return u32::MAX;
        }
        if distance_km <= 0.0 {
            return 0;
        }
        let minutes = (distance_km / self.speed_kmh * 60.0).ceil();
        if minutes >= u32::MAX as f64 {
            u32::MAX
        } else {
            minutes as u32
        }
    }
}

impl Default for TravelTimeEstimator {
    fn default() -> Self {
        TravelTimeEstimator { speed_kmh: DEFAULT_AVERAGE_SPEED_KMH }
    }
}

pub fn estimate_travel_minutes(distance_km: f64) -> u32 {
    TravelTimeEstimator::default().estimate_minutes(distance_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::AllocationError;

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(distance_km(48.8566, 2.3522, 48.8566, 2.3522), 0.0);
    }

    #[test]
    fn paris_to_lyon_is_about_391_km() {
        let d = distance_km(48.8566, 2.3522, 45.7640, 4.8357);
        assert!((d - 391.5).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = distance_km(51.4980, -0.1170, 55.8609, -4.3476);
        let b = distance_km(55.8609, -4.3476, 51.4980, -0.1170);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn travel_time_rounds_up() {
        assert_eq!(estimate_travel_minutes(0.0), 0);
        assert_eq!(estimate_travel_minutes(50.0), 60);
        assert_eq!(estimate_travel_minutes(0.1), 1);
        assert_eq!(estimate_travel_minutes(50.01), 61);
    }

    #[test]
    fn travel_time_is_monotonic() {
        let mut last = 0;
        for step in 0..500 {
            let minutes = estimate_travel_minutes(step as f64 * 0.73);
            assert!(minutes >= last);
            last = minutes;
        }
    }

    #[test]
    fn invalid_speed_falls_back_to_default() {
        assert_eq!(TravelTimeEstimator::new(0.0).speed_kmh(), DEFAULT_AVERAGE_SPEED_KMH);
        assert_eq!(TravelTimeEstimator::new(f64::NAN).speed_kmh(), DEFAULT_AVERAGE_SPEED_KMH);
        assert_eq!(TravelTimeEstimator::new(100.0).estimate_minutes(100.0), 60);
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        assert_eq!(round_km(12.3456), 12.35);
        assert_eq!(round_km(0.004), 0.0);
    }

    #[test]
    fn invalid_coordinates_are_rejected() {
        let err = validate_coordinates(95.0, 0.0).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidCoordinates { .. }));
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(48.85, 2.35).is_ok());
    }
}
