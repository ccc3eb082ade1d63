// models/src/location.rs

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};

/// A validated WGS84 position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Builds a point, rejecting NaN/infinite values and anything outside ±90 / ±180.
    pub fn new(latitude: f64, longitude: f64) -> ValidationResult<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if !lat_ok || !lon_ok {
            return Err(ValidationError::CoordinatesOutOfRange { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}
