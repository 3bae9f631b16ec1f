use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Earth's mean radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS-84 latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Build validated coordinates
    ///
    /// Rejects non-finite values and anything outside the
    /// [-90, 90] / [-180, 180] degree ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        let coords = Self { lat, lon };
        coords.validate()?;
        Ok(coords)
    }

    /// Check ranges on coordinates that bypassed `new` (e.g. deserialized config)
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(ValidationError::LatitudeOutOfRange(self.lat));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(ValidationError::LongitudeOutOfRange(self.lon));
        }
        Ok(())
    }

    /// Great-circle distance in kilometers (haversine)
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + (d_lon / 2.0).sin().powi(2) * self.lat.to_radians().cos() * other.lat.to_radians().cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}
