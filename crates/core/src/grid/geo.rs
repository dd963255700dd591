//! Geographic primitives: points and latitude/longitude boxes

use serde::{Deserialize, Serialize};

/// Mean length of one degree of latitude (m)
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// A geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Squared distance in degree space (x = longitude, y = latitude)
    #[inline]
    pub fn squared_distance(&self, other: &GeoPoint) -> f64 {
        let dx = self.lon - other.lon;
        let dy = self.lat - other.lat;
        dx * dx + dy * dy
    }
}

/// Axis-aligned latitude/longitude box, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Create a box; the bounds are reordered if given reversed
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min: lat_min.min(lat_max),
            lat_max: lat_min.max(lat_max),
            lon_min: lon_min.min(lon_max),
            lon_max: lon_min.max(lon_max),
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.lat)
            && (self.lon_min..=self.lon_max).contains(&point.lon)
    }

    /// Grow the box by `degrees` on every side
    pub fn expanded(&self, degrees: f64) -> Self {
        Self {
            lat_min: self.lat_min - degrees,
            lat_max: self.lat_max + degrees,
            lon_min: self.lon_min - degrees,
            lon_max: self.lon_max + degrees,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }
}

/// Convert a distance in meters to degrees of latitude and longitude at `latitude`
///
/// Returns `(lat_degrees, lon_degrees)`.
pub fn meters_to_degrees(meters: f64, latitude: f64) -> (f64, f64) {
    let lat_degrees = meters / METERS_PER_DEGREE;
    let lon_degrees = meters / (METERS_PER_DEGREE * latitude.to_radians().cos());
    (lat_degrees, lon_degrees)
}
