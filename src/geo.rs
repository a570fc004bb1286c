use serde::{Deserialize, Serialize};

use crate::units::{Length, meters};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Normal vectors closer than this (per component) are treated as the same position
const NORMAL_VECTOR_EPSILON: f64 = 1e-12;

/// Great-circle distance in meters between two lat/lon pairs (Haversine)
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// A geographic point (WGS84 latitude/longitude in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates finite and within their valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to another point
    pub fn distance_to(&self, other: &GeoPoint) -> Length {
        meters(haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        ))
    }

    /// Position as a unit vector in earth-centered coordinates
    pub fn normal_vector(&self) -> [f64; 3] {
        let lat = self.latitude.to_radians();
        let lon = self.longitude.to_radians();
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }

    /// Same position within numeric precision
    pub fn equal_normal_vector(&self, other: &GeoPoint) -> bool {
        self.normal_vector()
            .iter()
            .zip(other.normal_vector().iter())
            .all(|(a, b)| (a - b).abs() <= NORMAL_VECTOR_EPSILON)
    }
}
