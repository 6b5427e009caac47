//! Coordinate type plus the small amount of spherical math the tracker needs.
//!
//! `lerp` is a planar approximation. It is only used for hops of a few
//! kilometres (animation frames, route densification) where the error against
//! a true great-circle interpolation is far below marker size.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng * 0.5).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Initial great-circle heading from `from` to `to`, degrees clockwise from
/// north in `[0, 360)`. Coincident points yield `0`; callers that want to keep
/// the previous heading must check for that themselves.
pub fn bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if from == to {
        return 0.0;
    }

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    let degrees = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    if degrees >= 360.0 || degrees.is_nan() {
        0.0
    } else {
        degrees
    }
}

/// Componentwise linear interpolation. `t` is expected in `[0, 1]`; the
/// weighted form returns `p1` and `p2` bit-exactly at the endpoints.
pub fn lerp(p1: &GeoPoint, p2: &GeoPoint, t: f64) -> GeoPoint {
    GeoPoint {
        lat: p1.lat * (1.0 - t) + p2.lat * t,
        lng: p1.lng * (1.0 - t) + p2.lng * t,
    }
}
