//! Core value types: geodetic points, vectors, aircraft state and the
//! descriptors supplied at task-load time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::spatial::{
    bearing_deg, cross_track_minimum_distance, haversine_distance, intermediate_point,
    offset_by_bearing,
};

/// A geodetic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another point in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.lat, self.lon, other.lat, other.lon)
    }

    /// Initial bearing toward another point, degrees in [0, 360).
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing_deg(self.lat, self.lon, other.lat, other.lon)
    }

    /// Point at `distance_m` from self along the great circle toward `other`.
    ///
    /// Well-defined when `other` is nearer than `distance_m` (the result
    /// overshoots it on the same bearing) and when the points coincide
    /// (bearing defaults to north).
    pub fn intermediate_point(&self, other: &GeoPoint, distance_m: f64) -> GeoPoint {
        let (lat, lon) = intermediate_point(self.lat, self.lon, other.lat, other.lon, distance_m);
        GeoPoint::new(lat, lon)
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.lat.abs() <= 90.0
    }
}

/// A directed great-circle displacement: distance plus true bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoVector {
    pub distance_m: f64,
    pub bearing_deg: f64,
}

impl GeoVector {
    pub fn new(distance_m: f64, bearing_deg: f64) -> Self {
        Self {
            distance_m,
            bearing_deg,
        }
    }

    /// The end point reached by applying this vector from `start`.
    pub fn end_point(&self, start: &GeoPoint) -> GeoPoint {
        let (lat, lon) = offset_by_bearing(start.lat, start.lon, self.distance_m, self.bearing_deg);
        GeoPoint::new(lat, lon)
    }

    /// Minimum geodesic distance from the segment (start -> end point) to
    /// `point`, in meters.
    pub fn minimum_distance(&self, start: &GeoPoint, point: &GeoPoint) -> f64 {
        let end = self.end_point(start);
        cross_track_minimum_distance(start.lat, start.lon, end.lat, end.lon, point.lat, point.lon)
    }
}

/// Immutable snapshot of aircraft state for one navigation tick.
///
/// Produced by the sensor bridge behind the blackboard lock and handed to
/// the geometry core read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    pub location: GeoPoint,
    pub altitude_m: f64,
    pub time: DateTime<Utc>,
    /// Filtered true airspeed, if the airspeed driver is present
    #[serde(default)]
    pub airspeed_mps: Option<f64>,
    /// Filtered total-energy vario
    #[serde(default)]
    pub vario_mps: Option<f64>,
    /// Static pressure from the baro driver
    #[serde(default)]
    pub pressure_hpa: Option<f64>,
}

impl AircraftState {
    pub fn new(location: GeoPoint, altitude_m: f64, time: DateTime<Utc>) -> Self {
        Self {
            location,
            altitude_m,
            time,
            airspeed_mps: None,
            vario_mps: None,
            pressure_hpa: None,
        }
    }
}

/// A named turnpoint location from the task file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub elevation_m: f64,
}

/// Observation-zone descriptor as supplied by the task editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneDescriptor {
    Cylinder {
        radius_m: f64,
    },
    Sector {
        radius_m: f64,
        start_radial_deg: f64,
        end_radial_deg: f64,
    },
    Line {
        length_m: f64,
        orientation_deg: f64,
    },
}

/// One turnpoint entry in the task-load input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPointDescriptor {
    pub waypoint: Waypoint,
    pub zone: ZoneDescriptor,
    /// Whether the zone boundary (rather than interior achievement)
    /// determines scoring eligibility for this point
    #[serde(default)]
    pub boundary_scored: bool,
}

/// Airspace shape descriptor from the airspace file loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AirspaceDescriptor {
    Circle {
        center: GeoPoint,
        radius_m: f64,
    },
    Polygon {
        /// Closed ring; first vertex repeated last is accepted but not required
        ring: Vec<GeoPoint>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn geo_vector_end_point_round_trip() {
        let start = GeoPoint::new(46.9, 7.5);
        let v = GeoVector::new(10_000.0, 77.0);
        let end = v.end_point(&start);
        assert_relative_eq!(start.distance_to(&end), 10_000.0, max_relative = 1e-6);
        assert!((start.bearing_to(&end) - 77.0).abs() < 0.05);
    }

    #[test]
    fn minimum_distance_point_on_path_is_zero() {
        let start = GeoPoint::new(0.0, 0.0);
        let v = GeoVector::new(10_000.0, 90.0);
        let mid = GeoVector::new(5_000.0, 90.0).end_point(&start);
        assert!(v.minimum_distance(&start, &mid) < 1.0);
    }

    #[test]
    fn zone_descriptor_serde_tagging() {
        let z = ZoneDescriptor::Cylinder { radius_m: 500.0 };
        let json = serde_json::to_value(&z).unwrap();
        assert_eq!(json["kind"], "cylinder");
        let back: ZoneDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, z);
    }

    #[test]
    fn aircraft_state_optional_fields_default() {
        let json = serde_json::json!({
            "location": { "lat": 46.9, "lon": 7.5 },
            "altitude_m": 1200.0,
            "time": "2024-05-01T10:00:00Z"
        });
        let state: AircraftState = serde_json::from_value(json).unwrap();
        assert_eq!(state.airspeed_mps, None);
        assert_eq!(state.vario_mps, None);
    }
}
