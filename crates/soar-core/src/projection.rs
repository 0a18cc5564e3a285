//! Local flat-earth projection shared by all geometry in one task.
//!
//! A `TaskProjection` is fixed once the task's coordinate span is known and
//! every plane point in the system must come from the same instance.
//! Calling [`TaskProjection::update`] invalidates all previously produced
//! plane points; owners must re-project every cached point afterwards (see
//! `Task::update_projection`).

use crate::flat::{FlatGeoPoint, FlatPoint};
use crate::models::GeoPoint;
use crate::spatial::{meters_per_deg_lat, meters_per_deg_lon};

/// Target half-extent of the task area in integer plane units. Leaves
/// i32 headroom for the 1.42x + 1 bounding-box margins applied on top.
const FLAT_EXTENT_UNITS: f64 = 15_000.0;

/// Floor on the extent used for scaling, so a single-point or degenerate
/// task still gets a usable resolution.
const MIN_EXTENT_M: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskProjection {
    reference: GeoPoint,
    /// Plane units per meter
    scale: f64,
}

impl Default for TaskProjection {
    fn default() -> Self {
        Self {
            reference: GeoPoint::new(0.0, 0.0),
            scale: FLAT_EXTENT_UNITS / 50_000.0,
        }
    }
}

impl TaskProjection {
    /// Projection centered on a single location with the default scale.
    pub fn new(reference: GeoPoint) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    pub fn reference(&self) -> GeoPoint {
        self.reference
    }

    /// Project to the floating plane.
    pub fn fproject(&self, p: &GeoPoint) -> FlatPoint {
        let x = (p.lon - self.reference.lon) * meters_per_deg_lon(self.reference.lat) * self.scale;
        let y = (p.lat - self.reference.lat) * meters_per_deg_lat(self.reference.lat) * self.scale;
        FlatPoint::new(x, y)
    }

    /// Project to the integer-snapped plane.
    pub fn project(&self, p: &GeoPoint) -> FlatGeoPoint {
        let f = self.fproject(p);
        FlatGeoPoint::new(f.x.round() as i32, f.y.round() as i32)
    }

    /// Inverse of [`fproject`](Self::fproject).
    pub fn funproject(&self, p: &FlatPoint) -> GeoPoint {
        let lon = self.reference.lon
            + p.x / (meters_per_deg_lon(self.reference.lat) * self.scale);
        let lat = self.reference.lat
            + p.y / (meters_per_deg_lat(self.reference.lat) * self.scale);
        GeoPoint::new(lat, lon)
    }

    /// Inverse of [`project`](Self::project), to integer-unit precision.
    pub fn unproject(&self, p: &FlatGeoPoint) -> GeoPoint {
        self.funproject(&FlatPoint::new(p.x as f64, p.y as f64))
    }

    /// Project a distance (e.g. a radius) at a location into plane units.
    ///
    /// Uses the offset-east trick rather than a bare scale multiply so the
    /// result stays consistent with `fproject` of nearby points.
    pub fn fproject_range(&self, at: &GeoPoint, range_m: f64) -> f64 {
        let east = crate::models::GeoVector::new(range_m, 90.0).end_point(at);
        (self.fproject(&east).x - self.fproject(at).x).abs()
    }

    /// Recompute the reference and scale from the bounding extent of the
    /// given points.
    ///
    /// Every plane point produced before this call is invalid afterwards.
    /// An empty iterator leaves the projection unchanged.
    pub fn update(&mut self, points: impl IntoIterator<Item = GeoPoint>) {
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        let mut any = false;

        for p in points {
            if !p.is_valid() {
                continue;
            }
            any = true;
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
            min_lon = min_lon.min(p.lon);
            max_lon = max_lon.max(p.lon);
        }

        if !any {
            return;
        }

        let reference = GeoPoint::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0);
        let height_m = (max_lat - min_lat) * meters_per_deg_lat(reference.lat);
        let width_m = (max_lon - min_lon) * meters_per_deg_lon(reference.lat);
        let half_extent = (height_m.max(width_m) / 2.0).max(MIN_EXTENT_M);

        self.reference = reference;
        self.scale = FLAT_EXTENT_UNITS / half_extent;

        tracing::debug!(
            lat = reference.lat,
            lon = reference.lon,
            scale = self.scale,
            "task projection updated"
        );
    }
}
