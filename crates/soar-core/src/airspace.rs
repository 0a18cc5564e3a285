//! Airspace shapes for proximity and intersection warnings.
//!
//! Independent of the task-scoring zones but built on the same projection
//! and planar primitives. The variant set is closed: dispatch happens here,
//! not through open subclassing.

use crate::flat::{segment_intersection_point, FlatBoundingBox, FlatPoint};
use crate::models::{AircraftState, AirspaceDescriptor, GeoPoint, GeoVector};
use crate::projection::TaskProjection;
use crate::zone::nearest_circle_crossing;

/// Margin factor for circle bounding boxes: covers the circle rotated into
/// its bounding square. Together with the one-unit outward rounding this
/// guarantees the box never under-covers the shape (hard invariant).
const BOX_MARGIN_FACTOR: f64 = 1.42;

/// A circular airspace volume.
#[derive(Debug, Clone, PartialEq)]
pub struct AirspaceCircle {
    center: GeoPoint,
    radius_m: f64,
}

impl AirspaceCircle {
    pub fn new(center: GeoPoint, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Bounding box from the four cardinal-diagonal points at
    /// 1.42x radius, expanded one integer unit outward so rounding keeps
    /// the box valid.
    pub fn bounding_box(&self, projection: &TaskProjection) -> FlatBoundingBox {
        let eradius = self.radius_m * BOX_MARGIN_FACTOR;
        let corners = [45.0, 135.0, 225.0, 315.0]
            .map(|b| projection.project(&GeoVector::new(eradius, b).end_point(&self.center)));
        FlatBoundingBox::from_points(corners.iter(), 1)
    }

    /// True geodesic containment.
    ///
    /// Deliberately not the plane approximation: containment is a
    /// user-facing safety decision and must not inherit projection error.
    pub fn inside(&self, state: &AircraftState) -> bool {
        self.radius_m > 0.0 && state.location.distance_to(&self.center) <= self.radius_m
    }

    /// Crossing point of a projected flight vector with this circle.
    ///
    /// Three tiers: a start already inside reports the intersection at the
    /// start itself; a vector whose minimum geodesic distance to the
    /// center exceeds the radius cannot intersect; otherwise the crossing
    /// is solved in the local plane. The plane solution returns a valid
    /// crossing near the segment start, not a proven earliest crossing of
    /// the bounded segment (known approximation).
    pub fn intersects(
        &self,
        start: &GeoPoint,
        vec: &GeoVector,
        projection: &TaskProjection,
    ) -> Option<GeoPoint> {
        if self.radius_m <= 0.0 {
            return None;
        }
        if self.center.distance_to(start) <= self.radius_m {
            // Starts inside: conservative, no search needed.
            return Some(*start);
        }
        if vec.minimum_distance(start, &self.center) > self.radius_m {
            return None;
        }
        let end = vec.end_point(start);
        nearest_circle_crossing(projection, &self.center, self.radius_m, start, &end)
    }

    /// The boundary point nearest `p`: the geodesic intermediate point
    /// from the center toward `p` at the radius. Well-defined for interior
    /// query points too.
    pub fn closest_point(&self, p: &GeoPoint) -> GeoPoint {
        self.center.intermediate_point(p, self.radius_m)
    }
}

/// A polygonal airspace volume over a closed geodetic ring.
#[derive(Debug, Clone, PartialEq)]
pub struct AirspacePolygon {
    ring: Vec<GeoPoint>,
}

impl AirspacePolygon {
    /// A closing vertex equal to the first is accepted and dropped.
    pub fn new(mut ring: Vec<GeoPoint>) -> Self {
        if ring.len() >= 2 && ring.first() == ring.last() {
            ring.pop();
        }
        Self { ring }
    }

    pub fn ring(&self) -> &[GeoPoint] {
        &self.ring
    }

    fn is_degenerate(&self) -> bool {
        self.ring.len() < 3
    }

    pub fn bounding_box(&self, projection: &TaskProjection) -> FlatBoundingBox {
        let corners: Vec<_> = self.ring.iter().map(|p| projection.project(p)).collect();
        FlatBoundingBox::from_points(corners.iter(), 1)
    }

    /// Ray-casting containment over the geodetic ring.
    pub fn inside(&self, state: &AircraftState) -> bool {
        self.contains_location(&state.location)
    }

    fn contains_location(&self, location: &GeoPoint) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let (lat, lon) = (location.lat, location.lon);
        let mut inside = false;
        let mut j = self.ring.len() - 1;
        for i in 0..self.ring.len() {
            let (vi, vj) = (&self.ring[i], &self.ring[j]);
            if (vi.lat > lat) != (vj.lat > lat)
                && lon < (vj.lon - vi.lon) * (lat - vi.lat) / (vj.lat - vi.lat) + vi.lon
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// First crossing of the flight vector with any polygon edge, by
    /// squared plane distance from the start.
    pub fn intersects(
        &self,
        start: &GeoPoint,
        vec: &GeoVector,
        projection: &TaskProjection,
    ) -> Option<GeoPoint> {
        if self.is_degenerate() {
            return None;
        }
        if self.contains_location(start) {
            return Some(*start);
        }

        let f_start = projection.fproject(start);
        let f_end = projection.fproject(&vec.end_point(start));

        let mut best: Option<FlatPoint> = None;
        let mut j = self.ring.len() - 1;
        for i in 0..self.ring.len() {
            let e1 = projection.fproject(&self.ring[j]);
            let e2 = projection.fproject(&self.ring[i]);
            if let Some(p) = segment_intersection_point(f_start, f_end, e1, e2) {
                let closer = match best {
                    Some(b) => (p - f_start).mag_sq() < (b - f_start).mag_sq(),
                    None => true,
                };
                if closer {
                    best = Some(p);
                }
            }
            j = i;
        }
        best.map(|p| projection.funproject(&p))
    }

    /// Nearest boundary point to `p`, solved edge-wise in the plane.
    pub fn closest_point(&self, p: &GeoPoint, projection: &TaskProjection) -> GeoPoint {
        if self.is_degenerate() {
            return self.ring.first().copied().unwrap_or(*p);
        }

        let fp = projection.fproject(p);
        let mut best = projection.fproject(&self.ring[0]);
        let mut best_d = (best - fp).mag_sq();

        let mut j = self.ring.len() - 1;
        for i in 0..self.ring.len() {
            let a = projection.fproject(&self.ring[j]);
            let b = projection.fproject(&self.ring[i]);
            let candidate = closest_on_segment(fp, a, b);
            let d = (candidate - fp).mag_sq();
            if d < best_d {
                best = candidate;
                best_d = d;
            }
            j = i;
        }
        projection.funproject(&best)
    }
}

fn closest_on_segment(p: FlatPoint, a: FlatPoint, b: FlatPoint) -> FlatPoint {
    let ab = b - a;
    let len_sq = ab.mag_sq();
    if len_sq <= f64::EPSILON {
        return a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    FlatPoint::new(a.x + t * ab.x, a.y + t * ab.y)
}

/// One airspace volume of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AirspaceShape {
    Circle(AirspaceCircle),
    Polygon(AirspacePolygon),
}

impl AirspaceShape {
    pub fn from_descriptor(desc: &AirspaceDescriptor) -> Self {
        match desc {
            AirspaceDescriptor::Circle { center, radius_m } => {
                AirspaceShape::Circle(AirspaceCircle::new(*center, *radius_m))
            }
            AirspaceDescriptor::Polygon { ring } => {
                AirspaceShape::Polygon(AirspacePolygon::new(ring.clone()))
            }
        }
    }

    pub fn bounding_box(&self, projection: &TaskProjection) -> FlatBoundingBox {
        match self {
            AirspaceShape::Circle(c) => c.bounding_box(projection),
            AirspaceShape::Polygon(p) => p.bounding_box(projection),
        }
    }

    pub fn inside(&self, state: &AircraftState) -> bool {
        match self {
            AirspaceShape::Circle(c) => c.inside(state),
            AirspaceShape::Polygon(p) => p.inside(state),
        }
    }

    pub fn intersects(
        &self,
        start: &GeoPoint,
        vec: &GeoVector,
        projection: &TaskProjection,
    ) -> Option<GeoPoint> {
        match self {
            AirspaceShape::Circle(c) => c.intersects(start, vec, projection),
            AirspaceShape::Polygon(p) => p.intersects(start, vec, projection),
        }
    }

    pub fn closest_point(&self, p: &GeoPoint, projection: &TaskProjection) -> GeoPoint {
        match self {
            AirspaceShape::Circle(c) => c.closest_point(p),
            AirspaceShape::Polygon(poly) => poly.closest_point(p, projection),
        }
    }
}

/// Ordered collection of airspace shapes with cached bounding boxes.
///
/// The boxes are recomputed lazily after a projection change and used to
/// reject shapes cheaply before the precise intersection math runs.
#[derive(Debug, Clone, Default)]
pub struct Airspaces {
    shapes: Vec<AirspaceShape>,
    boxes: Vec<FlatBoundingBox>,
}

impl Airspaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(
        descriptors: &[AirspaceDescriptor],
        projection: &TaskProjection,
    ) -> Self {
        let mut airspaces = Self::new();
        for desc in descriptors {
            airspaces.push(AirspaceShape::from_descriptor(desc), projection);
        }
        airspaces
    }

    pub fn push(&mut self, shape: AirspaceShape, projection: &TaskProjection) {
        self.boxes.push(shape.bounding_box(projection));
        self.shapes.push(shape);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AirspaceShape> {
        self.shapes.iter()
    }

    /// Recompute all cached bounding boxes against the current projection.
    /// Must be called after any projection update.
    pub fn update_projection(&mut self, projection: &TaskProjection) {
        for (bb, shape) in self.boxes.iter_mut().zip(&self.shapes) {
            *bb = shape.bounding_box(projection);
        }
    }

    /// All shapes whose boundary the projected flight vector crosses,
    /// with the crossing points, in collection order.
    ///
    /// Shapes whose bounding box does not overlap the vector's box are
    /// rejected without running the precise intersection.
    pub fn find_intersections(
        &self,
        start: &GeoPoint,
        vec: &GeoVector,
        projection: &TaskProjection,
    ) -> Vec<(usize, GeoPoint)> {
        let path_box = FlatBoundingBox::from_points(
            [
                projection.project(start),
                projection.project(&vec.end_point(start)),
            ]
            .iter(),
            1,
        );

        let mut hits = Vec::new();
        for (index, (shape, bb)) in self.shapes.iter().zip(&self.boxes).enumerate() {
            if !bb.overlaps(&path_box) {
                continue;
            }
            if let Some(p) = shape.intersects(start, vec, projection) {
                hits.push((index, p));
            }
        }
        if !hits.is_empty() {
            tracing::debug!(count = hits.len(), "airspace intersections on track");
        }
        hits
    }
}
