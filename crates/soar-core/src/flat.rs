//! Planar primitives over the task projection's local coordinates.
//!
//! Two point flavors exist on purpose: `FlatPoint` carries f64 coordinates
//! for intersection algebra, `FlatGeoPoint` is integer-snapped for cheap,
//! reproducible bounding-box math and point-set ordering. Both are only
//! meaningful relative to the projection instance that produced them.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Floating plane point, used where sub-unit precision matters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatPoint {
    pub x: f64,
    pub y: f64,
}

impl FlatPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared magnitude. Cheaper than `mag` and sufficient for
    /// closer-of-two comparisons.
    pub fn mag_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn mag(&self) -> f64 {
        self.mag_sq().sqrt()
    }

    pub fn dot(&self, other: &FlatPoint) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the cross product; sign gives orientation.
    pub fn cross(&self, other: &FlatPoint) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for FlatPoint {
    type Output = FlatPoint;

    fn add(self, rhs: FlatPoint) -> FlatPoint {
        FlatPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for FlatPoint {
    type Output = FlatPoint;

    fn sub(self, rhs: FlatPoint) -> FlatPoint {
        FlatPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Integer-snapped plane point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct FlatGeoPoint {
    pub x: i32,
    pub y: i32,
}

impl FlatGeoPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cross product of (b - a) and (c - a); sign gives turn direction.
    pub fn cross_track(a: &FlatGeoPoint, b: &FlatGeoPoint, c: &FlatGeoPoint) -> i64 {
        let abx = (b.x - a.x) as i64;
        let aby = (b.y - a.y) as i64;
        let acx = (c.x - a.x) as i64;
        let acy = (c.y - a.y) as i64;
        abx * acy - aby * acx
    }
}

/// A segment between two floating plane points, relative to an implicit
/// local origin. Callers translate by the circle center before solving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatLine {
    pub p1: FlatPoint,
    pub p2: FlatPoint,
}

impl FlatLine {
    pub fn new(p1: FlatPoint, p2: FlatPoint) -> Self {
        Self { p1, p2 }
    }

    /// Intersect the infinite line through p1 and p2 with a circle of
    /// radius `r` centered at the origin.
    ///
    /// Returns the up-to-two real solutions, or `None` when the line misses
    /// the circle or the two points coincide. Note this solves the full
    /// line, not the segment; the caller picks the root nearer its segment
    /// start by squared magnitude.
    pub fn intersect_czero(&self, r: f64) -> Option<(FlatPoint, FlatPoint)> {
        let dx = self.p2.x - self.p1.x;
        let dy = self.p2.y - self.p1.y;
        let dr_sq = dx * dx + dy * dy;
        if dr_sq <= f64::EPSILON {
            return None;
        }

        let d = self.p1.cross(&self.p2);
        let disc = r * r * dr_sq - d * d;
        if disc < 0.0 {
            return None;
        }

        let sqrt_disc = disc.sqrt();
        let sgn_dy = if dy < 0.0 { -1.0 } else { 1.0 };

        let x1 = (d * dy + sgn_dy * dx * sqrt_disc) / dr_sq;
        let x2 = (d * dy - sgn_dy * dx * sqrt_disc) / dr_sq;
        let y1 = (-d * dx + dy.abs() * sqrt_disc) / dr_sq;
        let y2 = (-d * dx - dy.abs() * sqrt_disc) / dr_sq;

        Some((FlatPoint::new(x1, y1), FlatPoint::new(x2, y2)))
    }
}

const SEGMENT_EPS: f64 = 1e-9;

fn orient(p: FlatPoint, q: FlatPoint, r: FlatPoint) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

fn within(a: f64, b: f64, value: f64) -> bool {
    let min = a.min(b) - SEGMENT_EPS;
    let max = a.max(b) + SEGMENT_EPS;
    value >= min && value <= max
}

fn on_segment(p: FlatPoint, q: FlatPoint, r: FlatPoint) -> bool {
    within(p.x, q.x, r.x) && within(p.y, q.y, r.y)
}

/// Whether segments a1-a2 and b1-b2 intersect, including touches and
/// collinear overlap.
pub fn segments_intersect(a1: FlatPoint, a2: FlatPoint, b1: FlatPoint, b2: FlatPoint) -> bool {
    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= SEGMENT_EPS && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= SEGMENT_EPS && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= SEGMENT_EPS && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= SEGMENT_EPS && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > SEGMENT_EPS && o2 < -SEGMENT_EPS) || (o1 < -SEGMENT_EPS && o2 > SEGMENT_EPS);
    let b_crosses = (o3 > SEGMENT_EPS && o4 < -SEGMENT_EPS) || (o3 < -SEGMENT_EPS && o4 > SEGMENT_EPS);
    a_crosses && b_crosses
}

/// Intersection point of segments a1-a2 and b1-b2, if they cross.
///
/// Collinear overlaps resolve to the endpoint of b nearest a1.
pub fn segment_intersection_point(
    a1: FlatPoint,
    a2: FlatPoint,
    b1: FlatPoint,
    b2: FlatPoint,
) -> Option<FlatPoint> {
    if !segments_intersect(a1, a2, b1, b2) {
        return None;
    }

    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(&s);
    if denom.abs() <= SEGMENT_EPS {
        // Collinear or parallel-touching
        let d1 = (b1 - a1).mag_sq();
        let d2 = (b2 - a1).mag_sq();
        return Some(if d1 <= d2 { b1 } else { b2 });
    }

    let t = (b1 - a1).cross(&s) / denom;
    Some(FlatPoint::new(a1.x + t * r.x, a1.y + t * r.y))
}

/// Axis-aligned bounding box in integer plane coordinates.
///
/// Used to cheaply reject airspace shapes before precise intersection math.
/// Circle-derived boxes are built from 1.42x-radius diagonal points and
/// expanded one unit outward so integer rounding never under-covers the
/// true shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatBoundingBox {
    min: FlatGeoPoint,
    max: FlatGeoPoint,
}

impl FlatBoundingBox {
    /// Construct from two corner points; corners are normalised per axis.
    pub fn new(a: FlatGeoPoint, b: FlatGeoPoint) -> Self {
        Self {
            min: FlatGeoPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: FlatGeoPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest box covering all given points, expanded outward by
    /// `margin` units per side. Returns a degenerate single-point box for
    /// an empty input.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a FlatGeoPoint>, margin: i32) -> Self {
        let mut min = FlatGeoPoint::new(i32::MAX, i32::MAX);
        let mut max = FlatGeoPoint::new(i32::MIN, i32::MIN);
        let mut any = false;
        for p in points {
            any = true;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        if !any {
            return Self::new(FlatGeoPoint::default(), FlatGeoPoint::default());
        }
        Self {
            min: FlatGeoPoint::new(min.x - margin, min.y - margin),
            max: FlatGeoPoint::new(max.x + margin, max.y + margin),
        }
    }

    pub fn min(&self) -> FlatGeoPoint {
        self.min
    }

    pub fn max(&self) -> FlatGeoPoint {
        self.max
    }

    /// Inclusive containment test.
    pub fn is_inside(&self, p: &FlatGeoPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether two boxes share any point.
    pub fn overlaps(&self, other: &FlatBoundingBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}
