//! Search points: geodetic locations paired with their cached plane
//! projection, and the ordered sequences of them accumulated by a
//! [`SampledTaskPoint`](crate::task_point::SampledTaskPoint).

use serde::{Deserialize, Serialize};

use crate::flat::FlatGeoPoint;
use crate::models::GeoPoint;
use crate::projection::TaskProjection;

/// A geodetic point with its cached plane projection.
///
/// The cache is only valid against the projection that produced it; after a
/// projection update the owner must call [`SearchPoint::project`] again.
/// Equality is by geodetic location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchPoint {
    location: GeoPoint,
    flat: FlatGeoPoint,
}

impl SearchPoint {
    pub fn new(location: GeoPoint, projection: &TaskProjection) -> Self {
        Self {
            location,
            flat: projection.project(&location),
        }
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    pub fn flat(&self) -> FlatGeoPoint {
        self.flat
    }

    /// Refresh the cached plane coordinate after a projection update.
    pub fn project(&mut self, projection: &TaskProjection) {
        self.flat = projection.project(&self.location);
    }
}

impl PartialEq for SearchPoint {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

/// An ordered sequence of search points.
///
/// Holds either trajectory samples recorded inside an observation zone
/// (chronological order) or a zone boundary tessellation (traversal order).
/// Consecutive geodetic duplicates are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPointVector {
    points: Vec<SearchPoint>,
}

impl SearchPointVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_locations(
        locations: impl IntoIterator<Item = GeoPoint>,
        projection: &TaskProjection,
    ) -> Self {
        let mut v = Self::new();
        for loc in locations {
            v.push(SearchPoint::new(loc, projection));
        }
        v
    }

    /// Append a point unless it duplicates the current last geodetic point.
    /// Returns whether the point was stored.
    pub fn push(&mut self, point: SearchPoint) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&SearchPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchPoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[SearchPoint] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Drop everything but the most recent point.
    pub fn keep_last(&mut self) {
        if self.points.len() > 1 {
            self.points.drain(..self.points.len() - 1);
        }
    }

    pub fn contains_location(&self, location: &GeoPoint) -> bool {
        self.points.iter().any(|p| p.location() == *location)
    }

    /// Re-project every stored point against the current projection.
    pub fn project_all(&mut self, projection: &TaskProjection) {
        for p in &mut self.points {
            p.project(projection);
        }
    }

    /// Discard points interior to the convex hull of the sequence, in the
    /// integer plane.
    ///
    /// The hull keeps every extremal point, so the best achievable boundary
    /// point stays representable from the remaining set. Collinear interior
    /// points are dropped too (along a straight edge only the endpoints
    /// matter to the optimizer). Idempotent: a second call with no
    /// intervening mutation discards nothing and returns false.
    pub fn prune_interior(&mut self) -> bool {
        if self.points.len() <= 2 {
            return false;
        }

        let hull = convex_hull(&self.points);
        if hull == self.points {
            return false;
        }
        self.points = hull;
        true
    }
}

/// Monotone-chain convex hull over the cached integer plane coordinates.
///
/// Output is in counter-clockwise traversal order starting from the
/// lexicographically smallest plane point. Strictly convex: collinear and
/// coincident points are dropped.
fn convex_hull(points: &[SearchPoint]) -> Vec<SearchPoint> {
    let mut sorted: Vec<SearchPoint> = points.to_vec();
    sorted.sort_by_key(|p| p.flat());
    sorted.dedup_by_key(|p| p.flat());

    if sorted.len() <= 2 {
        return sorted;
    }

    let mut lower: Vec<SearchPoint> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 {
            let a = lower[lower.len() - 2].flat();
            let b = lower[lower.len() - 1].flat();
            if FlatGeoPoint::cross_track(&a, &b, &p.flat()) <= 0 {
                lower.pop();
            } else {
                break;
            }
        }
        lower.push(*p);
    }

    let mut upper: Vec<SearchPoint> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 {
            let a = upper[upper.len() - 2].flat();
            let b = upper[upper.len() - 1].flat();
            if FlatGeoPoint::cross_track(&a, &b, &p.flat()) <= 0 {
                upper.pop();
            } else {
                break;
            }
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
