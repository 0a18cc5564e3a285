//! Observation zones: the geometric acceptance regions around task
//! turnpoints.
//!
//! The variant set is small and fixed, so this is a closed enum dispatched
//! by the owning task point rather than an open trait hierarchy. Zones are
//! pure shapes; the turnpoint location is passed in by the owner.

use serde::{Deserialize, Serialize};

use crate::flat::FlatLine;
use crate::models::{GeoPoint, GeoVector, ZoneDescriptor};
use crate::projection::TaskProjection;
use crate::spatial::cross_track_minimum_distance;

/// Cross-track slop for line-gate containment, meters. A gate has zero
/// area; a fix this close to the segment counts as on it.
const LINE_GATE_TOLERANCE_M: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObservationZone {
    /// Circle of `radius_m` about the turnpoint.
    Cylinder { radius_m: f64 },
    /// Circular arc between two radials (true bearings from the
    /// turnpoint), swept clockwise from start to end.
    Sector {
        radius_m: f64,
        start_radial_deg: f64,
        end_radial_deg: f64,
    },
    /// Gate segment of `length_m` centered on the turnpoint, running along
    /// `orientation_deg` and its reciprocal.
    Line {
        length_m: f64,
        orientation_deg: f64,
    },
}

impl ObservationZone {
    pub fn from_descriptor(desc: &ZoneDescriptor) -> Self {
        match *desc {
            ZoneDescriptor::Cylinder { radius_m } => ObservationZone::Cylinder { radius_m },
            ZoneDescriptor::Sector {
                radius_m,
                start_radial_deg,
                end_radial_deg,
            } => ObservationZone::Sector {
                radius_m,
                start_radial_deg,
                end_radial_deg,
            },
            ZoneDescriptor::Line {
                length_m,
                orientation_deg,
            } => ObservationZone::Line {
                length_m,
                orientation_deg,
            },
        }
    }

    /// Whether the zone dimensions describe a non-empty region.
    pub fn is_degenerate(&self) -> bool {
        match *self {
            ObservationZone::Cylinder { radius_m } => radius_m <= 0.0,
            ObservationZone::Sector { radius_m, .. } => radius_m <= 0.0,
            ObservationZone::Line { length_m, .. } => length_m <= 0.0,
        }
    }

    /// Point containment test against the zone centered on `center`.
    ///
    /// Degenerate dimensions never contain anything.
    pub fn is_in_sector(&self, center: &GeoPoint, p: &GeoPoint) -> bool {
        if self.is_degenerate() {
            return false;
        }
        match *self {
            ObservationZone::Cylinder { radius_m } => center.distance_to(p) <= radius_m,
            ObservationZone::Sector {
                radius_m,
                start_radial_deg,
                end_radial_deg,
            } => {
                let dist = center.distance_to(p);
                if dist > radius_m {
                    return false;
                }
                // The turnpoint itself has no defined radial; count it in.
                if dist <= f64::EPSILON {
                    return true;
                }
                radial_in_arc(center.bearing_to(p), start_radial_deg, end_radial_deg)
            }
            ObservationZone::Line { .. } => {
                let (e1, e2) = self.line_endpoints(center);
                cross_track_minimum_distance(e1.lat, e1.lon, e2.lat, e2.lon, p.lat, p.lon)
                    <= LINE_GATE_TOLERANCE_M
            }
        }
    }

    /// Deterministic ordered tessellation of the zone boundary.
    ///
    /// Used to seed the boundary search-point sequence when no better
    /// pruning is available. Degenerate zones yield just the center.
    pub fn boundary_points(&self, center: &GeoPoint, count: usize) -> Vec<GeoPoint> {
        if self.is_degenerate() || count == 0 {
            return vec![*center];
        }
        match *self {
            ObservationZone::Cylinder { radius_m } => {
                let step = 360.0 / count as f64;
                (0..count)
                    .map(|i| GeoVector::new(radius_m, step * i as f64).end_point(center))
                    .collect()
            }
            ObservationZone::Sector {
                radius_m,
                start_radial_deg,
                end_radial_deg,
            } => {
                // Center first, then the arc from the start radial to the
                // end radial; the radial edges fall out of the traversal.
                let sweep = arc_sweep(start_radial_deg, end_radial_deg);
                let steps = count.max(2);
                let mut pts = Vec::with_capacity(steps + 1);
                pts.push(*center);
                for i in 0..steps {
                    let frac = i as f64 / (steps - 1) as f64;
                    let bearing = start_radial_deg + sweep * frac;
                    pts.push(GeoVector::new(radius_m, bearing).end_point(center));
                }
                pts
            }
            ObservationZone::Line { .. } => {
                let (e1, e2) = self.line_endpoints(center);
                vec![e1, *center, e2]
            }
        }
    }

    /// First crossing of a directed vector with the zone boundary, in
    /// direction of travel.
    ///
    /// Same discipline as the airspace circle: a vector whose minimum
    /// geodesic distance to the zone center exceeds the radius cannot
    /// cross, otherwise the crossing is solved in the local plane and the
    /// root nearer the start is chosen by squared magnitude. Sector
    /// crossings are only reported through the bounding arc; a vector
    /// entering through a radial edge yields `None`.
    pub fn intersect_vector(
        &self,
        center: &GeoPoint,
        start: &GeoPoint,
        vec: &GeoVector,
        projection: &TaskProjection,
    ) -> Option<GeoPoint> {
        if self.is_degenerate() || vec.distance_m <= 0.0 {
            return None;
        }
        let end = vec.end_point(start);
        match *self {
            ObservationZone::Cylinder { radius_m } => {
                if vec.minimum_distance(start, center) > radius_m {
                    return None;
                }
                nearest_circle_crossing(projection, center, radius_m, start, &end)
            }
            ObservationZone::Sector {
                radius_m,
                start_radial_deg,
                end_radial_deg,
            } => {
                if vec.minimum_distance(start, center) > radius_m {
                    return None;
                }
                let crossing =
                    nearest_circle_crossing(projection, center, radius_m, start, &end)?;
                if radial_in_arc(center.bearing_to(&crossing), start_radial_deg, end_radial_deg) {
                    Some(crossing)
                } else {
                    None
                }
            }
            ObservationZone::Line { .. } => {
                let (e1, e2) = self.line_endpoints(center);
                let p = crate::flat::segment_intersection_point(
                    projection.fproject(start),
                    projection.fproject(&end),
                    projection.fproject(&e1),
                    projection.fproject(&e2),
                )?;
                Some(projection.funproject(&p))
            }
        }
    }

    fn line_endpoints(&self, center: &GeoPoint) -> (GeoPoint, GeoPoint) {
        match *self {
            ObservationZone::Line {
                length_m,
                orientation_deg,
            } => {
                let half = GeoVector::new(length_m / 2.0, orientation_deg);
                let back = GeoVector::new(length_m / 2.0, orientation_deg + 180.0);
                (back.end_point(center), half.end_point(center))
            }
            _ => (*center, *center),
        }
    }
}

/// Whether `bearing` falls in the clockwise arc from `start` to `end`.
fn radial_in_arc(bearing: f64, start: f64, end: f64) -> bool {
    let b = bearing.rem_euclid(360.0);
    let s = start.rem_euclid(360.0);
    let e = end.rem_euclid(360.0);
    if (s - e).abs() <= f64::EPSILON {
        // Zero-width arc reads as the full circle.
        return true;
    }
    if s <= e {
        b >= s && b <= e
    } else {
        b >= s || b <= e
    }
}

/// Degrees swept clockwise from `start` to `end`, in (0, 360].
fn arc_sweep(start: f64, end: f64) -> f64 {
    let sweep = (end - start).rem_euclid(360.0);
    if sweep == 0.0 {
        360.0
    } else {
        sweep
    }
}

/// Crossing of the segment `start`-`end` with the circle of `radius_m`
/// about `center`, solved in the local plane.
///
/// Translates both ends by the projected center, intersects the infinite
/// line with the origin circle, then takes the root nearer the start by
/// squared magnitude and translates it back. This is a documented
/// approximation: the root is near the segment start but is not proven to
/// be the earliest crossing of the bounded segment.
pub(crate) fn nearest_circle_crossing(
    projection: &TaskProjection,
    center: &GeoPoint,
    radius_m: f64,
    start: &GeoPoint,
    end: &GeoPoint,
) -> Option<GeoPoint> {
    let f_radius = projection.fproject_range(center, radius_m);
    let f_center = projection.fproject(center);
    let f_start = projection.fproject(start) - f_center;
    let f_end = projection.fproject(end) - f_center;

    let line = FlatLine::new(f_start, f_end);
    let (p1, p2) = line.intersect_czero(f_radius)?;

    let nearer = if (p1 - f_start).mag_sq() < (p2 - f_start).mag_sq() {
        p1
    } else {
        p2
    };
    Some(projection.funproject(&(nearer + f_center)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proj_around(center: &GeoPoint) -> TaskProjection {
        let mut p = TaskProjection::default();
        p.update([
            GeoPoint::new(center.lat - 0.5, center.lon - 0.5),
            GeoPoint::new(center.lat + 0.5, center.lon + 0.5),
        ]);
        p
    }

    #[test]
    fn cylinder_containment() {
        let zone = ObservationZone::Cylinder { radius_m: 500.0 };
        let center = GeoPoint::new(46.5, 7.5);
        let inside = GeoVector::new(400.0, 120.0).end_point(&center);
        let outside = GeoVector::new(600.0, 120.0).end_point(&center);

        assert!(zone.is_in_sector(&center, &center));
        assert!(zone.is_in_sector(&center, &inside));
        assert!(!zone.is_in_sector(&center, &outside));
    }

    #[test]
    fn zero_radius_cylinder_contains_nothing() {
        let zone = ObservationZone::Cylinder { radius_m: 0.0 };
        let center = GeoPoint::new(46.5, 7.5);
        assert!(!zone.is_in_sector(&center, &center));
        assert_eq!(zone.boundary_points(&center, 12), vec![center]);
    }

    #[test]
    fn sector_containment_respects_radials() {
        let zone = ObservationZone::Sector {
            radius_m: 5_000.0,
            start_radial_deg: 45.0,
            end_radial_deg: 135.0,
        };
        let center = GeoPoint::new(46.5, 7.5);
        let in_arc = GeoVector::new(3_000.0, 90.0).end_point(&center);
        let out_of_arc = GeoVector::new(3_000.0, 270.0).end_point(&center);
        let too_far = GeoVector::new(6_000.0, 90.0).end_point(&center);

        assert!(zone.is_in_sector(&center, &in_arc));
        assert!(!zone.is_in_sector(&center, &out_of_arc));
        assert!(!zone.is_in_sector(&center, &too_far));
        assert!(zone.is_in_sector(&center, &center));
    }

    #[test]
    fn sector_arc_wrapping_north() {
        let zone = ObservationZone::Sector {
            radius_m: 5_000.0,
            start_radial_deg: 315.0,
            end_radial_deg: 45.0,
        };
        let center = GeoPoint::new(46.5, 7.5);
        let north = GeoVector::new(1_000.0, 0.0).end_point(&center);
        let south = GeoVector::new(1_000.0, 180.0).end_point(&center);
        assert!(zone.is_in_sector(&center, &north));
        assert!(!zone.is_in_sector(&center, &south));
    }

    #[test]
    fn cylinder_boundary_points_lie_on_radius() {
        let zone = ObservationZone::Cylinder { radius_m: 1_000.0 };
        let center = GeoPoint::new(46.5, 7.5);
        let pts = zone.boundary_points(&center, 24);
        assert_eq!(pts.len(), 24);
        for p in &pts {
            assert!((center.distance_to(p) - 1_000.0).abs() < 1.0);
        }
        // Deterministic: same call, same tessellation.
        assert_eq!(pts, zone.boundary_points(&center, 24));
    }

    #[test]
    fn line_boundary_is_gate_endpoints() {
        let zone = ObservationZone::Line {
            length_m: 2_000.0,
            orientation_deg: 90.0,
        };
        let center = GeoPoint::new(46.5, 7.5);
        let pts = zone.boundary_points(&center, 8);
        assert_eq!(pts.len(), 3);
        assert!((pts[0].distance_to(&pts[2]) - 2_000.0).abs() < 2.0);
        assert_eq!(pts[1], center);
    }

    #[test]
    fn line_gate_containment_near_segment() {
        let zone = ObservationZone::Line {
            length_m: 2_000.0,
            orientation_deg: 90.0,
        };
        let center = GeoPoint::new(46.5, 7.5);
        let near = GeoVector::new(10.0, 0.0).end_point(&center);
        let far = GeoVector::new(500.0, 0.0).end_point(&center);
        let beyond_end = GeoVector::new(1_500.0, 90.0).end_point(&center);

        assert!(zone.is_in_sector(&center, &near));
        assert!(!zone.is_in_sector(&center, &far));
        assert!(!zone.is_in_sector(&center, &beyond_end));
    }

    #[test]
    fn cylinder_intersect_vector_crosses_boundary() {
        let center = GeoPoint::new(46.5, 7.5);
        let projection = proj_around(&center);
        let zone = ObservationZone::Cylinder { radius_m: 500.0 };

        let start = GeoVector::new(2_000.0, 270.0).end_point(&center);
        let vec = GeoVector::new(3_000.0, 90.0);
        let crossing = zone
            .intersect_vector(&center, &start, &vec, &projection)
            .unwrap();
        assert!((center.distance_to(&crossing) - 500.0).abs() < 10.0);
        // First crossing lies on the near side of the circle.
        assert!(start.distance_to(&crossing) < 1_600.0);
    }

    #[test]
    fn cylinder_intersect_vector_pointing_away() {
        let center = GeoPoint::new(46.5, 7.5);
        let projection = proj_around(&center);
        let zone = ObservationZone::Cylinder { radius_m: 500.0 };

        // Start 2km west of the center, flying further west. The boundary
        // lies behind the start, not in direction of travel.
        let start = GeoVector::new(2_000.0, 270.0).end_point(&center);
        let vec = GeoVector::new(3_000.0, 270.0);
        assert!(zone
            .intersect_vector(&center, &start, &vec, &projection)
            .is_none());
    }

    #[test]
    fn cylinder_intersect_vector_falling_short() {
        let center = GeoPoint::new(46.5, 7.5);
        let projection = proj_around(&center);
        let zone = ObservationZone::Cylinder { radius_m: 500.0 };

        // Heading straight at the zone but stopping 1km short of the
        // boundary: no crossing within the segment.
        let start = GeoVector::new(2_000.0, 270.0).end_point(&center);
        let vec = GeoVector::new(500.0, 90.0);
        assert!(zone
            .intersect_vector(&center, &start, &vec, &projection)
            .is_none());
    }

    #[test]
    fn sector_intersect_vector_only_reports_arc_crossings() {
        let center = GeoPoint::new(46.5, 7.5);
        let projection = proj_around(&center);
        let zone = ObservationZone::Sector {
            radius_m: 5_000.0,
            start_radial_deg: 45.0,
            end_radial_deg: 135.0,
        };

        // Crossing the bounding circle where the arc is: reported.
        let start = GeoVector::new(6_000.0, 90.0).end_point(&center);
        let inbound = GeoVector::new(2_000.0, start.bearing_to(&center));
        let crossing = zone
            .intersect_vector(&center, &start, &inbound, &projection)
            .unwrap();
        assert!((center.distance_to(&crossing) - 5_000.0).abs() < 30.0);

        // Entering through the start radial edge: flying north-south
        // across the wedge 2km east of the center. Both bounding-circle
        // roots fall outside the arc, so no crossing is reported.
        let abeam = GeoVector::new(2_000.0, 90.0).end_point(&center);
        let edge_start = GeoVector::new(3_000.0, 0.0).end_point(&abeam);
        let south = GeoVector::new(6_000.0, 180.0);
        assert!(zone
            .intersect_vector(&center, &edge_start, &south, &projection)
            .is_none());
    }

    #[test]
    fn cylinder_intersect_vector_miss() {
        let center = GeoPoint::new(46.5, 7.5);
        let projection = proj_around(&center);
        let zone = ObservationZone::Cylinder { radius_m: 500.0 };

        let start = GeoVector::new(2_000.0, 0.0).end_point(&center);
        let vec = GeoVector::new(3_000.0, 90.0);
        assert!(zone
            .intersect_vector(&center, &start, &vec, &projection)
            .is_none());
    }

    #[test]
    fn line_intersect_vector_through_gate() {
        let center = GeoPoint::new(46.5, 7.5);
        let projection = proj_around(&center);
        let zone = ObservationZone::Line {
            length_m: 2_000.0,
            orientation_deg: 90.0,
        };

        // Fly south to north straight over the gate center.
        let start = GeoVector::new(1_000.0, 180.0).end_point(&center);
        let vec = GeoVector::new(2_000.0, 0.0);
        let crossing = zone
            .intersect_vector(&center, &start, &vec, &projection)
            .unwrap();
        assert!(center.distance_to(&crossing) < 30.0);
    }

    #[test]
    fn degenerate_vector_never_intersects() {
        let center = GeoPoint::new(46.5, 7.5);
        let projection = proj_around(&center);
        let zone = ObservationZone::Cylinder { radius_m: 500.0 };
        let start = GeoVector::new(2_000.0, 270.0).end_point(&center);
        assert!(zone
            .intersect_vector(&center, &start, &GeoVector::new(0.0, 90.0), &projection)
            .is_none());
    }
}
