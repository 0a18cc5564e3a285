//! A task turnpoint with its accumulated trajectory and boundary sample
//! history.
//!
//! `SampledTaskPoint` composes a waypoint, a held [`ObservationZone`] and
//! the search-point sequences consumed by the route optimizer. All
//! operations are total: geometrically degenerate input yields degenerate
//! results, never errors.

use crate::models::{AircraftState, GeoPoint, TaskPointDescriptor, Waypoint};
use crate::projection::TaskProjection;
use crate::search::{SearchPoint, SearchPointVector};
use crate::zone::ObservationZone;

/// Tessellation size used to seed a zone's boundary sequence.
const DEFAULT_BOUNDARY_POINT_COUNT: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct SampledTaskPoint {
    waypoint: Waypoint,
    zone: ObservationZone,
    /// Whether the zone boundary (rather than interior achievement)
    /// determines scoring eligibility
    boundary_scored: bool,
    sampled_points: SearchPointVector,
    boundary_points: SearchPointVector,
    search_max: SearchPoint,
    search_min: SearchPoint,
}

impl SampledTaskPoint {
    pub fn new(
        projection: &TaskProjection,
        waypoint: Waypoint,
        zone: ObservationZone,
        boundary_scored: bool,
    ) -> Self {
        let origin = SearchPoint::new(waypoint.location, projection);
        let mut point = Self {
            waypoint,
            zone,
            boundary_scored,
            sampled_points: SearchPointVector::new(),
            boundary_points: SearchPointVector::new(),
            search_max: origin,
            search_min: origin,
        };
        point.clear_boundary_points(projection);
        point.clear_sample_points();
        point
    }

    pub fn from_descriptor(projection: &TaskProjection, desc: &TaskPointDescriptor) -> Self {
        Self::new(
            projection,
            desc.waypoint.clone(),
            ObservationZone::from_descriptor(&desc.zone),
            desc.boundary_scored,
        )
    }

    pub fn waypoint(&self) -> &Waypoint {
        &self.waypoint
    }

    pub fn location(&self) -> GeoPoint {
        self.waypoint.location
    }

    pub fn zone(&self) -> &ObservationZone {
        &self.zone
    }

    pub fn is_boundary_scored(&self) -> bool {
        self.boundary_scored
    }

    /// Whether the aircraft is currently inside this point's zone.
    pub fn is_in_sector(&self, state: &AircraftState) -> bool {
        self.zone
            .is_in_sector(&self.waypoint.location, &state.location)
    }

    /// Record the aircraft state as a trajectory sample if it lies inside
    /// the observation zone.
    ///
    /// Returns true iff the sample set changed materially, i.e. the new
    /// fix is an extremal point of the pruned trajectory. Callers use this
    /// to decide whether route optimization needs to re-run.
    pub fn update_sample(&mut self, state: &AircraftState, projection: &TaskProjection) -> bool {
        if !self.is_in_sector(state) {
            return false;
        }

        // A fix already in the set cannot change the hull, even when it
        // revisits an earlier extremal vertex.
        if self.sampled_points.contains_location(&state.location) {
            return false;
        }
        self.sampled_points.push(SearchPoint::new(state.location, projection));
        self.sampled_points.prune_interior();

        let material = self.sampled_points.contains_location(&state.location);
        if material {
            tracing::trace!(
                waypoint = %self.waypoint.name,
                samples = self.sampled_points.len(),
                "new extremal trajectory sample"
            );
        }
        material
    }

    /// Discard trajectory samples that cannot affect the achieved optimum.
    /// Returns whether anything was discarded.
    pub fn prune_sample_points(&mut self) -> bool {
        self.sampled_points.prune_interior()
    }

    /// Collapse non-extremal points of the cached boundary tessellation.
    /// Returns whether anything was discarded.
    pub fn prune_boundary_points(&mut self) -> bool {
        self.boundary_points.prune_interior()
    }

    /// The candidate point set for the route optimizer.
    ///
    /// Boundary-scored points always offer the zone boundary; otherwise
    /// the accumulated trajectory samples when any exist. With `cheat` set
    /// (degenerate-solving fallback) the boundary is widened with the
    /// interior samples as extra candidates.
    pub fn get_search_points(&self, cheat: bool) -> SearchPointVector {
        if cheat {
            let mut widened = self.boundary_points.clone();
            for sample in self.sampled_points.iter() {
                if !widened.contains_location(&sample.location()) {
                    widened.push(*sample);
                }
            }
            return widened;
        }

        if !self.boundary_scored && !self.sampled_points.is_empty() {
            self.sampled_points.clone()
        } else {
            self.boundary_points.clone()
        }
    }

    pub fn get_boundary_points(&self) -> &SearchPointVector {
        &self.boundary_points
    }

    pub fn get_sample_points(&self) -> &SearchPointVector {
        &self.sampled_points
    }

    /// Written by the route optimizer once it has solved for the extremal
    /// boundary point.
    pub fn set_search_max(&mut self, point: SearchPoint) {
        self.search_max = point;
    }

    pub fn set_search_min(&mut self, point: SearchPoint) {
        self.search_min = point;
    }

    pub fn search_max(&self) -> &SearchPoint {
        &self.search_max
    }

    pub fn search_min(&self) -> &SearchPoint {
        &self.search_min
    }

    pub fn max_location(&self) -> GeoPoint {
        self.search_max.location()
    }

    pub fn min_location(&self) -> GeoPoint {
        self.search_min.location()
    }

    /// Seed the boundary sequence from the zone's default tessellation.
    pub fn default_boundary_points(&mut self, projection: &TaskProjection) {
        self.boundary_points = SearchPointVector::from_locations(
            self.zone
                .boundary_points(&self.waypoint.location, DEFAULT_BOUNDARY_POINT_COUNT),
            projection,
        );
    }

    /// Reset the boundary sequence to the default tessellation.
    pub fn clear_boundary_points(&mut self, projection: &TaskProjection) {
        self.boundary_points.clear();
        self.default_boundary_points(projection);
    }

    /// Drop all accumulated trajectory samples.
    pub fn clear_sample_points(&mut self) {
        self.sampled_points.clear();
    }

    /// Drop accumulated samples except the most recent fix, which still
    /// describes where the aircraft currently is. Used when the task is
    /// edited mid-flight.
    pub fn clear_sample_all_but_last(&mut self, state: &AircraftState, projection: &TaskProjection) {
        self.sampled_points.keep_last();
        if self.sampled_points.is_empty() && self.is_in_sector(state) {
            self.sampled_points
                .push(SearchPoint::new(state.location, projection));
        }
    }

    /// Re-project every stored search point against the current shared
    /// projection. Must be called whenever the projection reference
    /// changes; the cached plane coordinates are invalid until then.
    pub fn update_projection(&mut self, projection: &TaskProjection) {
        self.sampled_points.project_all(projection);
        self.boundary_points.project_all(projection);
        self.search_max.project(projection);
        self.search_min.project(projection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoVector;
    use chrono::Utc;

    fn center() -> GeoPoint {
        GeoPoint::new(46.5, 7.5)
    }

    fn proj() -> TaskProjection {
        let mut p = TaskProjection::default();
        p.update([
            GeoPoint::new(46.0, 7.0),
            GeoPoint::new(47.0, 8.0),
        ]);
        p
    }

    fn cylinder_point(projection: &TaskProjection, boundary_scored: bool) -> SampledTaskPoint {
        SampledTaskPoint::new(
            projection,
            Waypoint {
                name: "TP1".into(),
                location: center(),
                elevation_m: 500.0,
            },
            ObservationZone::Cylinder { radius_m: 500.0 },
            boundary_scored,
        )
    }

    fn state_at(location: GeoPoint) -> AircraftState {
        AircraftState::new(location, 1_500.0, Utc::now())
    }

    #[test]
    fn update_sample_outside_zone_is_ignored() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, false);
        let outside = GeoVector::new(1_000.0, 90.0).end_point(&center());
        assert!(!tp.update_sample(&state_at(outside), &projection));
        assert!(tp.get_sample_points().is_empty());
    }

    #[test]
    fn update_sample_inside_zone_is_material() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, false);
        let inside = GeoVector::new(200.0, 90.0).end_point(&center());
        assert!(tp.update_sample(&state_at(inside), &projection));
        assert_eq!(tp.get_sample_points().len(), 1);
    }

    #[test]
    fn repeated_fix_is_not_material() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, false);
        let inside = GeoVector::new(200.0, 90.0).end_point(&center());
        assert!(tp.update_sample(&state_at(inside), &projection));
        assert!(!tp.update_sample(&state_at(inside), &projection));
    }

    #[test]
    fn revisited_extremal_fix_is_not_material() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, false);
        let corners: Vec<GeoPoint> = [0.0, 120.0, 240.0]
            .iter()
            .map(|b| GeoVector::new(400.0, *b).end_point(&center()))
            .collect();
        for c in &corners {
            assert!(tp.update_sample(&state_at(*c), &projection));
        }

        // Coming back over the first corner adds nothing to the hull and
        // must not trigger another optimization run.
        assert!(!tp.update_sample(&state_at(corners[0]), &projection));
        assert_eq!(tp.get_sample_points().len(), 3);
    }

    #[test]
    fn interior_fix_is_not_material() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, false);
        // Surround a central fix with extremal ones.
        for bearing in [0.0, 90.0, 180.0, 270.0] {
            let p = GeoVector::new(400.0, bearing).end_point(&center());
            tp.update_sample(&state_at(p), &projection);
        }
        assert!(!tp.update_sample(&state_at(center()), &projection));
    }

    #[test]
    fn prune_sample_points_idempotent() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, false);
        for bearing in [0.0, 90.0, 180.0, 270.0] {
            let p = GeoVector::new(400.0, bearing).end_point(&center());
            tp.update_sample(&state_at(p), &projection);
        }
        // update_sample already pruned; nothing further to discard.
        assert!(!tp.prune_sample_points());
        assert!(!tp.prune_sample_points());
    }

    #[test]
    fn cleared_point_falls_back_to_default_boundary() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, false);
        let inside = GeoVector::new(200.0, 45.0).end_point(&center());
        tp.update_sample(&state_at(inside), &projection);

        tp.clear_sample_points();
        tp.clear_boundary_points(&projection);

        assert!(tp.get_sample_points().is_empty());
        let search = tp.get_search_points(false);
        assert_eq!(search.len(), 24);
        for p in search.iter() {
            assert!((center().distance_to(&p.location()) - 500.0).abs() < 1.0);
        }
    }

    #[test]
    fn boundary_scored_point_offers_boundary_despite_samples() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, true);
        let inside = GeoVector::new(200.0, 45.0).end_point(&center());
        tp.update_sample(&state_at(inside), &projection);

        let search = tp.get_search_points(false);
        assert!(!search.contains_location(&inside));
    }

    #[test]
    fn cheat_widens_with_interior_samples() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, true);
        let inside = GeoVector::new(200.0, 45.0).end_point(&center());
        tp.update_sample(&state_at(inside), &projection);

        let widened = tp.get_search_points(true);
        assert!(widened.contains_location(&inside));
        assert!(widened.len() > tp.get_boundary_points().len());
    }

    #[test]
    fn clear_sample_all_but_last_keeps_current_fix() {
        let projection = proj();
        let mut tp = cylinder_point(&projection, false);
        let fixes: Vec<GeoPoint> = [0.0, 90.0, 180.0]
            .iter()
            .map(|b| GeoVector::new(300.0, *b).end_point(&center()))
            .collect();
        for f in &fixes {
            tp.update_sample(&state_at(*f), &projection);
        }

        tp.clear_sample_all_but_last(&state_at(fixes[2]), &projection);
        assert_eq!(tp.get_sample_points().len(), 1);
    }

    #[test]
    fn update_projection_preserves_geodetic_extremals() {
        let mut projection = proj();
        let mut tp = cylinder_point(&projection, false);

        let solved = SearchPoint::new(
            GeoVector::new(500.0, 90.0).end_point(&center()),
            &projection,
        );
        tp.set_search_max(solved);
        let max_before = tp.max_location();
        let flat_before = tp.search_max().flat();

        // Task moved: new projection reference, everything re-projected.
        projection.update([GeoPoint::new(46.3, 7.3), GeoPoint::new(46.7, 7.7)]);
        tp.update_projection(&projection);

        assert_eq!(tp.max_location(), max_before);
        assert_ne!(tp.search_max().flat(), flat_before);
    }

    #[test]
    fn degenerate_zone_never_samples() {
        let projection = proj();
        let mut tp = SampledTaskPoint::new(
            &projection,
            Waypoint {
                name: "ZERO".into(),
                location: center(),
                elevation_m: 0.0,
            },
            ObservationZone::Cylinder { radius_m: 0.0 },
            false,
        );
        assert!(!tp.update_sample(&state_at(center()), &projection));
        // Degenerate boundary is just the turnpoint itself.
        assert_eq!(tp.get_boundary_points().len(), 1);
    }
}
