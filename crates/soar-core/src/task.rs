//! The task: an ordered sequence of sampled turnpoints sharing one
//! projection.
//!
//! The task owns the single `TaskProjection` instance all of its geometry
//! uses. Any projection update is immediately cascaded to every turnpoint
//! so no stale plane coordinate survives the call.

use crate::error::TaskError;
use crate::models::{AircraftState, GeoPoint, TaskPointDescriptor, ZoneDescriptor};
use crate::projection::TaskProjection;
use crate::task_point::SampledTaskPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    points: Vec<SampledTaskPoint>,
    projection: TaskProjection,
}

impl Task {
    /// Build a task from editor/profile descriptors.
    ///
    /// This is the only fallible path in the crate: descriptors with
    /// non-finite coordinates or negative zone dimensions are rejected
    /// here so the geometry below never sees them. Zero dimensions are
    /// accepted and behave as degenerate zones.
    pub fn from_descriptors(descriptors: Vec<TaskPointDescriptor>) -> Result<Self, TaskError> {
        if descriptors.is_empty() {
            return Err(TaskError::EmptyTask);
        }
        for (index, desc) in descriptors.iter().enumerate() {
            if !desc.waypoint.location.is_valid() {
                return Err(TaskError::InvalidCoordinate { index });
            }
            validate_zone(index, &desc.zone)?;
        }

        let mut projection = TaskProjection::default();
        projection.update(descriptors.iter().map(|d| d.waypoint.location));

        let points = descriptors
            .iter()
            .map(|d| SampledTaskPoint::from_descriptor(&projection, d))
            .collect();

        tracing::debug!(turnpoints = descriptors.len(), "task loaded");
        Ok(Self { points, projection })
    }

    pub fn projection(&self) -> &TaskProjection {
        &self.projection
    }

    pub fn points(&self) -> &[SampledTaskPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&SampledTaskPoint> {
        self.points.get(index)
    }

    pub fn point_mut(&mut self, index: usize) -> Option<&mut SampledTaskPoint> {
        self.points.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Deliver one navigation tick to every turnpoint.
    ///
    /// Returns true if any point's sample set changed materially,
    /// signaling that route optimization may need to re-run.
    pub fn update_sample(&mut self, state: &AircraftState) -> bool {
        let mut changed = false;
        for point in &mut self.points {
            changed |= point.update_sample(state, &self.projection);
        }
        changed
    }

    /// Prune every turnpoint's trajectory samples. Returns whether
    /// anything was discarded.
    pub fn prune_sample_points(&mut self) -> bool {
        let mut pruned = false;
        for point in &mut self.points {
            pruned |= point.prune_sample_points();
        }
        pruned
    }

    /// Prune every turnpoint's boundary tessellation.
    pub fn prune_boundary_points(&mut self) -> bool {
        let mut pruned = false;
        for point in &mut self.points {
            pruned |= point.prune_boundary_points();
        }
        pruned
    }

    /// Recompute the shared projection from the task's current coordinate
    /// span, then re-project every stored search point.
    ///
    /// Every plane point produced before this call is invalid; the cascade
    /// below is what restores the system invariant that all cached plane
    /// coordinates agree with the live projection.
    pub fn update_projection(&mut self) {
        let extent: Vec<GeoPoint> = self
            .points
            .iter()
            .flat_map(|p| {
                std::iter::once(p.location())
                    .chain(p.get_sample_points().iter().map(|s| s.location()))
            })
            .collect();
        self.projection.update(extent);

        for point in &mut self.points {
            point.update_projection(&self.projection);
        }
    }

    /// Reset accumulated state for a task restart: samples dropped,
    /// boundaries reseeded from the zone defaults.
    pub fn restart(&mut self) {
        for point in &mut self.points {
            point.clear_sample_points();
            point.clear_boundary_points(&self.projection);
        }
    }
}

fn validate_zone(index: usize, zone: &ZoneDescriptor) -> Result<(), TaskError> {
    let (value, what) = match *zone {
        ZoneDescriptor::Cylinder { radius_m } => (radius_m, "radius"),
        ZoneDescriptor::Sector { radius_m, .. } => (radius_m, "radius"),
        ZoneDescriptor::Line { length_m, .. } => (length_m, "length"),
    };
    if !value.is_finite() || value < 0.0 {
        return Err(TaskError::InvalidZone {
            index,
            reason: format!("{what} must be finite and non-negative, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoVector, Waypoint};
    use chrono::Utc;

    fn descriptor(name: &str, lat: f64, lon: f64, radius_m: f64) -> TaskPointDescriptor {
        TaskPointDescriptor {
            waypoint: Waypoint {
                name: name.into(),
                location: GeoPoint::new(lat, lon),
                elevation_m: 400.0,
            },
            zone: ZoneDescriptor::Cylinder { radius_m },
            boundary_scored: false,
        }
    }

    fn three_point_task() -> Task {
        Task::from_descriptors(vec![
            descriptor("START", 46.2, 7.2, 1_000.0),
            descriptor("TP1", 46.6, 7.6, 500.0),
            descriptor("FINISH", 46.4, 7.9, 1_000.0),
        ])
        .unwrap()
    }

    #[test]
    fn empty_task_is_rejected() {
        assert_eq!(Task::from_descriptors(vec![]), Err(TaskError::EmptyTask));
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let err = Task::from_descriptors(vec![descriptor("BAD", f64::NAN, 7.0, 500.0)]);
        assert_eq!(err, Err(TaskError::InvalidCoordinate { index: 0 }));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let err = Task::from_descriptors(vec![descriptor("BAD", 46.0, 7.0, -1.0)]);
        assert!(matches!(err, Err(TaskError::InvalidZone { index: 0, .. })));
    }

    #[test]
    fn zero_radius_is_accepted_as_degenerate() {
        let task = Task::from_descriptors(vec![descriptor("ZERO", 46.0, 7.0, 0.0)]).unwrap();
        assert_eq!(task.len(), 1);
    }

    #[test]
    fn update_sample_fans_out_to_containing_points() {
        let mut task = three_point_task();
        let inside_tp1 =
            GeoVector::new(300.0, 45.0).end_point(&GeoPoint::new(46.6, 7.6));
        let state = AircraftState::new(inside_tp1, 1_500.0, Utc::now());

        assert!(task.update_sample(&state));
        assert_eq!(task.point(1).unwrap().get_sample_points().len(), 1);
        assert!(task.point(0).unwrap().get_sample_points().is_empty());
    }

    #[test]
    fn projection_reference_tracks_task_extent() {
        let task = three_point_task();
        let r = task.projection().reference();
        assert!((r.lat - 46.4).abs() < 1e-9);
        assert!((r.lon - 7.55).abs() < 1e-9);
    }

    #[test]
    fn update_projection_cascades_to_all_points() {
        let mut task = three_point_task();
        let inside_tp1 =
            GeoVector::new(300.0, 45.0).end_point(&GeoPoint::new(46.6, 7.6));
        let state = AircraftState::new(inside_tp1, 1_500.0, Utc::now());
        task.update_sample(&state);

        let flats_before: Vec<_> = task
            .point(1)
            .unwrap()
            .get_boundary_points()
            .iter()
            .map(|p| p.flat())
            .collect();

        // Shrink the task; the scale changes and all caches must follow.
        task.points.truncate(2);
        task.update_projection();

        let point = task.point(1).unwrap();
        let flats_after: Vec<_> = point
            .get_boundary_points()
            .iter()
            .map(|p| p.flat())
            .collect();
        assert_ne!(flats_before, flats_after);

        // Geodetic content is untouched by re-projection.
        assert!(point
            .get_sample_points()
            .contains_location(&inside_tp1));
    }

    #[test]
    fn restart_resets_samples_and_boundaries() {
        let mut task = three_point_task();
        let inside_tp1 =
            GeoVector::new(300.0, 45.0).end_point(&GeoPoint::new(46.6, 7.6));
        task.update_sample(&AircraftState::new(inside_tp1, 1_500.0, Utc::now()));

        task.restart();
        assert!(task.point(1).unwrap().get_sample_points().is_empty());
        assert_eq!(task.point(1).unwrap().get_boundary_points().len(), 24);
    }
}
