pub mod airspace;
pub mod blackboard;
pub mod error;
pub mod flat;
pub mod models;
pub mod projection;
pub mod search;
pub mod spatial;
pub mod task;
pub mod task_point;
pub mod zone;

pub use airspace::{AirspaceCircle, AirspacePolygon, AirspaceShape, Airspaces};
pub use blackboard::StateBlackboard;
pub use error::TaskError;
pub use flat::{FlatBoundingBox, FlatGeoPoint, FlatLine, FlatPoint};
pub use models::{
    AircraftState, AirspaceDescriptor, GeoPoint, GeoVector, TaskPointDescriptor, Waypoint,
    ZoneDescriptor,
};
pub use projection::TaskProjection;
pub use search::{SearchPoint, SearchPointVector};
pub use spatial::haversine_distance;
pub use task::Task;
pub use task_point::SampledTaskPoint;
pub use zone::ObservationZone;
