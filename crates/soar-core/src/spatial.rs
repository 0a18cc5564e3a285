//! Geodesic math shared by the task and airspace geometry.
//!
//! All functions take coordinates in decimal degrees and bearings in
//! degrees clockwise from true north. Distances are meters on a spherical
//! earth model.

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using the Haversine formula.
///
/// This is the standard formula for great-circle distance between two
/// points on a sphere given their latitudes and longitudes.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from point 1 to point 2.
///
/// Returns degrees in [0, 360), 0 = north, 90 = east.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y).to_degrees().rem_euclid(360.0)
}

/// Destination point given a start, distance and bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_deg` - Bearing in degrees (0 = north, 90 = east)
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_deg: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// Point at `distance_m` from (lat1, lon1) along the great circle toward
/// (lat2, lon2).
///
/// Well-defined for any distance, including beyond the target point. When
/// the two points coincide the bearing is taken as north.
pub fn intermediate_point(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    distance_m: f64,
) -> (f64, f64) {
    let bearing = if haversine_distance(lat1, lon1, lat2, lon2) <= f64::EPSILON {
        0.0
    } else {
        bearing_deg(lat1, lon1, lat2, lon2)
    };
    offset_by_bearing(lat1, lon1, distance_m, bearing)
}

/// Minimum geodesic distance from the great-circle segment (start -> end)
/// to a point, in meters.
///
/// Uses the cross-track formula when the point's along-track projection
/// falls within the segment, otherwise the nearer endpoint distance.
pub fn cross_track_minimum_distance(
    start_lat: f64,
    start_lon: f64,
    end_lat: f64,
    end_lon: f64,
    point_lat: f64,
    point_lon: f64,
) -> f64 {
    let seg_len = haversine_distance(start_lat, start_lon, end_lat, end_lon);
    let d_start = haversine_distance(start_lat, start_lon, point_lat, point_lon);
    if seg_len <= f64::EPSILON {
        return d_start;
    }

    let theta_seg = bearing_deg(start_lat, start_lon, end_lat, end_lon).to_radians();
    let theta_pt = bearing_deg(start_lat, start_lon, point_lat, point_lon).to_radians();
    let delta13 = d_start / EARTH_RADIUS_M;

    // Cross-track and along-track arcs from the start point.
    let cross = (delta13.sin() * (theta_pt - theta_seg).sin()).asin();
    let along = (delta13.cos() / cross.cos().max(f64::EPSILON))
        .clamp(-1.0, 1.0)
        .acos()
        * EARTH_RADIUS_M;

    let foot_in_segment = (theta_pt - theta_seg).cos() >= 0.0 && along <= seg_len;

    if foot_in_segment {
        cross.abs() * EARTH_RADIUS_M
    } else {
        let d_end = haversine_distance(end_lat, end_lon, point_lat, point_lon);
        d_start.min(d_end)
    }
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}
