//! Great-circle distance and local planar projection
//!
//! Pure spherical geometry with no I/O. Points carry x = longitude and
//! y = latitude, both in degrees, matching the geo crate convention used
//! throughout the library.

use geo::Point;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points in kilometers
///
/// Symmetric, non-negative, and zero for identical inputs. One degree of
/// longitude at the equator comes out near 111.19 km.
#[inline]
pub fn great_circle_distance(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let delta_lat = (p2.y() - p1.y()).to_radians();
    let delta_lon = (p2.x() - p1.x()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Project a point onto a local plane around `reference`
///
/// Returns x = east and y = north, where east is the great-circle distance
/// from the reference to (reference latitude, point longitude) and north the
/// distance to (point latitude, reference longitude), both in kilometers.
///
/// This is a small-offset flattening, not a real map projection. Both
/// components are distances and therefore non-negative, so points west or
/// south of the reference fold into the same quadrant as points east or
/// north of it. Only meaningful for points close to the reference.
#[inline]
pub fn project_to_plane(point: Point<f64>, reference: Point<f64>) -> Point<f64> {
    let east = great_circle_distance(Point::new(point.x(), reference.y()), reference);
    let north = great_circle_distance(Point::new(reference.x(), point.y()), reference);
    Point::new(east, north)
}
