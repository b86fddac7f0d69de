//! Typed track point records

use chrono::{DateTime, Utc};
use geo::Point;

/// One timestamped GPS fix, read-only once parsed
///
/// `distance_to_next` is filled in during enrichment with the great-circle
/// distance in kilometers to the following point of the same file; the last
/// point of a file keeps `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Elevation in meters
    pub elevation: f64,
    /// Fix timestamp (GPX times are UTC)
    pub time: DateTime<Utc>,
    /// Path of the originating file
    pub source: String,
    /// Distance to the following point in kilometers
    pub distance_to_next: Option<f64>,
}

impl TrackPoint {
    /// Position as a geo point (x = longitude, y = latitude)
    #[inline]
    pub fn position(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}
