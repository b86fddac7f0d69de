//! Flat tables for the plotting sink
//!
//! Rendering itself lives outside this library; these helpers only shape
//! point runs into {longitude, latitude, value} tables and serialize them.

use crate::point::TrackPoint;
use crate::{Result, geomath};
use chrono::{DateTime, Utc};
use geo::Point;
use serde::Serialize;

/// One row of a longitude/latitude scatter table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotRow {
    pub longitude: f64,
    pub latitude: f64,
    pub value: f64,
}

/// One row re-based onto a local plane around a reference point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanarRow {
    pub east_km: f64,
    pub north_km: f64,
    pub value: f64,
}

/// Scatter table carrying elevation as the plotted value
pub fn elevation_table(points: &[TrackPoint]) -> Vec<PlotRow> {
    points
        .iter()
        .map(|point| PlotRow {
            longitude: point.longitude,
            latitude: point.latitude,
            value: point.elevation,
        })
        .collect()
}

/// Scatter table carrying whole days since the fix as the plotted value
pub fn recency_table(points: &[TrackPoint], now: DateTime<Utc>) -> Vec<PlotRow> {
    points
        .iter()
        .map(|point| PlotRow {
            longitude: point.longitude,
            latitude: point.latitude,
            value: (now - point.time).num_days() as f64,
        })
        .collect()
}

/// Re-base every point onto a local plane around `reference`
///
/// Components come from [`geomath::project_to_plane`] and are therefore
/// non-negative; see its notes on the quadrant folding this implies.
pub fn planar_table(points: &[TrackPoint], reference: Point<f64>) -> Vec<PlanarRow> {
    points
        .iter()
        .map(|point| {
            let planar = geomath::project_to_plane(point.position(), reference);
            PlanarRow {
                east_km: planar.x(),
                north_km: planar.y(),
                value: point.elevation,
            }
        })
        .collect()
}

/// Serialize any of the tables as CSV for the plotting sink
pub fn write_table_csv<W: std::io::Write, R: Serialize>(writer: W, rows: &[R]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
