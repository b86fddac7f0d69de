//! Single-file wrapper around raw GPX text and its parsed points

use crate::point::TrackPoint;
use crate::{Result, parser};
use chrono::{DateTime, Utc};
use std::path::Path;

/// One loaded GPX file with header fields and the enriched point run
///
/// The raw text is kept verbatim so the file can serve as the structural
/// skeleton when a collection is recombined. Everything is parsed once at
/// construction and read-only afterwards.
#[derive(Debug, Clone)]
pub struct TrackFile {
    filename: String,
    raw: String,
    name: String,
    create_time: DateTime<Utc>,
    points: Vec<TrackPoint>,
}

impl TrackFile {
    /// Read and parse the file at `path`
    ///
    /// The handle is dropped as soon as the text is in memory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_raw(raw, path.as_ref().display().to_string())
    }

    /// Parse GPX text that is already in memory
    ///
    /// The name tag, the metadata time stamp and the track segment are all
    /// required; a missing piece fails the whole file and nothing partial is
    /// returned.
    pub fn from_raw(raw: String, filename: String) -> Result<Self> {
        let name = parser::extract_tag(&raw, "name")?.to_string();
        let metadata = parser::extract_tag(&raw, "metadata")?;
        let create_time = parser::parse_time(parser::extract_tag(metadata, "time")?)?;
        let points = parser::parse_points(&raw, &filename)?;

        Ok(TrackFile {
            filename,
            raw,
            name,
            create_time,
            points,
        })
    }

    /// Path (or identifier) this file was loaded from
    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The original text, byte for byte
    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Content of the first `<name>` tag
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recording time from the `<metadata><time>` stamp
    #[inline]
    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    /// Parsed points in source order
    #[inline]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Serialize every point back to `<trkpt>` markup
    ///
    /// Each element nests `<ele>` then `<time>` in that fixed order, and the
    /// time comes back out in the exact layout it was parsed from, so feeding
    /// the joined markup through the parser again reproduces the same points.
    pub fn to_gpx_point_markup(&self) -> Vec<String> {
        self.points.iter().map(point_markup).collect()
    }
}

/// Render one point as a `<trkpt>` element
fn point_markup(point: &TrackPoint) -> String {
    format!(
        "<trkpt lat=\"{}\" lon=\"{}\">\n<ele>{}</ele>\n<time>{}</time>\n</trkpt>",
        point.latitude,
        point.longitude,
        point.elevation,
        parser::format_time(point.time)
    )
}
