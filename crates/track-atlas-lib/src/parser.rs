//! Tag and attribute extraction from raw GPX text
//!
//! GPX input is treated as plain text with a fixed tag set rather than going
//! through an XML parser. [`extract_tag`] and [`extract_attribute`] define
//! the extraction contract; [`parse_points`] turns the raw fragments into
//! typed [`TrackPoint`]s and enriches them with pairwise distances.

use crate::point::TrackPoint;
use crate::{Result, TrackError, geomath};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp layout used by GPX `<time>` tags (Z marks UTC)
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Raw per-point substrings pulled out of one `<trkpt>` fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPointRecord {
    pub lat: String,
    pub lon: String,
    pub elevation: String,
    pub time: String,
}

/// Parse a GPX timestamp into UTC
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, TIME_FORMAT).map_err(|source| {
        TrackError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })?;
    Ok(naive.and_utc())
}

/// Format a UTC timestamp back into the GPX layout
///
/// Inverse of [`parse_time`]: formatting a parsed value reproduces the
/// original string.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Substring between the first `<tag>` and the first `</tag>` after it
///
/// Both delimiters are required; a missing one fails with
/// [`TrackError::MissingTag`].
pub fn extract_tag<'a>(text: &'a str, tag: &str) -> Result<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");

    let start = text
        .find(&open)
        .ok_or_else(|| TrackError::MissingTag(tag.to_string()))?
        + open.len();
    let length = text[start..]
        .find(&close)
        .ok_or_else(|| TrackError::MissingTag(tag.to_string()))?;

    Ok(&text[start..start + length])
}

/// Value of the first `name="..."` attribute in a tag fragment
pub fn extract_attribute<'a>(fragment: &'a str, name: &str) -> Result<&'a str> {
    let marker = format!("{name}=\"");

    let start = fragment
        .find(&marker)
        .ok_or_else(|| TrackError::MissingAttribute(name.to_string()))?
        + marker.len();
    let length = fragment[start..]
        .find('"')
        .ok_or_else(|| TrackError::MissingAttribute(name.to_string()))?;

    Ok(&fragment[start..start + length])
}

/// Pull raw point records out of the first `<trkseg>` block
///
/// Only the first segment is read; later `<trkseg>` blocks are ignored.
/// Fragments without a `lat` attribute (the text before the first point)
/// are discarded.
pub fn extract_track_points(raw: &str) -> Result<Vec<RawPointRecord>> {
    let segment = extract_tag(raw, "trkseg")?;

    segment
        .split("<trkpt ")
        .filter(|fragment| fragment.contains("lat=\""))
        .map(|fragment| {
            let body = match fragment.find("</trkpt>") {
                Some(end) => &fragment[..end],
                None => fragment,
            };
            Ok(RawPointRecord {
                lat: extract_attribute(body, "lat")?.to_string(),
                lon: extract_attribute(body, "lon")?.to_string(),
                elevation: extract_tag(body, "ele")?.to_string(),
                time: extract_tag(body, "time")?.to_string(),
            })
        })
        .collect()
}

/// Parse every point in `raw`, attach the source id, and enrich each point
/// with the distance to its successor
///
/// Zero or one points parse fine; there is simply nothing to enrich.
pub fn parse_points(raw: &str, source: &str) -> Result<Vec<TrackPoint>> {
    let mut points = extract_track_points(raw)?
        .into_iter()
        .map(|record| {
            Ok(TrackPoint {
                latitude: parse_number(&record.lat)?,
                longitude: parse_number(&record.lon)?,
                elevation: parse_number(&record.elevation)?,
                time: parse_time(&record.time)?,
                source: source.to_string(),
                distance_to_next: None,
            })
        })
        .collect::<Result<Vec<TrackPoint>>>()?;

    let distances: Vec<f64> = points
        .windows(2)
        .map(|pair| geomath::great_circle_distance(pair[0].position(), pair[1].position()))
        .collect();
    for (point, distance) in points.iter_mut().zip(distances) {
        point.distance_to_next = Some(distance);
    }

    Ok(points)
}

fn parse_number(value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|source| TrackError::InvalidNumber {
            value: value.to_string(),
            source,
        })
}
