//! Track Atlas Library - GPX Track Parsing, Merging and Heat-Map Accumulation
//!
//! This library parses GPX track logs, extracts per-point
//! latitude/longitude/elevation/time records, enriches them with great-circle
//! distances, merges many recordings into a single exported GPX document, and
//! accumulates points across files into a heat-map table tagged with
//! filename-derived metadata.
//!
//! # Architecture
//!
//! - **[`geomath`]**: Haversine distance and local planar projection
//! - **[`parser`]**: Tag/attribute extraction from raw GPX text
//! - **[`TrackFile`]**: One parsed file with its enriched point run
//! - **[`TrackCollection`]**: Files ordered by create time, recombinable into one document
//! - **[`HeatMapStore`]**: Point accumulation across files, deduplicated by source
//! - **[`plot`]**: Flat tables for the plotting sink
//!
//! # Input assumptions
//!
//! GPX is handled as plain text with a fixed tag set (one `<trkseg>` block,
//! `<trkpt lat lon>` points nested with `<ele>` and `<time>`, a
//! `<metadata><time>` stamp and a `<name>` tag). This is not a general XML
//! parser and no schema validation happens beyond that tag set.

mod collection;
pub mod geomath;
mod heatmap;
pub mod parser;
pub mod plot;
mod point;
mod track;

// Public API exports
pub use collection::TrackCollection;
pub use heatmap::{HeatMapStore, HeatRow, MetadataDecoder, TrailMeta, decode_date_trail_region};
pub use point::TrackPoint;
pub use track::TrackFile;

/// Error types for parsing and export
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("missing tag <{0}>")]
    MissingTag(String),

    #[error("missing attribute {0}")]
    MissingAttribute(String),

    #[error("invalid number {value:?}: {source}")]
    InvalidNumber {
        value: String,
        source: std::num::ParseFloatError,
    },

    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty collection")]
    EmptyCollection,
}

pub type Result<T> = std::result::Result<T, TrackError>;
