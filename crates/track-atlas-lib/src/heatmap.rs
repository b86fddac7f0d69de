//! Historical point accumulation across many recordings
//!
//! Every ingested file contributes its points as flat rows tagged with
//! metadata decoded from the filename. Files are deduplicated by source path,
//! so re-running an ingest over the same directory is a no-op.

use crate::track::TrackFile;
use crate::{Result, parser};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Metadata decoded from a heat-map source filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailMeta {
    pub date: String,
    pub trailname: String,
    pub region: String,
}

/// Maps a source path onto trail metadata
///
/// Returns `None` when the filename does not follow the decoder's
/// convention; such files are skipped with a warning rather than ingested
/// untagged.
pub type MetadataDecoder = fn(&str) -> Option<TrailMeta>;

/// Default decoder for `date_trailname_region` basenames
///
/// The extension is stripped first and exactly three underscore-separated
/// parts are required. `2021-03-28_boulderfield_plains.gpx` decodes to date
/// `2021-03-28`, trail `boulderfield`, region `plains`.
pub fn decode_date_trail_region(path: &str) -> Option<TrailMeta> {
    let stem = Path::new(path).file_stem()?.to_str()?;

    let mut parts = stem.split('_');
    let date = parts.next()?;
    let trailname = parts.next()?;
    let region = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    Some(TrailMeta {
        date: date.to_string(),
        trailname: trailname.to_string(),
        region: region.to_string(),
    })
}

/// One dressed heat-map row
///
/// Field order is the persisted CSV column order. The source path is not a
/// column; it only feeds the store's dedup set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatRow {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub time: String,
    pub date: String,
    pub trailname: String,
    pub region: String,
}

/// Accumulated heat-map rows plus the set of files already ingested
///
/// Accumulation steps take the store by value and hand back the grown store.
#[derive(Debug, Clone)]
pub struct HeatMapStore {
    rows: Vec<HeatRow>,
    sources: BTreeSet<String>,
    decoder: MetadataDecoder,
}

impl Default for HeatMapStore {
    fn default() -> Self {
        Self::new(decode_date_trail_region)
    }
}

impl HeatMapStore {
    /// Empty store using the given filename decoder
    pub fn new(decoder: MetadataDecoder) -> Self {
        HeatMapStore {
            rows: Vec::new(),
            sources: BTreeSet::new(),
            decoder,
        }
    }

    /// Source files already ingested, in sorted order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    /// Rows accumulated so far
    #[inline]
    pub fn rows(&self) -> &[HeatRow] {
        &self.rows
    }

    /// Number of accumulated rows
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the store holds no rows
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ingest one file unless its path was already taken in
    ///
    /// A path the decoder cannot make sense of is skipped with a warning.
    /// Parse and read errors for a fresh file are fatal, as in collection
    /// loading.
    pub fn intake<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let source = path.as_ref().display().to_string();

        if self.sources.contains(&source) {
            tracing::debug!("{source} already ingested, skipping");
            return Ok(self);
        }
        let Some(meta) = (self.decoder)(&source) else {
            tracing::warn!("{source} does not match the filename convention, skipping");
            return Ok(self);
        };

        tracing::info!("processing {source}");
        let file = TrackFile::load(path.as_ref())?;
        for point in file.points() {
            self.rows.push(HeatRow {
                latitude: point.latitude,
                longitude: point.longitude,
                elevation: point.elevation,
                time: parser::format_time(point.time),
                date: meta.date.clone(),
                trailname: meta.trailname.clone(),
                region: meta.region.clone(),
            });
        }
        self.sources.insert(source);

        Ok(self)
    }

    /// Ingest many paths, visiting them in sorted order
    pub fn compile<P: AsRef<Path>>(self, paths: &[P]) -> Result<Self> {
        let mut sorted: Vec<&Path> = paths.iter().map(AsRef::as_ref).collect();
        sorted.sort();

        let mut store = self;
        for path in sorted {
            store = store.intake(path)?;
        }
        Ok(store)
    }

    /// Serialize the dressed table as CSV
    ///
    /// Columns are latitude, longitude, elevation, time, date, trailname,
    /// region, in that order.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the dressed table to `path`
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}
