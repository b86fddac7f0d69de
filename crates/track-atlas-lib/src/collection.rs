//! Ordered sets of track files and the combined-document export

use crate::point::TrackPoint;
use crate::track::TrackFile;
use crate::{Result, TrackError, parser};
use geo::{Coord, Rect};
use rayon::prelude::*;
use std::path::Path;

/// Track files sorted ascending by create time
///
/// The order of the input path list never matters; ordering is re-derived
/// from each file's `<metadata><time>` stamp after loading. The collection
/// is rebuilt from scratch whenever the file list changes.
#[derive(Debug, Clone, Default)]
pub struct TrackCollection {
    files: Vec<TrackFile>,
}

impl TrackCollection {
    /// Load every path and sort the result by create time
    ///
    /// Files are parsed in parallel. One malformed or unreadable file fails
    /// the whole batch, since the sort needs a create time from every file.
    pub fn load<P: AsRef<Path> + Send + Sync>(paths: Vec<P>) -> Result<Self> {
        let files: Result<Vec<TrackFile>> = paths.into_par_iter().map(TrackFile::load).collect();

        Ok(Self::from_files(files?))
    }

    /// Wrap already-parsed files, sorting them by create time
    pub fn from_files(mut files: Vec<TrackFile>) -> Self {
        files.sort_by_key(TrackFile::create_time);
        TrackCollection { files }
    }

    /// Files in create-time order
    #[inline]
    pub fn files(&self) -> &[TrackFile] {
        &self.files
    }

    /// Number of files in the collection
    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the collection holds no files
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of points across all files
    pub fn total_points(&self) -> usize {
        self.files.iter().map(|file| file.points().len()).sum()
    }

    /// Concatenate every file's points in collection order
    ///
    /// Per-file point order is preserved; files appear in create-time order.
    pub fn all_points(&self) -> Vec<TrackPoint> {
        self.files
            .iter()
            .flat_map(|file| file.points().iter().cloned())
            .collect()
    }

    /// Bounding box over every point (x = longitude, y = latitude)
    ///
    /// `None` when no file contains any point.
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut found_point = false;

        for point in self.files.iter().flat_map(|file| file.points()) {
            min_x = min_x.min(point.longitude);
            min_y = min_y.min(point.latitude);
            max_x = max_x.max(point.longitude);
            max_y = max_y.max(point.latitude);
            found_point = true;
        }

        if !found_point {
            return None;
        }

        Some(Rect::new(
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: max_y },
        ))
    }

    /// Rebuild one GPX document out of every file's points
    ///
    /// The earliest file's text is the structural skeleton: everything before
    /// its `<trkseg>` and after its `</trkseg>` is kept byte for byte, except
    /// that the `gpx creator` attribute value and the first `<name>` content
    /// are swapped for the supplied labels. When either pattern is absent or
    /// empty the skeleton keeps its value and a warning is logged. The track
    /// segment itself is rebuilt from the points of all files in collection
    /// order.
    pub fn combine(&self, creator: &str, name: &str) -> Result<String> {
        let skeleton = self.files.first().ok_or(TrackError::EmptyCollection)?;

        let (head, rest) = skeleton
            .raw()
            .split_once("<trkseg>")
            .ok_or_else(|| TrackError::MissingTag("trkseg".to_string()))?;
        let (_, tail) = rest
            .split_once("</trkseg>")
            .ok_or_else(|| TrackError::MissingTag("trkseg".to_string()))?;

        let mut head = head.to_string();

        match parser::extract_attribute(&head, "gpx creator").map(str::to_owned) {
            Ok(old) if !old.is_empty() => head = head.replace(&old, creator),
            _ => tracing::warn!("no usable gpx creator attribute in skeleton, keeping its header"),
        }

        match parser::extract_tag(&head, "name").map(str::to_owned) {
            Ok(old) if !old.is_empty() => head = head.replace(&old, name),
            _ => tracing::warn!("no usable name tag in skeleton, keeping its text"),
        }

        let body = self
            .files
            .iter()
            .flat_map(TrackFile::to_gpx_point_markup)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!("{head}<trkseg>\n{body}\n</trkseg>{tail}"))
    }

    /// Write the combined document to `path`
    ///
    /// The handle is closed as soon as the write finishes.
    pub fn export_combined<P: AsRef<Path>>(
        &self,
        path: P,
        creator: &str,
        name: &str,
    ) -> Result<()> {
        let combined = self.combine(creator, name)?;
        std::fs::write(path, combined)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_gpx(
        creator: &str,
        name: &str,
        create_time: &str,
        points: &[(f64, f64, f64, &str)],
    ) -> String {
        let mut body = String::new();
        for (lat, lon, ele, time) in points {
            body.push_str(&format!(
                "<trkpt lat=\"{lat}\" lon=\"{lon}\">\n<ele>{ele}</ele>\n<time>{time}</time>\n</trkpt>\n"
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <gpx creator=\"{creator}\" version=\"1.1\">\n\
             <metadata><time>{create_time}</time></metadata>\n\
             <name>{name}</name>\n\
             <trk>\n<trkseg>\n{body}</trkseg>\n</trk>\n</gpx>\n"
        )
    }

    fn parsed(raw: String, filename: &str) -> TrackFile {
        TrackFile::from_raw(raw, filename.to_string()).unwrap()
    }

    fn write_temp(tag: &str, contents: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("track-atlas-col-{}-{tag}.gpx", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_from_files_sorts_by_create_time() {
        let late = sample_gpx(
            "Rec",
            "Afternoon",
            "2021-03-28T15:00:00Z",
            &[(40.2, -105.2, 2300.0, "2021-03-28T15:01:00Z")],
        );
        let early = sample_gpx(
            "Rec",
            "Morning",
            "2021-03-28T09:00:00Z",
            &[(40.0, -105.0, 2200.0, "2021-03-28T09:01:00Z")],
        );

        let collection = TrackCollection::from_files(vec![
            parsed(late, "late.gpx"),
            parsed(early, "early.gpx"),
        ]);

        assert_eq!(collection.files()[0].name(), "Morning");
        assert_eq!(collection.files()[1].name(), "Afternoon");
    }

    #[test]
    fn test_all_points_concatenates_in_order() {
        let first = sample_gpx(
            "Rec",
            "First",
            "2021-03-28T09:00:00Z",
            &[
                (40.0, -105.0, 2200.0, "2021-03-28T09:01:00Z"),
                (40.01, -105.01, 2210.0, "2021-03-28T09:02:00Z"),
            ],
        );
        let second = sample_gpx(
            "Rec",
            "Second",
            "2021-03-28T15:00:00Z",
            &[
                (41.0, -106.0, 2400.0, "2021-03-28T15:01:00Z"),
                (41.01, -106.01, 2410.0, "2021-03-28T15:02:00Z"),
                (41.02, -106.02, 2420.0, "2021-03-28T15:03:00Z"),
            ],
        );

        let collection = TrackCollection::from_files(vec![
            parsed(second, "second.gpx"),
            parsed(first, "first.gpx"),
        ]);

        let points = collection.all_points();
        assert_eq!(points.len(), 5);
        assert_eq!(points.len(), collection.total_points());
        assert_eq!(points[0].source, "first.gpx");
        assert_eq!(points[2].source, "second.gpx");
    }

    #[test]
    fn test_bounding_box() {
        let raw = sample_gpx(
            "Rec",
            "Box",
            "2021-03-28T09:00:00Z",
            &[
                (40.0, -105.5, 2200.0, "2021-03-28T09:01:00Z"),
                (40.5, -105.0, 2300.0, "2021-03-28T09:02:00Z"),
            ],
        );
        let collection = TrackCollection::from_files(vec![parsed(raw, "box.gpx")]);

        let bbox = collection.bounding_box().unwrap();
        assert_eq!(bbox.min().x, -105.5);
        assert_eq!(bbox.min().y, 40.0);
        assert_eq!(bbox.max().x, -105.0);
        assert_eq!(bbox.max().y, 40.5);
    }

    #[test]
    fn test_bounding_box_empty() {
        let collection = TrackCollection::from_files(Vec::new());
        assert!(collection.bounding_box().is_none());
        assert!(collection.is_empty());
    }

    #[test]
    fn test_combine_replaces_only_creator_and_name() {
        let raw = sample_gpx(
            "OldTool",
            "Morning Run",
            "2021-03-28T09:00:00Z",
            &[(40.0, -105.0, 2200.0, "2021-03-28T09:01:00Z")],
        );
        let collection = TrackCollection::from_files(vec![parsed(raw.clone(), "run.gpx")]);

        let combined = collection.combine("MyTool", "Run1").unwrap();

        let expected_head = raw
            .split_once("<trkseg>")
            .unwrap()
            .0
            .replace("OldTool", "MyTool")
            .replace("Morning Run", "Run1");
        let expected_tail = raw.split_once("</trkseg>").unwrap().1;

        assert!(combined.starts_with(&expected_head));
        assert!(combined.ends_with(expected_tail));
        assert!(!combined.contains("OldTool"));
        assert!(!combined.contains("Morning Run"));
    }

    #[test]
    fn test_combine_merges_all_files_in_order() {
        let first = sample_gpx(
            "Rec",
            "First",
            "2021-03-28T09:00:00Z",
            &[(40.0, -105.0, 2200.0, "2021-03-28T09:01:00Z")],
        );
        let second = sample_gpx(
            "Rec",
            "Second",
            "2021-03-28T15:00:00Z",
            &[
                (41.0, -106.0, 2400.0, "2021-03-28T15:01:00Z"),
                (41.01, -106.01, 2410.0, "2021-03-28T15:02:00Z"),
            ],
        );

        let collection = TrackCollection::from_files(vec![
            parsed(second, "second.gpx"),
            parsed(first, "first.gpx"),
        ]);

        let combined = collection.combine("Merger", "All Trails").unwrap();
        assert_eq!(combined.matches("<trkpt ").count(), 3);

        // The combined document is itself parseable and keeps point order
        let merged = parsed(combined, "merged.gpx");
        assert_eq!(merged.name(), "All Trails");
        assert_eq!(merged.points().len(), 3);
        assert!(merged.points()[0].time < merged.points()[2].time);
    }

    #[test]
    fn test_combine_without_creator_warns_and_keeps_head() {
        let raw = "<gpx version=\"1.1\">\n\
                   <metadata><time>2021-03-28T09:00:00Z</time></metadata>\n\
                   <name>Run</name>\n\
                   <trkseg>\n</trkseg>\n</gpx>\n";
        let collection = TrackCollection::from_files(vec![parsed(raw.to_string(), "run.gpx")]);

        let combined = collection.combine("MyTool", "Renamed").unwrap();
        assert!(!combined.contains("MyTool"));
        assert!(combined.contains("<name>Renamed</name>"));
    }

    #[test]
    fn test_combine_empty_collection_fails() {
        let collection = TrackCollection::from_files(Vec::new());
        let result = collection.combine("MyTool", "Run");
        assert!(matches!(result, Err(TrackError::EmptyCollection)));
    }

    #[test]
    fn test_load_sorts_regardless_of_path_order() {
        let late = write_temp(
            "late",
            &sample_gpx(
                "Rec",
                "Late",
                "2021-03-28T15:00:00Z",
                &[(40.2, -105.2, 2300.0, "2021-03-28T15:01:00Z")],
            ),
        );
        let early = write_temp(
            "early",
            &sample_gpx(
                "Rec",
                "Early",
                "2021-03-28T09:00:00Z",
                &[(40.0, -105.0, 2200.0, "2021-03-28T09:01:00Z")],
            ),
        );

        let collection = TrackCollection::load(vec![late.clone(), early.clone()]).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.files()[0].name(), "Early");
        assert_eq!(collection.files()[1].name(), "Late");

        std::fs::remove_file(&late).ok();
        std::fs::remove_file(&early).ok();
    }

    #[test]
    fn test_load_aborts_on_malformed_file() {
        let good = write_temp(
            "good",
            &sample_gpx(
                "Rec",
                "Good",
                "2021-03-28T09:00:00Z",
                &[(40.0, -105.0, 2200.0, "2021-03-28T09:01:00Z")],
            ),
        );
        let bad = write_temp(
            "bad",
            "<gpx creator=\"x\"><metadata><time>2021-03-28T09:00:00Z</time></metadata>\
             <trkseg></trkseg></gpx>",
        );

        let result = TrackCollection::load(vec![good.clone(), bad.clone()]);
        assert!(matches!(result, Err(TrackError::MissingTag(tag)) if tag == "name"));

        std::fs::remove_file(&good).ok();
        std::fs::remove_file(&bad).ok();
    }

    #[test]
    fn test_export_combined() {
        let raw = sample_gpx(
            "OldTool",
            "Morning Run",
            "2021-03-28T09:00:00Z",
            &[(40.0, -105.0, 2200.0, "2021-03-28T09:01:00Z")],
        );
        let collection = TrackCollection::from_files(vec![parsed(raw, "run.gpx")]);

        let out = std::env::temp_dir().join(format!(
            "track-atlas-export-{}.gpx",
            std::process::id()
        ));
        collection.export_combined(&out, "MyTool", "Run1").unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, collection.combine("MyTool", "Run1").unwrap());

        std::fs::remove_file(&out).ok();
    }
}
