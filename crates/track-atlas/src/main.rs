//! Command line front end for track-atlas-lib
//!
//! The library itself is path-agnostic; this binary supplies the file
//! listing, output paths and logging setup around it.

use chrono::Utc;
use clap::{Parser, Subcommand};
use geo::Point;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use track_atlas_lib::{HeatMapStore, TrackCollection, plot};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "track-atlas",
    version,
    about = "Merge GPX track logs and build heat-map tables"
)]
struct Cli {
    /// Log at debug level and above (RUST_LOG overrides this)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Combine many GPX files into one document")]
    Merge {
        /// GPX files or directories to scan for .gpx files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Destination path for the combined document
        #[arg(short, long)]
        output: PathBuf,

        /// Creator attribute written into the combined document
        #[arg(long, default_value = "track-atlas")]
        creator: String,

        /// Name tag written into the combined document
        #[arg(long, default_value = "combined")]
        name: String,
    },
    #[command(about = "Accumulate points from GPX files into a heat-map CSV")]
    Heatmap {
        /// GPX files or directories to scan for .gpx files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Destination path for the heat-map table
        #[arg(short, long)]
        output: PathBuf,
    },
    #[command(about = "Write a scatter table (CSV) for the plotting sink")]
    PlotTable {
        /// GPX files or directories to scan for .gpx files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Destination path for the table
        #[arg(short, long)]
        output: PathBuf,

        /// Plotted value column
        #[arg(long, value_enum, default_value_t = Metric::Elevation)]
        metric: Metric,

        /// Re-base coordinates onto a local plane around LAT,LON
        /// (the table then carries elevation as its value)
        #[arg(long, value_name = "LAT,LON")]
        planar: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Metric {
    Elevation,
    DaysAgo,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Merge {
            inputs,
            output,
            creator,
            name,
        } => merge_command(&inputs, &output, &creator, &name),
        Commands::Heatmap { inputs, output } => heatmap_command(&inputs, &output),
        Commands::PlotTable {
            inputs,
            output,
            metric,
            planar,
        } => plot_table_command(&inputs, &output, metric, planar.as_deref()),
    }
}

/// Expand files and directories into a flat list of .gpx paths
fn collect_gpx_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input) {
                let entry = entry?;
                if entry.file_type().is_file()
                    && entry.path().extension().map_or(false, |ext| ext == "gpx")
                {
                    paths.push(entry.path().to_path_buf());
                }
            }
        } else {
            paths.push(input.clone());
        }
    }

    if paths.is_empty() {
        return Err("no GPX files found in the given inputs".into());
    }
    Ok(paths)
}

fn merge_command(
    inputs: &[PathBuf],
    output: &Path,
    creator: &str,
    name: &str,
) -> Result<(), Box<dyn Error>> {
    let paths = collect_gpx_paths(inputs)?;
    info!("merging {} files", paths.len());

    let collection = TrackCollection::load(paths)?;
    collection.export_combined(output, creator, name)?;

    info!(
        "wrote {} points to {}",
        collection.total_points(),
        output.display()
    );
    Ok(())
}

fn heatmap_command(inputs: &[PathBuf], output: &Path) -> Result<(), Box<dyn Error>> {
    let paths = collect_gpx_paths(inputs)?;

    let store = HeatMapStore::default().compile(&paths)?;
    store.export_csv(output)?;

    info!(
        "wrote {} rows from {} sources to {}",
        store.len(),
        store.sources().count(),
        output.display()
    );
    Ok(())
}

fn plot_table_command(
    inputs: &[PathBuf],
    output: &Path,
    metric: Metric,
    planar: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let reference = planar.map(parse_reference).transpose()?;
    let paths = collect_gpx_paths(inputs)?;
    let collection = TrackCollection::load(paths)?;
    let points = collection.all_points();

    let file = std::fs::File::create(output)?;
    match reference {
        Some(reference) => {
            let table = plot::planar_table(&points, reference);
            plot::write_table_csv(file, &table)?;
        }
        None => {
            let table = match metric {
                Metric::Elevation => plot::elevation_table(&points),
                Metric::DaysAgo => plot::recency_table(&points, Utc::now()),
            };
            plot::write_table_csv(file, &table)?;
        }
    }

    info!("wrote {} rows to {}", points.len(), output.display());
    Ok(())
}

/// Parse a LAT,LON argument into a geo point (x = longitude, y = latitude)
fn parse_reference(value: &str) -> Result<Point<f64>, Box<dyn Error>> {
    let Some((lat, lon)) = value.split_once(',') else {
        return Err(format!("invalid reference {value:?}: expected LAT,LON").into());
    };
    let lat: f64 = lat.trim().parse()?;
    let lon: f64 = lon.trim().parse()?;
    Ok(Point::new(lon, lat))
}
