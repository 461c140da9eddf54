use std::error::Error;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use photon_core::pointcloud::point::{mean_latitude, Photon, CLASS_UNCLASSIFIED};
use photon_core::pointcloud::surface::detector::{HistogramSurfaceDetector, SurfaceDetector as _};
use photon_parser::parsers::csv::CsvParserProvider;
use photon_parser::parsers::{get_extension, Extension};
use photon_parser::parsers::{Parser as _, ParserProvider as _};

/// Photons below this confidence are discarded before surface detection.
const MIN_SIGNAL_CONF: i32 = 3;
/// Latitudes at or above this value are sensor fill values.
const MAX_VALID_LATITUDE: f64 = 9000.0;

#[derive(Parser, Debug)]
#[command(
    name = "Photon Prep",
    about = "Prepares ICESat-2 photon beams for bathymetric classification",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    #[arg(short, long, required = true, value_name = "DIR")]
    output: String,

    #[arg(long, default_value_t = -50.0, allow_negative_numbers = true)]
    min_elev: f64,

    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    max_elev: f64,

    #[arg(long, default_value_t = 100_000)]
    segment_len: usize,
}

fn check_and_get_extension(paths: &[PathBuf]) -> Result<Extension, String> {
    let mut extensions = vec![];
    for path in paths.iter() {
        let extension = path.extension().and_then(OsStr::to_str);
        match extension {
            Some(ext) => extensions.push(ext),
            None => return Err("File extension is not found".to_string()),
        }
    }
    extensions.sort();
    extensions.dedup();

    if extensions.len() > 1 {
        return Err("Multiple extensions are not supported".to_string());
    }

    Ok(get_extension(extensions[0]))
}

fn expand_globs(input_patterns: Vec<String>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob(&pattern).expect("Failed to read glob pattern") {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => eprintln!("Error: {:?}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    paths
}

fn preprocess_beam(
    input_path: &Path,
    output_dir: &Path,
    extension: Extension,
    detector: &HistogramSurfaceDetector,
    segment_len: usize,
) -> Result<usize, Box<dyn Error + Send + Sync>> {
    let provider = match extension {
        Extension::Csv | Extension::Txt => CsvParserProvider {
            filenames: vec![input_path.to_path_buf()],
        },
    };
    let cloud = provider
        .get_parser()
        .parse()
        .map_err(|e| e.to_string())?;
    log::info!(
        "{:?}: {} photons",
        input_path.file_name().unwrap_or_default(),
        cloud.metadata.point_count
    );

    let mut photons = cloud.photons;
    for photon in photons.iter_mut() {
        photon.class = CLASS_UNCLASSIFIED;
    }

    // quality filters before surface detection
    photons.retain(|p| p.signal_conf >= MIN_SIGNAL_CONF && p.lat < MAX_VALID_LATITUDE);
    photons.retain(|p| p.elevation > detector.min_elev && p.elevation < detector.max_elev);

    // fixed-size index segments; an ambiguous segment contributes nothing
    let mut kept: Vec<Photon> = Vec::new();
    for segment in photons.chunks(segment_len) {
        let mut segment = segment.to_vec();
        kept.extend(detector.find_surface(&mut segment));
    }

    let zone = if mean_latitude(&kept) > 0.0 { "N" } else { "S" };
    let stem = input_path
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or("invalid input file name")?;
    let output_path = output_dir.join(format!("{}_{}.csv", stem, zone));

    let mut writer = csv::Writer::from_path(&output_path)?;
    for photon in &kept {
        writer.serialize(photon)?;
    }
    writer.flush()?;
    log::info!("wrote {} photons to {:?}", kept.len(), output_path);

    Ok(kept.len())
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();

    log::info!("input files: {:?}", args.input);
    log::info!("output folder: {}", args.output);
    log::info!("elevation bounds: [{}, {}]", args.min_elev, args.max_elev);
    log::info!("segment length: {}", args.segment_len);

    if args.segment_len == 0 {
        log::error!("segment length must be greater than zero");
        return;
    }

    let start = std::time::Instant::now();

    log::info!("start processing...");
    let input_files = expand_globs(args.input);
    log::info!("Expanded input files: {:?}", input_files);

    let extension = check_and_get_extension(&input_files).unwrap();

    let output_path = PathBuf::from(args.output);
    std::fs::create_dir_all(&output_path).unwrap();

    let detector = HistogramSurfaceDetector {
        min_elev: args.min_elev,
        max_elev: args.max_elev,
    };

    log::info!("start preprocessing...");
    let start_local = std::time::Instant::now();

    let results: Vec<_> = input_files
        .par_iter()
        .map(|path| {
            (
                path,
                preprocess_beam(path, &output_path, extension, &detector, args.segment_len),
            )
        })
        .collect();

    let mut failed = 0;
    for (path, result) in results {
        if let Err(e) = result {
            failed += 1;
            log::error!("failed to preprocess {:?}: {}", path, e);
        }
    }
    log::info!("Finish preprocessing in {:?}", start_local.elapsed());
    if failed > 0 {
        log::warn!("{} input file(s) failed", failed);
    }

    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!("Finish processing");
}
