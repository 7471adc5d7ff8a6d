use clap::Parser;
use image::ImageReader;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use faceage::detection::annotate::annotate;
use faceage::logger::init_logger;
use faceage::{
    AgeEstimator, AgeStats, BucketConfiguration, FaceAnalysis, FaceBox, FaceDetector,
    FixedRegionDetector, Preset, WholeImageDetector,
};

#[derive(Parser)]
#[command(name = "faceage")]
#[command(about = "Estimate heuristic age buckets for faces in images")]
struct Cli {
    /// Input image files
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Built-in bucket configuration
    #[arg(long, value_enum, default_value_t = Preset::Nine)]
    preset: Preset,

    /// Bucket configuration file (TOML), instead of a preset
    #[arg(long, value_name = "FILE", conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Face box in every image; repeatable. Without it each image is one face
    #[arg(long = "face", value_name = "X,Y,W,H", value_parser = parse_face)]
    faces: Vec<FaceBox>,

    /// Write images with the face boxes drawn to this directory
    #[arg(long, value_name = "DIR")]
    annotate: Option<PathBuf>,

    /// Save per-step crops to this directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Print how many faces fell into each bucket
    #[arg(long)]
    stats: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log filter, e.g. "debug" or "faceage=trace" (overrides --verbose)
    #[arg(long, value_name = "SPEC")]
    log_level: Option<String>,
}

#[derive(Serialize)]
struct ImageReport {
    image: PathBuf,
    faces: Vec<FaceAnalysis>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    images: &'a [ImageReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a AgeStats>,
}

fn parse_face(s: &str) -> Result<FaceBox, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid face box '{}': {}", s, e))?;
    match parts[..] {
        [x, y, w, h] => Ok(FaceBox::new(x, y, w, h)),
        _ => Err(format!("expected X,Y,W,H, got '{}'", s)),
    }
}

fn output_name(index: usize, path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{:02}_{}", index + 1, stem)
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let log_spec = args
        .log_level
        .clone()
        .unwrap_or_else(|| if args.verbose { "info" } else { "warn" }.to_string());
    let _logger = init_logger(&log_spec)?;

    let config = match &args.config {
        Some(path) => BucketConfiguration::load(path)?,
        None => BucketConfiguration::preset(args.preset)?,
    };
    let config = Arc::new(config);
    info!("Using {} age buckets", config.bucket_count());

    let detector: Arc<dyn FaceDetector> = if args.faces.is_empty() {
        Arc::new(WholeImageDetector)
    } else {
        Arc::new(FixedRegionDetector::new(args.faces.clone()))
    };
    let estimator = AgeEstimator::new(detector, config.clone());

    if let Some(dir) = &args.annotate {
        std::fs::create_dir_all(dir)?;
    }

    let mut stats = AgeStats::new(&config);
    let mut reports = Vec::new();

    for (index, path) in args.images.iter().enumerate() {
        info!("Loading image: {}", path.display());
        let img = ImageReader::open(path)?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.display(), e))?;
        info!("Image loaded: {}x{}", img.width(), img.height());

        let faces = match &args.debug_out {
            Some(dir) => estimator.analyze_with_debug(&img, dir.join(output_name(index, path)))?,
            None => estimator.analyze(&img)?,
        };
        stats.extend(faces.iter().map(|f| &f.result));

        if let Some(dir) = &args.annotate {
            let out = dir.join(format!("{}.png", output_name(index, path)));
            annotate(&img, &faces)
                .save(&out)
                .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", out.display(), e))?;
            info!("Annotated image saved to {}", out.display());
        }

        reports.push(ImageReport {
            image: path.clone(),
            faces,
        });
    }

    if args.json {
        let output = JsonOutput {
            images: &reports,
            stats: args.stats.then_some(&stats),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n=== Age Estimation Results ===");
    for report in &reports {
        println!("{}: {} faces", report.image.display(), report.faces.len());
        for (i, face) in report.faces.iter().enumerate() {
            println!(
                "  Face {} at ({}, {}) {}x{}: {} - score {}, confidence {:.0}%",
                i + 1,
                face.face.x,
                face.face.y,
                face.face.width,
                face.face.height,
                face.result.bucket.label,
                face.result.raw_score,
                face.result.confidence * 100.0
            );
            if args.verbose {
                for (name, value) in face.features.iter() {
                    println!("      {:<16} {:.4}", name, value);
                }
            }
        }
    }

    if args.stats {
        println!("\n=== Bucket Distribution ({} faces) ===", stats.total());
        for row in stats.rows() {
            if row.count > 0 {
                println!(
                    "  {:<24} {:>4} ({:.1}%)",
                    row.label,
                    row.count,
                    stats.percentage(row)
                );
            }
        }
    }

    Ok(())
}
