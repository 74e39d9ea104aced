use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use log::{error, info, warn};
use portrait_tone::{
    AdjustmentOverrides, AdjustmentSetting, BatchConfig, BatchProcessor,
    error::Result,
    report::JsonReport,
};

#[derive(Parser, Debug)]
#[command(version, about = "Calibrated body and face colour correction for a folder of photos", long_about = None)]
struct Cli {
    /// Folder of images to correct
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// JSON configuration file; flags below take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Corrected image of the reference pair
    #[arg(long, value_name = "FILE")]
    reference_corrected: Option<PathBuf>,

    /// Uncorrected image of the reference pair
    #[arg(long, value_name = "FILE")]
    reference_original: Option<PathBuf>,

    /// Output folder for processed images
    #[arg(long, value_name = "DIR")]
    processed_dir: Option<PathBuf>,

    /// Output folder for comparison images
    #[arg(long, value_name = "DIR")]
    compared_dir: Option<PathBuf>,

    #[command(flatten)]
    body: BodyArgs,

    #[command(flatten)]
    face: FaceArgs,

    /// SeetaFace model used to locate faces (needs the `rustface` feature)
    #[arg(long, value_name = "FILE")]
    face_model: Option<PathBuf>,

    /// TrueType font for the comparison labels
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Label font size in pixels
    #[arg(long, value_name = "PX")]
    font_size: Option<f32>,

    /// Process files on all cores
    #[arg(short, long)]
    parallel: bool,

    /// Write a JSON summary of the run
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct BodyArgs {
    /// Brightness multiplier for the body (replaces the calibrated value)
    #[arg(long, value_name = "FLOAT", conflicts_with = "body_brightness_pct")]
    body_brightness: Option<f64>,
    /// Temperature offset for the body (replaces the calibrated value)
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true, conflicts_with = "body_temperature_pct")]
    body_temperature: Option<f64>,
    /// Bronze percentage for the body, 0-100
    #[arg(long, value_name = "PERCENT")]
    body_bronze: Option<f64>,
    /// Additional brightness percentage on top of the calibrated body value
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    body_brightness_pct: Option<f64>,
    /// Additional temperature percentage on top of the calibrated body value
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    body_temperature_pct: Option<f64>,
}

#[derive(clap::Args, Debug)]
struct FaceArgs {
    /// Brightness multiplier for the face (replaces the calibrated value)
    #[arg(long, value_name = "FLOAT", conflicts_with = "face_brightness_pct")]
    face_brightness: Option<f64>,
    /// Temperature offset for the face (replaces the calibrated value)
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true, conflicts_with = "face_temperature_pct")]
    face_temperature: Option<f64>,
    /// Bronze percentage for the face, 0-100
    #[arg(long, value_name = "PERCENT")]
    face_bronze: Option<f64>,
    /// Additional brightness percentage on top of the calibrated face value
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    face_brightness_pct: Option<f64>,
    /// Additional temperature percentage on top of the calibrated face value
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    face_temperature_pct: Option<f64>,
}

fn layer(
    target: &mut AdjustmentOverrides,
    brightness: Option<f64>,
    temperature: Option<f64>,
    bronze: Option<f64>,
    brightness_pct: Option<f64>,
    temperature_pct: Option<f64>,
) {
    if let Some(value) = brightness {
        target.brightness = AdjustmentSetting::Override(value);
    }
    if let Some(pct) = brightness_pct {
        target.brightness = AdjustmentSetting::Percent(pct);
    }
    if let Some(value) = temperature {
        target.temperature = AdjustmentSetting::Override(value);
    }
    if let Some(pct) = temperature_pct {
        target.temperature = AdjustmentSetting::Percent(pct);
    }
    if let Some(value) = bronze {
        target.bronze = AdjustmentSetting::Override(value);
    }
}

fn build_config(cli: &Cli) -> Result<BatchConfig> {
    let mut config = match cli.config {
        Some(ref path) => BatchConfig::load(path)?,
        None => BatchConfig::default(),
    };

    if let Some(ref input) = cli.input {
        config.input_dir = input.clone();
    }
    if let Some(ref path) = cli.reference_corrected {
        config.reference_corrected = path.clone();
    }
    if let Some(ref path) = cli.reference_original {
        config.reference_original = path.clone();
    }
    if let Some(ref dir) = cli.processed_dir {
        config.processed_dir = Some(dir.clone());
    }
    if let Some(ref dir) = cli.compared_dir {
        config.compared_dir = Some(dir.clone());
    }
    if let Some(ref font) = cli.font {
        config.render.font_path = Some(font.clone());
    }
    if let Some(size) = cli.font_size {
        config.render.font_size = size;
    }
    config.parallel |= cli.parallel;

    let b = &cli.body;
    layer(
        &mut config.body,
        b.body_brightness,
        b.body_temperature,
        b.body_bronze,
        b.body_brightness_pct,
        b.body_temperature_pct,
    );
    let f = &cli.face;
    layer(
        &mut config.face,
        f.face_brightness,
        f.face_temperature,
        f.face_bronze,
        f.face_brightness_pct,
        f.face_temperature_pct,
    );

    Ok(config)
}

#[cfg(feature = "rustface")]
fn attach_face_locator(processor: BatchProcessor, cli: &Cli, config: &BatchConfig) -> Result<BatchProcessor> {
    use portrait_tone::detection::{FaceLocator, seeta::RustfaceDetector};

    match cli.face_model {
        Some(ref model) => {
            let detector = RustfaceDetector::new(model, config.detector)?;
            Ok(processor.with_face_locator(FaceLocator::new(Box::new(detector))))
        }
        None => Ok(processor),
    }
}

#[cfg(not(feature = "rustface"))]
fn attach_face_locator(processor: BatchProcessor, cli: &Cli, _config: &BatchConfig) -> Result<BatchProcessor> {
    if cli.face_model.is_some() {
        warn!("Built without the `rustface` feature; ignoring --face-model");
    }
    Ok(processor)
}

fn run(cli: &Cli) -> Result<bool> {
    let config = build_config(cli)?;
    let processor = BatchProcessor::calibrate(config.clone())?;
    let processor = attach_face_locator(processor, cli, &config)?;

    let adjustments = processor.adjustments();
    info!(
        "Body: brightness {:.3}, temperature {:.2}, bronze {:.1}",
        adjustments.body.brightness, adjustments.body.temperature, adjustments.body.bronze
    );
    info!(
        "Face: brightness {:.3}, temperature {:.2}, bronze {:.1}",
        adjustments.face.brightness, adjustments.face.temperature, adjustments.face.bronze
    );

    let report = processor.run()?;
    info!(
        "Done: {} processed, {} failed",
        report.processed_count(),
        report.failure_count()
    );

    if let Some(ref path) = cli.report {
        JsonReport::from(&report).save(path)?;
        info!("Wrote report to {}", path.display());
    }

    Ok(!report.has_failures())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}
