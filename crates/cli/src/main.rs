use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};

use spotter_core::classifier::infrastructure::onnx_feature_extractor::OnnxFeatureExtractor;
use spotter_core::detection::infrastructure::null_face_detector::NullFaceDetector;
use spotter_core::learning::session_config::SessionConfig;
use spotter_core::learning::session_controller::SessionController;
use spotter_core::learning::session_observer::LogSessionObserver;
use spotter_core::learning::state::PipelineState;
use spotter_core::pipeline::announcer::LogAnnouncer;
use spotter_core::pipeline::frame_pipeline::{FramePipeline, PipelineConfig};
use spotter_core::registry::infrastructure::file_predictor_store::FilePredictorStore;
use spotter_core::registry::predictor_registry::PredictorRegistry;
use spotter_core::shared::constants::{
    DEFAULT_SAMPLE_TARGET, NETWORK_MODEL_NAME, NETWORK_MODEL_URL,
};
use spotter_core::shared::frame::{Frame, PixelFormat};
use spotter_core::shared::model_resolver;
use spotter_core::shared::rect::Rect;

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Incremental object learning and recognition over frame sequences.
#[derive(Parser)]
#[command(name = "spotter")]
struct Cli {
    /// Predictor storage directory (defaults to the platform data dir).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Directory holding a pre-fetched network model file.
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    /// Class-labels file (one label per line) for `diagnose`.
    #[arg(long, global = true)]
    labels: Option<PathBuf>,

    /// Milliseconds between processed frames.
    #[arg(long, default_value = "200", global = true)]
    interval_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Teach a new predictor from positive and negative example frames.
    Learn {
        /// Predictor name (randomly generated if omitted).
        #[arg(long, default_value = "")]
        name: String,

        /// Directory of frames showing the object.
        #[arg(long)]
        positive: PathBuf,

        /// Directory of frames not showing the object.
        #[arg(long)]
        negative: PathBuf,

        /// Positive samples to collect (5-200).
        #[arg(long, default_value_t = DEFAULT_SAMPLE_TARGET)]
        positive_samples: usize,

        /// Negative samples to collect (5-200).
        #[arg(long, default_value_t = DEFAULT_SAMPLE_TARGET)]
        negative_samples: usize,

        /// Region of interest as x,y,width,height in frame coordinates.
        #[arg(long, value_delimiter = ',', num_args = 4)]
        select: Option<Vec<f32>>,
    },

    /// Re-detect learned objects over a directory of frames.
    Watch {
        /// Directory of frames to scan, in name order.
        frames: PathBuf,

        /// Region of interest as x,y,width,height in frame coordinates.
        #[arg(long, value_delimiter = ',', num_args = 4)]
        select: Option<Vec<f32>>,
    },

    /// List registered predictors, or delete them.
    Predictors {
        /// Delete the named predictor.
        #[arg(long)]
        delete: Option<String>,

        /// Delete every predictor and its backing files.
        #[arg(long)]
        reset: bool,
    },

    /// Diagnostic multi-class classification of a single image.
    Diagnose {
        image: PathBuf,

        /// How many top classes to print.
        #[arg(long, default_value = "5")]
        top: usize,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store_dir = cli
        .store
        .clone()
        .or_else(FilePredictorStore::default_dir)
        .ok_or("could not determine a predictor storage directory")?;
    let registry = Arc::new(PredictorRegistry::new(Box::new(FilePredictorStore::new(
        store_dir,
    ))));

    match &cli.command {
        Command::Learn {
            name,
            positive,
            negative,
            positive_samples,
            negative_samples,
            select,
        } => run_learn(
            &cli,
            registry,
            name,
            positive,
            negative,
            *positive_samples,
            *negative_samples,
            select.as_deref(),
        ),
        Command::Watch { frames, select } => run_watch(&cli, registry, frames, select.as_deref()),
        Command::Predictors { delete, reset } => run_predictors(registry, delete.as_deref(), *reset),
        Command::Diagnose { image, top } => run_diagnose(&cli, image, *top),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_learn(
    cli: &Cli,
    registry: Arc<PredictorRegistry>,
    name: &str,
    positive_dir: &Path,
    negative_dir: &Path,
    positive_samples: usize,
    negative_samples: usize,
    select: Option<&[f32]>,
) -> Result<(), Box<dyn std::error::Error>> {
    let positive_frames = frame_paths(positive_dir)?;
    let negative_frames = frame_paths(negative_dir)?;

    let config = SessionConfig::new(name, positive_samples, negative_samples)?;
    let predictor_name = config.name().to_string();

    let mut pipeline = build_pipeline(cli, registry)?;
    if let Some(rect) = parse_select(select) {
        pipeline.select_region(rect);
    }

    {
        let mut controller = pipeline.controller().lock().unwrap();
        controller.bootstrap()?;
        controller.start_session(config)?;
    }

    log::info!("capturing positive examples of {predictor_name}");
    feed_until(
        &mut pipeline,
        &positive_frames,
        PipelineState::Waiting,
        positive_samples * 4 + 16,
    )?;

    pipeline.controller().lock().unwrap().confirm_negative_phase()?;

    log::info!("capturing negative examples");
    feed_until(
        &mut pipeline,
        &negative_frames,
        PipelineState::Predicting,
        negative_samples * 4 + 16,
    )?;

    log::info!("predictor {predictor_name} registered");
    Ok(())
}

fn run_watch(
    cli: &Cli,
    registry: Arc<PredictorRegistry>,
    frames_dir: &Path,
    select: Option<&[f32]>,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = frame_paths(frames_dir)?;

    let mut pipeline = build_pipeline(cli, registry)?;
    if let Some(rect) = parse_select(select) {
        pipeline.select_region(rect);
    }

    let loaded = pipeline.controller().lock().unwrap().bootstrap()?;
    if loaded == 0 {
        log::warn!("no predictors registered; nothing will be detected");
    }

    for (index, path) in paths.iter().enumerate() {
        match load_frame(path, index) {
            Ok(frame) => pipeline.process_frame(&frame),
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
    }

    Ok(())
}

fn run_predictors(
    registry: Arc<PredictorRegistry>,
    delete: Option<&str>,
    reset: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    registry.load_all()?;

    if reset {
        registry.clear_all();
        log::info!("all predictors deleted");
        return Ok(());
    }

    if let Some(name) = delete {
        if !registry.contains(name) {
            return Err(format!("no predictor named {name:?}").into());
        }
        registry.remove(name);
        log::info!("deleted predictor {name}");
        return Ok(());
    }

    let names = registry.names();
    if names.is_empty() {
        println!("No predictors");
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

fn run_diagnose(cli: &Cli, image: &Path, top: usize) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = build_extractor(cli)?;
    let frame = load_frame(image, 0)?;
    let region = Rect::new(0.0, 0.0, frame.width() as f32, frame.height() as f32);

    for (label, probability) in extractor.classify_top(&frame, &region, top)? {
        println!("{label} - {probability:.2}");
    }
    Ok(())
}

fn build_pipeline(
    cli: &Cli,
    registry: Arc<PredictorRegistry>,
) -> Result<FramePipeline, Box<dyn std::error::Error>> {
    let extractor = build_extractor(cli)?;
    let controller = Arc::new(Mutex::new(SessionController::new(
        registry,
        Box::new(LogSessionObserver),
    )));

    Ok(FramePipeline::new(
        Box::new(extractor),
        Box::new(NullFaceDetector),
        controller,
        Box::new(LogAnnouncer),
        PipelineConfig {
            view_size: None,
            frame_interval: Duration::from_millis(cli.interval_ms),
        },
    ))
}

fn build_extractor(cli: &Cli) -> Result<OnnxFeatureExtractor, Box<dyn std::error::Error>> {
    log::info!("resolving network model {NETWORK_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        NETWORK_MODEL_NAME,
        NETWORK_MODEL_URL,
        cli.model_dir.as_deref(),
    )?;

    let mut extractor = OnnxFeatureExtractor::new(&model_path)?;
    if let Some(labels_path) = &cli.labels {
        extractor = extractor.with_labels(OnnxFeatureExtractor::labels_from_file(labels_path)?);
    }
    Ok(extractor)
}

/// Feeds frames (cycling through the directory as often as needed) until
/// the state machine reaches `target`, or gives up after `max_frames`.
fn feed_until(
    pipeline: &mut FramePipeline,
    paths: &[PathBuf],
    target: PipelineState,
    max_frames: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if paths.is_empty() {
        return Err("no frames found".into());
    }

    for (index, path) in paths.iter().cycle().take(max_frames).enumerate() {
        match load_frame(path, index) {
            Ok(frame) => pipeline.process_frame(&frame),
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                continue;
            }
        }
        if pipeline.controller().lock().unwrap().current_state() == target {
            return Ok(());
        }
    }

    Err(format!("state machine did not reach {target} after {max_frames} frames").into())
}

fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("not a directory: {}", dir.display()).into());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_frame_file(path))
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_frame(path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(
        img.into_raw(),
        width,
        height,
        PixelFormat::Rgb8,
        index,
    ))
}

fn parse_select(select: Option<&[f32]>) -> Option<Rect> {
    match select {
        Some([x, y, w, h]) => Some(Rect::new(*x, *y, *w, *h)),
        _ => None,
    }
}
