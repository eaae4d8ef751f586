use anyhow::{Context, bail};
use motion_sensor::config::MotionConfig;
use motion_sensor::{
    DetectionPublisher, Frame, MotionDetectionService, MotionWorker, SensitivityLevel,
    sensitivity_control,
};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "Usage: motion_tester [--config <path>] [--sensitivity low|medium|high] <frame> <frame> ...";

struct Args {
    config: Option<PathBuf>,
    sensitivity: Option<SensitivityLevel>,
    frames: Vec<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = env::args().skip(1);
    let mut parsed = Args {
        config: None,
        sensitivity: None,
        frames: Vec::new(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--sensitivity" => {
                let level = args.next().context("--sensitivity needs a level")?;
                parsed.sensitivity = Some(level.parse()?);
            }
            _ => parsed.frames.push(PathBuf::from(arg)),
        }
    }

    if parsed.frames.is_empty() {
        bail!(USAGE);
    }
    Ok(parsed)
}

/// `RUST_LOG` wins over the configured level. Either one must be a valid filter.
fn env_filter(configured: &str) -> anyhow::Result<EnvFilter> {
    match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => parse_filter(&directives, EnvFilter::DEFAULT_ENV),
        Err(_) => parse_filter(configured, "[logging] level"),
    }
}

fn parse_filter(directives: &str, origin: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter `{directives}` in {origin}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Argument Parsing & Setup ---
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => MotionConfig::load(path)?,
        None => MotionConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.logging.level)?)
        .init();

    // --- 2. Motion Service Initialization ---
    let mut detection = config.detection.clone();
    if let Some(level) = args.sensitivity {
        detection.sensitivity = level;
    }

    let (level_tx, level_rx) = sensitivity_control();
    level_tx.send_replace(detection.sensitivity);
    let publisher = DetectionPublisher::new();
    let (handle, worker) = MotionWorker::spawn(
        MotionDetectionService::from_config(&detection),
        level_rx,
        publisher.clone(),
    );

    info!(
        frames = args.frames.len(),
        sensitivity = %detection.sensitivity,
        threshold = detection.sensitivity.threshold(),
        "scoring frames"
    );

    // --- 3. Main Processing Loop ---
    let mut motion_frames = 0usize;
    for (index, path) in args.frames.iter().enumerate() {
        let image = image::open(path)
            .with_context(|| format!("failed to read frame {}", path.display()))?
            .to_rgba8();
        let frame = Frame::from(image);

        let report = handle.process(frame).await?;
        if report.motion_detected() {
            motion_frames += 1;
        }

        let magnitude = report
            .motion
            .magnitude
            .map(|m| format!("{m:.4}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{index:>4}  {:<40}  magnitude={magnitude:<7} motion={:<5} person={}",
            path.display(),
            report.motion_detected(),
            report.person_detected
        );
    }

    // --- 4. Shutdown ---
    drop(handle);
    worker.await?;

    let state = publisher.current();
    println!(
        "Processing complete. {motion_frames} of {} frames reported motion (last state: motion={}, person={}).",
        args.frames.len(),
        state.motion_detected,
        state.person_detected
    );
    Ok(())
}
