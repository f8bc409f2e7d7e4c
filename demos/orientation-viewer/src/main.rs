//! Headless orientation viewer.
//!
//! Runs the input pipeline against a simulated device: one thread delivers
//! rotation-vector (and optionally inertial) samples, one plays a gesture
//! script, and the main thread runs a fixed-rate render tick that only draws
//! when the transform changed.
//!
//! ```text
//! cargo run -p orientation-viewer -- --seconds 5 --rate game
//! RUST_LOG=debug cargo run -p orientation-viewer -- --config viewer.json
//! ```

mod backend;
mod sim;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use input_pipeline::{Pipeline, PipelineConfig, RenderBackend, SensorRate};
use sensor_types::SampleKind;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::backend::LoggingBackend;
use crate::sim::{SimulatedSensorService, run_gestures, run_sensors};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Rate {
    Normal,
    Ui,
    Game,
    Fastest,
}

impl From<Rate> for SensorRate {
    fn from(rate: Rate) -> Self {
        match rate {
            Rate::Normal => Self::Normal,
            Rate::Ui => Self::Ui,
            Rate::Game => Self::Game,
            Rate::Fastest => Self::Fastest,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive the orientation/gesture input pipeline with simulated input")]
struct Args {
    /// How long to run, in seconds
    #[arg(long, default_value_t = 3.0)]
    seconds: f64,

    /// Rotation-vector delivery rate (overrides the config file)
    #[arg(long, value_enum)]
    rate: Option<Rate>,

    /// Pipeline configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render tick interval in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Log every Nth drawn frame
    #[arg(long, default_value_t = 30)]
    log_every: u64,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            PipelineConfig::from_json_str(&json)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };
    if let Some(rate) = args.rate {
        config = config.with_subscription(SampleKind::RotationVector, rate.into());
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = load_config(&args)?;
    let output = config.rotation_output;
    let service = Arc::new(SimulatedSensorService::default());
    let mut pipeline = Pipeline::new(config, Arc::clone(&service)).context("build pipeline")?;
    pipeline.start().context("start pipeline")?;

    let stop = Arc::new(AtomicBool::new(false));

    let sensor_thread = {
        let port = pipeline.sensor_port()?;
        let subscriptions = service.active();
        let stop = Arc::clone(&stop);
        thread::spawn(move || run_sensors(port, &subscriptions, &stop))
    };
    let gesture_thread = {
        let port = pipeline.gesture_port()?;
        let stop = Arc::clone(&stop);
        thread::spawn(move || run_gestures(&port, &stop))
    };

    let mut render = pipeline.render_handle()?;
    let mut backend = LoggingBackend::new(output, args.log_every);
    backend.init(1280, 720);

    let tick = Duration::from_millis(args.frame_ms.max(1));
    let deadline = Instant::now() + Duration::from_secs_f64(args.seconds.max(0.0));
    let mut ticks: u64 = 0;
    while Instant::now() < deadline {
        render.render_tick(&mut backend);
        ticks += 1;
        thread::sleep(tick);
    }

    if let Some(trace) = render.inertial_trace() {
        for (name, channel) in [("accel", &trace.accel), ("gyro", &trace.gyro), ("mag", &trace.mag)] {
            info!(sensor = name, abs_max = channel.abs_max, plot_scale = ?channel.plot_scale(0.5), "inertial window");
        }
    }

    pipeline.stop().context("stop pipeline")?;
    stop.store(true, Ordering::Release);

    let sensors = sensor_thread
        .join()
        .map_err(|_| anyhow::anyhow!("sensor thread panicked"))?;
    let gestures = gesture_thread
        .join()
        .map_err(|_| anyhow::anyhow!("gesture thread panicked"))?;

    if render.read_latest().is_some() {
        warn!("render handle still live after stop");
    }

    info!(
        ticks,
        frames = backend.frames(),
        sensor_published = sensors.published,
        sensor_rejected = sensors.rejected,
        sensor_other = sensors.other,
        gestures_published = gestures.published,
        "done"
    );
    Ok(())
}
