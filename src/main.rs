//! Ball-on-table tracker: follows a colored ball on a colored round table.

use anyhow::{bail, Result};
use ball_table_tracker::{
    app::{AppConfig, BallTrackerApp, VideoSource},
    config::Config,
    orientation::{CameraFacing, DisplayRotation},
};
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use; defaults to `camera.index` from the config
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to process
    #[arg(short, long)]
    video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Display rotation in degrees (0, 90, 180, 270); overrides the config
    #[arg(short, long)]
    rotation: Option<i32>,

    /// Frames come from a front (mirrored) camera
    #[arg(long)]
    front: bool,

    /// Run without a display window
    #[arg(long)]
    headless: bool,

    /// Print `x y detected` per frame to stdout
    #[arg(short, long)]
    print_positions: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Ball Table Tracker");

    let mut tracker = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(degrees) = args.rotation {
        let Some(rotation) = DisplayRotation::from_degrees(degrees) else {
            bail!("Rotation must be one of 0, 90, 180, 270, got {degrees}");
        };
        tracker.camera.rotation = rotation;
    }
    if args.front {
        tracker.camera.facing = CameraFacing::Front;
    }

    let config = AppConfig {
        video_source: VideoSource::select(args.video, args.cam, &tracker.camera),
        tracker,
        headless: args.headless,
        print_positions: args.print_positions,
    };

    let mut app = BallTrackerApp::new(config)?;
    app.run()?;

    Ok(())
}
