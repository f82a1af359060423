//! gesture-mouse-app: runs the gesture pipeline against external streams
//!
//! - Landmark frames from a JSON-lines replay (file or stdin)
//! - Optional speech transcripts for voice commands
//! - A virtual desktop standing in for the OS, driven through one serialized queue
//! - A terminal status line with the current gesture and action

pub mod actuation;
pub mod cli;
pub mod desktop;
pub mod runtime;
pub mod sources;

use anyhow::{Context, Result};
use gesture_mouse_config::AppConfig;
use tracing::info;

pub use actuation::ActuationQueue;
pub use cli::{Cli, Command, ConfigArgs, RunArgs};
pub use desktop::{DesktopEvent, DesktopSimulator};
pub use runtime::{Pipeline, RunReport, StopSignal};
pub use sources::{LandmarkSource, LineUtteranceSource, ReplaySource, UtteranceSource};

/// Execute the `run` subcommand with an already resolved configuration.
pub async fn run(args: &RunArgs, config: AppConfig) -> Result<()> {
    let frames: Box<dyn LandmarkSource> = if args.frames_from_stdin() {
        Box::new(ReplaySource::stdin().paced(config.runtime.frame_rate))
    } else {
        Box::new(
            ReplaySource::open(&args.frames)
                .await?
                .paced(config.runtime.frame_rate),
        )
    };

    let utterances: Option<Box<dyn UtteranceSource>> = match &args.utterances {
        Some(path) if cli::is_stdin(path) => {
            if args.frames_from_stdin() {
                anyhow::bail!("Frames and utterances cannot both be read from stdin");
            }
            Some(Box::new(LineUtteranceSource::stdin()))
        }
        Some(path) => Some(Box::new(LineUtteranceSource::open(path).await?)),
        None => None,
    };

    let desktop = DesktopSimulator::new(&config.desktop);
    info!(
        "Starting gesture pipeline (dominant hand: {}, {} fps)",
        config.hands.dominant, config.runtime.frame_rate
    );

    let pipeline = Pipeline::new(config);
    let stop = pipeline.stop_signal();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down");
            stop.raise();
        }
    });

    let report = pipeline
        .run(frames, utterances, desktop)
        .await
        .context("Gesture pipeline failed")?;
    interrupt.abort();

    let (x, y) = report.backend.cursor();
    info!(
        "Final desktop state: cursor ({}, {}), brightness {:.0}%, volume {:.2}",
        x,
        y,
        report.backend.current_brightness(),
        report.backend.current_volume()
    );
    Ok(())
}

/// Execute the `config` subcommand.
pub fn print_config(args: &ConfigArgs) -> Result<()> {
    let config = cli::load_config(args.config.as_ref())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
