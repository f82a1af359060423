//! gesture-mouse: control the desktop with hand gestures
//!
//! Usage:
//!   gesture-mouse run --frames landmarks.jsonl
//!   detector | gesture-mouse run --frames - --utterances speech.txt
//!   gesture-mouse config

use anyhow::Result;
use clap::Parser;
use gesture_mouse_app::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let config = args.resolve_config()?;
            init_tracing(&config.logging.level);
            gesture_mouse_app::run(&args, config).await
        }
        Command::Config(args) => {
            init_tracing("warn");
            gesture_mouse_app::print_config(&args)
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .init();
}
