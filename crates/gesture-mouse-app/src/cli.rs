//! Command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gesture_mouse_config::{AppConfig, Handedness};

#[derive(Parser, Debug)]
#[command(name = "gesture-mouse", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the gesture pipeline against a landmark stream
    Run(RunArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSON-lines landmark frames, or `-` for stdin
    #[arg(long)]
    pub frames: PathBuf,

    /// Recognized speech transcripts, one per line, or `-` for stdin
    #[arg(long)]
    pub utterances: Option<PathBuf>,

    /// Configuration file (default: platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hand that drives the cursor (left or right)
    #[arg(long)]
    pub dominant_hand: Option<Handedness>,

    /// Disable the terminal status line
    #[arg(long, default_value_t = false)]
    pub no_display: bool,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file (default: platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Load the configuration from an explicit path or the default location.
pub fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => AppConfig::load_default_location().context("Failed to load default configuration"),
    }
}

impl RunArgs {
    /// Configuration with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = load_config(self.config.as_ref())?;
        if let Some(hand) = self.dominant_hand {
            config = config.with_dominant_hand(hand);
        }
        if let Some(level) = &self.log_level {
            config = config.with_log_level(level.clone());
        }
        if self.no_display {
            config.runtime.display = false;
        }
        Ok(config)
    }

    pub fn frames_from_stdin(&self) -> bool {
        is_stdin(&self.frames)
    }
}

/// `-` selects standard input.
pub fn is_stdin(path: &std::path::Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::parse_from([
            "gesture-mouse",
            "run",
            "--frames",
            "-",
            "--dominant-hand",
            "left",
            "--no-display",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert!(args.frames_from_stdin());
        assert_eq!(args.dominant_hand, Some(Handedness::Left));
        assert!(args.no_display);
        assert!(args.utterances.is_none());
    }

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hands]\ndominant = \"right\"\n\n[logging]\nlevel = \"warn\"").unwrap();

        let cli = Cli::parse_from([
            "gesture-mouse",
            "run",
            "--frames",
            "frames.jsonl",
            "--config",
            file.path().to_str().unwrap(),
            "--dominant-hand",
            "left",
            "--no-display",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        let config = args.resolve_config().unwrap();
        assert_eq!(config.hands.dominant, Handedness::Left);
        assert_eq!(config.logging.level, "warn");
        assert!(!config.runtime.display);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_config(Some(&missing)).is_err());
    }
}
