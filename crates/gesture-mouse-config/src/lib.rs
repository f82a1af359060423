//! Configuration management for gesture-mouse.
//!
//! Every tunable of the gesture pipeline lives here as a plain serde struct so
//! that the core crate can consume it directly and the binary can load it from
//! a single TOML file.
//!
//! # Usage
//!
//! ```ignore
//! use gesture_mouse_config::AppConfig;
//!
//! let config = AppConfig::load_default_location()?;
//! println!("{}", config.to_toml_string()?);
//! ```

pub mod config;
pub mod error;

pub use config::{
    AppConfig, ClassifierSettings, CursorSettings, DesktopSettings, Handedness, HandsSettings,
    LoggingSettings, PinchSettings, RuntimeSettings, VoiceSettings,
};
pub use error::{ConfigError, Result};
