//! Configuration model and TOML loading.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

/// Which physical hand. Also used for the handedness label reported by the
/// landmark source, so both `"right"` and `"Right"` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    #[serde(alias = "Left")]
    Left,
    #[serde(alias = "Right")]
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ConfigError::Invalid(format!(
                "unknown hand '{}', expected 'left' or 'right'",
                other
            ))),
        }
    }
}

/// Hand role assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandsSettings {
    /// The dominant hand takes the major role
    pub dominant: Handedness,
}

impl Default for HandsSettings {
    fn default() -> Self {
        Self {
            dominant: Handedness::Right,
        }
    }
}

/// Thresholds used by the finger-state encoder and gesture classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Thumb-tip to index-tip distance below which a pinch is recognised
    pub pinch_distance: f32,
    /// Tip/knuckle to knuckle/wrist ratio above which a finger counts as extended
    pub extension_ratio: f32,
    /// Index/middle tip spread relative to knuckle spread that selects the V gesture
    pub spread_ratio: f32,
    /// Maximum index/middle tip depth difference for the two-finger-closed gesture
    pub depth_tolerance: f32,
    /// Consecutive identical raw classifications required before the stable gesture changes
    pub hysteresis_frames: u32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            pinch_distance: 0.05,
            extension_ratio: 0.5,
            spread_ratio: 1.7,
            depth_tolerance: 0.1,
            hysteresis_frames: 3,
        }
    }
}

/// Continuous pinch control tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchSettings {
    /// Minimum level magnitude before an axis is considered, and the width of the confirm window
    pub axis_threshold: f32,
    /// Stabilized frames required before a continuous action fires
    pub confirm_frames: u32,
    /// Brightness percent applied per unit of pinch level
    pub brightness_scale: f32,
    /// Volume scalar applied per unit of pinch level
    pub volume_scale: f32,
    /// Fixed scroll size per fired pinch scroll
    pub scroll_ticks: i32,
    /// Starting brightness when the sink cannot report one
    pub fallback_brightness: f32,
    /// Starting volume when the sink cannot report one
    pub fallback_volume: f32,
}

impl Default for PinchSettings {
    fn default() -> Self {
        Self {
            axis_threshold: 0.3,
            confirm_frames: 3,
            brightness_scale: 10.0,
            volume_scale: 0.1,
            scroll_ticks: 120,
            fallback_brightness: 50.0,
            fallback_volume: 0.5,
        }
    }
}

/// Relative cursor motion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorSettings {
    /// Landmark index whose position drives the cursor
    pub tracked_landmark: usize,
    /// Squared pixel displacement at or below which motion is suppressed
    pub dead_zone_sq: f64,
    /// Squared pixel displacement up to which motion is scaled progressively
    pub progressive_limit_sq: f64,
    /// Progressive gain applied to the displacement magnitude
    pub gain: f64,
    /// Ratio used beyond the progressive range
    pub max_ratio: f64,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            tracked_landmark: 9,
            dead_zone_sq: 25.0,
            progressive_limit_sq: 900.0,
            gain: 0.1,
            max_ratio: 2.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub enabled: bool,
    /// Scroll size issued by the "scroll up" / "scroll down" commands
    pub scroll_ticks: i32,
    /// Folder "open file" searches first and "reset folder" returns to.
    /// Defaults to the user's Documents folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_dir: Option<PathBuf>,
    /// Folders searched by "launch" and "open folder".
    /// Defaults to the user's desktop plus the shared public desktop, if any.
    pub desktop_dirs: Vec<PathBuf>,
    /// File extensions "launch" treats as launchable
    pub launch_extensions: Vec<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scroll_ticks: 300,
            documents_dir: None,
            desktop_dirs: Vec::new(),
            launch_extensions: vec!["lnk".to_string(), "exe".to_string(), "desktop".to_string()],
        }
    }
}

impl VoiceSettings {
    /// Configured documents folder, else the platform one, else the home directory.
    pub fn resolved_documents_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.documents_dir {
            return Some(dir.clone());
        }
        let dirs = UserDirs::new()?;
        Some(
            dirs.document_dir()
                .unwrap_or_else(|| dirs.home_dir())
                .to_path_buf(),
        )
    }

    /// Configured desktop folders, else the platform ones.
    pub fn resolved_desktop_dirs(&self) -> Vec<PathBuf> {
        if !self.desktop_dirs.is_empty() {
            return self.desktop_dirs.clone();
        }
        let mut dirs: Vec<PathBuf> = UserDirs::new()
            .and_then(|d| d.desktop_dir().map(Path::to_path_buf))
            .into_iter()
            .collect();
        if let Some(public) = std::env::var_os("PUBLIC") {
            dirs.push(PathBuf::from(public).join("Desktop"));
        }
        dirs
    }
}

/// Loop cadence and hand-off sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Replay pacing in frames per second
    pub frame_rate: u32,
    /// How long the frame loop and the status line wait for input before
    /// re-checking the stop signal and the keyboard
    pub poll_interval_ms: u64,
    /// Frames buffered between the landmark source and the processing loop
    pub frame_buffer: usize,
    /// Whether the status display loop runs
    pub display: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            poll_interval_ms: 100,
            frame_buffer: 4,
            display: true,
        }
    }
}

impl RuntimeSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Initial state of the virtual desktop used when no platform backend is wired in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopSettings {
    pub width: i32,
    pub height: i32,
    pub brightness: f32,
    pub volume: f32,
    /// Most recent events kept in the desktop's history; older ones are dropped
    pub history_limit: usize,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            brightness: 50.0,
            volume: 0.5,
            history_limit: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hands: HandsSettings,
    pub classifier: ClassifierSettings,
    pub pinch: PinchSettings,
    pub cursor: CursorSettings,
    pub voice: VoiceSettings,
    pub runtime: RuntimeSettings,
    pub desktop: DesktopSettings,
    pub logging: LoggingSettings,
}

impl AppConfig {
    const FILE_NAME: &'static str = "config.toml";

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Platform default location, e.g. `~/.config/gesture-mouse/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "gesture-mouse").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(Self::FILE_NAME))
    }

    /// Load from the default location, falling back to defaults when no file exists there.
    pub fn load_default_location() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_or_default(&path)
    }

    /// Load `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(
                "No configuration at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Render the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Override the dominant hand.
    pub fn with_dominant_hand(mut self, hand: Handedness) -> Self {
        self.hands.dominant = hand;
        self
    }

    /// Override the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        positive("classifier.pinch_distance", c.pinch_distance)?;
        positive("classifier.extension_ratio", c.extension_ratio)?;
        positive("classifier.spread_ratio", c.spread_ratio)?;
        positive("classifier.depth_tolerance", c.depth_tolerance)?;
        nonzero("classifier.hysteresis_frames", c.hysteresis_frames.into())?;

        let p = &self.pinch;
        positive("pinch.axis_threshold", p.axis_threshold)?;
        nonzero("pinch.confirm_frames", p.confirm_frames.into())?;
        positive("pinch.brightness_scale", p.brightness_scale)?;
        positive("pinch.volume_scale", p.volume_scale)?;
        if p.scroll_ticks <= 0 {
            return Err(ConfigError::Invalid(
                "pinch.scroll_ticks must be positive".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&p.fallback_brightness) {
            return Err(ConfigError::Invalid(
                "pinch.fallback_brightness must be within 0-100".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&p.fallback_volume) {
            return Err(ConfigError::Invalid(
                "pinch.fallback_volume must be within 0.0-1.0".to_string(),
            ));
        }

        let cur = &self.cursor;
        if cur.tracked_landmark > 20 {
            return Err(ConfigError::Invalid(format!(
                "cursor.tracked_landmark must be a landmark index 0-20, got {}",
                cur.tracked_landmark
            )));
        }
        if cur.dead_zone_sq < 0.0 || cur.dead_zone_sq > cur.progressive_limit_sq {
            return Err(ConfigError::Invalid(
                "cursor.dead_zone_sq must be non-negative and not exceed cursor.progressive_limit_sq"
                    .to_string(),
            ));
        }
        if cur.gain <= 0.0 || cur.max_ratio <= 0.0 {
            return Err(ConfigError::Invalid(
                "cursor.gain and cursor.max_ratio must be positive".to_string(),
            ));
        }

        nonzero("runtime.frame_rate", self.runtime.frame_rate.into())?;
        nonzero("runtime.poll_interval_ms", self.runtime.poll_interval_ms)?;
        nonzero("runtime.frame_buffer", self.runtime.frame_buffer as u64)?;

        if self.desktop.width <= 0 || self.desktop.height <= 0 {
            return Err(ConfigError::Invalid(
                "desktop.width and desktop.height must be positive".to_string(),
            ));
        }
        nonzero("desktop.history_limit", self.desktop.history_limit as u64)?;

        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

fn nonzero(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        Err(ConfigError::Invalid(format!("{} must be at least 1", name)))
    } else {
        Ok(())
    }
}
