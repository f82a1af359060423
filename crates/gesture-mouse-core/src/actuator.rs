//! OS actuation sink abstraction.
//!
//! The core never talks to the platform directly. Every cursor, button,
//! scroll, volume and brightness effect goes through an [`Actuator`], and
//! every call may fail on its own without affecting gesture state.

use std::path::Path;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Failure of a single actuation call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActuationError {
    #[error("Platform rejected {operation}: {reason}")]
    Rejected { operation: &'static str, reason: String },

    #[error("{0} is not available on this platform")]
    Unavailable(&'static str),

    #[error("Actuation backend has shut down")]
    Disconnected,
}

pub type ActuationResult<T> = std::result::Result<T, ActuationError>;

/// Device-control operations the gesture pipeline and voice commands can issue.
pub trait Actuator {
    /// Screen size in pixels
    fn screen_size(&mut self) -> ActuationResult<(i32, i32)>;

    /// Current cursor position in pixels
    fn cursor_position(&mut self) -> ActuationResult<(i32, i32)>;

    fn move_cursor(&mut self, x: i32, y: i32) -> ActuationResult<()>;

    fn mouse_down(&mut self, button: MouseButton) -> ActuationResult<()>;

    fn mouse_up(&mut self, button: MouseButton) -> ActuationResult<()>;

    fn click(&mut self, button: MouseButton) -> ActuationResult<()>;

    fn double_click(&mut self) -> ActuationResult<()>;

    /// Vertical scroll; positive scrolls up
    fn scroll(&mut self, ticks: i32) -> ActuationResult<()>;

    /// Horizontal scroll; positive scrolls right
    fn scroll_horizontal(&mut self, ticks: i32) -> ActuationResult<()>;

    /// Master volume in 0.0..=1.0
    fn volume(&mut self) -> ActuationResult<f32>;

    fn set_volume(&mut self, level: f32) -> ActuationResult<()>;

    /// Display brightness in percent, 0..=100
    fn brightness(&mut self) -> ActuationResult<f32>;

    fn set_brightness(&mut self, percent: f32) -> ActuationResult<()>;

    /// Close the focused window
    fn close_window(&mut self) -> ActuationResult<()>;

    /// Minimize every window (show the desktop)
    fn minimize_all(&mut self) -> ActuationResult<()>;

    /// Open a file or folder with its default handler
    fn open_path(&mut self, path: &Path) -> ActuationResult<()>;

    /// Start an application by name, e.g. `"chrome"`
    fn launch(&mut self, program: &str) -> ActuationResult<()>;

    /// Open the file manager's top-level "This PC" view
    fn show_computer(&mut self) -> ActuationResult<()>;
}

/// Log a failed actuation and report whether it succeeded.
pub fn report(operation: &str, result: ActuationResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Actuation '{}' failed: {}", operation, e);
            false
        }
    }
}
