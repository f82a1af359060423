//! Shared fixtures for unit tests: synthetic hands and a recording sink.

use std::path::{Path, PathBuf};

use gesture_mouse_config::Handedness;

use crate::actuator::{ActuationError, ActuationResult, Actuator, MouseButton};
use crate::landmark::{
    HandLandmarks, Landmark, INDEX_MCP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_TIP, THUMB_TIP, WRIST,
};

/// Builds a hand with every finger folded and the thumb well away from
/// the index tip and the pinky knuckle.
///
/// Finger `f` (index = 0) sits at x = 0.4 + 0.06 f with its knuckle at
/// y = 0.7. Folded tips hang below the knuckle, extended tips reach y = 0.45.
pub struct HandBuilder {
    handedness: Handedness,
    points: [Landmark; LANDMARK_COUNT],
}

impl HandBuilder {
    pub fn right() -> Self {
        Self::new(Handedness::Right)
    }

    pub fn left() -> Self {
        Self::new(Handedness::Left)
    }

    fn new(handedness: Handedness) -> Self {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[WRIST] = Landmark::new(0.5, 0.9, 0.0);
        points[1] = Landmark::new(0.35, 0.8, 0.0);
        points[2] = Landmark::new(0.28, 0.72, 0.0);
        points[3] = Landmark::new(0.23, 0.65, 0.0);
        points[THUMB_TIP] = Landmark::new(0.2, 0.6, 0.0);
        for finger in 0..4 {
            let x = 0.4 + 0.06 * finger as f32;
            let mcp = INDEX_MCP + finger * 4;
            points[mcp] = Landmark::new(x, 0.7, 0.0);
            points[mcp + 1] = Landmark::new(x, 0.6, 0.0);
            points[mcp + 2] = Landmark::new(x, 0.55, 0.0);
            points[mcp + 3] = Landmark::new(x, 0.75, 0.0);
        }
        Self { handedness, points }
    }

    pub fn point(mut self, index: usize, x: f32, y: f32, z: f32) -> Self {
        self.points[index] = Landmark::new(x, y, z);
        self
    }

    /// Extend or fold index, middle, ring and pinky, in that order.
    pub fn extended(mut self, fingers: &[bool; 4]) -> Self {
        for (finger, &up) in fingers.iter().enumerate() {
            let tip = INDEX_TIP + finger * 4;
            let y = if up { 0.45 } else { 0.75 };
            self.points[tip].y = y;
        }
        self
    }

    /// Spread extended index and middle tips into a V.
    pub fn spread_v(self) -> Self {
        self.point(INDEX_TIP, 0.34, 0.45, 0.0)
            .point(MIDDLE_TIP, 0.52, 0.45, 0.0)
    }

    /// Push the middle tip to depth `z` relative to the index tip.
    pub fn depth(mut self, z: f32) -> Self {
        self.points[MIDDLE_TIP].z = z;
        self
    }

    /// Bring the thumb tip against the index tip.
    pub fn pinch(mut self) -> Self {
        let tip = self.points[INDEX_TIP];
        self.points[THUMB_TIP] = Landmark::new(tip.x + 0.02, tip.y, tip.z);
        self
    }

    pub fn build(self) -> HandLandmarks {
        HandLandmarks::new(self.handedness, self.points)
    }
}

/// Commands issued to a [`RecordingActuator`]. Queries are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Move(i32, i32),
    Down(MouseButton),
    Up(MouseButton),
    Click(MouseButton),
    DoubleClick,
    Scroll(i32),
    HorizontalScroll(i32),
    SetVolume(f32),
    SetBrightness(f32),
    CloseWindow,
    MinimizeAll,
    Open(PathBuf),
    Launch(String),
    ShowComputer,
}

/// In-memory sink on a 1000x1000 screen.
pub struct RecordingActuator {
    pub calls: Vec<Call>,
    pub cursor: (i32, i32),
    pub brightness: f32,
    pub volume: f32,
    /// Make volume and brightness reads fail
    pub fail_reads: bool,
    /// Make every command fail (queries still succeed)
    pub fail_commands: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            cursor: (500, 500),
            brightness: 50.0,
            volume: 0.5,
            fail_reads: false,
            fail_commands: false,
        }
    }

    fn command(&mut self, operation: &'static str, call: Call) -> ActuationResult<()> {
        if self.fail_commands {
            return Err(ActuationError::Rejected {
                operation,
                reason: "test failure".to_string(),
            });
        }
        match call {
            Call::Move(x, y) => self.cursor = (x, y),
            Call::SetVolume(v) => self.volume = v,
            Call::SetBrightness(b) => self.brightness = b,
            _ => {}
        }
        self.calls.push(call);
        Ok(())
    }

    fn read(&self, value: f32, operation: &'static str) -> ActuationResult<f32> {
        if self.fail_reads {
            Err(ActuationError::Unavailable(operation))
        } else {
            Ok(value)
        }
    }
}

impl Actuator for RecordingActuator {
    fn screen_size(&mut self) -> ActuationResult<(i32, i32)> {
        Ok((1000, 1000))
    }

    fn cursor_position(&mut self) -> ActuationResult<(i32, i32)> {
        Ok(self.cursor)
    }

    fn move_cursor(&mut self, x: i32, y: i32) -> ActuationResult<()> {
        self.command("move_cursor", Call::Move(x, y))
    }

    fn mouse_down(&mut self, button: MouseButton) -> ActuationResult<()> {
        self.command("mouse_down", Call::Down(button))
    }

    fn mouse_up(&mut self, button: MouseButton) -> ActuationResult<()> {
        self.command("mouse_up", Call::Up(button))
    }

    fn click(&mut self, button: MouseButton) -> ActuationResult<()> {
        self.command("click", Call::Click(button))
    }

    fn double_click(&mut self) -> ActuationResult<()> {
        self.command("double_click", Call::DoubleClick)
    }

    fn scroll(&mut self, ticks: i32) -> ActuationResult<()> {
        self.command("scroll", Call::Scroll(ticks))
    }

    fn scroll_horizontal(&mut self, ticks: i32) -> ActuationResult<()> {
        self.command("scroll_horizontal", Call::HorizontalScroll(ticks))
    }

    fn volume(&mut self) -> ActuationResult<f32> {
        self.read(self.volume, "volume")
    }

    fn set_volume(&mut self, level: f32) -> ActuationResult<()> {
        self.command("set_volume", Call::SetVolume(level))
    }

    fn brightness(&mut self) -> ActuationResult<f32> {
        self.read(self.brightness, "brightness")
    }

    fn set_brightness(&mut self, percent: f32) -> ActuationResult<()> {
        self.command("set_brightness", Call::SetBrightness(percent))
    }

    fn close_window(&mut self) -> ActuationResult<()> {
        self.command("close_window", Call::CloseWindow)
    }

    fn minimize_all(&mut self) -> ActuationResult<()> {
        self.command("minimize_all", Call::MinimizeAll)
    }

    fn open_path(&mut self, path: &Path) -> ActuationResult<()> {
        self.command("open_path", Call::Open(path.to_path_buf()))
    }

    fn launch(&mut self, program: &str) -> ActuationResult<()> {
        self.command("launch", Call::Launch(program.to_string()))
    }

    fn show_computer(&mut self) -> ActuationResult<()> {
        self.command("show_computer", Call::ShowComputer)
    }
}
