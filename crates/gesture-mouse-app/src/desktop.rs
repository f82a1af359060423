//! Virtual desktop backend
//!
//! Stands in for the operating system so the pipeline can run anywhere:
//! keeps a cursor, button state, brightness and volume in memory and logs
//! every call it receives. Only the most recent events are kept.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use gesture_mouse_config::DesktopSettings;
use gesture_mouse_core::{ActuationError, ActuationResult, Actuator, MouseButton};
use tracing::{debug, info};

/// Something the virtual desktop did, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DesktopEvent {
    Moved { x: i32, y: i32 },
    Pressed(MouseButton),
    Released(MouseButton),
    Clicked(MouseButton),
    DoubleClicked,
    Scrolled(i32),
    ScrolledHorizontally(i32),
    VolumeSet(f32),
    BrightnessSet(f32),
    WindowClosed,
    AllMinimized,
    Opened(PathBuf),
    Launched(String),
    ComputerShown,
}

/// In-memory desktop implementing [`Actuator`].
#[derive(Debug, Clone)]
pub struct DesktopSimulator {
    width: i32,
    height: i32,
    cursor: (i32, i32),
    left_down: bool,
    right_down: bool,
    brightness: f32,
    volume: f32,
    events: VecDeque<DesktopEvent>,
    history_limit: usize,
    recorded: u64,
}

impl DesktopSimulator {
    pub fn new(settings: &DesktopSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            cursor: (settings.width / 2, settings.height / 2),
            left_down: false,
            right_down: false,
            brightness: settings.brightness,
            volume: settings.volume,
            events: VecDeque::new(),
            history_limit: settings.history_limit.max(1),
            recorded: 0,
        }
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left_down,
            MouseButton::Right => self.right_down,
        }
    }

    pub fn current_brightness(&self) -> f32 {
        self.brightness
    }

    pub fn current_volume(&self) -> f32 {
        self.volume
    }

    /// Most recent events, oldest first.
    pub fn events(&self) -> &VecDeque<DesktopEvent> {
        &self.events
    }

    /// Events seen since creation, including those no longer in the history.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    fn record(&mut self, event: DesktopEvent) {
        if self.events.len() == self.history_limit {
            self.events.pop_front();
        }
        self.events.push_back(event);
        self.recorded += 1;
    }

    fn button_state(&mut self, button: MouseButton) -> &mut bool {
        match button {
            MouseButton::Left => &mut self.left_down,
            MouseButton::Right => &mut self.right_down,
        }
    }
}

impl Default for DesktopSimulator {
    fn default() -> Self {
        Self::new(&DesktopSettings::default())
    }
}

impl Actuator for DesktopSimulator {
    fn screen_size(&mut self) -> ActuationResult<(i32, i32)> {
        Ok((self.width, self.height))
    }

    fn cursor_position(&mut self) -> ActuationResult<(i32, i32)> {
        Ok(self.cursor)
    }

    fn move_cursor(&mut self, x: i32, y: i32) -> ActuationResult<()> {
        let x = x.clamp(0, (self.width - 1).max(0));
        let y = y.clamp(0, (self.height - 1).max(0));
        if (x, y) != self.cursor {
            debug!("Cursor -> ({}, {})", x, y);
        }
        self.cursor = (x, y);
        self.record(DesktopEvent::Moved { x, y });
        Ok(())
    }

    fn mouse_down(&mut self, button: MouseButton) -> ActuationResult<()> {
        let held = self.button_state(button);
        if *held {
            return Err(ActuationError::Rejected {
                operation: "mouse_down",
                reason: format!("{:?} button is already held", button),
            });
        }
        *held = true;
        info!("{:?} button down at {:?}", button, self.cursor);
        self.record(DesktopEvent::Pressed(button));
        Ok(())
    }

    fn mouse_up(&mut self, button: MouseButton) -> ActuationResult<()> {
        let held = self.button_state(button);
        if !*held {
            debug!("{:?} button released while not held", button);
        }
        *held = false;
        info!("{:?} button up at {:?}", button, self.cursor);
        self.record(DesktopEvent::Released(button));
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> ActuationResult<()> {
        info!("{:?} click at {:?}", button, self.cursor);
        self.record(DesktopEvent::Clicked(button));
        Ok(())
    }

    fn double_click(&mut self) -> ActuationResult<()> {
        info!("Double click at {:?}", self.cursor);
        self.record(DesktopEvent::DoubleClicked);
        Ok(())
    }

    fn scroll(&mut self, ticks: i32) -> ActuationResult<()> {
        info!("Scroll {}", ticks);
        self.record(DesktopEvent::Scrolled(ticks));
        Ok(())
    }

    fn scroll_horizontal(&mut self, ticks: i32) -> ActuationResult<()> {
        info!("Horizontal scroll {}", ticks);
        self.record(DesktopEvent::ScrolledHorizontally(ticks));
        Ok(())
    }

    fn volume(&mut self) -> ActuationResult<f32> {
        Ok(self.volume)
    }

    fn set_volume(&mut self, level: f32) -> ActuationResult<()> {
        if !(0.0..=1.0).contains(&level) {
            return Err(ActuationError::Rejected {
                operation: "set_volume",
                reason: format!("{} is outside 0.0..=1.0", level),
            });
        }
        info!("Volume {:.2} -> {:.2}", self.volume, level);
        self.volume = level;
        self.record(DesktopEvent::VolumeSet(level));
        Ok(())
    }

    fn brightness(&mut self) -> ActuationResult<f32> {
        Ok(self.brightness)
    }

    fn set_brightness(&mut self, percent: f32) -> ActuationResult<()> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(ActuationError::Rejected {
                operation: "set_brightness",
                reason: format!("{} is outside 0..=100", percent),
            });
        }
        info!("Brightness {:.0}% -> {:.0}%", self.brightness, percent);
        self.brightness = percent;
        self.record(DesktopEvent::BrightnessSet(percent));
        Ok(())
    }

    fn close_window(&mut self) -> ActuationResult<()> {
        info!("Close focused window");
        self.record(DesktopEvent::WindowClosed);
        Ok(())
    }

    fn minimize_all(&mut self) -> ActuationResult<()> {
        info!("Minimize all windows");
        self.record(DesktopEvent::AllMinimized);
        Ok(())
    }

    fn open_path(&mut self, path: &Path) -> ActuationResult<()> {
        info!("Open {}", path.display());
        self.record(DesktopEvent::Opened(path.to_path_buf()));
        Ok(())
    }

    fn launch(&mut self, program: &str) -> ActuationResult<()> {
        if program.trim().is_empty() {
            return Err(ActuationError::Rejected {
                operation: "launch",
                reason: "no program named".to_string(),
            });
        }
        info!("Launch {}", program);
        self.record(DesktopEvent::Launched(program.to_string()));
        Ok(())
    }

    fn show_computer(&mut self) -> ActuationResult<()> {
        info!("Show computer view");
        self.record(DesktopEvent::ComputerShown);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> DesktopSimulator {
        DesktopSimulator::new(&DesktopSettings {
            width: 100,
            height: 50,
            ..DesktopSettings::default()
        })
    }

    #[test]
    fn test_cursor_starts_centered_and_is_clamped() {
        let mut desktop = small();
        assert_eq!(desktop.cursor(), (50, 25));
        desktop.move_cursor(-10, 500).unwrap();
        assert_eq!(desktop.cursor(), (0, 49));
    }

    #[test]
    fn test_button_hold_and_release() {
        let mut desktop = small();
        desktop.mouse_down(MouseButton::Left).unwrap();
        assert!(desktop.is_pressed(MouseButton::Left));
        assert!(desktop.mouse_down(MouseButton::Left).is_err());
        desktop.mouse_up(MouseButton::Left).unwrap();
        assert!(!desktop.is_pressed(MouseButton::Left));
    }

    #[test]
    fn test_levels_are_range_checked() {
        let mut desktop = small();
        desktop.set_brightness(70.0).unwrap();
        assert!(desktop.set_brightness(120.0).is_err());
        assert_eq!(desktop.brightness().unwrap(), 70.0);

        desktop.set_volume(0.2).unwrap();
        assert!(desktop.set_volume(-0.1).is_err());
        assert_eq!(desktop.volume().unwrap(), 0.2);
        assert_eq!(
            desktop.events(),
            &[DesktopEvent::BrightnessSet(70.0), DesktopEvent::VolumeSet(0.2)]
        );
    }

    #[test]
    fn test_history_keeps_only_recent_events() {
        let mut desktop = DesktopSimulator::new(&DesktopSettings {
            history_limit: 3,
            ..DesktopSettings::default()
        });
        for x in 0..10 {
            desktop.move_cursor(x, 0).unwrap();
        }
        assert_eq!(desktop.recorded(), 10);
        assert_eq!(
            desktop.events(),
            &[
                DesktopEvent::Moved { x: 7, y: 0 },
                DesktopEvent::Moved { x: 8, y: 0 },
                DesktopEvent::Moved { x: 9, y: 0 },
            ]
        );
    }

    #[test]
    fn test_open_and_launch_are_recorded() {
        let mut desktop = small();
        desktop.open_path(Path::new("/home/me/Documents")).unwrap();
        desktop.launch("chrome").unwrap();
        assert!(desktop.launch("  ").is_err());
        desktop.show_computer().unwrap();
        assert_eq!(
            desktop.events(),
            &[
                DesktopEvent::Opened(PathBuf::from("/home/me/Documents")),
                DesktopEvent::Launched("chrome".to_string()),
                DesktopEvent::ComputerShown,
            ]
        );
    }
}
