//! Stable gesture to device action mapping.

use std::fmt;

use gesture_mouse_config::{CursorSettings, PinchSettings};
use tracing::{debug, warn};

use crate::actuator::{self, Actuator, MouseButton};
use crate::gesture::{Gesture, PinchFamily};
use crate::landmark::HandLandmarks;
use crate::pinch::{Axis, ControlPair, PinchSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increase,
    Decrease,
}

/// What the dispatcher did on the last dispatched frame, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLabel {
    MouseControl,
    Dragging,
    LeftClick,
    RightClick,
    DoubleClick,
    Scroll(Axis),
    Brightness(Trend),
    Volume(Trend),
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trend = |t: &Trend| match t {
            Trend::Increase => "Increase",
            Trend::Decrease => "Decrease",
        };
        match self {
            Self::MouseControl => f.write_str("Mouse Control"),
            Self::Dragging => f.write_str("Dragging"),
            Self::LeftClick => f.write_str("Left Click"),
            Self::RightClick => f.write_str("Right Click"),
            Self::DoubleClick => f.write_str("Double Click"),
            Self::Scroll(Axis::Horizontal) => f.write_str("Horizontal Scroll"),
            Self::Scroll(Axis::Vertical) => f.write_str("Vertical Scroll"),
            Self::Brightness(t) => write!(f, "Brightness {}", trend(t)),
            Self::Volume(t) => write!(f, "Volume {}", trend(t)),
        }
    }
}

/// Relative, velocity-scaled cursor motion.
///
/// The cursor moves by the frame-to-frame displacement of the tracked
/// landmark (in screen pixels) times a ratio that is zero inside the dead
/// zone, grows with speed, and is capped for fast motion.
#[derive(Debug, Clone)]
pub struct CursorTracker {
    settings: CursorSettings,
    previous: Option<(i32, i32)>,
}

impl CursorTracker {
    pub fn new(settings: CursorSettings) -> Self {
        Self {
            settings,
            previous: None,
        }
    }

    /// Scale factor for a squared pixel displacement.
    pub fn ratio(&self, distance_sq: f64) -> f64 {
        if distance_sq <= self.settings.dead_zone_sq {
            0.0
        } else if distance_sq <= self.settings.progressive_limit_sq {
            self.settings.gain * distance_sq.sqrt()
        } else {
            self.settings.max_ratio
        }
    }

    /// Update the tracked position and return the new cursor target.
    ///
    /// `None` when the sink could not report its geometry.
    pub fn track(&mut self, hand: &HandLandmarks, actuator: &mut dyn Actuator) -> Option<(i32, i32)> {
        let (width, height) = match actuator.screen_size() {
            Ok(size) => size,
            Err(e) => {
                warn!("Could not read screen size: {}", e);
                return None;
            }
        };
        let point = hand.point(self.settings.tracked_landmark);
        let current = (project(point.x, width), project(point.y, height));
        let previous = self.previous.replace(current).unwrap_or(current);
        let dx = f64::from(current.0) - f64::from(previous.0);
        let dy = f64::from(current.1) - f64::from(previous.1);
        let ratio = self.ratio(dx * dx + dy * dy);

        let (x, y) = match actuator.cursor_position() {
            Ok(pos) => pos,
            Err(e) => {
                warn!("Could not read cursor position: {}", e);
                return None;
            }
        };
        Some((
            x.saturating_add((dx * ratio).round() as i32),
            y.saturating_add((dy * ratio).round() as i32),
        ))
    }

    /// Forget the tracked position so the next frame starts from zero motion.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn previous(&self) -> Option<(i32, i32)> {
        self.previous
    }
}

/// Normalized coordinate to a pixel on a screen axis of `extent` pixels.
/// Landmarks outside the frame pin to the nearest edge; NaN lands on 0.
fn project(value: f32, extent: i32) -> i32 {
    let last = f64::from(extent.max(1) - 1);
    (f64::from(value) * f64::from(extent)).round().clamp(0.0, last) as i32
}

/// Turns the dispatched stable gesture into actions, one frame at a time.
///
/// Discrete actions are edge-triggered: a click fires once on entry and a
/// held drag is released as soon as another gesture is dispatched. Each
/// pinch family owns its own session slot.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    pinch_settings: PinchSettings,
    cursor: CursorTracker,
    move_armed: bool,
    dragging: bool,
    sessions: [Option<PinchSession>; 3],
    label: Option<ActionLabel>,
}

impl ActionDispatcher {
    pub fn new(pinch_settings: PinchSettings, cursor_settings: CursorSettings) -> Self {
        Self {
            pinch_settings,
            cursor: CursorTracker::new(cursor_settings),
            move_armed: false,
            dragging: false,
            sessions: [None, None, None],
            label: None,
        }
    }

    /// Dispatch one frame's stable gesture.
    pub fn dispatch(
        &mut self,
        gesture: Gesture,
        hand: &HandLandmarks,
        actuator: &mut dyn Actuator,
    ) -> Option<ActionLabel> {
        let target = if gesture != Gesture::Palm {
            self.cursor.track(hand, actuator)
        } else {
            None
        };

        if gesture != Gesture::Fist && self.dragging {
            self.dragging = false;
            debug!("Drag released");
            actuator::report("mouse_up", actuator.mouse_up(MouseButton::Left));
        }
        for family in PinchFamily::ALL {
            if gesture.pinch_family() != Some(family) && self.sessions[family.slot()].take().is_some() {
                debug!("Pinch session {:?} ended", family);
            }
        }

        self.label = match gesture {
            Gesture::VGest => {
                self.move_armed = true;
                if let Some((x, y)) = target {
                    actuator::report("move_cursor", actuator.move_cursor(x, y));
                }
                Some(ActionLabel::MouseControl)
            }
            Gesture::Fist => {
                if !self.dragging {
                    self.dragging = true;
                    debug!("Drag started");
                    actuator::report("mouse_down", actuator.mouse_down(MouseButton::Left));
                }
                if let Some((x, y)) = target {
                    actuator::report("move_cursor", actuator.move_cursor(x, y));
                }
                Some(ActionLabel::Dragging)
            }
            Gesture::Mid if self.move_armed => {
                self.move_armed = false;
                actuator::report("click", actuator.click(MouseButton::Left));
                Some(ActionLabel::LeftClick)
            }
            Gesture::Index if self.move_armed => {
                self.move_armed = false;
                actuator::report("right_click", actuator.click(MouseButton::Right));
                Some(ActionLabel::RightClick)
            }
            Gesture::TwoFingerClosed if self.move_armed => {
                self.move_armed = false;
                actuator::report("double_click", actuator.double_click());
                Some(ActionLabel::DoubleClick)
            }
            Gesture::PinchMajor | Gesture::PinchMinor | Gesture::VolumeBrightness => {
                gesture.pinch_family().and_then(|family| self.drive_pinch(family, hand, actuator))
            }
            _ => None,
        };
        self.label
    }

    fn drive_pinch(
        &mut self,
        family: PinchFamily,
        hand: &HandLandmarks,
        actuator: &mut dyn Actuator,
    ) -> Option<ActionLabel> {
        let slot = family.slot();
        if self.sessions[slot].is_none() {
            self.sessions[slot] = Some(PinchSession::begin(
                family,
                hand,
                &self.pinch_settings,
                actuator,
            ));
        }
        let session = self.sessions[slot].as_mut()?;
        session.update(hand, actuator);

        let axis = session.axis_lock()?;
        let trend = if session.committed_level() > 0.0 {
            Trend::Increase
        } else {
            Trend::Decrease
        };
        Some(match (session.pair(), axis) {
            (ControlPair::Scroll, axis) => ActionLabel::Scroll(axis),
            (ControlPair::BrightnessVolume, Axis::Horizontal) => ActionLabel::Brightness(trend),
            (ControlPair::BrightnessVolume, Axis::Vertical) => ActionLabel::Volume(trend),
        })
    }

    /// Frame with no detected hands: drop the cursor anchor and the label.
    /// Active drags and pinch sessions are left alone.
    pub fn idle(&mut self) {
        self.cursor.reset();
        self.label = None;
    }

    pub fn label(&self) -> Option<ActionLabel> {
        self.label
    }

    pub fn session(&self, family: PinchFamily) -> Option<&PinchSession> {
        self.sessions[family.slot()].as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_move_armed(&self) -> bool {
        self.move_armed
    }

    pub fn cursor(&self) -> &CursorTracker {
        &self.cursor
    }
}
