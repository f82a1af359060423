//! Continuous pinch control.
//!
//! A [`PinchSession`] lives from the frame a pinch-family gesture becomes
//! stable until the frame it stops being dispatched. It turns index-tip
//! motion relative to the activation point into a signed level on one axis,
//! waits for the level to settle for a few frames, then fires one continuous
//! action (scroll, brightness or volume) and starts waiting again.

use gesture_mouse_config::PinchSettings;
use tracing::{debug, warn};

use crate::actuator::{self, Actuator};
use crate::gesture::PinchFamily;
use crate::landmark::{HandLandmarks, INDEX_TIP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// The two quantities a session steers, one per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPair {
    /// Horizontal and vertical scrolling
    Scroll,
    /// Brightness on the horizontal axis, volume on the vertical axis
    BrightnessVolume,
}

impl From<PinchFamily> for ControlPair {
    fn from(family: PinchFamily) -> Self {
        match family {
            PinchFamily::Minor => Self::Scroll,
            PinchFamily::Major | PinchFamily::VolumeBrightness => Self::BrightnessVolume,
        }
    }
}

/// Values captured at activation that absolute controls are applied against.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Baseline {
    Scroll,
    Levels { brightness: f32, volume: f32 },
}

/// One fired continuous action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchStep {
    pub axis: Axis,
    pub level: f32,
}

fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone)]
pub struct PinchSession {
    family: PinchFamily,
    pair: ControlPair,
    settings: PinchSettings,
    anchor: (f32, f32),
    baseline: Baseline,
    axis_lock: Option<Axis>,
    committed_level: f32,
    confirm_count: u32,
}

impl PinchSession {
    /// Start a session anchored at the current index tip, reading start values from the sink.
    pub fn begin(
        family: PinchFamily,
        hand: &HandLandmarks,
        settings: &PinchSettings,
        actuator: &mut dyn Actuator,
    ) -> Self {
        let pair = ControlPair::from(family);
        let baseline = match pair {
            ControlPair::Scroll => Baseline::Scroll,
            ControlPair::BrightnessVolume => {
                let brightness = actuator.brightness().unwrap_or_else(|e| {
                    warn!("Could not read brightness, assuming {}: {}", settings.fallback_brightness, e);
                    settings.fallback_brightness
                });
                let volume = actuator.volume().unwrap_or_else(|e| {
                    warn!("Could not read volume, assuming {}: {}", settings.fallback_volume, e);
                    settings.fallback_volume
                });
                Baseline::Levels { brightness, volume }
            }
        };
        let tip = hand.point(INDEX_TIP);
        debug!("Pinch session {:?} anchored at ({:.3}, {:.3})", family, tip.x, tip.y);
        Self::with_baseline(family, (tip.x, tip.y), baseline, settings)
    }

    fn with_baseline(
        family: PinchFamily,
        anchor: (f32, f32),
        baseline: Baseline,
        settings: &PinchSettings,
    ) -> Self {
        Self {
            family,
            pair: ControlPair::from(family),
            settings: settings.clone(),
            anchor,
            baseline,
            axis_lock: None,
            committed_level: 0.0,
            confirm_count: 0,
        }
    }

    /// Horizontal and vertical levels of the index tip relative to the anchor.
    /// Upward motion is positive.
    pub fn levels(&self, hand: &HandLandmarks) -> (f32, f32) {
        let tip = hand.point(INDEX_TIP);
        let lvx = round_tenth((tip.x - self.anchor.0) * 10.0);
        let lvy = round_tenth((self.anchor.1 - tip.y) * 10.0);
        (lvx, lvy)
    }

    /// Run the axis selection and confirm window for one frame's levels.
    ///
    /// Returns the step to actuate once the committed level has held for
    /// `confirm_frames` frames; the frame that sets a new level counts as the first.
    pub fn advance(&mut self, lvx: f32, lvy: f32) -> Option<PinchStep> {
        let threshold = self.settings.axis_threshold;
        let (axis, candidate) = if lvy.abs() > lvx.abs() && lvy.abs() > threshold {
            (Axis::Vertical, lvy)
        } else if lvx.abs() > threshold {
            (Axis::Horizontal, lvx)
        } else {
            return None;
        };
        self.axis_lock = Some(axis);

        if (candidate - self.committed_level).abs() < threshold {
            self.confirm_count += 1;
        } else {
            self.committed_level = candidate;
            self.confirm_count = 1;
        }

        if self.confirm_count >= self.settings.confirm_frames {
            self.confirm_count = 0;
            Some(PinchStep {
                axis,
                level: self.committed_level,
            })
        } else {
            None
        }
    }

    /// Process one active frame: measure, debounce, and actuate if confirmed.
    pub fn update(&mut self, hand: &HandLandmarks, actuator: &mut dyn Actuator) -> Option<PinchStep> {
        let (lvx, lvy) = self.levels(hand);
        let step = self.advance(lvx, lvy)?;
        self.apply(step, actuator);
        Some(step)
    }

    fn apply(&self, step: PinchStep, actuator: &mut dyn Actuator) {
        debug!("Pinch {:?} fires {:?} at level {:.1}", self.family, step.axis, step.level);
        let ticks = if step.level > 0.0 {
            self.settings.scroll_ticks
        } else {
            -self.settings.scroll_ticks
        };
        match (self.pair, step.axis) {
            (ControlPair::Scroll, Axis::Vertical) => {
                actuator::report("scroll", actuator.scroll(ticks));
            }
            (ControlPair::Scroll, Axis::Horizontal) => {
                actuator::report("scroll_horizontal", actuator.scroll_horizontal(ticks));
            }
            (ControlPair::BrightnessVolume, Axis::Horizontal) => {
                if let Some(target) = self.target_brightness(step.level) {
                    actuator::report("set_brightness", actuator.set_brightness(target));
                }
            }
            (ControlPair::BrightnessVolume, Axis::Vertical) => {
                if let Some(target) = self.target_volume(step.level) {
                    actuator::report("set_volume", actuator.set_volume(target));
                }
            }
        }
    }

    /// Brightness for a level, clamped to 0..=100. `None` for scroll sessions.
    pub fn target_brightness(&self, level: f32) -> Option<f32> {
        match self.baseline {
            Baseline::Levels { brightness, .. } => {
                Some((brightness + level * self.settings.brightness_scale).clamp(0.0, 100.0))
            }
            Baseline::Scroll => None,
        }
    }

    /// Volume for a level, clamped to 0.0..=1.0. `None` for scroll sessions.
    pub fn target_volume(&self, level: f32) -> Option<f32> {
        match self.baseline {
            Baseline::Levels { volume, .. } => {
                Some((volume + level * self.settings.volume_scale).clamp(0.0, 1.0))
            }
            Baseline::Scroll => None,
        }
    }

    pub fn family(&self) -> PinchFamily {
        self.family
    }

    pub fn pair(&self) -> ControlPair {
        self.pair
    }

    pub fn anchor(&self) -> (f32, f32) {
        self.anchor
    }

    pub fn axis_lock(&self) -> Option<Axis> {
        self.axis_lock
    }

    pub fn committed_level(&self) -> f32 {
        self.committed_level
    }

    pub fn confirm_count(&self) -> u32 {
        self.confirm_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Call, HandBuilder, RecordingActuator};

    fn session(family: PinchFamily) -> PinchSession {
        let levels = Baseline::Levels {
            brightness: 50.0,
            volume: 0.5,
        };
        let baseline = match ControlPair::from(family) {
            ControlPair::Scroll => Baseline::Scroll,
            ControlPair::BrightnessVolume => levels,
        };
        PinchSession::with_baseline(family, (0.5, 0.5), baseline, &PinchSettings::default())
    }

    #[test]
    fn test_settled_level_fires_once_after_window() {
        let mut s = session(PinchFamily::Major);
        assert_eq!(s.advance(0.0, 0.4), None);
        assert_eq!(s.advance(0.0, 0.45), None);
        let step = s.advance(0.0, 0.5).expect("third settled frame fires");
        assert_eq!(step.axis, Axis::Vertical);
        assert!((step.level - 0.4).abs() < 1e-6);
        assert_eq!(s.confirm_count(), 0);
        assert_eq!(s.advance(0.0, 0.5), None);
    }

    #[test]
    fn test_oscillating_level_never_fires() {
        let mut s = session(PinchFamily::Major);
        for level in [0.4, -0.4, 0.4, -0.4, 0.4] {
            assert_eq!(s.advance(0.0, level), None);
            assert!(s.confirm_count() < 3);
        }
    }

    #[test]
    fn test_small_motion_leaves_state_untouched() {
        let mut s = session(PinchFamily::Minor);
        assert_eq!(s.advance(0.2, -0.1), None);
        assert_eq!(s.axis_lock(), None);
        assert_eq!(s.confirm_count(), 0);
        assert_eq!(s.committed_level(), 0.0);
    }

    #[test]
    fn test_axis_selection_prefers_dominant_motion() {
        let mut s = session(PinchFamily::Minor);
        s.advance(0.6, 0.4);
        assert_eq!(s.axis_lock(), Some(Axis::Horizontal));
        s.advance(0.2, -0.7);
        assert_eq!(s.axis_lock(), Some(Axis::Vertical));
    }

    #[test]
    fn test_levels_invert_y_and_round() {
        let s = session(PinchFamily::Minor);
        let hand = HandBuilder::right().point(INDEX_TIP, 0.56, 0.42, 0.0).build();
        let (lvx, lvy) = s.levels(&hand);
        assert!((lvx - 0.6).abs() < 1e-5);
        assert!((lvy - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_brightness_and_volume_are_clamped() {
        let s = session(PinchFamily::VolumeBrightness);
        assert_eq!(s.target_brightness(50.0), Some(100.0));
        assert_eq!(s.target_brightness(-50.0), Some(0.0));
        assert_eq!(s.target_volume(50.0), Some(1.0));
        assert_eq!(s.target_volume(-50.0), Some(0.0));
        assert_eq!(s.target_brightness(1.0), Some(60.0));
        assert!(session(PinchFamily::Minor).target_volume(1.0).is_none());
    }

    #[test]
    fn test_scroll_session_scrolls_by_sign() {
        let mut actuator = RecordingActuator::new();
        let anchor_hand = HandBuilder::right().point(INDEX_TIP, 0.5, 0.5, 0.0).build();
        let mut s = PinchSession::begin(
            PinchFamily::Minor,
            &anchor_hand,
            &PinchSettings::default(),
            &mut actuator,
        );
        assert!(actuator.calls.is_empty());

        let down = HandBuilder::right().point(INDEX_TIP, 0.5, 0.6, 0.0).build();
        let fired: Vec<_> = (0..3).filter_map(|_| s.update(&down, &mut actuator)).collect();
        assert_eq!(fired.len(), 1);
        assert_eq!(actuator.calls, vec![Call::Scroll(-120)]);
    }

    #[test]
    fn test_brightness_session_uses_start_value() {
        let mut actuator = RecordingActuator::new();
        actuator.brightness = 30.0;
        let anchor_hand = HandBuilder::right().point(INDEX_TIP, 0.5, 0.5, 0.0).build();
        let mut s = PinchSession::begin(
            PinchFamily::Major,
            &anchor_hand,
            &PinchSettings::default(),
            &mut actuator,
        );

        let right = HandBuilder::right().point(INDEX_TIP, 0.6, 0.5, 0.0).build();
        for _ in 0..3 {
            s.update(&right, &mut actuator);
        }
        assert_eq!(actuator.calls, vec![Call::SetBrightness(40.0)]);
    }

    #[test]
    fn test_unreadable_start_values_fall_back() {
        let mut actuator = RecordingActuator::new();
        actuator.fail_reads = true;
        let hand = HandBuilder::right().point(INDEX_TIP, 0.5, 0.5, 0.0).build();
        let s = PinchSession::begin(
            PinchFamily::VolumeBrightness,
            &hand,
            &PinchSettings::default(),
            &mut actuator,
        );
        assert_eq!(s.target_brightness(0.0), Some(50.0));
        assert_eq!(s.target_volume(0.0), Some(0.5));
    }
}
