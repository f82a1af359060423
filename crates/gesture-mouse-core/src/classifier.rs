//! Rule-based gesture classification with temporal hysteresis.

use gesture_mouse_config::ClassifierSettings;
use tracing::debug;

use crate::finger::{FingerMask, FingerStateEncoder};
use crate::gesture::{Gesture, HandRole};
use crate::landmark::{
    HandLandmarks, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, THUMB_TIP,
};

/// Spread ratio used when the knuckle distance is zero.
const DEGENERATE_SPREAD: f32 = 10.0;

/// Maps a finger mask plus hand geometry to a raw, per-frame gesture.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    settings: ClassifierSettings,
}

impl GestureClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// Classify one frame. Rules are tried in priority order; first match wins.
    pub fn classify(&self, mask: FingerMask, hand: &HandLandmarks, role: HandRole) -> Gesture {
        let bits = mask.bits();

        if (bits == 0b0111 || bits == 0b1111)
            && hand.distance(THUMB_TIP, INDEX_TIP) < self.settings.pinch_distance
        {
            return Gesture::pinch_for(role);
        }

        if bits == 0b1100 {
            let tips = hand.distance(INDEX_TIP, MIDDLE_TIP);
            let knuckles = hand.distance(INDEX_MCP, MIDDLE_MCP);
            let spread = if knuckles == 0.0 {
                DEGENERATE_SPREAD
            } else {
                tips / knuckles
            };
            if spread > self.settings.spread_ratio {
                return Gesture::VGest;
            }
            if hand.point(INDEX_TIP).depth_gap(hand.point(MIDDLE_TIP)) < self.settings.depth_tolerance {
                return Gesture::TwoFingerClosed;
            }
            return Gesture::Mid;
        }

        if bits == 0b1110 && hand.distance(THUMB_TIP, PINKY_MCP) < self.settings.pinch_distance {
            return Gesture::VolumeBrightness;
        }

        Gesture::from_mask(mask)
    }
}

/// Debounces raw classifications into a stable gesture.
///
/// The stable value only moves once the same raw gesture has been seen on
/// `required` consecutive frames.
#[derive(Debug, Clone)]
pub struct Hysteresis {
    required: u32,
    last_raw: Option<Gesture>,
    run_length: u32,
    stable: Gesture,
}

impl Hysteresis {
    pub fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
            last_raw: None,
            run_length: 0,
            stable: Gesture::Palm,
        }
    }

    /// Feed one raw classification and return the (possibly unchanged) stable gesture.
    pub fn observe(&mut self, raw: Gesture) -> Gesture {
        if self.last_raw == Some(raw) {
            self.run_length = self.run_length.saturating_add(1);
        } else {
            self.last_raw = Some(raw);
            self.run_length = 1;
        }

        if self.run_length >= self.required && self.stable != raw {
            debug!("Stable gesture {} -> {}", self.stable, raw);
            self.stable = raw;
        }
        self.stable
    }

    pub fn stable(&self) -> Gesture {
        self.stable
    }

    pub fn raw(&self) -> Option<Gesture> {
        self.last_raw
    }

    pub fn run_length(&self) -> u32 {
        self.run_length
    }
}

/// Encoder, classifier and hysteresis for one hand role.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    role: HandRole,
    encoder: FingerStateEncoder,
    classifier: GestureClassifier,
    hysteresis: Hysteresis,
}

impl GestureTracker {
    pub fn new(role: HandRole, settings: &ClassifierSettings) -> Self {
        Self {
            role,
            encoder: FingerStateEncoder::new(settings.extension_ratio),
            classifier: GestureClassifier::new(settings.clone()),
            hysteresis: Hysteresis::new(settings.hysteresis_frames),
        }
    }

    /// Process this role's hand for the frame.
    ///
    /// Returns the stable gesture when a hand was present. Without a hand
    /// nothing is updated and `None` is returned.
    pub fn observe(&mut self, hand: Option<&HandLandmarks>) -> Option<Gesture> {
        let hand = hand?;
        let mask = self.encoder.update(Some(hand));
        let raw = self.classifier.classify(mask, hand, self.role);
        Some(self.hysteresis.observe(raw))
    }

    pub fn role(&self) -> HandRole {
        self.role
    }

    pub fn mask(&self) -> FingerMask {
        self.encoder.mask()
    }

    pub fn stable(&self) -> Gesture {
        self.hysteresis.stable()
    }

    pub fn hysteresis(&self) -> &Hysteresis {
        &self.hysteresis
    }
}
