//! Major/minor hand role assignment and per-frame dispatch priority.

use gesture_mouse_config::{ClassifierSettings, Handedness};

use crate::classifier::GestureTracker;
use crate::gesture::{Gesture, HandRole};
use crate::landmark::{Frame, HandLandmarks};

/// Outcome of arbitrating one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arbitration<'a> {
    /// No hands were detected
    NoHands,
    /// Hands were seen but none is eligible for dispatch
    Idle,
    /// This hand's stable gesture drives the dispatcher
    Dispatch {
        role: HandRole,
        gesture: Gesture,
        hand: &'a HandLandmarks,
    },
}

/// Assigns hands to roles by handedness and decides which one is dispatched.
#[derive(Debug, Clone)]
pub struct DualHandArbiter {
    dominant: Handedness,
    major: GestureTracker,
    minor: GestureTracker,
}

impl DualHandArbiter {
    pub fn new(dominant: Handedness, settings: &ClassifierSettings) -> Self {
        Self {
            dominant,
            major: GestureTracker::new(HandRole::Major, settings),
            minor: GestureTracker::new(HandRole::Minor, settings),
        }
    }

    /// Split a frame's hands into (major, minor). A later hand with the same
    /// handedness replaces an earlier one.
    pub fn assign<'a>(
        &self,
        hands: &'a [HandLandmarks],
    ) -> (Option<&'a HandLandmarks>, Option<&'a HandLandmarks>) {
        let mut major = None;
        let mut minor = None;
        for hand in hands {
            if hand.handedness == self.dominant {
                major = Some(hand);
            } else {
                minor = Some(hand);
            }
        }
        (major, minor)
    }

    /// Classify both roles and pick the hand to dispatch.
    ///
    /// A minor-hand scroll pinch or volume/brightness gesture wins over the
    /// major hand. Without any hands nothing is updated.
    pub fn arbitrate<'a>(&mut self, frame: &'a Frame) -> Arbitration<'a> {
        if frame.is_empty() {
            return Arbitration::NoHands;
        }

        let (major_hand, minor_hand) = self.assign(&frame.hands);
        let major = self.major.observe(major_hand);
        let minor = self.minor.observe(minor_hand);

        if let (Some(gesture), Some(hand)) = (minor, minor_hand) {
            if gesture.overrides_major() {
                return Arbitration::Dispatch {
                    role: HandRole::Minor,
                    gesture,
                    hand,
                };
            }
        }
        if let (Some(gesture), Some(hand)) = (major, major_hand) {
            return Arbitration::Dispatch {
                role: HandRole::Major,
                gesture,
                hand,
            };
        }
        Arbitration::Idle
    }

    pub fn dominant(&self) -> Handedness {
        self.dominant
    }

    pub fn tracker(&self, role: HandRole) -> &GestureTracker {
        match role {
            HandRole::Major => &self.major,
            HandRole::Minor => &self.minor,
        }
    }
}
