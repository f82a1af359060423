//! One-frame processing step: arbitrate the hands, then dispatch.

use gesture_mouse_config::AppConfig;

use crate::actuator::Actuator;
use crate::arbiter::{Arbitration, DualHandArbiter};
use crate::dispatcher::{ActionDispatcher, ActionLabel};
use crate::gesture::{Gesture, HandRole};
use crate::landmark::Frame;

/// Result of processing one frame, used to annotate the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    /// Role and stable gesture that were dispatched, if any
    pub dispatched: Option<(HandRole, Gesture)>,
    /// Current action label
    pub label: Option<ActionLabel>,
}

/// Owns all per-controller state. Independent engines share nothing.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    arbiter: DualHandArbiter,
    dispatcher: ActionDispatcher,
}

impl GestureEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            arbiter: DualHandArbiter::new(config.hands.dominant, &config.classifier),
            dispatcher: ActionDispatcher::new(config.pinch.clone(), config.cursor.clone()),
        }
    }

    /// Encode, classify, arbitrate and dispatch one frame.
    pub fn process_frame(&mut self, frame: &Frame, actuator: &mut dyn Actuator) -> FrameOutcome {
        match self.arbiter.arbitrate(frame) {
            Arbitration::NoHands => {
                self.dispatcher.idle();
                FrameOutcome::default()
            }
            Arbitration::Idle => FrameOutcome {
                dispatched: None,
                label: self.dispatcher.label(),
            },
            Arbitration::Dispatch {
                role,
                gesture,
                hand,
            } => {
                let label = self.dispatcher.dispatch(gesture, hand, actuator);
                FrameOutcome {
                    dispatched: Some((role, gesture)),
                    label,
                }
            }
        }
    }

    pub fn arbiter(&self) -> &DualHandArbiter {
        &self.arbiter
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }
}
