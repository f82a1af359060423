//! gesture-mouse-core: hand-gesture driven device control
//!
//! This crate turns per-frame hand landmarks into device actions:
//! - Finger extension encoding and rule-based gesture classification
//! - Frame-count hysteresis so single-frame flicker never reaches the desktop
//! - Major/minor hand arbitration
//! - Edge-triggered clicks and drags, relative cursor motion
//! - Pinch sessions for scroll, brightness and volume
//! - A small voice command vocabulary
//!
//! Everything here is synchronous and platform-free. Actions are issued
//! through the [`Actuator`] trait.

pub mod actuator;
pub mod arbiter;
pub mod classifier;
pub mod dispatcher;
pub mod engine;
pub mod finger;
pub mod gesture;
pub mod landmark;
pub mod pinch;
pub mod voice;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use actuator::{ActuationError, ActuationResult, Actuator, MouseButton};
pub use arbiter::{Arbitration, DualHandArbiter};
pub use classifier::{GestureClassifier, GestureTracker, Hysteresis};
pub use dispatcher::{ActionDispatcher, ActionLabel, CursorTracker, Trend};
pub use engine::{FrameOutcome, GestureEngine};
pub use finger::{FingerMask, FingerStateEncoder};
pub use gesture::{Gesture, HandRole, PinchFamily};
pub use gesture_mouse_config::Handedness;
pub use landmark::{Frame, HandLandmarks, Landmark};
pub use pinch::{Axis, ControlPair, PinchSession, PinchStep};
pub use voice::{ScrollDirection, VoiceCommand, VoiceController, VoiceIntent, VoiceOutcome};
